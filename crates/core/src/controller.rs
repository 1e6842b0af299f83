//! Event-driven wrapper that applies navigation effects to the session.

use tracing::{debug, error, info};

use crate::{
    menu::MenuTree,
    nav::{self, Effect, NavigationState, Selection, View},
    session::Session,
};

/// Whether the event loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep processing events.
    Continue,
    /// Terminate the process normally.
    Exit,
}

/// Navigation state plus the session it acts on.
pub struct Controller<'m> {
    menu: &'m MenuTree,
    state: NavigationState,
    session: Session,
}

impl<'m> Controller<'m> {
    /// Start at the root of `menu`.
    pub fn new(menu: &'m MenuTree, session: Session) -> Self {
        Self {
            menu,
            state: NavigationState::default(),
            session,
        }
    }

    /// Current navigation state.
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Session owned by the controller.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Render instruction for the current state.
    pub fn view(&self) -> View {
        nav::view(&self.state, self.menu)
    }

    /// Handle the option at `index` of the current view, if any.
    pub fn select_index(&mut self, index: usize) -> Outcome {
        let selection = nav::visible_options(self.state.location, self.menu)
            .get(index)
            .map(|option| option.selection);
        match selection {
            Some(selection) => self.select(selection),
            None => Outcome::Continue,
        }
    }

    /// Handle one selection event.
    pub fn select(&mut self, selection: Selection) -> Outcome {
        let (next, effect) = nav::step(&self.state, selection, self.menu);
        debug!(?selection, from = ?self.state.location, to = ?next.location, ?effect, "Navigation step");
        self.state = next;
        self.apply(effect)
    }

    /// Replace the info text, e.g. to surface an external notice.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.state.info = message.into();
    }

    /// Export on an external quit signal when `autosave` is set.
    pub fn shutdown(&mut self, autosave: bool) -> Outcome {
        if autosave {
            if let Err(err) = self.session.save() {
                error!(%err, "Autosave on quit failed");
            } else {
                info!("Autosaved on quit");
            }
        }
        Outcome::Exit
    }

    fn apply(&mut self, effect: Effect) -> Outcome {
        match effect {
            Effect::None => Outcome::Continue,
            Effect::ShowRaw => {
                self.state.info = match self.session.raw() {
                    Ok(raw) => format!("Raw save data:\n{raw}"),
                    Err(err) => format!("Unable to display save: {err}"),
                };
                Outcome::Continue
            }
            Effect::Save => {
                self.state.info = match self.session.save() {
                    Ok(()) => {
                        info!(path = %self.session.store().path().display(), "Game saved");
                        "Game saved successfully.".to_string()
                    }
                    Err(err) => {
                        error!(%err, "Save failed");
                        format!("Error saving game: {err}")
                    }
                };
                Outcome::Continue
            }
            Effect::SaveAndExit => match self.session.save() {
                Ok(()) => {
                    info!("Game saved, exiting");
                    self.state.info = "Game saved. Exiting...".to_string();
                    Outcome::Exit
                }
                Err(err) => {
                    error!(%err, "Save before exit failed; staying in session");
                    self.state.info =
                        format!("Error saving game: {err}\nNot exiting so progress is not lost.");
                    Outcome::Continue
                }
            },
        }
    }
}
