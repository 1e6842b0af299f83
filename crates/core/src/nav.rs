//! Menu navigation state machine.
//!
//! [`step`] is a pure transition from the current [`NavigationState`] and a
//! [`Selection`] to the next state plus an [`Effect`] the caller must apply.
//! Rendering reads a [`View`] built from the state and never feeds back into it.

use crate::menu::{Action, MenuTree, Tab, BACK_ID, BACK_LABEL};

/// Info text shown at the root.
pub const ROOT_INFO: &str = "Select a tab to view info...";
/// Title of the option list at the root.
pub const ROOT_TITLE: &str = "Menu";

const CREDITS: &str = "Credits:\nGame design by Jackson.\nPowered by Rust and ratatui.";

/// Where the user currently is in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Top-level tabs are visible.
    AtRoot,
    /// A tab's submenu is visible.
    InSubmenu(Tab),
}

/// Current position plus the info text on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    /// Active node.
    pub location: Location,
    /// Text in the info panel.
    pub info: String,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            location: Location::AtRoot,
            info: ROOT_INFO.to_string(),
        }
    }
}

/// A user selection from the visible option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Open a tab.
    Tab(Tab),
    /// Pick a submenu entry.
    Option(Action),
    /// Return to the root.
    Back,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing beyond the state change.
    None,
    /// Display the live save document.
    ShowRaw,
    /// Export the live save document.
    Save,
    /// Export the live save document, then terminate.
    SaveAndExit,
}

/// Concrete behaviour bound to a `(tab, action)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Show fixed text.
    Message(&'static str),
    /// Request a side effect.
    Effect(Effect),
}

/// Dispatch table. `None` means the pair has no dedicated behaviour yet.
pub fn dispatch(tab: Tab, action: Action) -> Option<Handler> {
    use Action::*;
    let handler = match (tab, action) {
        (Tab::Settings, Credits) => Handler::Message(CREDITS),
        (Tab::Settings, SeeRaw) => Handler::Effect(Effect::ShowRaw),
        (Tab::Settings, Save) => Handler::Effect(Effect::Save),
        (Tab::Settings, SaveExit) => Handler::Effect(Effect::SaveAndExit),

        (Tab::Bank, Account) => {
            Handler::Message("Bank → Account:\nView balances, deposits, and withdrawals.")
        }
        (Tab::Bank, Loans) => {
            Handler::Message("Bank → Loans:\nManage active loans, apply for new ones.")
        }
        (Tab::Bank, Properties) => {
            Handler::Message("Bank → Properties:\nTrack owned properties and mortgages.")
        }
        (Tab::Bank, Stock) => {
            Handler::Message("Bank → Stock:\nBuy, sell, and monitor stock investments.")
        }

        (Tab::Market, Buy) => Handler::Message("Market → Buy:\nPurchase goods and resources."),
        (Tab::Market, Sell) => {
            Handler::Message("Market → Sell:\nSell products and surplus stock.")
        }
        (Tab::Market, Upgrade) => Handler::Message(
            "Market → Upgrade:\nInvest in better trading tools or market reach.",
        ),

        _ => return None,
    };
    Some(handler)
}

/// Message for pairs without a dispatch entry.
pub fn fallback_message(tab: Tab, action: Action) -> String {
    format!("Selected option: {tab}-{action}")
}

/// One entry of the visible option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleOption {
    /// Identifier unique within the list.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Selection produced when chosen.
    pub selection: Selection,
}

/// Everything the rendering layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Title of the option list.
    pub title: String,
    /// Info panel text.
    pub info: String,
    /// Selectable entries, in order.
    pub options: Vec<VisibleOption>,
}

/// Options visible at `location`: the tabs at the root, or a submenu followed by Back.
pub fn visible_options(location: Location, menu: &MenuTree) -> Vec<VisibleOption> {
    match location {
        Location::AtRoot => menu
            .tabs()
            .iter()
            .map(|node| VisibleOption {
                id: node.tab.id().to_string(),
                label: node.tab.label().to_string(),
                selection: Selection::Tab(node.tab),
            })
            .collect(),
        Location::InSubmenu(tab) => {
            let mut options: Vec<_> = menu
                .tab(tab)
                .map(|node| node.options.as_slice())
                .unwrap_or_default()
                .iter()
                .map(|option| VisibleOption {
                    id: format!("{tab}-{}", option.action),
                    label: option.label.to_string(),
                    selection: Selection::Option(option.action),
                })
                .collect();
            options.push(VisibleOption {
                id: BACK_ID.to_string(),
                label: BACK_LABEL.to_string(),
                selection: Selection::Back,
            });
            options
        }
    }
}

/// Render instruction for `state`.
pub fn view(state: &NavigationState, menu: &MenuTree) -> View {
    let title = match state.location {
        Location::AtRoot => ROOT_TITLE,
        Location::InSubmenu(tab) => tab.label(),
    };
    View {
        title: title.to_string(),
        info: state.info.clone(),
        options: visible_options(state.location, menu),
    }
}

/// Apply `selection` to `state`.
///
/// Selections that are not visible from the current location leave the state
/// untouched. Effects carry no info text; the caller reports their outcome.
pub fn step(
    state: &NavigationState,
    selection: Selection,
    menu: &MenuTree,
) -> (NavigationState, Effect) {
    let unchanged = || (state.clone(), Effect::None);
    match (state.location, selection) {
        (Location::AtRoot, Selection::Tab(tab)) if menu.tab(tab).is_some() => (
            NavigationState {
                location: Location::InSubmenu(tab),
                info: format!("{} tab selected.", tab.label()),
            },
            Effect::None,
        ),
        (Location::InSubmenu(_), Selection::Back) => (NavigationState::default(), Effect::None),
        (Location::InSubmenu(tab), Selection::Option(action)) => {
            let offered = menu
                .tab(tab)
                .map(|node| node.options.iter().any(|option| option.action == action))
                .unwrap_or(false);
            if !offered {
                return unchanged();
            }
            match dispatch(tab, action) {
                Some(Handler::Message(text)) => (
                    NavigationState {
                        location: state.location,
                        info: text.to_string(),
                    },
                    Effect::None,
                ),
                Some(Handler::Effect(effect)) => (state.clone(), effect),
                None => (
                    NavigationState {
                        location: state.location,
                        info: fallback_message(tab, action),
                    },
                    Effect::None,
                ),
            }
        }
        _ => unchanged(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MENU;

    fn open(tab: Tab) -> NavigationState {
        step(&NavigationState::default(), Selection::Tab(tab), &MENU).0
    }

    #[test]
    fn starts_at_root_with_tabs() {
        let state = NavigationState::default();
        let view = view(&state, &MENU);
        assert_eq!(view.info, ROOT_INFO);
        let labels: Vec<_> = view.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Production", "Staff", "Market", "Bank", "Encyclopedia", "Settings"]
        );
    }

    #[test]
    fn selecting_a_tab_shows_its_submenu_plus_back() {
        for node in MENU.tabs() {
            let (state, effect) =
                step(&NavigationState::default(), Selection::Tab(node.tab), &MENU);
            assert_eq!(effect, Effect::None);
            assert_eq!(state.location, Location::InSubmenu(node.tab));
            assert_eq!(state.info, format!("{} tab selected.", node.tab.label()));

            let options = visible_options(state.location, &MENU);
            assert_eq!(options.len(), node.options.len() + 1);
            for (visible, configured) in options.iter().zip(&node.options) {
                assert_eq!(visible.label, configured.label);
                assert_eq!(visible.selection, Selection::Option(configured.action));
            }
            let backs = options
                .iter()
                .filter(|o| o.selection == Selection::Back)
                .count();
            assert_eq!(backs, 1);
            assert_eq!(options.last().map(|o| o.id.as_str()), Some(BACK_ID));
        }
    }

    #[test]
    fn back_restores_root_exactly() {
        let root = view(&NavigationState::default(), &MENU);
        for tab in Tab::ALL {
            let inside = step(&open(tab), Selection::Option(Action::Save), &MENU).0;
            let (state, effect) = step(&inside, Selection::Back, &MENU);
            assert_eq!(effect, Effect::None);
            assert_eq!(state, NavigationState::default());
            assert_eq!(view(&state, &MENU), root);
        }
    }

    #[test]
    fn dispatch_covers_settings_bank_and_market() {
        for tab in [Tab::Settings, Tab::Bank, Tab::Market] {
            let node = MENU.tab(tab).expect("tab exists");
            for option in &node.options {
                assert!(
                    dispatch(tab, option.action).is_some(),
                    "{tab}-{} has no handler",
                    option.action
                );
                let (state, effect) = step(&open(tab), Selection::Option(option.action), &MENU);
                if effect == Effect::None {
                    assert_ne!(state.info, fallback_message(tab, option.action));
                    assert!(!state.info.starts_with("Selected option"));
                }
            }
        }
    }

    #[test]
    fn bank_and_market_messages() {
        let (state, _) = step(&open(Tab::Bank), Selection::Option(Action::Loans), &MENU);
        assert_eq!(
            state.info,
            "Bank → Loans:\nManage active loans, apply for new ones."
        );
        assert_eq!(state.location, Location::InSubmenu(Tab::Bank));

        let (state, _) = step(&open(Tab::Market), Selection::Option(Action::Upgrade), &MENU);
        assert!(state.info.starts_with("Market → Upgrade:"));
    }

    #[test]
    fn settings_actions_request_effects() {
        let settings = open(Tab::Settings);
        let cases = [
            (Action::SeeRaw, Effect::ShowRaw),
            (Action::Save, Effect::Save),
            (Action::SaveExit, Effect::SaveAndExit),
        ];
        for (action, expected) in cases {
            let (state, effect) = step(&settings, Selection::Option(action), &MENU);
            assert_eq!(effect, expected);
            assert_eq!(state.location, Location::InSubmenu(Tab::Settings));
        }
        let (state, effect) = step(&settings, Selection::Option(Action::Credits), &MENU);
        assert_eq!(effect, Effect::None);
        assert!(state.info.starts_with("Credits:"));
    }

    #[test]
    fn unmatched_pairs_use_generic_message() {
        let (state, effect) = step(
            &open(Tab::Production),
            Selection::Option(Action::Factories),
            &MENU,
        );
        assert_eq!(effect, Effect::None);
        assert_eq!(state.info, "Selected option: production-factories");
        assert_eq!(state.location, Location::InSubmenu(Tab::Production));
    }

    #[test]
    fn invisible_selections_are_ignored() {
        let root = NavigationState::default();
        assert_eq!(step(&root, Selection::Back, &MENU), (root.clone(), Effect::None));
        assert_eq!(
            step(&root, Selection::Option(Action::Save), &MENU),
            (root.clone(), Effect::None)
        );

        let staff = open(Tab::Staff);
        assert_eq!(
            step(&staff, Selection::Tab(Tab::Bank), &MENU),
            (staff.clone(), Effect::None)
        );
        assert_eq!(
            step(&staff, Selection::Option(Action::SaveExit), &MENU),
            (staff.clone(), Effect::None)
        );
    }
}
