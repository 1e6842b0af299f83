//! Startup protocol choosing between loading the save slot and starting fresh.

use std::io;

use anyhow::{anyhow, Context, Result};
use tracing::{error, info, warn};

use crate::save::{SaveDocument, SaveError, SaveStore};

/// Question asked before the interactive session starts.
pub const QUESTION: &str = "Do you have a save file? Y/N --> ";
/// Notice shown for unrecognised answers.
pub const RETRY_NOTICE: &str = "Please enter Y or N.";
/// Notice shown when the user claims a save that does not exist.
pub const MISSING_NOTICE: &str = "No save file found. Creating a new save instead.";

/// Source of answers and sink for notices during bootstrap.
pub trait Prompt {
    /// Ask `question`; `Ok(None)` means input is closed.
    fn ask(&mut self, question: &str) -> io::Result<Option<String>>;
    /// Show an informational line to the operator.
    fn notify(&mut self, message: &str);
}

/// Parsed answer to [`QUESTION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Load the existing save.
    Existing,
    /// Start a new save.
    Fresh,
}

/// Accepts `y`/`yes`/`n`/`no`, trimmed and case-insensitive.
pub fn parse_choice(input: &str) -> Option<Choice> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Choice::Existing),
        "n" | "no" => Some(Choice::Fresh),
        _ => None,
    }
}

/// Bootstrap progress.
#[derive(Debug)]
pub enum BootstrapState {
    /// Waiting for a valid answer.
    AwaitingChoice,
    /// A persisted document is ready for the session.
    Ready(SaveDocument),
}

/// Two-state machine driven one answer at a time.
pub struct Bootstrap<'a> {
    store: &'a SaveStore,
    state: BootstrapState,
}

impl<'a> Bootstrap<'a> {
    /// Begin awaiting a choice for `store`.
    pub fn new(store: &'a SaveStore) -> Self {
        Self {
            store,
            state: BootstrapState::AwaitingChoice,
        }
    }

    /// Current state.
    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    /// Whether a document has been produced.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, BootstrapState::Ready(_))
    }

    /// Feed one line of input, returning notices for the operator.
    ///
    /// Fails only if a fresh save cannot be persisted.
    pub fn answer(&mut self, input: &str) -> Result<Vec<String>> {
        if self.is_ready() {
            return Ok(Vec::new());
        }
        let Some(choice) = parse_choice(input) else {
            return Ok(vec![RETRY_NOTICE.to_string()]);
        };
        let (document, notices) = self.resolve(choice)?;
        self.state = BootstrapState::Ready(document);
        Ok(notices)
    }

    /// Consume the machine, yielding the document once ready.
    pub fn into_document(self) -> Option<SaveDocument> {
        match self.state {
            BootstrapState::Ready(document) => Some(document),
            BootstrapState::AwaitingChoice => None,
        }
    }

    fn resolve(&self, choice: Choice) -> Result<(SaveDocument, Vec<String>)> {
        if choice == Choice::Fresh {
            return Ok((self.create()?, Vec::new()));
        }

        match self.store.load() {
            Ok(document) => {
                let notice = format!("Loaded save from {}.", self.store.path().display());
                Ok((document, vec![notice]))
            }
            Err(SaveError::Missing { path }) => {
                info!(path = %path.display(), "Save claimed but missing; starting fresh");
                Ok((self.create()?, vec![MISSING_NOTICE.to_string()]))
            }
            Err(err) => {
                // Unreadable saves are moved aside, never silently overwritten.
                warn!(%err, "Save unreadable; starting fresh");
                let mut notices = vec![format!("WARNING: {err}")];
                match self.store.quarantine() {
                    Ok(kept) => notices.push(format!(
                        "The unreadable save was kept at {}.",
                        kept.display()
                    )),
                    Err(move_err) => {
                        error!(%move_err, "Could not quarantine unreadable save");
                        notices.push(format!(
                            "Could not move the unreadable save aside ({move_err}); it will be replaced."
                        ));
                    }
                }
                notices.push("Starting a new save.".to_string());
                Ok((self.create()?, notices))
            }
        }
    }

    fn create(&self) -> Result<SaveDocument> {
        self.store.create_new().with_context(|| {
            format!(
                "cannot start without a persisted save at {}",
                self.store.path().display()
            )
        })
    }
}

/// Ask until answered and return the document the session should own.
pub fn run(prompt: &mut impl Prompt, store: &SaveStore) -> Result<SaveDocument> {
    let mut bootstrap = Bootstrap::new(store);
    while !bootstrap.is_ready() {
        let line = prompt
            .ask(QUESTION)
            .context("failed to read save choice")?
            .ok_or_else(|| anyhow!("input closed before a save choice was made"))?;
        for notice in bootstrap.answer(&line)? {
            prompt.notify(&notice);
        }
    }
    bootstrap
        .into_document()
        .context("bootstrap finished without a save")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::{collections::VecDeque, fs};
    use tempfile::tempdir;

    struct Scripted {
        answers: VecDeque<&'static str>,
        asked: usize,
        notices: Vec<String>,
    }

    impl Scripted {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: 0,
                notices: Vec::new(),
            }
        }
    }

    impl Prompt for Scripted {
        fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
            assert_eq!(question, QUESTION);
            self.asked += 1;
            Ok(self.answers.pop_front().map(str::to_string))
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    fn comparable(mut document: SaveDocument) -> SaveDocument {
        document.created_at = 0.0;
        document
    }

    #[test]
    fn parses_accepted_tokens() {
        for input in ["y", "Y", "yes", " YES \n", "Yes"] {
            assert_eq!(parse_choice(input), Some(Choice::Existing), "{input:?}");
        }
        for input in ["n", "N", "no", "\tNo "] {
            assert_eq!(parse_choice(input), Some(Choice::Fresh), "{input:?}");
        }
        for input in ["", "maybe", "ye", "nope", "y n"] {
            assert_eq!(parse_choice(input), None, "{input:?}");
        }
    }

    #[test]
    fn invalid_answers_reprompt() -> Result<()> {
        let dir = tempdir()?;
        let store = SaveStore::new(dir.path().join("save.json"));
        let mut prompt = Scripted::new(&["maybe", "", "n"]);

        let document = run(&mut prompt, &store)?;
        assert_eq!(prompt.asked, 3);
        assert_eq!(prompt.notices, vec![RETRY_NOTICE, RETRY_NOTICE]);
        assert_eq!(document.version, 1);
        assert!(store.exists());
        Ok(())
    }

    #[test]
    fn claimed_but_missing_save_matches_fresh_start() -> Result<()> {
        let yes_dir = tempdir()?;
        let yes_store = SaveStore::new(yes_dir.path().join("save.json"));
        let mut yes_prompt = Scripted::new(&["y"]);
        let from_yes = run(&mut yes_prompt, &yes_store)?;

        let no_dir = tempdir()?;
        let no_store = SaveStore::new(no_dir.path().join("save.json"));
        let from_no = run(&mut Scripted::new(&["n"]), &no_store)?;

        assert_eq!(comparable(from_yes), comparable(from_no));
        assert!(yes_store.exists());
        assert!(no_store.exists());
        assert_eq!(yes_prompt.notices, vec![MISSING_NOTICE]);
        Ok(())
    }

    #[test]
    fn corrupt_save_is_kept_and_replaced() -> Result<()> {
        let dir = tempdir()?;
        let store = SaveStore::new(dir.path().join("save.json"));
        fs::write(store.path(), "{ this is not json")?;
        let mut prompt = Scripted::new(&["yes"]);

        let document = run(&mut prompt, &store)?;
        assert_eq!(document.version, 1);
        assert!(document.progress.is_empty());
        assert_eq!(store.load()?, document);
        assert!(prompt.notices[0].starts_with("WARNING:"));

        let kept: Vec<_> = fs::read_dir(dir.path())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("save.corrupt-"))
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join(&kept[0]))?,
            "{ this is not json"
        );
        Ok(())
    }

    #[test]
    fn existing_save_is_loaded() -> Result<()> {
        let dir = tempdir()?;
        let store = SaveStore::new(dir.path().join("save.json"));
        fs::write(
            store.path(),
            json!({"version": 1, "created_at": 1700000000.5, "progress": {"cash": 42}})
                .to_string(),
        )?;

        let document = run(&mut Scripted::new(&["Y"]), &store)?;
        assert_eq!(document.created_at, 1700000000.5);
        assert_eq!(document.progress.get("cash"), Some(&json!(42)));
        Ok(())
    }

    #[test]
    fn fresh_choice_overwrites_existing_save() -> Result<()> {
        let dir = tempdir()?;
        let store = SaveStore::new(dir.path().join("save.json"));
        fs::write(
            store.path(),
            r#"{"version": 1, "created_at": 1.0, "progress": {"cash": 42}}"#,
        )?;

        let document = run(&mut Scripted::new(&["no"]), &store)?;
        assert!(document.progress.is_empty());
        assert!(store.load()?.progress.is_empty());
        Ok(())
    }

    #[test]
    fn closed_input_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let store = SaveStore::new(dir.path().join("save.json"));
        assert!(run(&mut Scripted::new(&["what"]), &store).is_err());
        assert!(!store.exists());
        Ok(())
    }

    #[test]
    fn unpersistable_fresh_save_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x")?;
        let store = SaveStore::new(blocker.join("save.json"));

        let mut bootstrap = Bootstrap::new(&store);
        assert!(bootstrap.answer("n").is_err());
        assert!(matches!(bootstrap.state(), BootstrapState::AwaitingChoice));
        Ok(())
    }
}
