//! The live save document and the store it persists to.

use serde_json::Value;

use crate::save::{SaveDocument, SaveError, SaveStore};

/// Owner of the one live [`SaveDocument`] for the process.
///
/// Everything else reaches the document through this type, so reads and
/// exports share a single `&mut` path on the event-loop thread.
#[derive(Debug)]
pub struct Session {
    store: SaveStore,
    document: SaveDocument,
}

impl Session {
    /// Wrap a document produced by bootstrap.
    pub fn new(store: SaveStore, document: SaveDocument) -> Self {
        Self { store, document }
    }

    /// Store backing the session.
    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    /// Read-only access to the live document.
    pub fn document(&self) -> &SaveDocument {
        &self.document
    }

    /// Live document as pretty JSON.
    pub fn raw(&self) -> Result<String, SaveError> {
        self.document.to_pretty_json()
    }

    /// Persist the live document.
    pub fn save(&self) -> Result<(), SaveError> {
        self.store.export(&self.document)
    }

    /// Set a progress value, returning the previous one.
    pub fn set_progress(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.document.progress.insert(key.into(), value)
    }

    /// Look up a progress value.
    pub fn progress(&self, key: &str) -> Option<&Value> {
        self.document.progress.get(key)
    }
}
