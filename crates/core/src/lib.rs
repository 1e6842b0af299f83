#![warn(clippy::all, missing_docs)]

//! Core logic for the SimShell management-game shell.
//!
//! This crate hosts the static data catalog, the save slot, the menu tree,
//! the navigation state machine and the startup bootstrap. Frontends drive
//! a [`Controller`] and render the [`nav::View`] it produces.

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod menu;
pub mod nav;
pub mod save;
pub mod session;

pub use catalog::{Catalog, CatalogError};
pub use config::AppConfig;
pub use controller::{Controller, Outcome};
pub use menu::{Action, MenuTree, Tab, MENU};
pub use nav::{Location, NavigationState, Selection, View};
pub use save::{SaveDocument, SaveError, SaveStore};
pub use session::Session;
