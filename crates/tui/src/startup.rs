//! Process exit statuses and the fallible steps that decide them.

use std::path::Path;

use simshell_core::{Catalog, Outcome};
use tracing::{error, warn};

/// Normal quit, including Save & Exit.
pub const EXIT_OK: u8 = 0;
/// The data catalog is missing, malformed or incomplete.
pub const EXIT_DATA_ERROR: u8 = 1;
/// Terminal input ended before the user quit.
pub const EXIT_INPUT_LOST: u8 = 2;

/// Load the catalog, or report the failure and return the status to exit with.
pub fn load_catalog(path: &Path) -> Result<Catalog, u8> {
    Catalog::load(path).map_err(|err| {
        error!(%err, "Data catalog unavailable");
        eprintln!("Error: {err}");
        EXIT_DATA_ERROR
    })
}

/// Status for the way the event loop finished.
pub fn exit_status(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Exit => EXIT_OK,
        Outcome::Continue => {
            warn!("Event loop stopped without a quit request");
            EXIT_INPUT_LOST
        }
    }
}
