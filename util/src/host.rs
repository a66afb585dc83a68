//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the software from the `VULCAN_SW_ROOT`
/// environment variable.
///
/// The parameter and session directories are resolved relative to this root,
/// so the variable must be set before any executable is started.
pub fn get_vulcan_sw_root() -> Result<PathBuf, std::env::VarError> {
    let root = std::env::var("VULCAN_SW_ROOT")?;
    Ok(PathBuf::from(root))
}
