//! Host environment utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "PERIPH_SW_ROOT";

/// Get the root directory of the software installation.
///
/// The root holds the `params` directory and is where session directories
/// are created.
pub fn get_periph_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var(SW_ROOT_ENV_VAR)?))
}
