//! `.env` file loading
//!
//! `.env.local` is read before `.env`; dotenvy never overrides variables
//! that are already set, so the real environment wins over both files.

use crate::primitives::ConfigError;
use std::path::Path;

pub const ENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Load the `.env` files in `dir` into the process environment
///
/// Missing files are fine; unreadable or malformed ones are errors.
pub fn load_env_files(dir: &Path) -> Result<(), ConfigError> {
    for name in ENV_FILES {
        if let Err(e) = dotenvy::from_path(dir.join(name)) {
            if e.not_found() {
                continue;
            }
            return Err(ConfigError::EnvFileError {
                file: name.to_string(),
                source: e,
            });
        }
        tracing::debug!(file = name, "loaded environment file");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("loader.test.rs");
}
