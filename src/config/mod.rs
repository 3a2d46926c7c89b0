//! # Configuration Management
//!
//! Settings come from the process environment, optionally seeded from a
//! `.env` file, and are validated before any workflow starts. CLI flags
//! override individual values afterwards.

mod settings;

pub use settings::{AclBootstrapSettings, IssuanceSettings, ENV_PREFIX};

/// Load `.env` from the working directory if there is one. Variables that
/// are already set are left alone.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable environment file"),
    }
}
