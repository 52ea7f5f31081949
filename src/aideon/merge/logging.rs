use tracing_subscriber::EnvFilter;

use crate::aideon::merge::error::{MergeError, Result};

/// Filter applied when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. Output goes to stderr so it never mixes
/// with rendered grids on stdout.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| MergeError::Logging(error.to_string()))
}
