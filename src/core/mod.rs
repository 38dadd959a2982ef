//! Core Module - infrastructure components
//!
//! Configuration, error handling and shared application state.

pub mod config;
pub mod error;
pub mod state;

// Re-exports to shorten imports
pub use config::Config;
pub use error::{AppError, ErrorKind};
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, honoring `RUST_LOG`.
/// Call once at startup; a second call is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
