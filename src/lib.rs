//! fadelink - messaging engine with ephemeral messages
//!
//! Client-side engine for a chat application backed by an external
//! real-time document store: live message feeds with ordering and
//! de-duplication, backward pagination, and an auto-delete subsystem
//! that sweeps expired messages and presents per-message countdowns.

pub mod core;
pub mod dtos;
pub mod entities;
pub mod expiry;
pub mod feed;
pub mod repositories;
pub mod services;
pub mod store;

// Re-export the main types to shorten imports
pub use crate::core::{AppError, AppState, Config, ErrorKind, init_tracing};
pub use crate::expiry::AutoDeletePreset;
pub use crate::feed::{ChatScope, ChatSession};
pub use crate::store::{DocumentStore, MemoryStore};
