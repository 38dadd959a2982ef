//! Real-time message feed
//!
//! One session per open conversation: a live subscription normalized
//! into an ordered view, a backward pagination cursor over older
//! history, and the timers of the ephemeral subsystem. Everything a
//! session starts stops with it.

pub mod pagination;
pub mod session;
pub mod synchronizer;
pub mod view;

pub use pagination::PaginationCursor;
pub use session::{ChatScope, ChatSession};
pub use synchronizer::normalize_snapshot;
pub use view::{SharedView, View};
