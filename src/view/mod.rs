//! The review panel, modeled without a rendering surface.
//!
//! - [`state`]: immutable view state and transition functions
//! - [`render`]: text rendering of a state
//! - [`session`]: runs a state against a [`SyncService`](crate::protocol::SyncService)

pub mod render;
pub mod session;
pub mod state;

pub use render::render;
pub use session::Session;
pub use state::{init, update, ChunkDraft, DraftField, VersionTab, ViewEvent, ViewMode, ViewState};
