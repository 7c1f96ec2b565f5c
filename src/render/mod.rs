//! Presentation layer. Everything here is a pure function of the message
//! list and the per-artifact tab map; no module below owns conversation
//! state.

pub mod artifact;
pub mod code;
pub mod markdown;
pub mod message;

pub use artifact::ViewMode;
