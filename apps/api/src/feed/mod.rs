//! The quote feed: a page of recent quotes, the card cursor over it, and the
//! optimistic like/save path.

pub mod commands;
pub mod gestures;
pub mod handlers;
pub mod loader;
pub mod navigation;
pub mod state;
pub mod sync;
