//! Session transcript: the ordered list of submitted messages and the reducer
//! that folds request outcomes into them.

pub mod reducer;
pub mod store;

pub use reducer::{reduce, MessageEvent};
pub use store::TranscriptStore;
