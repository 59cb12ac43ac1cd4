//! Highlight records, the store contract and the per-story session

mod session;
mod store;
mod types;

pub use session::HighlightSession;
pub use store::HighlightStore;
pub use types::{Highlight, HighlightColor, NewHighlight};
