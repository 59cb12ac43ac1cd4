//! Text selection capture

mod debounce;
mod extractor;

pub use debounce::SelectionDebouncer;
pub use extractor::{Rect, SelectionExtractor, SelectionSnapshot, TextSelection};
