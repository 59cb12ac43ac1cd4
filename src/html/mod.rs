//! HTML processing: content normalization and highlight injection

mod highlight_injector;
mod normalizer;
mod rules;

pub use highlight_injector::{
    inject_highlights, HighlightConfig, HighlightInjector, InjectionResult,
};
pub use normalizer::{is_full_document, Normalizer};
pub use rules::NORMALIZER_VERSION;
