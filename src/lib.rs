//! Story Annotations
//!
//! Normalizes raw story markup into display-ready HTML, captures text
//! selections as character-offset ranges, persists them as highlights and
//! re-projects stored highlights onto the content at render time.
//!
//! # Modules
//!
//! - `dom`: typed document tree and the shared text traversal
//! - `html`: content normalization and highlight injection
//! - `selection`: selection extraction and debouncing
//! - `highlights`: highlight records, store contract, per-story session
//! - `db`: SQLite highlight store
//! - `navigation`: jump-to-highlight

pub mod config;
pub mod db;
pub mod dom;
pub mod error;
pub mod highlights;
pub mod html;
pub mod navigation;
pub mod selection;
pub mod story;

pub use error::{Error, Result};
