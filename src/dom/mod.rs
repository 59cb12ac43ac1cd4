//! Typed HTML tree
//!
//! A small element/text tree shared by every stage of the pipeline:
//! - Parsing via lol_html callbacks
//! - Serialization with html-escape
//! - One document-order traversal that defines the flattened-text
//!   coordinate space for all highlight offsets

mod node;
mod parser;
mod serialize;
pub mod visit;

pub use node::{is_void, Element, Fragment, Node, NodePath, RAW_TEXT_ELEMENTS, VOID_ELEMENTS};
pub use visit::{Boundary, TextSpan};
