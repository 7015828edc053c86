//! Wraeblast Parser - filter text and structured documents to the element model
//!
//! This crate provides two front ends producing an [`ItemFilter`]:
//! - [`StandardParser`] for the canonical line-oriented filter format
//! - [`DocumentParser`] for YAML documents with presets, styles and rules

pub mod document;
pub mod error;
pub mod standard;
pub mod yaml_parser;

// Re-export main parser types
pub use document::DocumentParser;
pub use error::{ParseError, Result};
pub use standard::StandardParser;
pub use yaml_parser::YamlParser;

use wraeblast_core::ItemFilter;

/// Parse canonical filter text
pub fn loads(text: &str) -> Result<ItemFilter> {
    StandardParser::parse(text)
}
