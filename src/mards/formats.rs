//! Output formats
//!
//! Everything that turns a [`Tree`](crate::mards::node::Tree) back into
//! something external:
//! - render: indented MARDS text with a choice of value quoting
//! - value: `serde_json` values (and YAML through them) with optional
//!   single-element list collapsing

pub mod render;
pub mod value;

use thiserror::Error;

use crate::mards::node::Tree;

pub use render::{render, QuoteStyle};
pub use value::{delist, to_json, to_yaml};

/// A conversion that could not be produced
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("format '{0}' not found")]
    FormatNotFound(String),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Emit the tree in a named format
///
/// `json` and `yaml` are the delisted native conversions; `mards` renders
/// the text form back out.
pub fn convert(tree: &Tree, format: &str) -> Result<String, FormatError> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(&delist(to_json(tree)))?),
        "yaml" => Ok(to_yaml(tree)?),
        "mards" => Ok(render(tree, QuoteStyle::ByNeed)),
        other => Err(FormatError::FormatNotFound(other.to_string())),
    }
}
