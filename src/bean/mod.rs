//! Beans: package manifests and where they come from.
//!
//! - [`manifest`] - The parsed [`Manifest`] data model
//! - [`parser`] - The canonical bean grammar
//! - [`source`] - Local and remote bean sources
//! - [`fetch`] - Fetch-and-parse with optional integrity pins

pub mod fetch;
pub mod manifest;
pub mod parser;
pub mod source;

pub use fetch::{sha256_hex, ManifestFetcher, SourceFetcher};
pub use manifest::{is_valid_name, validate_name, Manifest, Script};
pub use parser::{BeanParser, ManifestParser, REMOVE_ARG};
pub use source::{source_from_location, BeanSource, DirSource, HttpSource, DEFAULT_SOURCE};
