//! Allow-listed file reads and `@import` inlining.
//!
//! Containment is decided lexically by [`path::is_contained`]. Symbolic links
//! are not resolved, so a link inside an allowed directory can still point
//! outside of it.

pub mod config;
pub mod errors;
pub mod inline;
pub mod logging;
pub mod path;
pub mod reader;
pub mod security;


pub use errors::{Error, Result};
pub use inline::{inline_imports, Inliner, ProcessedDocument};
pub use path::{is_contained, normalize_join, resolve_relative_to};
pub use reader::{read, AllowList, SafeReader};
