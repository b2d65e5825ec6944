//! This crate's private flat, vtabled metadata encoding.
//!
//! See `SPEC_FULL.md` §10.5 for the full byte layout. The two halves below
//! are a matched builder/reader pair; nothing outside `src/metadata/` should
//! need to touch either directly.

pub mod builder;
pub mod reader;

pub use builder::{FlatBuilder, Offset, TableBuilder};
pub use reader::{FlatReader, TableReader};
