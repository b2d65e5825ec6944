//! An IPC message codec for a columnar in-memory analytics format: message
//! framing with 8-byte alignment, a versioned and extensible flat metadata
//! encoding for schemas, record batches, and dictionary batches, and a
//! zero-copy column-buffer layout over `bytes::Bytes` body regions.
//!
//! Three layers, thinnest first:
//!
//! - [`framer`] — the wire-level prefix/payload/padding/body shape, with no
//!   opinion on what the payload means.
//! - [`schema_codec`] and [`batch_codec`] — the message kinds built on top
//!   of the framer, plus the buffer-layout contract for record batches and
//!   dictionary batches.
//! - [`reader::MessageReader`] — a sequential dispatcher over a stream of
//!   mixed message kinds.
//!
//! `metadata` and `flat` implement the self-describing metadata format
//! itself and are reused by both codec layers.

pub mod allocator;
pub mod batch_codec;
pub mod channel;
pub mod error;
mod flat;
pub mod framer;
pub mod metadata;
pub mod options;
pub mod reader;
pub mod schema_codec;

pub use allocator::{Allocator, ByteRegion, DefaultAllocator};
pub use error::{Error, Result};
pub use framer::Block;
pub use options::WriteOptions;
pub use reader::{Frame, MessageReader};
