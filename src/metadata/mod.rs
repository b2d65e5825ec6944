//! The flat, versioned, extensible metadata schema (spec §4.1, component
//! C1): logical types, fields, schemas, and the record-batch/dictionary-batch
//! headers, all built on top of `crate::flat`'s private vtable encoding.

pub mod batch;
pub mod datatype;
pub mod field;
pub mod schema;

pub use batch::{
    DictionaryBatchHeader, FieldNode, BufferDesc, Message, MessageHeader, MetadataVersion,
    RecordBatchHeader,
};
pub use datatype::{DataType, DateUnit, IntervalUnit, Precision, TimeUnit, UnionMode};
pub use field::{DictionaryEncoding, Field, IndexType, KeyValue};
pub use schema::{Endianness, Schema};
