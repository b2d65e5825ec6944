//! `FieldNode`, `Buffer` descriptors, `RecordBatch`/`DictionaryBatch`
//! headers, and the root `Message` envelope (spec §3, §4.1).

use crate::error::{Error, Result};
use crate::flat::{FlatBuilder, FlatReader, Offset};
use crate::metadata::schema::Schema;

/// Per-column row/null-count statistics, in the schema's DFS preorder.
///
/// Fixed-layout (not a table): two `i64`s, written inline in a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldNode {
    pub length: i64,
    pub null_count: i64,
}

/// `(offset, length)` locating one column buffer inside a body region.
///
/// Fixed-layout (not a table): two `i64`s, written inline in a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    pub offset: i64,
    pub length: i64,
}

/// The metadata header of a record batch: row count plus the fixed-order
/// node and buffer lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBatchHeader {
    pub length: i64,
    pub nodes: Vec<FieldNode>,
    pub buffers: Vec<BufferDesc>,
}

impl RecordBatchHeader {
    pub(crate) fn encode(&self, b: &mut FlatBuilder) -> Offset {
        let nodes_off = b.write_struct_pair_vector(
            &self.nodes.iter().map(|n| (n.length, n.null_count)).collect::<Vec<_>>(),
        );
        let buffers_off = b.write_struct_pair_vector(
            &self.buffers.iter().map(|buf| (buf.offset, buf.length)).collect::<Vec<_>>(),
        );
        let mut t = b.start_table();
        t.push_i64(0, self.length, 0);
        t.push_offset(1, Some(nodes_off));
        t.push_offset(2, Some(buffers_off));
        t.finish()
    }

    pub(crate) fn decode(reader: &FlatReader<'_>, offset: Offset) -> Result<Self> {
        let t = reader.table_at(offset)?;
        let nodes = match t.get_offset(1)? {
            None => Vec::new(),
            Some(off) => reader
                .struct_pair_vector_at(off)?
                .into_iter()
                .map(|(length, null_count)| FieldNode { length, null_count })
                .collect(),
        };
        let buffers = match t.get_offset(2)? {
            None => Vec::new(),
            Some(off) => reader
                .struct_pair_vector_at(off)?
                .into_iter()
                .map(|(offset, length)| BufferDesc { offset, length })
                .collect(),
        };
        Ok(RecordBatchHeader {
            length: t.get_i64(0, 0)?,
            nodes,
            buffers,
        })
    }
}

/// `DictionaryBatch{id, data}` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryBatchHeader {
    pub id: i64,
    pub data: RecordBatchHeader,
}

impl DictionaryBatchHeader {
    pub(crate) fn encode(&self, b: &mut FlatBuilder) -> Offset {
        let data_off = self.data.encode(b);
        let mut t = b.start_table();
        t.push_i64(0, self.id, 0);
        t.push_offset(1, Some(data_off));
        t.finish()
    }

    pub(crate) fn decode(reader: &FlatReader<'_>, offset: Offset) -> Result<Self> {
        let t = reader.table_at(offset)?;
        let data_off = t.get_offset(1)?.ok_or(Error::UnexpectedEof)?;
        Ok(DictionaryBatchHeader {
            id: t.get_i64(0, 0)?,
            data: RecordBatchHeader::decode(reader, data_off)?,
        })
    }
}

/// The supported metadata format versions. Only `V4` is accepted by this
/// crate's reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataVersion {
    V1,
    V2,
    V3,
    V4,
    V5,
}

impl MetadataVersion {
    pub fn to_i16(self) -> i16 {
        match self {
            MetadataVersion::V1 => 0,
            MetadataVersion::V2 => 1,
            MetadataVersion::V3 => 2,
            MetadataVersion::V4 => 3,
            MetadataVersion::V5 => 4,
        }
    }

    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(MetadataVersion::V1),
            1 => Some(MetadataVersion::V2),
            2 => Some(MetadataVersion::V3),
            3 => Some(MetadataVersion::V4),
            4 => Some(MetadataVersion::V5),
            _ => None,
        }
    }
}

/// The `Message.header` union. `Tensor`/`SparseTensor` are recognized as
/// valid tags (so a mixed-version stream does not misparse) but are never
/// produced and are rejected with `Error::UnexpectedHeader` if a caller asks
/// for one, since materializing them is out of this crate's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageHeader {
    Schema(Schema),
    RecordBatch(RecordBatchHeader),
    DictionaryBatch(DictionaryBatchHeader),
    Tensor,
    SparseTensor,
}

impl MessageHeader {
    fn tag(&self) -> u8 {
        match self {
            MessageHeader::Schema(_) => 1,
            MessageHeader::RecordBatch(_) => 2,
            MessageHeader::DictionaryBatch(_) => 3,
            MessageHeader::Tensor => 4,
            MessageHeader::SparseTensor => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MessageHeader::Schema(_) => "Schema",
            MessageHeader::RecordBatch(_) => "RecordBatch",
            MessageHeader::DictionaryBatch(_) => "DictionaryBatch",
            MessageHeader::Tensor => "Tensor",
            MessageHeader::SparseTensor => "SparseTensor",
        }
    }
}

/// The root of a framed payload (spec §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub version: MetadataVersion,
    pub header: MessageHeader,
    pub body_length: i64,
}

impl Message {
    pub fn encode(&self) -> Vec<u8> {
        let mut b = FlatBuilder::new();
        let header_off = match &self.header {
            MessageHeader::Schema(s) => Some(s.encode(&mut b)),
            MessageHeader::RecordBatch(h) => Some(h.encode(&mut b)),
            MessageHeader::DictionaryBatch(h) => Some(h.encode(&mut b)),
            MessageHeader::Tensor | MessageHeader::SparseTensor => None,
        };
        let mut t = b.start_table();
        t.push_i16(0, self.version.to_i16(), MetadataVersion::V4.to_i16());
        t.push_u8(1, self.header.tag(), 0);
        t.push_offset(2, header_off);
        t.push_i64(3, self.body_length, 0);
        let root = t.finish();
        b.finish(root)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let reader = FlatReader::new(buf)?;
        let t = reader.root()?;
        let version_raw = t.get_i16(0, MetadataVersion::V4.to_i16())?;
        let version = MetadataVersion::from_i16(version_raw)
            .ok_or(Error::IncompatibleVersion { found: version_raw })?;
        let header_tag = t.get_u8(1, 0)?;
        let header_off = t.get_offset(2)?;
        let header = match header_tag {
            1 => MessageHeader::Schema(Schema::decode(
                &reader,
                header_off.ok_or(Error::UnexpectedEof)?,
            )?),
            2 => MessageHeader::RecordBatch(RecordBatchHeader::decode(
                &reader,
                header_off.ok_or(Error::UnexpectedEof)?,
            )?),
            3 => MessageHeader::DictionaryBatch(DictionaryBatchHeader::decode(
                &reader,
                header_off.ok_or(Error::UnexpectedEof)?,
            )?),
            4 => MessageHeader::Tensor,
            5 => MessageHeader::SparseTensor,
            other => return Err(Error::UnsupportedType { tag: other }),
        };
        Ok(Message {
            version,
            header,
            body_length: t.get_i64(3, 0)?,
        })
    }

    /// Enforces the "producer and consumer agree on V4" rule (spec's S4
    /// boundary scenario): a recognized-but-superseded version such as V3
    /// is a distinct failure from an unrecognized one, but both surface as
    /// `Error::IncompatibleVersion`.
    pub(crate) fn require_v4(&self) -> Result<()> {
        if self.version != MetadataVersion::V4 {
            return Err(Error::IncompatibleVersion {
                found: self.version.to_i16(),
            });
        }
        Ok(())
    }
}
