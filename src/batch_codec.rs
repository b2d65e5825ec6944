//! Record-batch and dictionary-batch body assembly and slicing (spec §3,
//! §4.1, §6, component C5). This module owns the buffer-layout contract:
//! how per-column buffers are packed into one body region at write time,
//! and how a decoded body is sliced back into zero-copy views.

use std::io::{Read, Write};

use bytes::{Bytes, BytesMut};

use crate::allocator::Allocator;
use crate::channel::PositionWriter;
use crate::error::{Error, Result};
use crate::framer::{self, Block};
use crate::metadata::{
    BufferDesc, DictionaryBatchHeader, FieldNode, Message, MessageHeader, MetadataVersion,
    RecordBatchHeader,
};
use crate::options::WriteOptions;

const MAX_WIRE_VALUE: i64 = i32::MAX as i64;

/// Rejects a value outside the wire's i32 range: shared by the body-length,
/// row-count, and per-node-counter checks spec §7 groups under
/// `oversized-batch`.
pub(crate) fn check_fits(what: &'static str, value: i64) -> Result<()> {
    if value < 0 || value > MAX_WIRE_VALUE {
        return Err(Error::OversizedBatch { what, value });
    }
    Ok(())
}

/// Validates that a decoded header's row count and every field node's
/// length/null-count are within i32 range (spec §7: "bodyLength, row count,
/// or per-node counter exceeds i32 range").
pub(crate) fn check_header_counters(header: &RecordBatchHeader) -> Result<()> {
    check_fits("row count", header.length)?;
    for node in &header.nodes {
        check_fits("field node length", node.length)?;
        check_fits("field node null count", node.null_count)?;
    }
    Ok(())
}

fn pad_len(len: usize, alignment: usize) -> usize {
    let rem = len % alignment;
    if rem == 0 {
        0
    } else {
        alignment - rem
    }
}

/// One column's node statistics plus its buffers, in the order they should
/// appear in the body (the DFS preorder of the schema's field tree, spec
/// §3's `RecordBatch` invariant).
#[derive(Debug, Clone)]
pub struct ColumnData {
    pub node: FieldNode,
    pub buffers: Vec<Bytes>,
}

/// Packs `columns` into one body region: each buffer is copied in
/// sequence, padded up to `alignment` before the next one starts. Returns
/// the header describing row count, nodes, and the resulting buffer
/// offsets/lengths, plus the assembled body.
pub fn encode_record_batch(
    columns: &[ColumnData],
    row_count: i64,
    alignment: usize,
) -> Result<(RecordBatchHeader, Bytes)> {
    check_fits("row count", row_count)?;

    let mut body = BytesMut::new();
    let mut nodes = Vec::with_capacity(columns.len());
    let mut buffers = Vec::new();

    for column in columns {
        nodes.push(column.node);
        for buf in &column.buffers {
            let offset = body.len() as i64;
            let length = buf.len() as i64;
            check_fits("buffer offset", offset)?;
            check_fits("buffer length", length)?;

            body.extend_from_slice(buf);
            let pad = pad_len(body.len(), alignment);
            body.resize(body.len() + pad, 0);

            buffers.push(BufferDesc { offset, length });
        }
    }

    let header = RecordBatchHeader {
        length: row_count,
        nodes,
        buffers,
    };
    Ok((header, body.freeze()))
}

/// Slices a decoded body back into one `Bytes` view per buffer descriptor,
/// validating that every range is in-bounds, non-negative, and aligned.
pub fn decode_record_batch(
    header: &RecordBatchHeader,
    body: &Bytes,
    alignment: usize,
) -> Result<Vec<Bytes>> {
    let mut buffers = Vec::with_capacity(header.buffers.len());
    for desc in &header.buffers {
        if desc.offset < 0 || desc.length < 0 {
            return Err(Error::BufferLayoutViolation {
                detail: "negative buffer offset or length",
            });
        }
        if desc.offset as usize % alignment != 0 {
            return Err(Error::BufferLayoutViolation {
                detail: "buffer offset is not aligned",
            });
        }
        let start = desc.offset as usize;
        let end = start
            .checked_add(desc.length as usize)
            .ok_or(Error::BufferLayoutViolation {
                detail: "buffer range overflows",
            })?;
        if end > body.len() {
            return Err(Error::BufferLayoutViolation {
                detail: "buffer range exceeds body length",
            });
        }
        buffers.push(body.slice(start..end));
    }
    Ok(buffers)
}

/// Writes a framed record-batch message: encodes the header, then hands the
/// assembled body straight to the framer.
pub fn write_record_batch_message<W: Write>(
    writer: &mut PositionWriter<W>,
    header: RecordBatchHeader,
    body: &Bytes,
    options: &WriteOptions,
) -> Result<Block> {
    check_fits("body length", body.len() as i64)?;
    let message = Message {
        version: MetadataVersion::V4,
        header: MessageHeader::RecordBatch(header),
        body_length: body.len() as i64,
    };
    let payload = message.encode();
    framer::write_message(writer, &payload, body, options.alignment())
}

/// Writes a framed dictionary-batch message.
pub fn write_dictionary_batch_message<W: Write>(
    writer: &mut PositionWriter<W>,
    id: i64,
    data_header: RecordBatchHeader,
    body: &Bytes,
    options: &WriteOptions,
) -> Result<Block> {
    check_fits("body length", body.len() as i64)?;
    let message = Message {
        version: MetadataVersion::V4,
        header: MessageHeader::DictionaryBatch(DictionaryBatchHeader {
            id,
            data: data_header,
        }),
        body_length: body.len() as i64,
    };
    let payload = message.encode();
    framer::write_message(writer, &payload, body, options.alignment())
}

/// Random-access read of a record batch (spec §4.5): given the `Block`
/// coordinates reported at write time, reads the message at `stream`
/// (which must already be positioned at `block.start_offset`), checks the
/// version, and slices the body into buffer views — the same validation
/// `MessageReader` applies to a streamed read.
pub fn read_record_batch_at_block<R: Read>(
    stream: &mut R,
    block: Block,
    alignment: usize,
    allocator: &dyn Allocator,
) -> Result<(RecordBatchHeader, Vec<Bytes>)> {
    let (payload, body) =
        framer::read_block(stream, block.metadata_length, block.body_length, allocator)?;
    let message = Message::decode(&payload)?;
    message.require_v4()?;
    match message.header {
        MessageHeader::RecordBatch(header) => {
            check_header_counters(&header)?;
            let buffers = decode_record_batch(&header, &body, alignment)?;
            Ok((header, buffers))
        }
        other => Err(Error::UnexpectedHeader { found: other.name() }),
    }
}

/// Random-access read of a dictionary batch; see [`read_record_batch_at_block`].
pub fn read_dictionary_batch_at_block<R: Read>(
    stream: &mut R,
    block: Block,
    alignment: usize,
    allocator: &dyn Allocator,
) -> Result<(i64, RecordBatchHeader, Vec<Bytes>)> {
    let (payload, body) =
        framer::read_block(stream, block.metadata_length, block.body_length, allocator)?;
    let message = Message::decode(&payload)?;
    message.require_v4()?;
    match message.header {
        MessageHeader::DictionaryBatch(dict) => {
            check_header_counters(&dict.data)?;
            let buffers = decode_record_batch(&dict.data, &body, alignment)?;
            Ok((dict.id, dict.data, buffers))
        }
        other => Err(Error::UnexpectedHeader { found: other.name() }),
    }
}
