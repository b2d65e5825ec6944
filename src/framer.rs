//! Message framing: prefix + payload + padding + body (spec §4.3, component
//! C3). This module knows nothing about what a metadata payload *means* —
//! that is C1/C4/C5's job — only how it sits on the wire relative to the
//! body bytes that follow it.

use std::io::{Read, Write};

use bytes::Bytes;

use crate::allocator::Allocator;
use crate::channel::{PositionReader, PositionWriter};
use crate::error::{Error, Result};

/// The coordinates of one framed message, as reported to a container index.
///
/// `metadata_length` includes the 4-byte prefix (spec §4.3/§6), which is
/// *not* the same quantity stored on the wire as the prefix itself (that one
/// excludes the 4 bytes of the prefix field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start_offset: u64,
    pub metadata_length: u64,
    pub body_length: u64,
}

fn align_up(n: usize, alignment: usize) -> usize {
    (n + alignment - 1) / alignment * alignment
}

/// Writes one framed message: `start` must already be `alignment`-aligned
/// (the invariant is the writer's, checked here). `body` must already be
/// `alignment`-aligned in length; the framer does not pad it further.
pub fn write_message<W: Write>(
    writer: &mut PositionWriter<W>,
    payload: &[u8],
    body: &[u8],
    alignment: usize,
) -> Result<Block> {
    let start = writer.position();
    if start as usize % alignment != 0 {
        return Err(Error::BufferLayoutViolation {
            detail: "channel position must be aligned before writing a message",
        });
    }
    if body.len() % alignment != 0 {
        return Err(Error::BufferLayoutViolation {
            detail: "body length must already be aligned before framing",
        });
    }

    // (start + 4 + metadataLength) % alignment == 0 is the authoritative
    // invariant (spec §9 Open Question, resolved): always derive padding
    // from it, never from the weaker `(4 + m) % alignment` schema-only form.
    let unpadded = 4 + payload.len();
    let padded_total = align_up(unpadded, alignment);
    let pad = padded_total - unpadded;
    let stored_len = payload.len() + pad;

    writer.write_i32_le(stored_len as i32)?;
    writer.write_all(payload)?;
    writer.write_zeros(pad)?;
    writer.write_all(body)?;

    Ok(Block {
        start_offset: start,
        metadata_length: 4 + stored_len as u64,
        body_length: body.len() as u64,
    })
}

/// Writes the zero-length end-of-stream sentinel.
pub fn write_end_of_stream<W: Write>(writer: &mut PositionWriter<W>) -> Result<()> {
    writer.write_i32_le(0)
}

/// Reads one message's prefix and metadata payload. Returns `Ok(None)` at a
/// legal end-of-stream (a zero prefix, or a stream that ends before any
/// prefix bytes at all); returns `Err(Error::UnexpectedEof)` if the prefix
/// is non-zero but the payload is truncated.
pub fn read_prefix_and_payload<R: Read>(
    reader: &mut PositionReader<R>,
) -> Result<Option<(u64, Vec<u8>)>> {
    let start = reader.position();
    let mut prefix_buf = [0u8; 4];
    let n = reader.read_fully(&mut prefix_buf)?;
    if n == 0 {
        return Ok(None);
    }
    if n < 4 {
        return Err(Error::UnexpectedEof);
    }
    let metadata_length = i32::from_le_bytes(prefix_buf);
    if metadata_length == 0 {
        return Ok(None);
    }
    if metadata_length < 0 {
        return Err(Error::OversizedBatch {
            what: "metadataLength",
            value: metadata_length as i64,
        });
    }
    let mut payload = vec![0u8; metadata_length as usize];
    reader.read_exact(&mut payload)?;
    Ok(Some((start, payload)))
}

/// Reads exactly `len` body bytes following a message's payload. The
/// backing memory comes from `allocator` (spec §6: "The codec allocates
/// bodies through this interface only").
pub fn read_body<R: Read>(
    reader: &mut PositionReader<R>,
    len: u64,
    allocator: &dyn Allocator,
) -> Result<Bytes> {
    let mut body = allocator.allocate(len as usize);
    reader.read_exact(&mut body)?;
    Ok(body.freeze())
}

/// Random-access, block-addressed read (spec §4.5): given the coordinates
/// reported at write time, reads `metadata_length + body_length` bytes in
/// one I/O and carves out the payload (skipping the 4-byte prefix) and the
/// body. `stream` must already be positioned at `start_offset`. The body
/// view shares the single allocator-backed arena read from the stream, so
/// it costs no extra copy; the payload is returned as a plain `Vec<u8>`
/// since metadata decoding does not go through the allocator seam.
pub fn read_block<R: Read>(
    stream: &mut R,
    metadata_length: u64,
    body_length: u64,
    allocator: &dyn Allocator,
) -> Result<(Vec<u8>, Bytes)> {
    let total = metadata_length as usize + body_length as usize;
    let mut buf = allocator.allocate(total);
    stream.read_exact(&mut buf).map_err(Error::from)?;
    let buf = buf.freeze();
    let payload = buf[4..metadata_length as usize].to_vec();
    let body = buf.slice(metadata_length as usize..);
    Ok((payload, body))
}
