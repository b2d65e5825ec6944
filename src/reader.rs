//! Streaming message dispatch (spec §4.1/§4.4, component C6): a sequential
//! reader walks START → read prefix+payload → dispatch on header kind →
//! (for batches) read the body → emit, looping back to START, and stopping
//! at END on the zero-length sentinel.

use std::io::Read;

use bytes::Bytes;

use crate::allocator::{Allocator, DefaultAllocator};
use crate::batch_codec;
use crate::channel::PositionReader;
use crate::error::{Error, Result};
use crate::framer;
use crate::metadata::{MessageHeader, RecordBatchHeader, Schema};

/// One decoded frame from a message stream.
#[derive(Debug, Clone)]
pub enum Frame {
    Schema(Schema),
    RecordBatch {
        header: RecordBatchHeader,
        buffers: Vec<Bytes>,
    },
    DictionaryBatch {
        id: i64,
        header: RecordBatchHeader,
        buffers: Vec<Bytes>,
    },
}

/// Sequentially reads framed messages off a byte stream, validating
/// version and buffer layout as it goes.
pub struct MessageReader<R> {
    reader: PositionReader<R>,
    alignment: usize,
    allocator: Box<dyn Allocator>,
}

impl<R: Read> MessageReader<R> {
    pub fn new(inner: R) -> Self {
        MessageReader::with_alignment(inner, 8)
    }

    pub fn with_alignment(inner: R, alignment: usize) -> Self {
        MessageReader::with_allocator(inner, alignment, Box::new(DefaultAllocator))
    }

    /// Builds a reader that allocates body buffers through `allocator`
    /// instead of the default heap-backed one (spec §6).
    pub fn with_allocator(inner: R, alignment: usize, allocator: Box<dyn Allocator>) -> Self {
        MessageReader {
            reader: PositionReader::new(inner),
            alignment,
            allocator,
        }
    }

    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Reads and dispatches the next message. Returns `Ok(None)` at a legal
    /// end-of-stream.
    pub fn next(&mut self) -> Result<Option<Frame>> {
        let (_, payload) = match framer::read_prefix_and_payload(&mut self.reader)? {
            None => return Ok(None),
            Some(v) => v,
        };
        let message = crate::metadata::Message::decode(&payload)?;
        message.require_v4()?;
        let body_length = message.body_length;

        match message.header {
            MessageHeader::Schema(schema) => Ok(Some(Frame::Schema(schema))),
            MessageHeader::RecordBatch(header) => {
                batch_codec::check_fits("bodyLength", body_length)?;
                batch_codec::check_header_counters(&header)?;
                let body = framer::read_body(
                    &mut self.reader,
                    body_length as u64,
                    self.allocator.as_ref(),
                )?;
                let buffers = batch_codec::decode_record_batch(&header, &body, self.alignment)?;
                Ok(Some(Frame::RecordBatch { header, buffers }))
            }
            MessageHeader::DictionaryBatch(dict) => {
                batch_codec::check_fits("bodyLength", body_length)?;
                batch_codec::check_header_counters(&dict.data)?;
                let body = framer::read_body(
                    &mut self.reader,
                    body_length as u64,
                    self.allocator.as_ref(),
                )?;
                let buffers = batch_codec::decode_record_batch(&dict.data, &body, self.alignment)?;
                Ok(Some(Frame::DictionaryBatch {
                    id: dict.id,
                    header: dict.data,
                    buffers,
                }))
            }
            MessageHeader::Tensor => Err(Error::UnexpectedHeader { found: "Tensor" }),
            MessageHeader::SparseTensor => Err(Error::UnexpectedHeader { found: "SparseTensor" }),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch_codec::{encode_record_batch, ColumnData};
    use crate::channel::PositionWriter;
    use crate::metadata::{DataType, Field, FieldNode, MetadataVersion};
    use crate::options::WriteOptions;
    use crate::schema_codec::write_schema_message;

    #[test]
    fn reads_schema_then_end_of_stream() {
        let schema = Schema::new(vec![Field::new("a", false, DataType::Int { bit_width: 32, signed: true })]);
        let mut w = PositionWriter::new(Vec::new());
        write_schema_message(&mut w, &schema, &WriteOptions::default()).unwrap();
        let bytes = w.into_inner();

        let mut reader = MessageReader::new(&bytes[..]);
        match reader.next().unwrap() {
            Some(Frame::Schema(s)) => assert_eq!(s, schema),
            other => panic!("unexpected frame: {:?}", other),
        }
        assert!(reader.next().unwrap().is_none());
    }

    #[test]
    fn reads_record_batch_with_buffers() {
        let columns = vec![ColumnData {
            node: FieldNode { length: 2, null_count: 0 },
            buffers: vec![Bytes::from_static(&[1, 2, 3, 4, 5, 6, 7, 8])],
        }];
        let (header, body) = encode_record_batch(&columns, 2, 8).unwrap();
        let mut w = PositionWriter::new(Vec::new());
        crate::batch_codec::write_record_batch_message(&mut w, header, &body, &WriteOptions::default())
            .unwrap();
        let bytes = w.into_inner();

        let mut reader = MessageReader::new(&bytes[..]);
        match reader.next().unwrap() {
            Some(Frame::RecordBatch { header, buffers }) => {
                assert_eq!(header.length, 2);
                assert_eq!(buffers[0].as_ref(), &[1, 2, 3, 4, 5, 6, 7, 8][..]);
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn rejects_non_v4_version() {
        let message = crate::metadata::Message {
            version: MetadataVersion::V3,
            header: MessageHeader::Schema(Schema::new(Vec::new())),
            body_length: 0,
        };
        let payload = message.encode();
        let mut w = PositionWriter::new(Vec::new());
        framer::write_message(&mut w, &payload, &[], 8).unwrap();
        let bytes = w.into_inner();

        let mut reader = MessageReader::new(&bytes[..]);
        assert!(matches!(
            reader.next(),
            Err(Error::IncompatibleVersion { .. })
        ));
    }

    #[test]
    fn rejects_oversized_body_length_without_reading_it() {
        let message = crate::metadata::Message {
            version: MetadataVersion::V4,
            header: MessageHeader::RecordBatch(RecordBatchHeader {
                length: 0,
                nodes: Vec::new(),
                buffers: Vec::new(),
            }),
            body_length: 1i64 << 31,
        };
        let payload = message.encode();
        let mut w = PositionWriter::new(Vec::new());
        framer::write_message(&mut w, &payload, &[], 8).unwrap();
        let bytes = w.into_inner();

        let mut reader = MessageReader::new(&bytes[..]);
        assert!(matches!(reader.next(), Err(Error::OversizedBatch { .. })));
    }
}
