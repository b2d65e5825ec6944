//! Schema message encode/decode (spec §4.1/§4.4, component C4). A schema
//! message has no body: `body_length` is always 0.

use std::io::{Read, Write};

use crate::channel::{PositionReader, PositionWriter};
use crate::error::{Error, Result};
use crate::framer::{self, Block};
use crate::metadata::{Message, MessageHeader, MetadataVersion, Schema};
use crate::options::WriteOptions;

pub fn write_schema_message<W: Write>(
    writer: &mut PositionWriter<W>,
    schema: &Schema,
    options: &WriteOptions,
) -> Result<Block> {
    let message = Message {
        version: MetadataVersion::V4,
        header: MessageHeader::Schema(schema.clone()),
        body_length: 0,
    };
    let payload = message.encode();
    framer::write_message(writer, &payload, &[], options.alignment())
}

/// Reads the next message and requires it to be a schema message. Returns
/// `Ok(None)` at end-of-stream.
pub fn read_schema_message<R: Read>(reader: &mut PositionReader<R>) -> Result<Option<Schema>> {
    let (_, payload) = match framer::read_prefix_and_payload(reader)? {
        None => return Ok(None),
        Some(v) => v,
    };
    let message = Message::decode(&payload)?;
    message.require_v4()?;
    match message.header {
        MessageHeader::Schema(schema) => Ok(Some(schema)),
        other => Err(Error::UnexpectedHeader { found: other.name() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{DataType, Field};

    #[test]
    fn empty_schema_round_trips() {
        let schema = Schema::new(Vec::new());
        let mut w = PositionWriter::new(Vec::new());
        write_schema_message(&mut w, &schema, &WriteOptions::default()).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len() % 8, 0);

        let mut r = PositionReader::new(&bytes[..]);
        let decoded = read_schema_message(&mut r).unwrap().unwrap();
        assert_eq!(decoded, schema);
        assert!(read_schema_message(&mut r).unwrap().is_none());
    }

    #[test]
    fn schema_with_fields_round_trips() {
        let schema = Schema::new(vec![
            Field::new("a", false, DataType::Int { bit_width: 32, signed: true }),
            Field::new("b", true, DataType::Utf8),
        ]);
        let mut w = PositionWriter::new(Vec::new());
        write_schema_message(&mut w, &schema, &WriteOptions::default()).unwrap();
        let bytes = w.into_inner();

        let mut r = PositionReader::new(&bytes[..]);
        let decoded = read_schema_message(&mut r).unwrap().unwrap();
        assert_eq!(decoded, schema);
    }

    #[test]
    fn rejects_non_schema_header() {
        use crate::metadata::RecordBatchHeader;

        let message = Message {
            version: MetadataVersion::V4,
            header: MessageHeader::RecordBatch(RecordBatchHeader {
                length: 0,
                nodes: Vec::new(),
                buffers: Vec::new(),
            }),
            body_length: 0,
        };
        let payload = message.encode();
        let mut w = PositionWriter::new(Vec::new());
        framer::write_message(&mut w, &payload, &[], 8).unwrap();
        let bytes = w.into_inner();

        let mut r = PositionReader::new(&bytes[..]);
        assert!(matches!(
            read_schema_message(&mut r),
            Err(Error::UnexpectedHeader { .. })
        ));
    }
}
