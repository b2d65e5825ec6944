//! The literal boundary scenarios from the buffer-layout and framing
//! contract: S1 empty schema, S2 end-of-stream, S3 oversized batch, S4
//! version mismatch, S5 a single int32 column, S6 a dictionary batch.

use bytes::Bytes;

use columnar_ipc::batch_codec::{encode_record_batch, write_dictionary_batch_message, ColumnData};
use columnar_ipc::channel::{PositionReader, PositionWriter};
use columnar_ipc::metadata::{
    DataType, Field, FieldNode, Message, MessageHeader, MetadataVersion, RecordBatchHeader, Schema,
};
use columnar_ipc::schema_codec::{read_schema_message, write_schema_message};
use columnar_ipc::{Error, Frame, MessageReader, WriteOptions};

#[test]
fn s1_empty_schema_round_trips() {
    let schema = Schema::new(Vec::new());
    let mut writer = PositionWriter::new(Vec::new());
    write_schema_message(&mut writer, &schema, &WriteOptions::default()).unwrap();
    let bytes = writer.into_inner();

    assert!(bytes.len() % 8 == 0);
    assert!(bytes.len() >= 16);

    let mut reader = PositionReader::new(&bytes[..]);
    let decoded = read_schema_message(&mut reader).unwrap().unwrap();
    assert_eq!(decoded, schema);
}

#[test]
fn s2_end_of_stream_on_zero_prefix_and_empty_stream() {
    let mut zero_prefixed = MessageReader::new(&[0u8, 0, 0, 0][..]);
    assert!(zero_prefixed.next().unwrap().is_none());

    let mut empty = MessageReader::new(&[][..]);
    assert!(empty.next().unwrap().is_none());
}

#[test]
fn s3_oversized_body_length_is_rejected_without_reading_the_body() {
    let message = Message {
        version: MetadataVersion::V4,
        header: MessageHeader::RecordBatch(RecordBatchHeader {
            length: 0,
            nodes: Vec::new(),
            buffers: Vec::new(),
        }),
        body_length: 1i64 << 31,
    };
    let payload = message.encode();
    let mut writer = PositionWriter::new(Vec::new());
    columnar_ipc::framer::write_message(&mut writer, &payload, &[], 8).unwrap();
    let bytes = writer.into_inner();

    let mut reader = MessageReader::new(&bytes[..]);
    match reader.next() {
        Err(Error::OversizedBatch { what, value }) => {
            assert_eq!(what, "bodyLength");
            assert_eq!(value, 1i64 << 31);
        }
        other => panic!("expected OversizedBatch, got {:?}", other),
    }
}

#[test]
fn s4_version_v3_is_incompatible() {
    let message = Message {
        version: MetadataVersion::V3,
        header: MessageHeader::Schema(Schema::new(Vec::new())),
        body_length: 0,
    };
    let payload = message.encode();
    let mut writer = PositionWriter::new(Vec::new());
    columnar_ipc::framer::write_message(&mut writer, &payload, &[], 8).unwrap();
    let bytes = writer.into_inner();

    let mut reader = MessageReader::new(&bytes[..]);
    match reader.next() {
        Err(Error::IncompatibleVersion { found }) => assert_eq!(found, MetadataVersion::V3.to_i16()),
        other => panic!("expected IncompatibleVersion, got {:?}", other),
    }
}

#[test]
fn s5_single_int32_column_round_trips_bit_exactly() {
    let schema = Schema::new(vec![Field::new(
        "a",
        true,
        DataType::Int { bit_width: 32, signed: true },
    )]);

    let values: [i32; 3] = [1, 2, 3];
    let mut values_buf = Vec::new();
    for v in values {
        values_buf.extend_from_slice(&v.to_le_bytes());
    }
    // Pad the values buffer itself is not required here: encode_record_batch
    // pads between buffers, not within one.
    let validity_buf = Bytes::from_static(&[0b0000_0111]);
    let values_buf = Bytes::from(values_buf);

    let columns = vec![ColumnData {
        node: FieldNode { length: 3, null_count: 0 },
        buffers: vec![validity_buf, values_buf],
    }];
    let (header, body) = encode_record_batch(&columns, 3, 8).unwrap();

    let mut writer = PositionWriter::new(Vec::new());
    write_schema_message(&mut writer, &schema, &WriteOptions::default()).unwrap();
    columnar_ipc::batch_codec::write_record_batch_message(
        &mut writer,
        header,
        &body,
        &WriteOptions::default(),
    )
    .unwrap();
    let bytes = writer.into_inner();

    let mut reader = MessageReader::new(&bytes[..]);
    assert!(matches!(reader.next().unwrap(), Some(Frame::Schema(_))));
    match reader.next().unwrap() {
        Some(Frame::RecordBatch { header, buffers }) => {
            assert_eq!(header.length, 3);
            assert_eq!(header.nodes, vec![FieldNode { length: 3, null_count: 0 }]);
            let recovered: Vec<i32> = buffers[1]
                .chunks_exact(4)
                .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
                .collect();
            assert_eq!(recovered, vec![1, 2, 3]);
        }
        other => panic!("expected RecordBatch, got {:?}", other),
    }
}

#[test]
fn s6_dictionary_batch_recovers_id_and_strings() {
    let strings = ["ab", "cd", "ef", "gh"];
    let mut offsets = vec![0i32];
    let mut data = Vec::new();
    for s in strings {
        data.extend_from_slice(s.as_bytes());
        offsets.push(data.len() as i32);
    }
    let mut offsets_buf = Vec::new();
    for o in &offsets {
        offsets_buf.extend_from_slice(&o.to_le_bytes());
    }

    let columns = vec![ColumnData {
        node: FieldNode { length: 4, null_count: 0 },
        buffers: vec![
            Bytes::from_static(&[0b0000_1111]),
            Bytes::from(offsets_buf),
            Bytes::from(data.clone()),
        ],
    }];
    let (header, body) = encode_record_batch(&columns, 4, 8).unwrap();

    let mut writer = PositionWriter::new(Vec::new());
    write_dictionary_batch_message(&mut writer, 7, header, &body, &WriteOptions::default()).unwrap();
    let bytes = writer.into_inner();

    let mut reader = MessageReader::new(&bytes[..]);
    match reader.next().unwrap() {
        Some(Frame::DictionaryBatch { id, header, buffers }) => {
            assert_eq!(id, 7);
            assert_eq!(header.length, 4);
            assert_eq!(buffers[2].as_ref(), data.as_slice());

            let recovered_offsets: Vec<i32> = buffers[1]
                .chunks_exact(4)
                .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
                .collect();
            let recovered: Vec<&str> = recovered_offsets
                .windows(2)
                .map(|w| std::str::from_utf8(&buffers[2][w[0] as usize..w[1] as usize]).unwrap())
                .collect();
            assert_eq!(recovered, strings.to_vec());
        }
        other => panic!("expected DictionaryBatch, got {:?}", other),
    }
}
