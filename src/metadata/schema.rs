//! `Schema` and `Endianness` (spec §3).

use crate::error::Result;
use crate::flat::{FlatBuilder, FlatReader, Offset};
use crate::metadata::field::{decode_kv_list, encode_kv_list, Field, KeyValue};

/// The byte order of the platform that produced a `Schema`'s body buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Default for Endianness {
    fn default() -> Self {
        Endianness::Little
    }
}

impl Endianness {
    fn to_i16(self) -> i16 {
        match self {
            Endianness::Little => 0,
            Endianness::Big => 1,
        }
    }

    fn from_i16(v: i16) -> Self {
        if v == 1 {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}

/// The set of fields making up a record batch's shape, plus producer
/// endianness and opaque custom metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub endianness: Endianness,
    pub fields: Vec<Field>,
    pub custom_metadata: Vec<KeyValue>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Schema {
            endianness: Endianness::Little,
            fields,
            custom_metadata: Vec::new(),
        }
    }

    pub(crate) fn encode(&self, b: &mut FlatBuilder) -> Offset {
        let field_offsets: Vec<Offset> = self.fields.iter().map(|f| f.encode(b)).collect();
        let fields_off = if field_offsets.is_empty() {
            None
        } else {
            Some(b.write_offset_vector(&field_offsets))
        };
        let metadata_off = encode_kv_list(b, &self.custom_metadata);

        let mut t = b.start_table();
        t.push_i16(0, self.endianness.to_i16(), Endianness::Little.to_i16());
        t.push_offset(1, fields_off);
        t.push_offset(2, metadata_off);
        t.finish()
    }

    pub(crate) fn decode(reader: &FlatReader<'_>, offset: Offset) -> Result<Self> {
        let t = reader.table_at(offset)?;
        let fields = match t.get_offset(1)? {
            None => Vec::new(),
            Some(off) => reader
                .offset_vector_at(off)?
                .into_iter()
                .map(|o| Field::decode(reader, o))
                .collect::<Result<Vec<_>>>()?,
        };
        let custom_metadata = decode_kv_list(reader, t.get_offset(2)?)?;
        Ok(Schema {
            endianness: Endianness::from_i16(t.get_i16(0, Endianness::Little.to_i16())?),
            fields,
            custom_metadata,
        })
    }
}
