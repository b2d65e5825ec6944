//! `Field`, `DictionaryEncoding` and the custom-metadata key/value pairs
//! carried by `Field` and `Schema` (spec §3).

use crate::error::Result;
use crate::flat::{FlatBuilder, FlatReader, Offset};
use crate::metadata::datatype::DataType;

/// An opaque, ordered key/value pair attached to a `Field` or `Schema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    fn encode(&self, b: &mut FlatBuilder) -> Offset {
        let key = b.write_string(&self.key);
        let value = b.write_string(&self.value);
        let mut t = b.start_table();
        t.push_offset(0, Some(key));
        t.push_offset(1, Some(value));
        t.finish()
    }

    fn decode(reader: &FlatReader<'_>, offset: Offset) -> Result<Self> {
        let t = reader.table_at(offset)?;
        let key = t.get_offset(0)?.map(|o| reader.string_at(o)).transpose()?.unwrap_or("");
        let value = t.get_offset(1)?.map(|o| reader.string_at(o)).transpose()?.unwrap_or("");
        Ok(KeyValue {
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }
}

pub(crate) fn encode_kv_list(b: &mut FlatBuilder, items: &[KeyValue]) -> Option<Offset> {
    if items.is_empty() {
        return None;
    }
    let offsets: Vec<Offset> = items.iter().map(|kv| kv.encode(b)).collect();
    Some(b.write_offset_vector(&offsets))
}

pub(crate) fn decode_kv_list(reader: &FlatReader<'_>, offset: Option<Offset>) -> Result<Vec<KeyValue>> {
    match offset {
        None => Ok(Vec::new()),
        Some(off) => reader
            .offset_vector_at(off)?
            .into_iter()
            .map(|o| KeyValue::decode(reader, o))
            .collect(),
    }
}

/// The integer index type backing a dictionary-encoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexType {
    pub bit_width: u8,
    pub signed: bool,
}

impl IndexType {
    /// `indexType` default per spec: "signed 32-bit" when absent.
    pub const DEFAULT: IndexType = IndexType {
        bit_width: 32,
        signed: true,
    };
}

/// `DictionaryEncoding`: marks a `Field` as storing indices into an
/// out-of-band dictionary identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEncoding {
    pub id: i64,
    pub index_type: IndexType,
    pub is_ordered: bool,
}

impl DictionaryEncoding {
    fn encode(&self, b: &mut FlatBuilder) -> Offset {
        let index_type_off = {
            let mut t = b.start_table();
            t.push_i32(0, self.index_type.bit_width as i32, 0);
            t.push_bool(1, self.index_type.signed, true);
            t.finish()
        };
        let mut t = b.start_table();
        t.push_i64(0, self.id, 0);
        t.push_offset(1, Some(index_type_off));
        t.push_bool(2, self.is_ordered, false);
        t.finish()
    }

    fn decode(reader: &FlatReader<'_>, offset: Offset) -> Result<Self> {
        let t = reader.table_at(offset)?;
        let index_type = match t.get_offset(1)? {
            Some(off) => {
                let it = reader.table_at(off)?;
                IndexType {
                    bit_width: it.get_i32(0, IndexType::DEFAULT.bit_width as i32)? as u8,
                    signed: it.get_bool(1, IndexType::DEFAULT.signed)?,
                }
            }
            None => IndexType::DEFAULT,
        };
        Ok(DictionaryEncoding {
            id: t.get_i64(0, 0)?,
            index_type,
            is_ordered: t.get_bool(2, false)?,
        })
    }
}

/// A column's static shape: its logical type, nullability, optional
/// dictionary encoding, and (for nested types) child fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Option<String>,
    pub nullable: bool,
    pub data_type: DataType,
    pub dictionary: Option<DictionaryEncoding>,
    pub children: Vec<Field>,
    pub custom_metadata: Vec<KeyValue>,
}

impl Field {
    pub fn new(name: impl Into<String>, nullable: bool, data_type: DataType) -> Self {
        Field {
            name: Some(name.into()),
            nullable,
            data_type,
            dictionary: None,
            children: Vec::new(),
            custom_metadata: Vec::new(),
        }
    }

    pub(crate) fn encode(&self, b: &mut FlatBuilder) -> Offset {
        let name_off = self.name.as_deref().map(|s| b.write_string(s));
        let (type_tag, type_off) = self.data_type.encode(b);
        let dict_off = self.dictionary.as_ref().map(|d| d.encode(b));
        let children_off = if self.children.is_empty() {
            None
        } else {
            let offsets: Vec<Offset> = self.children.iter().map(|c| c.encode(b)).collect();
            Some(b.write_offset_vector(&offsets))
        };
        let metadata_off = encode_kv_list(b, &self.custom_metadata);

        let mut t = b.start_table();
        t.push_offset(0, name_off);
        t.push_bool(1, self.nullable, false);
        t.push_u8(2, type_tag, 0);
        t.push_offset(3, type_off);
        t.push_offset(4, dict_off);
        t.push_offset(5, children_off);
        t.push_offset(6, metadata_off);
        t.finish()
    }

    pub(crate) fn decode(reader: &FlatReader<'_>, offset: Offset) -> Result<Self> {
        let t = reader.table_at(offset)?;
        let name = t.get_offset(0)?.map(|o| reader.string_at(o)).transpose()?.map(str::to_owned);
        let type_tag = t.get_u8(2, 0)?;
        let type_off = t.get_offset(3)?;
        let data_type = DataType::decode(reader, type_tag, type_off)?;
        let dictionary = t.get_offset(4)?.map(|o| DictionaryEncoding::decode(reader, o)).transpose()?;
        let children = match t.get_offset(5)? {
            None => Vec::new(),
            Some(off) => reader
                .offset_vector_at(off)?
                .into_iter()
                .map(|o| Field::decode(reader, o))
                .collect::<Result<Vec<_>>>()?,
        };
        let custom_metadata = decode_kv_list(reader, t.get_offset(6)?)?;

        Ok(Field {
            name,
            nullable: t.get_bool(1, false)?,
            data_type,
            dictionary,
            children,
            custom_metadata,
        })
    }
}
