//! Matching reader for `flat::builder`'s private vtabled encoding.
//!
//! Every read bounds-checks against the payload length and returns
//! `Error::UnexpectedEof` on any out-of-range access — this is what turns a
//! truncated or corrupt payload into a typed error instead of a panic.

use crate::error::{Error, Result};

fn need(buf: &[u8], at: usize, len: usize) -> Result<()> {
    if at.checked_add(len).map(|end| end > buf.len()).unwrap_or(true) {
        return Err(Error::UnexpectedEof);
    }
    Ok(())
}

fn read_u8(buf: &[u8], at: usize) -> Result<u8> {
    need(buf, at, 1)?;
    Ok(buf[at])
}

fn read_u16(buf: &[u8], at: usize) -> Result<u16> {
    need(buf, at, 2)?;
    Ok(u16::from_le_bytes(buf[at..at + 2].try_into().unwrap()))
}

fn read_i16(buf: &[u8], at: usize) -> Result<i16> {
    Ok(read_u16(buf, at)? as i16)
}

fn read_u32(buf: &[u8], at: usize) -> Result<u32> {
    need(buf, at, 4)?;
    Ok(u32::from_le_bytes(buf[at..at + 4].try_into().unwrap()))
}

fn read_i32(buf: &[u8], at: usize) -> Result<i32> {
    Ok(read_u32(buf, at)? as i32)
}

fn read_i64(buf: &[u8], at: usize) -> Result<i64> {
    need(buf, at, 8)?;
    Ok(i64::from_le_bytes(buf[at..at + 8].try_into().unwrap()))
}

/// A parsed flat metadata payload: `[u32 LE root_offset][arena...]`.
pub struct FlatReader<'a> {
    buf: &'a [u8],
}

impl<'a> FlatReader<'a> {
    pub fn new(buf: &'a [u8]) -> Result<Self> {
        need(buf, 0, 4)?;
        Ok(Self { buf })
    }

    pub fn root(&self) -> Result<TableReader<'a>> {
        let root_off = read_u32(self.buf, 0)?;
        self.table_at(root_off)
    }

    pub fn table_at(&self, offset: u32) -> Result<TableReader<'a>> {
        TableReader::new(self.buf, offset as usize)
    }

    pub fn string_at(&self, offset: u32) -> Result<&'a str> {
        let at = offset as usize;
        let len = read_u32(self.buf, at)? as usize;
        need(self.buf, at + 4, len)?;
        let bytes = &self.buf[at + 4..at + 4 + len];
        std::str::from_utf8(bytes).map_err(|_| Error::UnexpectedEof)
    }

    pub fn offset_vector_at(&self, offset: u32) -> Result<Vec<u32>> {
        let at = offset as usize;
        let count = read_u32(self.buf, at)? as usize;
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            out.push(read_u32(self.buf, at + 4 + i * 4)?);
        }
        Ok(out)
    }

    pub fn struct_pair_vector_at(&self, offset: u32) -> Result<Vec<(i64, i64)>> {
        let at = offset as usize;
        let count = read_u32(self.buf, at)? as usize;
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let base = at + 4 + i * 16;
            let a = read_i64(self.buf, base)?;
            let b = read_i64(self.buf, base + 8)?;
            out.push((a, b));
        }
        Ok(out)
    }
}

/// A single table: `[u32 LE vtable_offset][field bytes in slot order]`.
pub struct TableReader<'a> {
    buf: &'a [u8],
    table_start: usize,
}

impl<'a> TableReader<'a> {
    fn new(buf: &'a [u8], table_start: usize) -> Result<Self> {
        need(buf, table_start, 4)?;
        Ok(Self { buf, table_start })
    }

    /// The byte offset of the field's value relative to `table_start`, or
    /// `None` if the slot is absent from this table instance (never written,
    /// equal to its default at write time, or simply unknown to the writer
    /// that produced this payload — all three collapse to the same thing).
    pub fn field_offset(&self, slot: usize) -> Result<Option<u16>> {
        let vtable_off = read_u32(self.buf, self.table_start)? as usize;
        let vtable_len = read_u16(self.buf, vtable_off)? as usize;
        let num_slots = vtable_len.saturating_sub(4) / 2;
        if slot >= num_slots {
            return Ok(None);
        }
        let entry_at = vtable_off + 4 + slot * 2;
        let rel = read_u16(self.buf, entry_at)?;
        Ok(if rel == 0 { None } else { Some(rel) })
    }

    fn abs(&self, rel: u16) -> usize {
        self.table_start + rel as usize
    }

    pub fn get_bool(&self, slot: usize, default: bool) -> Result<bool> {
        Ok(match self.field_offset(slot)? {
            Some(rel) => read_u8(self.buf, self.abs(rel))? != 0,
            None => default,
        })
    }

    pub fn get_u8(&self, slot: usize, default: u8) -> Result<u8> {
        Ok(match self.field_offset(slot)? {
            Some(rel) => read_u8(self.buf, self.abs(rel))?,
            None => default,
        })
    }

    pub fn get_i16(&self, slot: usize, default: i16) -> Result<i16> {
        Ok(match self.field_offset(slot)? {
            Some(rel) => read_i16(self.buf, self.abs(rel))?,
            None => default,
        })
    }

    pub fn get_i32(&self, slot: usize, default: i32) -> Result<i32> {
        Ok(match self.field_offset(slot)? {
            Some(rel) => read_i32(self.buf, self.abs(rel))?,
            None => default,
        })
    }

    pub fn get_i64(&self, slot: usize, default: i64) -> Result<i64> {
        Ok(match self.field_offset(slot)? {
            Some(rel) => read_i64(self.buf, self.abs(rel))?,
            None => default,
        })
    }

    pub fn get_offset(&self, slot: usize) -> Result<Option<u32>> {
        Ok(match self.field_offset(slot)? {
            Some(rel) => Some(read_u32(self.buf, self.abs(rel))?),
            None => None,
        })
    }
}
