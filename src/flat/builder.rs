//! Forward-growing builder for this crate's private flat, vtabled metadata
//! encoding (see `SPEC_FULL.md` §10.5 for the byte layout).
//!
//! Unlike a textbook flatbuffer builder, which grows a buffer backwards so
//! that parent tables can embed small relative offsets, this builder grows
//! forwards and stores absolute offsets. The caller is still expected to
//! write children before parents (a string before the field that names it, a
//! child `Field` table before its parent), exactly as with the textbook
//! scheme — only the arithmetic differs.

/// An absolute byte offset into the arena being built.
pub type Offset = u32;

/// One value pending a slot in the table currently being built.
enum Slot {
    U8(u8),
    I16(i16),
    I32(i32),
    I64(i64),
    Offset(Offset),
}

/// Accumulates the serialized bytes of a single flat metadata payload.
#[derive(Default)]
pub struct FlatBuilder {
    buf: Vec<u8>,
}

impl FlatBuilder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Writes a length-prefixed UTF-8 string, returning its offset.
    pub fn write_string(&mut self, s: &str) -> Offset {
        let off = self.buf.len() as Offset;
        self.buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(s.as_bytes());
        off
    }

    /// Writes a vector of offsets (to tables or strings), returning its offset.
    pub fn write_offset_vector(&mut self, items: &[Offset]) -> Offset {
        let off = self.buf.len() as Offset;
        self.buf
            .extend_from_slice(&(items.len() as u32).to_le_bytes());
        for item in items {
            self.buf.extend_from_slice(&item.to_le_bytes());
        }
        off
    }

    /// Writes a vector of fixed 16-byte `(i64, i64)` structs inline (no
    /// per-element vtable — used for `Buffer` and `FieldNode`).
    pub fn write_struct_pair_vector(&mut self, items: &[(i64, i64)]) -> Offset {
        let off = self.buf.len() as Offset;
        self.buf
            .extend_from_slice(&(items.len() as u32).to_le_bytes());
        for (a, b) in items {
            self.buf.extend_from_slice(&a.to_le_bytes());
            self.buf.extend_from_slice(&b.to_le_bytes());
        }
        off
    }

    /// Begins a new table. Use the returned `TableBuilder` to push fields,
    /// then call `finish` to flush it into this arena.
    pub fn start_table(&mut self) -> TableBuilder<'_> {
        TableBuilder {
            b: self,
            slots: Vec::new(),
        }
    }

    /// Finishes the payload: prefixes the arena with the absolute offset of
    /// the root table.
    pub fn finish(self, root: Offset) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.buf.len());
        out.extend_from_slice(&root.to_le_bytes());
        out.extend_from_slice(&self.buf);
        out
    }
}

/// A table under construction. Fields are pushed by slot index (gaps are
/// allowed and mean "absent"); `finish` lays out the table body and its
/// vtable and returns the table's absolute offset.
pub struct TableBuilder<'a> {
    b: &'a mut FlatBuilder,
    slots: Vec<Option<Slot>>,
}

impl<'a> TableBuilder<'a> {
    fn set(&mut self, slot: usize, value: Slot) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(value);
    }

    pub fn push_bool(&mut self, slot: usize, value: bool, default: bool) {
        if value != default {
            self.set(slot, Slot::U8(value as u8));
        }
    }

    pub fn push_u8(&mut self, slot: usize, value: u8, default: u8) {
        if value != default {
            self.set(slot, Slot::U8(value));
        }
    }

    pub fn push_i16(&mut self, slot: usize, value: i16, default: i16) {
        if value != default {
            self.set(slot, Slot::I16(value));
        }
    }

    pub fn push_i32(&mut self, slot: usize, value: i32, default: i32) {
        if value != default {
            self.set(slot, Slot::I32(value));
        }
    }

    pub fn push_i64(&mut self, slot: usize, value: i64, default: i64) {
        if value != default {
            self.set(slot, Slot::I64(value));
        }
    }

    /// Pushes an offset field unconditionally if `value` is `Some`; `None`
    /// leaves the slot absent.
    pub fn push_offset(&mut self, slot: usize, value: Option<Offset>) {
        if let Some(v) = value {
            self.set(slot, Slot::Offset(v));
        }
    }

    /// Flushes the table body and its vtable into the arena, returning the
    /// table's absolute offset.
    pub fn finish(self) -> Offset {
        let table_start = self.b.buf.len() as Offset;
        // Reserve the 4-byte header slot that will hold the vtable's offset.
        self.b.buf.extend_from_slice(&[0u8; 4]);

        let mut field_rel_offsets = vec![0u16; self.slots.len()];
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(v) = slot {
                let rel = (self.b.buf.len() as u32 - table_start) as u16;
                field_rel_offsets[i] = rel;
                match v {
                    Slot::U8(x) => self.b.buf.push(*x),
                    Slot::I16(x) => self.b.buf.extend_from_slice(&x.to_le_bytes()),
                    Slot::I32(x) => self.b.buf.extend_from_slice(&x.to_le_bytes()),
                    Slot::I64(x) => self.b.buf.extend_from_slice(&x.to_le_bytes()),
                    Slot::Offset(x) => self.b.buf.extend_from_slice(&x.to_le_bytes()),
                }
            }
        }
        let table_end = self.b.buf.len() as u32;

        let vtable_start = self.b.buf.len() as Offset;
        let vtable_len: u16 = (4 + 2 * field_rel_offsets.len()) as u16;
        self.b.buf.extend_from_slice(&vtable_len.to_le_bytes());
        let table_len: u16 = (table_end - table_start) as u16;
        self.b.buf.extend_from_slice(&table_len.to_le_bytes());
        for rel in &field_rel_offsets {
            self.b.buf.extend_from_slice(&rel.to_le_bytes());
        }

        // Backpatch the table's header with the vtable's absolute offset.
        let header = table_start as usize;
        self.b.buf[header..header + 4].copy_from_slice(&vtable_start.to_le_bytes());

        table_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat::reader::FlatReader;

    #[test]
    fn scalar_round_trip() {
        let mut b = FlatBuilder::new();
        let mut t = b.start_table();
        t.push_i32(0, 42, 0);
        t.push_bool(1, true, false);
        let root = t.finish();
        let bytes = b.finish(root);

        let reader = FlatReader::new(&bytes).unwrap();
        let table = reader.root().unwrap();
        assert_eq!(table.get_i32(0, 0).unwrap(), 42);
        assert!(table.get_bool(1, false).unwrap());
        // Unset slot falls back to the supplied default.
        assert_eq!(table.get_i32(2, -1).unwrap(), -1);
    }

    #[test]
    fn default_valued_fields_are_omitted() {
        let mut b = FlatBuilder::new();
        let mut t = b.start_table();
        t.push_i32(0, 0, 0); // equals default -> omitted
        let root = t.finish();
        let bytes = b.finish(root);

        let reader = FlatReader::new(&bytes).unwrap();
        let table = reader.root().unwrap();
        assert!(table.field_offset(0).unwrap().is_none());
    }

    #[test]
    fn nested_table_and_string_round_trip() {
        let mut b = FlatBuilder::new();
        let name = b.write_string("hello");
        let mut child = b.start_table();
        child.push_offset(0, Some(name));
        let child_off = child.finish();

        let mut parent = b.start_table();
        parent.push_offset(0, Some(child_off));
        let root = parent.finish();
        let bytes = b.finish(root);

        let reader = FlatReader::new(&bytes).unwrap();
        let parent_table = reader.root().unwrap();
        let child_off = parent_table.get_offset(0).unwrap().unwrap();
        let child_table = reader.table_at(child_off).unwrap();
        let name_off = child_table.get_offset(0).unwrap().unwrap();
        assert_eq!(reader.string_at(name_off).unwrap(), "hello");
    }
}
