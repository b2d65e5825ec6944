//! The body-region allocator seam (spec §6): a pluggable source of the
//! buffers a batch's columns are assembled into, and the memory backing a
//! decoded body. `bytes::Bytes` already gives "released exactly once" for
//! free via its reference-counted `Drop`, so `ByteRegion` is just an alias.

use bytes::{Bytes, BytesMut};

/// An allocator-backed, reference-counted byte region. Cloning is cheap
/// (refcount bump); the backing allocation is freed when the last clone
/// drops.
pub type ByteRegion = Bytes;

/// A source of zeroed, writable buffers for assembling batch bodies.
///
/// Implementations may pool or otherwise reuse memory; this crate never
/// assumes anything about allocation strategy beyond the returned buffer
/// being exactly `len` bytes and zero-filled.
pub trait Allocator {
    fn allocate(&self, len: usize) -> BytesMut;
}

/// The allocator used when a caller doesn't supply one: plain heap memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAllocator;

impl Allocator for DefaultAllocator {
    fn allocate(&self, len: usize) -> BytesMut {
        BytesMut::zeroed(len)
    }
}
