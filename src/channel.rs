//! Position-tracking byte-channel adapters (spec §4.2, component C2).
//!
//! These wrap any `std::io::{Read, Write}` with a running position counter
//! and the little-endian/padding primitives the framer and codecs build on.
//! Neither adapter is `Sync`; sharing one across concurrent callers is a
//! caller bug, not something this crate guards against (spec §5).

use std::io::{self, Read, Write};

use crate::error::{Error, Result};

const ZEROS: [u8; 64] = [0; 64];

/// A `Write` wrapped with a byte position counter.
pub struct PositionWriter<W> {
    inner: W,
    position: u64,
}

impl<W: Write> PositionWriter<W> {
    pub fn new(inner: W) -> Self {
        PositionWriter { inner, position: 0 }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    pub fn write_i32_le(&mut self, v: i32) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    pub fn write_zeros(&mut self, n: usize) -> Result<()> {
        let mut remaining = n;
        while remaining > 0 {
            let chunk = remaining.min(ZEROS.len());
            self.write_all(&ZEROS[..chunk])?;
            remaining -= chunk;
        }
        Ok(())
    }

    /// Pads with zero bytes up to the next `alignment`-byte multiple of the
    /// *absolute* channel position.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let rem = (self.position as usize) % alignment;
        if rem != 0 {
            self.write_zeros(alignment - rem)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(Error::from)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// A `Read` wrapped with a byte position counter.
pub struct PositionReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> PositionReader<R> {
    pub fn new(inner: R) -> Self {
        PositionReader { inner, position: 0 }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads up to `buf.len()` bytes, returning fewer only at a clean
    /// end-of-stream (mirrors `ReadChannel.readFully`).
    pub fn read_fully(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            match self.inner.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.position += total as u64;
        Ok(total)
    }

    /// Reads exactly `buf.len()` bytes or fails with `Error::UnexpectedEof`.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = self.read_fully(buf)?;
        if n != buf.len() {
            return Err(Error::UnexpectedEof);
        }
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_pads_to_next_multiple() {
        let mut w = PositionWriter::new(Vec::new());
        w.write_all(&[1, 2, 3]).unwrap();
        w.align(8).unwrap();
        assert_eq!(w.position(), 8);
        assert_eq!(w.into_inner(), vec![1, 2, 3, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn align_is_noop_when_already_aligned() {
        let mut w = PositionWriter::new(Vec::new());
        w.write_zeros(8).unwrap();
        w.align(8).unwrap();
        assert_eq!(w.position(), 8);
    }

    #[test]
    fn read_fully_reports_short_read_at_eof() {
        let mut r = PositionReader::new(&b"ab"[..]);
        let mut buf = [0u8; 4];
        let n = r.read_fully(&mut buf).unwrap();
        assert_eq!(n, 2);
        assert_eq!(&buf[..2], b"ab");
    }

    #[test]
    fn read_exact_errors_on_truncation() {
        let mut r = PositionReader::new(&b"ab"[..]);
        let mut buf = [0u8; 4];
        assert!(matches!(r.read_exact(&mut buf), Err(Error::UnexpectedEof)));
    }
}
