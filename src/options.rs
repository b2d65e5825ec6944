//! Writer configuration (spec §10.4 ambient stack).

use crate::error::{Error, Result};

/// Controls the alignment boundary a writer pads every message and buffer
/// region to. The wire invariant (spec §4.3) requires a multiple of 8; this
/// type only allows larger power-of-two-ish multiples of 8 so the default
/// stays the common case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    alignment: usize,
}

impl WriteOptions {
    pub fn new(alignment: usize) -> Result<Self> {
        if alignment == 0 || alignment % 8 != 0 {
            return Err(Error::BufferLayoutViolation {
                detail: "alignment must be a positive multiple of 8",
            });
        }
        Ok(WriteOptions { alignment })
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions { alignment: 8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alignment_is_eight() {
        assert_eq!(WriteOptions::default().alignment(), 8);
    }

    #[test]
    fn rejects_non_multiple_of_eight() {
        assert!(WriteOptions::new(12).is_err());
    }

    #[test]
    fn rejects_zero() {
        assert!(WriteOptions::new(0).is_err());
    }

    #[test]
    fn accepts_larger_multiple() {
        assert_eq!(WriteOptions::new(64).unwrap().alignment(), 64);
    }
}
