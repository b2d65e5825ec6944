//! Codec errors.
//!
//! `Error` is a closed, seven-member taxonomy (see the spec's error handling
//! design): the codec never retries and never hides a malformed message
//! behind a successful return.

use std::fmt;
use std::io;

/// The result type returned by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A codec error.
///
/// Each variant corresponds to one row of the error taxonomy. Variants carry
/// enough context (the offending value, where available) that a caller can
/// produce a useful log line without this crate needing an opinion on log
/// format.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The stream ended mid-prefix, mid-payload, or mid-body, or a metadata
    /// field referenced a byte range outside the payload.
    UnexpectedEof,
    /// `Message.version` was not the supported version.
    IncompatibleVersion { found: i16 },
    /// `headerType` was not in the supported set for the call site.
    UnexpectedHeader { found: &'static str },
    /// A body length, row count, or per-node counter exceeded `i32::MAX`.
    OversizedBatch { what: &'static str, value: i64 },
    /// A buffer's declared layout and its actual placement disagree.
    BufferLayoutViolation { detail: &'static str },
    /// A type-union tag was not recognized by this reader.
    UnsupportedType { tag: u8 },
    /// The underlying channel failed.
    Transport(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEof => write!(f, "unexpected end of stream"),
            Error::IncompatibleVersion { found } => {
                write!(f, "incompatible metadata version: {found}")
            }
            Error::UnexpectedHeader { found } => {
                write!(f, "unexpected message header: {found}")
            }
            Error::OversizedBatch { what, value } => {
                write!(f, "{what} exceeds i32 range: {value}")
            }
            Error::BufferLayoutViolation { detail } => {
                write!(f, "buffer layout violation: {detail}")
            }
            Error::UnsupportedType { tag } => {
                write!(f, "unsupported type tag: {tag}")
            }
            Error::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof
        } else {
            Error::Transport(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offending_value() {
        let err = Error::IncompatibleVersion { found: 2 };
        assert_eq!(err.to_string(), "incompatible metadata version: 2");
    }

    #[test]
    fn io_eof_maps_to_unexpected_eof() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        match Error::from(io_err) {
            Error::UnexpectedEof => {}
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }
}
