use crate::types::PayloadType;
use std::error;
use std::fmt;
use std::io;

/// Represents errors that can occur while building, reading or encoding messages.
#[derive(Debug)]
pub enum Error {
    /// A header byte does not map to any value of its enumeration.
    InvalidField { field: &'static str, code: u8 },

    /// The requested payload size exceeds the payload capacity.
    PayloadTooLarge { size: usize, max: usize },

    /// The payload size is inconsistent with the declared payload type.
    PayloadTypeMismatch {
        payload_type: PayloadType,
        size: usize,
    },

    /// The buffer provided is too small for message encoding.
    BufferTooSmall { required: usize, available: usize },

    /// The input ended before a complete frame.
    Truncated { expected: usize, available: usize },

    /// The decoder rejected a frame and skipped it. `consumed` is the number
    /// of input bytes used by the call that reported it; any payload bytes
    /// of the frame not yet received are skipped on later calls.
    FrameDropped { consumed: usize, cause: Box<Error> },

    /// An I/O error occurred while writing an encoded frame.
    IoError(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidField { field, code } => {
                write!(f, "invalid {} code: {}", field, code)
            }
            Error::PayloadTooLarge { size, max } => {
                write!(f, "payload of {} bytes exceeds capacity of {}", size, max)
            }
            Error::PayloadTypeMismatch { payload_type, size } => write!(
                f,
                "{} bytes is not a valid {} payload",
                size, payload_type
            ),
            Error::BufferTooSmall {
                required,
                available,
            } => write!(
                f,
                "buffer is too small for message encoding: need {}, have {}",
                required, available
            ),
            Error::Truncated {
                expected,
                available,
            } => write!(
                f,
                "truncated frame: expected {} bytes, got {}",
                expected, available
            ),
            Error::FrameDropped { consumed, cause } => {
                write!(f, "frame dropped after {} bytes: {}", consumed, cause)
            }
            Error::IoError(err) => write!(f, "io error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            Error::FrameDropped { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IoError(err)
    }
}

/// A specialized `Result` type for message operations.
pub type Result<T> = std::result::Result<T, Error>;
