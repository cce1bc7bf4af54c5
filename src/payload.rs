//! Typed view over the payload bytes.
//!
//! The payload type tag selects how the trailing bytes are interpreted.
//! Multi-byte values are little-endian.

use crate::base::{Error, Result};
use crate::internals::MAX_PAYLOAD;
use crate::types::PayloadType;
use byteorder::{ByteOrder, LittleEndian};
use log::error;

/// A payload interpreted according to its payload type.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PayloadValue<'a> {
    /// Text bytes. Not necessarily valid UTF-8 or NUL-terminated.
    String(&'a [u8]),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    /// Opaque binary.
    Custom(&'a [u8]),
    Float32(f32),
    Empty,
}

impl<'a> PayloadValue<'a> {
    /// Wraps a text payload.
    pub fn text(s: &'a str) -> PayloadValue<'a> {
        PayloadValue::String(s.as_bytes())
    }

    /// The payload type tag matching this value.
    pub fn payload_type(&self) -> PayloadType {
        match self {
            PayloadValue::String(_) => PayloadType::String,
            PayloadValue::Byte(_) => PayloadType::Byte,
            PayloadValue::Int16(_) => PayloadType::Int16,
            PayloadValue::UInt16(_) => PayloadType::UInt16,
            PayloadValue::Int32(_) => PayloadType::Int32,
            PayloadValue::UInt32(_) => PayloadType::UInt32,
            PayloadValue::Custom(_) => PayloadType::Custom,
            PayloadValue::Float32(_) => PayloadType::Float32,
            PayloadValue::Empty => PayloadType::Empty,
        }
    }

    /// Number of bytes this value occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        match self {
            PayloadValue::String(bytes) | PayloadValue::Custom(bytes) => bytes.len(),
            other => other.payload_type().fixed_width().unwrap_or(0),
        }
    }

    /// Writes the value into `buf` and returns the number of bytes used.
    ///
    /// Fails with `PayloadTooLarge` if the value does not fit in `buf` or
    /// exceeds `MAX_PAYLOAD`; nothing is written in that case.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let len = self.encoded_len();
        let max = buf.len().min(MAX_PAYLOAD);
        if len > max {
            error!("Payload value needs {} bytes, capacity is {}", len, max);
            return Err(Error::PayloadTooLarge { size: len, max });
        }

        match *self {
            PayloadValue::String(bytes) | PayloadValue::Custom(bytes) => {
                buf[..len].copy_from_slice(bytes)
            }
            PayloadValue::Byte(v) => buf[0] = v,
            PayloadValue::Int16(v) => LittleEndian::write_i16(buf, v),
            PayloadValue::UInt16(v) => LittleEndian::write_u16(buf, v),
            PayloadValue::Int32(v) => LittleEndian::write_i32(buf, v),
            PayloadValue::UInt32(v) => LittleEndian::write_u32(buf, v),
            PayloadValue::Float32(v) => LittleEndian::write_f32(buf, v),
            PayloadValue::Empty => {}
        }
        Ok(len)
    }

    /// Interprets `bytes` as a payload of type `payload_type`.
    ///
    /// Fixed-width types require `bytes` to be exactly that width, otherwise
    /// `PayloadTypeMismatch` is returned.
    pub fn decode(payload_type: PayloadType, bytes: &'a [u8]) -> Result<PayloadValue<'a>> {
        if !payload_type.accepts_size(bytes.len()) {
            error!(
                "Payload of {} bytes does not match type {}",
                bytes.len(),
                payload_type
            );
            return Err(Error::PayloadTypeMismatch {
                payload_type,
                size: bytes.len(),
            });
        }

        Ok(match payload_type {
            PayloadType::String => PayloadValue::String(bytes),
            PayloadType::Byte => PayloadValue::Byte(bytes[0]),
            PayloadType::Int16 => PayloadValue::Int16(LittleEndian::read_i16(bytes)),
            PayloadType::UInt16 => PayloadValue::UInt16(LittleEndian::read_u16(bytes)),
            PayloadType::Int32 => PayloadValue::Int32(LittleEndian::read_i32(bytes)),
            PayloadType::UInt32 => PayloadValue::UInt32(LittleEndian::read_u32(bytes)),
            PayloadType::Custom => PayloadValue::Custom(bytes),
            PayloadType::Float32 => PayloadValue::Float32(LittleEndian::read_f32(bytes)),
            PayloadType::Empty => PayloadValue::Empty,
        })
    }
}
