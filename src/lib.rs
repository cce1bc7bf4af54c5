//! # Sensornet Message
//!
//! `sensornet_message` defines the compact message format exchanged between
//! nodes of a low-bandwidth wireless sensor network. A message is a 7 byte
//! header describing what it is about (command, sensor type, information
//! type, internal subtype) and how its payload is encoded, followed by up to
//! 137 payload bytes.
//!
//! [`MessageHelper`] owns one header and a fixed payload buffer and exposes
//! typed access to both. [`MessageCodec`] turns messages into frames and back.

extern crate byteorder;
extern crate log;

pub mod base;
mod internals;
pub mod payload;
mod protocol;
mod render;
pub mod types;

pub use crate::base::{Error, Message, ProtocolDecoder, ProtocolEncoder, Result};
pub use crate::internals::{FRAME_CAPACITY, HEADER_BYTES, MAX_PAYLOAD};
pub use crate::payload::PayloadValue;
pub use crate::protocol::MessageCodec;
pub use crate::types::{
    CommandKind, InformationType, InternalMessageType, PayloadType, SensorType, StreamType,
};

use log::{error, trace};
use std::fmt;

/// A message header together with its payload buffer.
///
/// The payload lives in a fixed `MAX_PAYLOAD` byte array; it never grows.
/// Only the first `payload_size` bytes are meaningful, and only those are
/// ever exposed or compared.
///
/// # Example
/// ```
/// use sensornet_message::{CommandKind, InformationType, MessageHelper, SensorType};
///
/// let mut msg = MessageHelper::new();
/// msg.set_sensor_id(1);
/// msg.set_command(CommandKind::Set);
/// msg.set_sensor_type(SensorType::Temp);
/// msg.set_information_type(InformationType::Temp);
/// msg.set_f32(23.5);
/// assert!(msg.render().unwrap().contains("23.5"));
/// ```
#[derive(Clone)]
pub struct MessageHelper {
    header: Message,
    payload: [u8; MAX_PAYLOAD],
}

impl MessageHelper {
    /// Creates a message with the default header and a zeroed payload.
    pub fn new() -> MessageHelper {
        MessageHelper::from_header(Message::new())
    }

    /// Creates a message from an existing header with a zeroed payload.
    ///
    /// The header's payload size is kept, so the payload view will contain
    /// that many zero bytes.
    pub fn from_header(header: Message) -> MessageHelper {
        MessageHelper {
            header,
            payload: [0; MAX_PAYLOAD],
        }
    }

    /// Creates a message from a header and payload bytes.
    /// The payload size is taken from `payload`.
    pub fn from_parts(header: Message, payload: &[u8]) -> Result<MessageHelper> {
        let mut msg = MessageHelper::from_header(header);
        msg.set_payload(payload)?;
        Ok(msg)
    }

    /// Decodes one frame. Bytes after the frame are ignored, since transports
    /// may deliver fixed-size, padded buffers.
    pub fn from_bytes(bytes: &[u8]) -> Result<MessageHelper> {
        if bytes.len() < HEADER_BYTES {
            error!(
                "Frame shorter than header: {} of {} bytes",
                bytes.len(),
                HEADER_BYTES
            );
            return Err(Error::Truncated {
                expected: HEADER_BYTES,
                available: bytes.len(),
            });
        }

        let mut raw = [0u8; HEADER_BYTES];
        raw.copy_from_slice(&bytes[..HEADER_BYTES]);
        let header = Message::from_bytes(&raw)?;

        let frame_len = HEADER_BYTES + header.payload_size as usize;
        if bytes.len() < frame_len {
            error!(
                "Frame truncated: expected {} bytes, got {}",
                frame_len,
                bytes.len()
            );
            return Err(Error::Truncated {
                expected: frame_len,
                available: bytes.len(),
            });
        }
        if bytes.len() > frame_len {
            trace!("Ignoring {} bytes after frame", bytes.len() - frame_len);
        }

        MessageHelper::from_parts(header, &bytes[HEADER_BYTES..frame_len])
    }

    /// Encodes the header followed by the payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_BYTES + self.payload().len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(self.payload());
        out
    }

    /// Returns the header.
    #[inline]
    pub fn header(&self) -> &Message {
        &self.header
    }

    pub fn set_sensor_id(&mut self, id: u8) {
        self.header.sensor_id = id;
    }

    pub fn set_sensor_type(&mut self, sensor_type: SensorType) {
        self.header.sensor_type = sensor_type;
    }

    /// Sets the information type. It is not checked against the sensor type.
    pub fn set_information_type(&mut self, information_type: InformationType) {
        self.header.information_type = information_type;
    }

    pub fn set_command(&mut self, command: CommandKind) {
        self.header.command = command;
    }

    pub fn set_internal_type(&mut self, internal_type: InternalMessageType) {
        self.header.internal_type = internal_type;
    }

    /// Stores a stream subtype in the internal type byte.
    ///
    /// Stream codes are a subset of internal codes, so this only fails if the
    /// two tables drift apart.
    pub fn set_stream_type(&mut self, stream_type: StreamType) -> Result<()> {
        self.header.internal_type = InternalMessageType::try_from(stream_type.code())?;
        Ok(())
    }

    /// Sets the payload type tag without touching the payload bytes.
    pub fn set_payload_type(&mut self, payload_type: PayloadType) {
        self.header.payload_type = payload_type;
    }

    /// Sets how many payload bytes are valid.
    ///
    /// Fails with `PayloadTooLarge` if `size` exceeds `MAX_PAYLOAD`, leaving
    /// the current size unchanged.
    pub fn set_payload_size(&mut self, size: u8) -> Result<()> {
        if size as usize > MAX_PAYLOAD {
            error!("Payload size {} exceeds maximum {}", size, MAX_PAYLOAD);
            return Err(Error::PayloadTooLarge {
                size: size as usize,
                max: MAX_PAYLOAD,
            });
        }
        trace!(
            "Payload size {} -> {}",
            self.header.payload_size,
            size
        );
        self.header.payload_size = size;
        Ok(())
    }

    #[inline]
    pub fn sensor_id(&self) -> u8 {
        self.header.sensor_id
    }

    #[inline]
    pub fn sensor_type(&self) -> SensorType {
        self.header.sensor_type
    }

    #[inline]
    pub fn information_type(&self) -> InformationType {
        self.header.information_type
    }

    #[inline]
    pub fn command(&self) -> CommandKind {
        self.header.command
    }

    #[inline]
    pub fn internal_type(&self) -> InternalMessageType {
        self.header.internal_type
    }

    /// The stream subtype, if this is a stream message.
    pub fn stream_type(&self) -> Option<StreamType> {
        if self.header.command != CommandKind::Stream {
            return None;
        }
        StreamType::try_from(self.header.internal_type.code()).ok()
    }

    #[inline]
    pub fn payload_type(&self) -> PayloadType {
        self.header.payload_type
    }

    #[inline]
    pub fn payload_size(&self) -> u8 {
        self.header.payload_size
    }

    /// The first `payload_size` bytes of the payload buffer.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.header.payload_size as usize]
    }

    /// Mutable view of the first `payload_size` bytes of the payload buffer.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.payload[..self.header.payload_size as usize]
    }

    /// Copies raw payload bytes and sets the payload size to their length.
    /// The payload type is left unchanged.
    pub fn set_payload(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > MAX_PAYLOAD {
            error!(
                "Payload of {} bytes exceeds maximum {}",
                bytes.len(),
                MAX_PAYLOAD
            );
            return Err(Error::PayloadTooLarge {
                size: bytes.len(),
                max: MAX_PAYLOAD,
            });
        }
        self.payload[..bytes.len()].copy_from_slice(bytes);
        self.header.payload_size = bytes.len() as u8;
        Ok(())
    }

    /// Writes a typed value, setting payload type, size and bytes together.
    pub fn set_value(&mut self, value: PayloadValue<'_>) -> Result<()> {
        let len = value.encode(&mut self.payload)?;
        self.header.payload_type = value.payload_type();
        self.header.payload_size = len as u8;
        trace!("Payload set to {} ({} bytes)", self.header.payload_type, len);
        Ok(())
    }

    /// Reads the payload according to its payload type.
    pub fn value(&self) -> Result<PayloadValue<'_>> {
        PayloadValue::decode(self.header.payload_type, self.payload())
    }

    pub fn set_string(&mut self, text: &str) -> Result<()> {
        self.set_value(PayloadValue::text(text))
    }

    pub fn set_custom(&mut self, bytes: &[u8]) -> Result<()> {
        self.set_value(PayloadValue::Custom(bytes))
    }

    pub fn set_byte(&mut self, value: u8) {
        self.set_fixed(PayloadValue::Byte(value));
    }

    /// Stored as a byte, 1 for `true`.
    pub fn set_bool(&mut self, value: bool) {
        self.set_byte(value as u8);
    }

    pub fn set_i16(&mut self, value: i16) {
        self.set_fixed(PayloadValue::Int16(value));
    }

    pub fn set_u16(&mut self, value: u16) {
        self.set_fixed(PayloadValue::UInt16(value));
    }

    pub fn set_i32(&mut self, value: i32) {
        self.set_fixed(PayloadValue::Int32(value));
    }

    pub fn set_u32(&mut self, value: u32) {
        self.set_fixed(PayloadValue::UInt32(value));
    }

    pub fn set_f32(&mut self, value: f32) {
        self.set_fixed(PayloadValue::Float32(value));
    }

    /// Marks the payload as empty.
    pub fn clear_payload(&mut self) {
        self.set_fixed(PayloadValue::Empty);
    }

    // Fixed-width values are at most 4 bytes and always fit the buffer.
    fn set_fixed(&mut self, value: PayloadValue<'_>) {
        let written = self.set_value(value);
        debug_assert!(written.is_ok(), "fixed-width payload must fit");
    }

    /// The payload as UTF-8 text. Requires a `String` payload.
    pub fn as_str(&self) -> Result<&str> {
        match self.value()? {
            PayloadValue::String(bytes) => std::str::from_utf8(bytes).map_err(|_| {
                error!("String payload is not valid UTF-8");
                self.mismatch()
            }),
            _ => Err(self.mismatch()),
        }
    }

    pub fn as_byte(&self) -> Result<u8> {
        match self.value()? {
            PayloadValue::Byte(v) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    /// `true` for any non-zero byte payload.
    pub fn as_bool(&self) -> Result<bool> {
        self.as_byte().map(|v| v != 0)
    }

    pub fn as_i16(&self) -> Result<i16> {
        match self.value()? {
            PayloadValue::Int16(v) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    pub fn as_u16(&self) -> Result<u16> {
        match self.value()? {
            PayloadValue::UInt16(v) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    pub fn as_i32(&self) -> Result<i32> {
        match self.value()? {
            PayloadValue::Int32(v) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    pub fn as_u32(&self) -> Result<u32> {
        match self.value()? {
            PayloadValue::UInt32(v) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        match self.value()? {
            PayloadValue::Float32(v) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    fn mismatch(&self) -> Error {
        Error::PayloadTypeMismatch {
            payload_type: self.header.payload_type,
            size: self.header.payload_size as usize,
        }
    }

    /// Renders the header and decoded payload as one human-readable line.
    ///
    /// Fails with `PayloadTypeMismatch` if the payload size does not fit the
    /// payload type.
    pub fn render(&self) -> Result<String> {
        render::render_message(&self.header, self.payload())
    }
}

impl Default for MessageHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for MessageHelper {
    /// Compares headers and the valid payload bytes only.
    fn eq(&self, other: &MessageHelper) -> bool {
        self.header == other.header && self.payload() == other.payload()
    }
}

impl Eq for MessageHelper {}

impl fmt::Debug for MessageHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageHelper")
            .field("header", &self.header)
            .field("payload", &self.payload())
            .finish()
    }
}
