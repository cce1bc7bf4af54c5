use crate::base::{Error, Message, ProtocolDecoder, ProtocolEncoder, Result};
use crate::internals::{HEADER_BYTES, MAX_PAYLOAD, PAYLOAD_SIZE_OFFSET};
use crate::MessageHelper;
use log::error;
use log::trace;
use std::cmp::min;
use std::io::Write;

#[derive(Debug, Clone, PartialEq)]
enum DecodeStatus {
    WaitHeader,
    ReceivePayload,
    DropPayload(usize),
}

/// Encoder and decoder for the message wire format.
///
/// A frame is the 7 header bytes followed by `payload_size` payload bytes.
/// Decoding is incremental: bytes may arrive in any split and several frames
/// may be concatenated in one buffer.
///
/// A header with an unknown code is reported as `Error::FrameDropped` and its
/// payload is skipped, so decoding resumes at the next frame. A header whose
/// size byte is out of range gives no way to find the next frame; only the
/// header is dropped in that case.
#[derive(Debug)]
pub struct MessageCodec {
    status: DecodeStatus,
    header_buf: Vec<u8>,
    header: Message,
    payload_buf: Vec<u8>,
    rejected: Option<Error>,
}

impl MessageCodec {
    /// Creates a new `MessageCodec` waiting for the first header byte.
    pub fn new() -> MessageCodec {
        trace!("Creating new MessageCodec");
        MessageCodec {
            status: DecodeStatus::WaitHeader,
            header_buf: Vec::with_capacity(HEADER_BYTES),
            header: Message::new(),
            payload_buf: Vec::new(),
            rejected: None,
        }
    }

    fn start_wait_header(&mut self) {
        trace!("Decoder state -> WaitHeader");
        self.status = DecodeStatus::WaitHeader;
        self.header_buf.clear();
        self.payload_buf.clear();
    }

    fn start_receive_payload(&mut self) {
        trace!(
            "Decoder state -> ReceivePayload (size: {})",
            self.header.payload_size
        );
        self.status = DecodeStatus::ReceivePayload;
        self.payload_buf.clear();
        self.payload_buf.reserve(self.header.payload_size as usize);
    }

    fn start_drop_payload(&mut self, remaining: usize) {
        trace!("Decoder state -> DropPayload({})", remaining);
        self.header_buf.clear();
        self.status = DecodeStatus::DropPayload(remaining);
    }

    fn finish_frame(&mut self) -> Result<MessageHelper> {
        let msg = MessageHelper::from_parts(self.header, &self.payload_buf)?;
        trace!("Frame complete: {}", self.header);
        self.start_wait_header();
        Ok(msg)
    }

    fn decode_header(&mut self, buf: &[u8]) -> Result<(usize, Option<MessageHelper>)> {
        let bytes_to_read = HEADER_BYTES - self.header_buf.len();
        let bytes_actual_read = min(bytes_to_read, buf.len());
        trace!(
            "Need {} header bytes, received {}, reading {}",
            bytes_to_read,
            buf.len(),
            bytes_actual_read
        );
        self.header_buf.extend_from_slice(&buf[..bytes_actual_read]);

        if self.header_buf.len() < HEADER_BYTES {
            trace!("Header incomplete, need more data");
            return Ok((bytes_actual_read, None));
        }

        let mut raw = [0u8; HEADER_BYTES];
        raw.copy_from_slice(&self.header_buf);
        self.header = match Message::from_bytes(&raw) {
            Ok(header) => header,
            Err(e) => {
                let size = raw[PAYLOAD_SIZE_OFFSET] as usize;
                let skip = if size <= MAX_PAYLOAD { size } else { 0 };
                error!("Rejecting frame header {:02X?}: {}", raw, e);
                self.rejected = Some(e);
                if skip > 0 {
                    self.start_drop_payload(skip);
                } else {
                    self.start_wait_header();
                }
                return Ok((bytes_actual_read, None));
            }
        };

        if self.header.payload_size == 0 {
            trace!("Payload size is 0, returning message immediately");
            Ok((bytes_actual_read, Some(self.finish_frame()?)))
        } else {
            self.start_receive_payload();
            Ok((bytes_actual_read, None))
        }
    }

    fn decode_payload(&mut self, buf: &[u8]) -> Result<(usize, Option<MessageHelper>)> {
        let bytes_to_read = self.header.payload_size as usize - self.payload_buf.len();
        let bytes_actual_read = min(bytes_to_read, buf.len());
        trace!(
            "Need {} payload bytes, received {}, reading {}",
            bytes_to_read,
            buf.len(),
            bytes_actual_read
        );
        self.payload_buf.extend_from_slice(&buf[..bytes_actual_read]);

        if self.payload_buf.len() == self.header.payload_size as usize {
            Ok((bytes_actual_read, Some(self.finish_frame()?)))
        } else {
            trace!("Payload incomplete, need more data");
            Ok((bytes_actual_read, None))
        }
    }

    fn drop_payload(&mut self, remaining: usize, buf: &[u8]) -> usize {
        let dropped = min(remaining, buf.len());
        trace!("Skipping {} of {} payload bytes", dropped, remaining);
        if dropped == remaining {
            self.start_wait_header();
        } else {
            self.status = DecodeStatus::DropPayload(remaining - dropped);
        }
        dropped
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolDecoder for MessageCodec {
    /// Consumes bytes until one frame is complete or the buffer runs out.
    ///
    /// Returns as soon as a frame is complete or rejected, so the consumed
    /// count may be less than `buf.len()` when frames are concatenated. For a
    /// rejected frame the count is carried by `Error::FrameDropped`.
    fn decode(&mut self, buf: &[u8]) -> Result<(usize, Option<MessageHelper>)> {
        trace!(
            "decode called with {} bytes, current state: {:?}",
            buf.len(),
            self.status
        );

        let mut i = 0;
        while i < buf.len() {
            let step = match self.status {
                DecodeStatus::WaitHeader => self.decode_header(&buf[i..]),
                DecodeStatus::ReceivePayload => self.decode_payload(&buf[i..]),
                DecodeStatus::DropPayload(remaining) => {
                    Ok((self.drop_payload(remaining, &buf[i..]), None))
                }
            };

            match step {
                Ok((consumed, msg_option)) => {
                    i += consumed;
                    if msg_option.is_some() {
                        return Ok((i, msg_option));
                    }
                    if let Some(cause) = self.rejected.take() {
                        if let DecodeStatus::DropPayload(remaining) = self.status {
                            i += self.drop_payload(remaining, &buf[i..]);
                        }
                        return Err(Error::FrameDropped {
                            consumed: i,
                            cause: Box::new(cause),
                        });
                    }
                }
                Err(e) => {
                    error!("Frame decode failed in state {:?}: {}", self.status, e);
                    self.reset_decoder();
                    return Err(e);
                }
            }
        }

        trace!("decode consumed {} bytes without a complete frame", i);
        Ok((i, None))
    }

    fn reset_decoder(&mut self) {
        trace!("Resetting decoder state");
        self.rejected = None;
        self.start_wait_header();
    }
}

impl ProtocolEncoder for MessageCodec {
    /// Writes the header followed by the payload bytes.
    fn encode(&mut self, msg: &MessageHelper, bytes: &mut [u8]) -> Result<usize> {
        let required = self.estimate_encoded_size(msg)?;
        if required > bytes.len() {
            error!(
                "Buffer too small: required {}, available {}",
                required,
                bytes.len()
            );
            return Err(Error::BufferTooSmall {
                required,
                available: bytes.len(),
            });
        }

        bytes[..HEADER_BYTES].copy_from_slice(&msg.header().to_bytes());
        bytes[HEADER_BYTES..required].copy_from_slice(msg.payload());
        trace!("Encoded frame of {} bytes: {}", required, msg.header());
        Ok(required)
    }

    fn estimate_encoded_size(&mut self, msg: &MessageHelper) -> Result<usize> {
        Ok(HEADER_BYTES + msg.payload().len())
    }

    fn write_to(&mut self, msg: &MessageHelper, dest: &mut impl Write) -> Result<usize> {
        let size = self.estimate_encoded_size(msg)?;
        let mut buf = vec![0; size];
        let encoded_size = self.encode(msg, &mut buf)?;
        match dest.write_all(&buf[..encoded_size]) {
            Ok(()) => {
                trace!("Wrote {} bytes", encoded_size);
                Ok(encoded_size)
            }
            Err(err) => {
                error!("IO error during write_all: {}", err);
                Err(err.into())
            }
        }
    }

    /// The encoder is stateless.
    fn reset_encoder(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommandKind, InternalMessageType, PayloadType, SensorType, StreamType};

    fn encode(codec: &mut MessageCodec, msg: &MessageHelper) -> Result<Vec<u8>> {
        let size = codec.estimate_encoded_size(msg)?;
        let mut buf = vec![0; size];
        let written = codec.encode(msg, &mut buf)?;
        buf.truncate(written);
        Ok(buf)
    }

    fn battery_report() -> MessageHelper {
        let mut msg = MessageHelper::new();
        msg.set_sensor_id(2);
        msg.set_command(CommandKind::Internal);
        msg.set_internal_type(InternalMessageType::BatteryLevel);
        msg.set_byte(87);
        msg
    }

    #[test]
    fn protocol_encode() {
        let mut codec = MessageCodec::new();
        assert_eq!(
            encode(&mut codec, &MessageHelper::new()).unwrap(),
            [0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            encode(&mut codec, &battery_report()).unwrap(),
            [2, 3, 0, 0, 0, 1, 1, 87]
        );
    }

    #[test]
    fn encode_into_short_buffer_fails() {
        let mut codec = MessageCodec::new();
        let mut buf = [0u8; 7];
        assert!(matches!(
            codec.encode(&battery_report(), &mut buf),
            Err(Error::BufferTooSmall {
                required: 8,
                available: 7
            })
        ));
    }

    #[test]
    fn decode_split_input() {
        let mut codec = MessageCodec::new();
        let frame = [2, 3, 0, 0, 0, 1, 1, 87];

        assert_eq!(codec.decode(&frame[..4]).unwrap(), (4, None));
        assert_eq!(codec.decode(&frame[4..7]).unwrap(), (3, None));
        let (consumed, msg) = codec.decode(&frame[7..]).unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(msg.unwrap(), battery_report());
    }

    #[test]
    fn decode_concatenated_frames() {
        let mut codec = MessageCodec::new();
        let mut stream = encode(&mut codec, &battery_report()).unwrap();
        let mut presentation = MessageHelper::new();
        presentation.set_sensor_id(5);
        presentation.set_sensor_type(SensorType::Hvac);
        presentation.set_string("hvac").unwrap();
        stream.extend(encode(&mut codec, &presentation).unwrap());

        let (first_len, first) = codec.decode(&stream).unwrap();
        assert_eq!(first_len, 8);
        assert_eq!(first.unwrap(), battery_report());

        let (second_len, second) = codec.decode(&stream[first_len..]).unwrap();
        assert_eq!(second_len, 11);
        let second = second.unwrap();
        assert_eq!(second.sensor_type(), SensorType::Hvac);
        assert_eq!(second.payload(), b"hvac");
    }

    #[test]
    fn decode_skips_rejected_frame() {
        let mut codec = MessageCodec::new();
        let mut stream = vec![0, 1, 99, 0, 0, 0, 2, b'h', b'i'];
        stream.extend_from_slice(&[1, 0, 0, 0, 0, 8, 0]);

        match codec.decode(&stream) {
            Err(Error::FrameDropped { consumed, cause }) => {
                assert_eq!(consumed, 9);
                assert!(matches!(
                    *cause,
                    Error::InvalidField {
                        field: "sensor_type",
                        code: 99
                    }
                ));
            }
            other => panic!("expected FrameDropped, got {:?}", other),
        }

        let (consumed, msg) = codec.decode(&stream[9..]).unwrap();
        assert_eq!(consumed, 7);
        let msg = msg.unwrap();
        assert_eq!(msg.sensor_id(), 1);
        assert_eq!(msg.payload_type(), PayloadType::Empty);
    }

    #[test]
    fn decode_skips_rejected_payload_across_calls() {
        let mut codec = MessageCodec::new();
        let mut stream = vec![0, 1, 99, 0, 0, 0, 2, b'h', b'i'];
        stream.extend(encode(&mut codec, &battery_report()).unwrap());

        assert!(matches!(
            codec.decode(&stream[..8]),
            Err(Error::FrameDropped { consumed: 8, .. })
        ));

        let (consumed, msg) = codec.decode(&stream[8..]).unwrap();
        assert_eq!(consumed, 9);
        assert_eq!(msg.unwrap(), battery_report());
    }

    #[test]
    fn decode_oversized_size_byte_drops_header_only() {
        let mut codec = MessageCodec::new();
        let mut stream = vec![0, 0, 0, 0, 0, 0, 200];
        stream.extend(encode(&mut codec, &battery_report()).unwrap());

        match codec.decode(&stream) {
            Err(Error::FrameDropped { consumed: 7, cause }) => {
                assert!(matches!(*cause, Error::PayloadTooLarge { size: 200, .. }))
            }
            other => panic!("expected FrameDropped, got {:?}", other),
        }
        assert_eq!(
            codec.decode(&stream[7..]).unwrap(),
            (8, Some(battery_report()))
        );
    }

    #[test]
    fn stream_frame_round_trip() {
        let mut codec = MessageCodec::new();
        let mut msg = MessageHelper::new();
        msg.set_sensor_id(3);
        msg.set_command(CommandKind::Stream);
        msg.set_stream_type(StreamType::FirmwareResponse).unwrap();
        msg.set_custom(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        let bytes = encode(&mut codec, &msg).unwrap();
        let (consumed, decoded) = codec.decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        let decoded = decoded.unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.stream_type(), Some(StreamType::FirmwareResponse));
    }

    #[test]
    fn stream_command_with_internal_subtype_round_trip() {
        let mut codec = MessageCodec::new();
        let mut msg = MessageHelper::new();
        msg.set_command(CommandKind::Stream);
        msg.set_internal_type(InternalMessageType::Reboot);

        let bytes = encode(&mut codec, &msg).unwrap();
        assert_eq!(bytes, [0, 4, 0, 0, 13, 0, 0]);

        let (_, decoded) = codec.decode(&bytes).unwrap();
        let decoded = decoded.unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.stream_type(), None);
        assert_eq!(MessageHelper::from_bytes(&bytes).unwrap(), msg);
    }

    #[test]
    fn write_to_stream() {
        let mut codec = MessageCodec::new();
        let mut out = Vec::new();
        let written = codec.write_to(&battery_report(), &mut out).unwrap();
        assert_eq!(written, 8);
        assert_eq!(out, [2, 3, 0, 0, 0, 1, 1, 87]);
    }
}
