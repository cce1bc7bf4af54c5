use crate::base::error::{Error, Result};
use crate::internals::*;
use crate::types::{
    CommandKind, InformationType, InternalMessageType, PayloadType, SensorType,
};
use log::{error, trace};
use std::fmt;

/// The fixed-size message header.
///
/// Fields are declared in wire order; each occupies exactly one byte when
/// encoded with [`Message::to_bytes`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Message {
    /// Which sensor or actuator on the sending node this message concerns.
    /// This is not a network address.
    pub sensor_id: u8,

    /// Top-level purpose of the message.
    pub command: CommandKind,

    /// Kind of device being addressed.
    pub sensor_type: SensorType,

    /// Meaning of the carried value.
    pub information_type: InformationType,

    /// Internal subtype, meaningful when `command` is `Internal`. Holds the
    /// stream subtype code when `command` is `Stream`.
    pub internal_type: InternalMessageType,

    /// Encoding of the trailing payload bytes.
    pub payload_type: PayloadType,

    /// Number of valid payload bytes, at most `MAX_PAYLOAD`.
    pub payload_size: u8,
}

impl Message {
    /// Creates a header with the default field values and an empty string payload.
    pub fn new() -> Message {
        Message {
            sensor_id: 0,
            command: CommandKind::Presentation,
            sensor_type: SensorType::Door,
            information_type: InformationType::Temp,
            internal_type: InternalMessageType::BatteryLevel,
            payload_type: PayloadType::String,
            payload_size: 0,
        }
    }

    /// Packs the header into its wire form.
    pub fn to_bytes(&self) -> [u8; HEADER_BYTES] {
        let mut bytes = [0u8; HEADER_BYTES];
        bytes[SENSOR_ID_OFFSET] = self.sensor_id;
        bytes[COMMAND_OFFSET] = self.command.code();
        bytes[SENSOR_TYPE_OFFSET] = self.sensor_type.code();
        bytes[INFORMATION_TYPE_OFFSET] = self.information_type.code();
        bytes[INTERNAL_TYPE_OFFSET] = self.internal_type.code();
        bytes[PAYLOAD_TYPE_OFFSET] = self.payload_type.code();
        bytes[PAYLOAD_SIZE_OFFSET] = self.payload_size;
        bytes
    }

    /// Decodes a header, rejecting any byte outside its field's code set.
    /// The subtype byte is always checked as an internal code, whatever the
    /// command; a stream view of it is derived by `MessageHelper::stream_type`.
    ///
    /// The payload size byte is checked against `MAX_PAYLOAD`. Whether the
    /// size suits the payload type is not checked here, since a header may
    /// legitimately be read before its payload is filled in.
    pub fn from_bytes(bytes: &[u8; HEADER_BYTES]) -> Result<Message> {
        trace!("Decoding header: {:02X?}", bytes);
        let payload_size = bytes[PAYLOAD_SIZE_OFFSET];
        if payload_size as usize > MAX_PAYLOAD {
            error!(
                "Header payload size {} exceeds maximum {}",
                payload_size, MAX_PAYLOAD
            );
            return Err(Error::PayloadTooLarge {
                size: payload_size as usize,
                max: MAX_PAYLOAD,
            });
        }

        Ok(Message {
            sensor_id: bytes[SENSOR_ID_OFFSET],
            command: CommandKind::try_from(bytes[COMMAND_OFFSET])?,
            sensor_type: SensorType::try_from(bytes[SENSOR_TYPE_OFFSET])?,
            information_type: InformationType::try_from(bytes[INFORMATION_TYPE_OFFSET])?,
            internal_type: InternalMessageType::try_from(bytes[INTERNAL_TYPE_OFFSET])?,
            payload_type: PayloadType::try_from(bytes[PAYLOAD_TYPE_OFFSET])?,
            payload_size,
        })
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sensor={} command={} type={} info={} internal={} payload_type={} size={}",
            self.sensor_id,
            self.command,
            self.sensor_type,
            self.information_type,
            self.internal_type,
            self.payload_type,
            self.payload_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_header() {
        let msg = Message::default();
        assert_eq!(msg.command, CommandKind::Presentation);
        assert_eq!(msg.payload_type, PayloadType::String);
        assert_eq!(msg.payload_size, 0);
        assert_eq!(msg.to_bytes(), [0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn header_wire_order() {
        let msg = Message {
            sensor_id: 9,
            command: CommandKind::Set,
            sensor_type: SensorType::Temp,
            information_type: InformationType::Temp,
            internal_type: InternalMessageType::BatteryLevel,
            payload_type: PayloadType::Float32,
            payload_size: 4,
        };
        let bytes = msg.to_bytes();
        assert_eq!(bytes, [9, 1, 6, 0, 0, 7, 4]);
        assert_eq!(Message::from_bytes(&bytes).unwrap(), msg);
    }

    #[test]
    fn rejects_unknown_codes() {
        match Message::from_bytes(&[1, 5, 0, 0, 0, 0, 0]) {
            Err(Error::InvalidField { field, code }) => {
                assert_eq!(field, "command");
                assert_eq!(code, 5);
            }
            other => panic!("expected InvalidField, got {:?}", other),
        }

        match Message::from_bytes(&[1, 1, 0, 57, 0, 0, 0]) {
            Err(Error::InvalidField { field, .. }) => assert_eq!(field, "information_type"),
            other => panic!("expected InvalidField, got {:?}", other),
        }

        assert!(matches!(
            Message::from_bytes(&[1, 1, 0, 0, 0, 9, 0]),
            Err(Error::InvalidField {
                field: "payload_type",
                code: 9
            })
        ));
    }

    #[test]
    fn stream_subtype_byte_is_an_internal_code() {
        assert!(Message::from_bytes(&[0, 4, 0, 0, 6, 6, 0]).is_ok());

        // Not a stream code, but a valid internal code: accepted as encoded.
        let msg = Message::from_bytes(&[0, 4, 0, 0, 13, 6, 0]).unwrap();
        assert_eq!(msg.command, CommandKind::Stream);
        assert_eq!(msg.internal_type, InternalMessageType::Reboot);

        assert!(matches!(
            Message::from_bytes(&[0, 4, 0, 0, 30, 6, 0]),
            Err(Error::InvalidField {
                field: "internal_type",
                code: 30
            })
        ));
    }

    #[test]
    fn rejects_oversized_payload_byte() {
        assert!(matches!(
            Message::from_bytes(&[0, 0, 0, 0, 0, 0, 138]),
            Err(Error::PayloadTooLarge { size: 138, max: 137 })
        ));
        assert!(Message::from_bytes(&[0, 0, 0, 0, 0, 0, 137]).is_ok());
    }

    #[test]
    fn display_lists_header() {
        let msg = Message::new();
        assert_eq!(
            msg.to_string(),
            "sensor=0 command=Presentation type=Door info=Temp internal=BatteryLevel payload_type=String size=0"
        );
    }
}
