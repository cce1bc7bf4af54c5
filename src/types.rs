//! Closed vocabularies carried in the message header.
//!
//! Every enumeration is one byte on the wire. The numeric codes are part of the
//! wire contract: never renumber a variant, only append at the next free code.
//! Deprecated names are kept as associated constants that resolve to the same
//! variant, so two names always decode to one value.

use crate::base::{Error, Result};
use log::error;
use std::fmt;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($field:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $code, )+
        }

        impl $name {
            /// Every variant, in wire code order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Returns the wire code of this value.
            #[inline]
            pub fn code(self) -> u8 {
                self as u8
            }

            /// Returns the variant name, used when rendering messages.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant), )+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = Error;

            fn try_from(code: u8) -> Result<$name> {
                match code {
                    $( $code => Ok($name::$variant), )+
                    _ => {
                        error!("Unknown {} code: {}", $field, code);
                        Err(Error::InvalidField { field: $field, code })
                    }
                }
            }
        }

        impl From<$name> for u8 {
            #[inline]
            fn from(value: $name) -> u8 {
                value.code()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

wire_enum! {
    /// Top-level purpose of a message.
    pub enum CommandKind ("command") {
        /// Sent by a node when it presents an attached sensor.
        Presentation = 0,
        /// Update of a sensor or actuator value.
        Set = 1,
        /// Request for a value.
        Request = 2,
        /// Library-level message; subtype in the internal type byte.
        Internal = 3,
        /// Chunked data such as firmware; subtype in the internal type byte.
        Stream = 4,
    }
}

wire_enum! {
    /// Kind of device attached to a node, used when presenting sensors.
    pub enum SensorType ("sensor_type") {
        /// Door sensor (Tripped, Armed).
        Door = 0,
        /// Motion sensor (Tripped, Armed).
        Motion = 1,
        /// Smoke sensor (Tripped, Armed).
        Smoke = 2,
        /// Binary light or relay (Status, Watt).
        Binary = 3,
        /// Dimmable light or fan (Status, Percentage, Watt).
        Dimmer = 4,
        /// Blinds or window cover (Up, Down, Stop, Percentage).
        Cover = 5,
        /// Temperature sensor.
        Temp = 6,
        /// Humidity sensor.
        Hum = 7,
        /// Barometer (Pressure, Forecast).
        Baro = 8,
        /// Wind sensor (Wind, Gust).
        Wind = 9,
        /// Rain sensor (Rain, RainRate).
        Rain = 10,
        /// UV sensor.
        Uv = 11,
        /// Personal scale (Weight, Impedance).
        Weight = 12,
        /// Power meter (Watt, Kwh, Var, Va, PowerFactor).
        Power = 13,
        /// Heater (HvacSetpointHeat, HvacFlowState, Temp).
        Heater = 14,
        /// Distance sensor.
        Distance = 15,
        /// Light level sensor (LightLevel, Level).
        LightLevel = 16,
        /// Non-repeating node.
        ArduinoNode = 17,
        /// Repeating node.
        ArduinoRepeaterNode = 18,
        /// Lock (LockStatus).
        Lock = 19,
        /// IR device (IrSend, IrReceive).
        Ir = 20,
        /// Water meter (Flow, Volume).
        Water = 21,
        /// Air quality sensor (Level).
        AirQuality = 22,
        /// Custom sensor.
        Custom = 23,
        /// Dust sensor (Level).
        Dust = 24,
        /// Scene controller (SceneOn, SceneOff).
        SceneController = 25,
        /// RGB light (Rgb, Watt).
        RgbLight = 26,
        /// RGBW light (Rgbw, Watt).
        RgbwLight = 27,
        /// Color sensor (Rgb).
        ColorSensor = 28,
        /// Thermostat / HVAC device.
        Hvac = 29,
        /// Multimeter (Voltage, Current, Impedance).
        Multimeter = 30,
        /// Sprinkler (Status, Tripped).
        Sprinkler = 31,
        /// Water leak sensor (Tripped, Armed).
        WaterLeak = 32,
        /// Sound sensor (Tripped, Armed, Level in dB).
        Sound = 33,
        /// Vibration sensor (Tripped, Armed, Level in Hz).
        Vibration = 34,
        /// Moisture sensor (Tripped, Armed, Level).
        Moisture = 35,
        /// Text display or information device (Text).
        Info = 36,
        /// Gas meter (Flow, Volume).
        Gas = 37,
        /// GPS sensor (Position).
        Gps = 38,
        /// Water quality sensor (Temp, Ph, Orp, Ec, Status).
        WaterQuality = 39,
    }
}

impl SensorType {
    /// Legacy name for [`SensorType::Binary`].
    #[deprecated(note = "use SensorType::Binary")]
    pub const LIGHT: SensorType = SensorType::Binary;
}

wire_enum! {
    /// Semantic meaning of the carried value. Which values make sense depends
    /// on the sensor type, but the pairing is not enforced.
    pub enum InformationType ("information_type") {
        /// Temperature.
        Temp = 0,
        /// Humidity.
        Hum = 1,
        /// Binary on/off status, 1 = on.
        Status = 2,
        /// Percentage 0-100.
        Percentage = 3,
        /// Atmospheric pressure.
        Pressure = 4,
        /// Weather forecast string.
        Forecast = 5,
        /// Amount of rain.
        Rain = 6,
        /// Rate of rain.
        RainRate = 7,
        /// Wind speed.
        Wind = 8,
        /// Gust.
        Gust = 9,
        /// Wind direction in degrees.
        Direction = 10,
        /// UV light level.
        Uv = 11,
        /// Weight.
        Weight = 12,
        /// Distance.
        Distance = 13,
        /// Impedance.
        Impedance = 14,
        /// Armed status of a security sensor, 1 = armed.
        Armed = 15,
        /// Tripped status of a security sensor, 1 = tripped.
        Tripped = 16,
        /// Watt value.
        Watt = 17,
        /// Accumulated kWh.
        Kwh = 18,
        /// Turn on a scene.
        SceneOn = 19,
        /// Turn off a scene.
        SceneOff = 20,
        /// HVAC flow state.
        HvacFlowState = 21,
        /// HVAC or heater fan speed.
        HvacSpeed = 22,
        /// Uncalibrated light level, 0-100%.
        LightLevel = 23,
        Var1 = 24,
        Var2 = 25,
        Var3 = 26,
        Var4 = 27,
        Var5 = 28,
        /// Window covering up.
        Up = 29,
        /// Window covering down.
        Down = 30,
        /// Window covering stop.
        Stop = 31,
        /// Send an IR command.
        IrSend = 32,
        /// Received IR command.
        IrReceive = 33,
        /// Water flow.
        Flow = 34,
        /// Water volume.
        Volume = 35,
        /// Lock status, 1 = locked.
        LockStatus = 36,
        /// Generic level (dust, air quality, dB, Hz, lux).
        Level = 37,
        /// Voltage.
        Voltage = 38,
        /// Current.
        Current = 39,
        /// RGB color as ASCII hex `RRGGBB`.
        Rgb = 40,
        /// RGBW color as ASCII hex `RRGGBBWW`.
        Rgbw = 41,
        /// Sensor hardware id.
        Id = 42,
        /// Unit prefix for display.
        UnitPrefix = 43,
        /// HVAC cool setpoint.
        HvacSetpointCool = 44,
        /// HVAC or heater heat setpoint.
        HvacSetpointHeat = 45,
        /// HVAC flow mode.
        HvacFlowMode = 46,
        /// Text to display.
        Text = 47,
        /// Custom controller or inter-node command.
        Custom = 48,
        /// GPS position as `latitude;longitude;altitude`.
        Position = 49,
        /// Record IR codes for playback.
        IrRecord = 50,
        /// Water pH.
        Ph = 51,
        /// Water redox potential in mV.
        Orp = 52,
        /// Water electric conductivity in uS/cm.
        Ec = 53,
        /// Reactive power.
        Var = 54,
        /// Apparent power.
        Va = 55,
        /// Ratio of real to apparent power, -1..=1.
        PowerFactor = 56,
    }
}

impl InformationType {
    /// Legacy name for [`InformationType::Status`].
    #[deprecated(note = "use InformationType::Status")]
    pub const LIGHT: InformationType = InformationType::Status;

    /// Legacy name for [`InformationType::Percentage`].
    #[deprecated(note = "use InformationType::Percentage")]
    pub const DIMMER: InformationType = InformationType::Percentage;

    /// Legacy name for [`InformationType::HvacFlowState`].
    #[deprecated(note = "use InformationType::HvacFlowState")]
    pub const HEATER: InformationType = InformationType::HvacFlowState;
}

wire_enum! {
    /// Subtype of a message whose command is [`CommandKind::Internal`].
    pub enum InternalMessageType ("internal_type") {
        BatteryLevel = 0,
        Time = 1,
        Version = 2,
        IdRequest = 3,
        IdResponse = 4,
        InclusionMode = 5,
        Config = 6,
        FindParent = 7,
        FindParentResponse = 8,
        LogMessage = 9,
        Children = 10,
        SketchName = 11,
        SketchVersion = 12,
        Reboot = 13,
        GatewayReady = 14,
        /// Signing preferences; first payload byte is the preference version.
        SigningPresentation = 15,
        NonceRequest = 16,
        NonceResponse = 17,
        HeartbeatRequest = 18,
        Presentation = 19,
        Discover = 20,
        DiscoverResponse = 21,
        HeartbeatResponse = 22,
        /// Node is locked, reason in a string payload.
        Locked = 23,
        /// Payload is an incremental hop counter.
        Ping = 24,
        /// Reply to a ping, payload is an incremental hop counter.
        Pong = 25,
        RegistrationRequest = 26,
        RegistrationResponse = 27,
        Debug = 28,
        SpecialFunctionsList = 29,
    }
}

wire_enum! {
    /// Subtype of a message whose command is [`CommandKind::Stream`].
    pub enum StreamType ("stream_type") {
        /// Request new firmware; payload holds current firmware details.
        FirmwareConfigRequest = 0,
        /// New firmware details to start an update.
        FirmwareConfigResponse = 1,
        /// Request a firmware block.
        FirmwareRequest = 2,
        /// A firmware block.
        FirmwareResponse = 3,
        Sound = 4,
        Image = 5,
        FunctionsList = 6,
    }
}

wire_enum! {
    /// Encoding of the payload bytes that follow the header.
    pub enum PayloadType ("payload_type") {
        /// Text, not necessarily NUL-terminated.
        String = 0,
        /// One unsigned byte.
        Byte = 1,
        /// Little-endian `i16`.
        Int16 = 2,
        /// Little-endian `u16`.
        UInt16 = 3,
        /// Little-endian `i32`.
        Int32 = 4,
        /// Little-endian `u32`.
        UInt32 = 5,
        /// Opaque binary.
        Custom = 6,
        /// Little-endian IEEE-754 `f32`.
        Float32 = 7,
        /// No payload.
        Empty = 8,
    }
}

impl PayloadType {
    /// Number of payload bytes this type occupies, or `None` for the
    /// variable-length types.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            PayloadType::Byte => Some(1),
            PayloadType::Int16 | PayloadType::UInt16 => Some(2),
            PayloadType::Int32 | PayloadType::UInt32 | PayloadType::Float32 => Some(4),
            PayloadType::Empty => Some(0),
            PayloadType::String | PayloadType::Custom => None,
        }
    }

    /// Returns `true` if `size` bytes are a valid payload of this type.
    #[inline]
    pub fn accepts_size(self, size: usize) -> bool {
        self.fixed_width().map_or(true, |width| width == size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip<T>(all: &[T], expected_len: usize)
    where
        T: Copy + PartialEq + std::fmt::Debug + TryFrom<u8, Error = Error> + Into<u8>,
    {
        assert_eq!(all.len(), expected_len);
        for (i, value) in all.iter().enumerate() {
            let code: u8 = (*value).into();
            assert_eq!(code as usize, i, "codes are contiguous from zero");
            assert_eq!(T::try_from(code).unwrap(), *value);
        }
        match T::try_from(expected_len as u8) {
            Err(Error::InvalidField { code, .. }) => assert_eq!(code as usize, expected_len),
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn codes_round_trip() {
        assert_round_trip(CommandKind::ALL, 5);
        assert_round_trip(SensorType::ALL, 40);
        assert_round_trip(InformationType::ALL, 57);
        assert_round_trip(InternalMessageType::ALL, 30);
        assert_round_trip(StreamType::ALL, 7);
        assert_round_trip(PayloadType::ALL, 9);
    }

    #[test]
    #[allow(deprecated)]
    fn legacy_names_share_codes() {
        assert_eq!(SensorType::LIGHT, SensorType::Binary);
        assert_eq!(SensorType::LIGHT.code(), 3);
        assert_eq!(InformationType::LIGHT.code(), 2);
        assert_eq!(InformationType::DIMMER.code(), 3);
        assert_eq!(InformationType::HEATER.code(), 21);
        assert_eq!(InformationType::try_from(2).unwrap(), InformationType::LIGHT);
    }

    #[test]
    fn unknown_code_names_field() {
        match SensorType::try_from(200) {
            Err(Error::InvalidField { field, code }) => {
                assert_eq!(field, "sensor_type");
                assert_eq!(code, 200);
            }
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn payload_widths() {
        assert_eq!(PayloadType::Float32.fixed_width(), Some(4));
        assert_eq!(PayloadType::Int16.fixed_width(), Some(2));
        assert_eq!(PayloadType::String.fixed_width(), None);
        assert!(PayloadType::Custom.accepts_size(17));
        assert!(!PayloadType::Byte.accepts_size(2));
        assert!(PayloadType::Empty.accepts_size(0));
    }

    #[test]
    fn display_uses_variant_name() {
        assert_eq!(CommandKind::Internal.to_string(), "Internal");
        assert_eq!(InformationType::PowerFactor.to_string(), "PowerFactor");
    }
}
