use crate::base::{Message, Result};
use crate::payload::PayloadValue;
use log::warn;
use std::fmt::{self, Write};

/// Renders a header and its payload as a single human-readable line.
///
/// The header part is the `Display` form of [`Message`]; a `payload=` field
/// follows unless the payload type is `Empty`.
pub fn render_message(header: &Message, payload: &[u8]) -> Result<String> {
    let value = PayloadValue::decode(header.payload_type, payload)?;

    let mut out = header.to_string();
    if value != PayloadValue::Empty {
        let _ = write!(out, " payload={}", value);
    }
    Ok(out)
}

impl fmt::Display for PayloadValue<'_> {
    /// Text is cut at the first NUL, binary is shown as hex, numbers in decimal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PayloadValue::String(bytes) => f.write_str(&display_text(bytes)),
            PayloadValue::Custom(bytes) => f.write_str(&hex_dump(bytes)),
            PayloadValue::Byte(v) => write!(f, "{}", v),
            PayloadValue::Int16(v) => write!(f, "{}", v),
            PayloadValue::UInt16(v) => write!(f, "{}", v),
            PayloadValue::Int32(v) => write!(f, "{}", v),
            PayloadValue::UInt32(v) => write!(f, "{}", v),
            PayloadValue::Float32(v) => write!(f, "{}", v),
            PayloadValue::Empty => Ok(()),
        }
    }
}

/// Text up to the first NUL, with invalid UTF-8 replaced.
pub(crate) fn display_text(bytes: &[u8]) -> String {
    let end = match bytes.iter().position(|b| *b == 0) {
        Some(nul) => {
            warn!(
                "String payload has NUL at offset {} of {}, truncating",
                nul,
                bytes.len()
            );
            nul
        }
        None => bytes.len(),
    };
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Uppercase hex, two digits per byte, no separators.
pub(crate) fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02X}", b);
    }
    out
}
