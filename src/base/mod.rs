mod error;
mod message;
mod traits;

pub use self::error::{Error, Result};
pub use self::message::Message;
pub use self::traits::{ProtocolDecoder, ProtocolEncoder};
