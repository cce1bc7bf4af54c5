use crate::base::error::Result;
use crate::MessageHelper;
use std::io;

/// Defines the behavior for decoding byte streams into messages.
pub trait ProtocolDecoder {
    /// Attempts to decode a message from the provided buffer.
    ///
    /// Returns a `Result` containing a tuple:
    /// * The number of bytes consumed from the buffer.
    /// * An `Option<MessageHelper>` which is `Some` if a complete frame was decoded.
    ///
    /// # Arguments
    ///
    /// * `buf` - The byte slice containing the data to decode.
    fn decode(&mut self, buf: &[u8]) -> Result<(usize, Option<MessageHelper>)>;

    /// Drops any partially decoded frame.
    fn reset_decoder(&mut self);
}

/// Defines the behavior for encoding messages into byte streams.
pub trait ProtocolEncoder {
    /// Encodes a message into the provided byte buffer.
    ///
    /// Returns the number of bytes written to the buffer upon successful encoding.
    ///
    /// # Arguments
    ///
    /// * `msg` - The message to encode.
    /// * `bytes` - The mutable byte slice to write the encoded frame into.
    fn encode(&mut self, msg: &MessageHelper, bytes: &mut [u8]) -> Result<usize>;

    /// Returns the exact number of bytes needed to encode the given message.
    fn estimate_encoded_size(&mut self, msg: &MessageHelper) -> Result<usize>;

    /// Encodes a message and writes it to a `Write` target.
    ///
    /// Returns the number of bytes written to the destination.
    fn write_to(&mut self, msg: &MessageHelper, dest: &mut impl io::Write) -> Result<usize>;

    /// Resets the internal state of the encoder.
    fn reset_encoder(&mut self);
}
