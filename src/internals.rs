/// Number of header bytes on the wire, one per header field.
pub const HEADER_BYTES: usize = 7;

/// Largest payload a single frame can carry.
pub const MAX_PAYLOAD: usize = 137;

/// Total frame capacity of the carrying transport.
pub const FRAME_CAPACITY: usize = HEADER_BYTES + MAX_PAYLOAD;

// Header byte offsets.
pub(crate) const SENSOR_ID_OFFSET: usize = 0;
pub(crate) const COMMAND_OFFSET: usize = 1;
pub(crate) const SENSOR_TYPE_OFFSET: usize = 2;
pub(crate) const INFORMATION_TYPE_OFFSET: usize = 3;
pub(crate) const INTERNAL_TYPE_OFFSET: usize = 4;
pub(crate) const PAYLOAD_TYPE_OFFSET: usize = 5;
pub(crate) const PAYLOAD_SIZE_OFFSET: usize = 6;
