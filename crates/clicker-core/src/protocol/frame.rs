//! Frame layout constants and the validated [`RawFrame`] type.
//!
//! Wire format:
//! ```text
//! [STX:1][LEN:1][fields:LEN-2][CHECKSUM:1][ETX:1]
//! ```
//! `LEN` counts every byte after `STX` up to and including `CHECKSUM`, so the
//! total size of a frame on the wire is `LEN + 2`. The checksum is the 8-bit
//! truncated sum of the bytes at offsets `1 ..= LEN-1` — note that this range
//! includes the `LEN` byte itself.

// ── Wire constants ────────────────────────────────────────────────────────────

/// Start-of-frame sentinel byte.
pub const STX: u8 = 0x02;

/// End-of-frame sentinel byte.
pub const ETX: u8 = 0x03;

/// Smallest frame the wire format can express: STX + LEN + CHECKSUM + ETX.
pub const MIN_FRAME_LEN: usize = 4;

/// Smallest legal value of the LEN byte (one byte for LEN, one for CHECKSUM).
pub const MIN_LEN_FIELD: u8 = 2;

/// Total wire size of the fixed-shape clicker report frame (`LEN == 13`).
pub const CLICKER_FRAME_LEN: usize = 15;

// ── Clicker report field offsets ──────────────────────────────────────────────

/// Offset of the class number within a clicker report frame.
pub const OFFSET_CLASS_NUMBER: usize = 2;
/// Offset of the student/device number.
pub const OFFSET_STUDENT_NUMBER: usize = 3;
/// Offset of the message type byte.
pub const OFFSET_MESSAGE_TYPE: usize = 4;
/// Offset of the pressed value (button-press reports only).
pub const OFFSET_VALUE: usize = 5;
/// Offset of the battery voltage (button-press reports only).
pub const OFFSET_VOLTAGE: usize = 6;
/// Offset of the first byte of the 6-byte device hardware address.
pub const OFFSET_ADDRESS: usize = 7;

/// Message type byte of a button-press report.
pub const MSG_BUTTON_PRESS: u8 = 0x11;
/// Message type byte of a registration acknowledgment.
pub const MSG_REGISTER_ACK: u8 = 0x10;

/// Computes the 8-bit truncated checksum over a frame's protected range.
///
/// Callers pass `&frame[1..len]`, i.e. the bytes at offsets `1 ..= LEN-1`.
/// The sum wraps at 255, matching the receiver's `& 0xff` arithmetic.
pub fn wire_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// One complete, checksum-validated frame extracted from the serial stream.
///
/// A `RawFrame` is only ever constructed by the [`crate::FrameDecoder`] after
/// full validation (sentinels present, length plausible, checksum matches),
/// so holders may index its fixed offsets without re-checking the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    /// Wraps already-validated frame bytes.
    ///
    /// Crate-private: only the decoder may mint frames.
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        debug_assert!(bytes.len() >= MIN_FRAME_LEN);
        debug_assert_eq!(bytes[0], STX);
        debug_assert_eq!(*bytes.last().unwrap(), ETX);
        Self { bytes }
    }

    /// The complete frame including STX/LEN/CHECKSUM/ETX.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total wire size of the frame (`LEN + 2`).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True only for the degenerate case; validated frames are never empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the frame, returning the owned bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
