//! Outbound registration command frames.
//!
//! The host sends exactly two commands to the receiver, both fixed 10-byte
//! templates with caller values substituted at fixed offsets. Their trailing
//! bytes (`1e 03 0d` / `19 03 0d`) are part of the template as the receiver
//! firmware expects it and are NOT derived from the inbound checksum
//! algorithm; the dongle rejects anything else, so they are reproduced
//! literally.

/// Wire size of both registration commands.
pub const COMMAND_LEN: usize = 10;

/// Builds the begin-registration command.
///
/// Puts the receiver into registration mode so that remotes pressing their
/// register button are assigned `class_number`/`device_number` under the
/// given `registration_key`. The receiver confirms each remote with a
/// registration acknowledgment frame.
///
/// Layout: `02 07 <class_number> <device_number> 10 01 <registration_key> 1e 03 0d`.
pub fn encode_begin_registration(
    class_number: u8,
    device_number: u8,
    registration_key: u8,
) -> [u8; COMMAND_LEN] {
    [
        0x02,
        0x07,
        class_number,
        device_number,
        0x10,
        0x01,
        registration_key,
        0x1E,
        0x03,
        0x0D,
    ]
}

/// Builds the finish-registration command, taking the receiver back out of
/// registration mode. All bytes are protocol-fixed constants.
pub fn encode_finish_registration() -> [u8; COMMAND_LEN] {
    [0x02, 0x07, 0x00, 0x00, 0x10, 0x10, 0x00, 0x19, 0x03, 0x0D]
}
