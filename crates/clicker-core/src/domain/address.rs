//! The 6-byte hardware address identifying a physical clicker remote.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error type for parsing a [`DeviceAddress`] from its string form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressParseError {
    /// The string does not contain exactly six colon-separated tokens.
    #[error("expected 6 colon-separated hex pairs, got {0} token(s)")]
    WrongTokenCount(usize),
    /// One of the tokens is not a two-digit hex pair.
    #[error("invalid hex pair {0:?}")]
    InvalidHexPair(String),
}

/// The stable identity of one physical remote.
///
/// Remotes have no serial number visible to the host; the 6 bytes at the tail
/// of every report frame are the only way to correlate a button press with a
/// device across sessions. Rendered and parsed as lower-case, zero-padded,
/// colon-separated hex pairs (`01:0a:ff:00:2b:9c`), which is also the form
/// used for serialization so front ends and config files see a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceAddress([u8; 6]);

impl DeviceAddress {
    /// Constructs an address from its raw bytes.
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Reads an address from a 6-byte wire slice.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is not exactly 6 bytes long; callers slice the
    /// address field out of an already-validated frame.
    pub fn from_wire(bytes: &[u8]) -> Self {
        Self(bytes.try_into().expect("address field is 6 bytes"))
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for DeviceAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split(':').collect();
        if tokens.len() != 6 {
            return Err(AddressParseError::WrongTokenCount(tokens.len()));
        }
        let mut bytes = [0u8; 6];
        for (slot, token) in bytes.iter_mut().zip(&tokens) {
            if token.len() != 2 {
                return Err(AddressParseError::InvalidHexPair((*token).to_string()));
            }
            *slot = u8::from_str_radix(token, 16)
                .map_err(|_| AddressParseError::InvalidHexPair((*token).to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for DeviceAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeviceAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_renders_lowercase_zero_padded_colon_hex() {
        let address = DeviceAddress::new([0x01, 0x0A, 0xFF, 0x00, 0x2B, 0x9C]);
        assert_eq!(address.to_string(), "01:0a:ff:00:2b:9c");
    }

    #[test]
    fn test_from_str_round_trips_display() {
        let address = DeviceAddress::new([0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x42]);
        let parsed: DeviceAddress = address.to_string().parse().unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn test_from_str_accepts_uppercase_hex() {
        let parsed: DeviceAddress = "01:0A:FF:00:2B:9C".parse().unwrap();
        assert_eq!(parsed, DeviceAddress::new([0x01, 0x0A, 0xFF, 0x00, 0x2B, 0x9C]));
    }

    #[test]
    fn test_from_str_rejects_wrong_token_count() {
        let result: Result<DeviceAddress, _> = "01:0a:ff".parse();
        assert_eq!(result, Err(AddressParseError::WrongTokenCount(3)));
    }

    #[test]
    fn test_from_str_rejects_non_hex_token() {
        let result: Result<DeviceAddress, _> = "01:0a:zz:00:2b:9c".parse();
        assert_eq!(
            result,
            Err(AddressParseError::InvalidHexPair("zz".to_string()))
        );
    }

    #[test]
    fn test_from_str_rejects_unpadded_token() {
        let result: Result<DeviceAddress, _> = "1:0a:ff:00:2b:9c".parse();
        assert_eq!(result, Err(AddressParseError::InvalidHexPair("1".to_string())));
    }

    #[test]
    fn test_from_wire_reads_frame_slice() {
        let frame_tail = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66];
        let address = DeviceAddress::from_wire(&frame_tail);
        assert_eq!(address.as_bytes(), &frame_tail);
    }

    #[test]
    fn test_serde_uses_string_form() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            id: DeviceAddress,
        }

        let wrapper = Wrapper {
            id: DeviceAddress::new([0x01, 0x0A, 0xFF, 0x00, 0x2B, 0x9C]),
        };
        let text = toml::to_string(&wrapper).unwrap();
        assert!(text.contains("\"01:0a:ff:00:2b:9c\""), "got: {text}");

        let restored: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(restored.id, wrapper.id);
    }
}
