//! Translation of validated frames and transport signals into domain events.
//!
//! The receiver currently speaks exactly one payload shape: a 15-byte report
//! frame (`LEN == 13`) used both for button presses and registration
//! acknowledgments, distinguished by the message type byte. Frames of any
//! other length are assumed to belong to a protocol extension we do not speak
//! and are ignored without error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::address::DeviceAddress;
use crate::protocol::frame::{
    RawFrame, CLICKER_FRAME_LEN, MSG_BUTTON_PRESS, MSG_REGISTER_ACK, OFFSET_ADDRESS,
    OFFSET_CLASS_NUMBER, OFFSET_MESSAGE_TYPE, OFFSET_STUDENT_NUMBER, OFFSET_VALUE, OFFSET_VOLTAGE,
};

/// Every event the protocol engine surfaces to its subscriber.
///
/// Events are immutable values handed to the subscriber by value; `raw`
/// carries the exact frame bytes the event was decoded from so diagnostic
/// tooling can log or replay them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClickerEvent {
    /// The serial connection finished opening.
    Opened,
    /// The serial connection closed.
    Closed,
    /// The underlying connection reported a fault. Non-fatal: the session
    /// stays usable and the subscriber decides whether to close.
    TransportError { message: String },
    /// A remote reported a button press.
    Clicked {
        address: DeviceAddress,
        class_number: u8,
        student_number: u8,
        /// The button value the student pressed.
        value: u8,
        /// Battery voltage as reported by the remote.
        voltage: u8,
        raw: Vec<u8>,
    },
    /// A remote acknowledged registration.
    Registered {
        address: DeviceAddress,
        class_number: u8,
        student_number: u8,
        raw: Vec<u8>,
    },
}

/// Transport-level notifications that do not originate from frame bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSignal {
    Opened,
    Closed,
    Error { message: String },
}

/// Lifts a transport signal into the event stream unchanged.
pub fn translate_transport_signal(signal: TransportSignal) -> ClickerEvent {
    match signal {
        TransportSignal::Opened => ClickerEvent::Opened,
        TransportSignal::Closed => ClickerEvent::Closed,
        TransportSignal::Error { message } => ClickerEvent::TransportError { message },
    }
}

/// Decodes a validated frame into a domain event.
///
/// Returns `None` for frame lengths and message types the protocol does not
/// currently define; such frames are valid on the wire but carry nothing we
/// can interpret.
pub fn translate_frame(frame: &RawFrame) -> Option<ClickerEvent> {
    if frame.len() != CLICKER_FRAME_LEN {
        debug!(len = frame.len(), "ignoring frame of unknown shape");
        return None;
    }

    let bytes = frame.bytes();
    let address = DeviceAddress::from_wire(&bytes[OFFSET_ADDRESS..OFFSET_ADDRESS + 6]);
    let class_number = bytes[OFFSET_CLASS_NUMBER];
    let student_number = bytes[OFFSET_STUDENT_NUMBER];

    match bytes[OFFSET_MESSAGE_TYPE] {
        MSG_BUTTON_PRESS => Some(ClickerEvent::Clicked {
            address,
            class_number,
            student_number,
            value: bytes[OFFSET_VALUE],
            voltage: bytes[OFFSET_VOLTAGE],
            raw: bytes.to_vec(),
        }),
        MSG_REGISTER_ACK => Some(ClickerEvent::Registered {
            address,
            class_number,
            student_number,
            raw: bytes.to_vec(),
        }),
        other => {
            debug!(message_type = other, "ignoring frame with unknown message type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decoder::FrameDecoder;
    use crate::protocol::frame::{wire_checksum, ETX, STX};

    fn make_report(class: u8, student: u8, msg_type: u8, value: u8, voltage: u8) -> RawFrame {
        let fields = [
            class, student, msg_type, value, voltage, 0x01, 0x0A, 0xFF, 0x00, 0x2B, 0x9C,
        ];
        let mut bytes = vec![STX, 0x0D];
        bytes.extend_from_slice(&fields);
        bytes.push(wire_checksum(&bytes[1..13]));
        bytes.push(ETX);

        // Route through the decoder so we exercise the real construction path.
        let mut decoder = FrameDecoder::new();
        let mut frames = decoder.feed(&bytes);
        assert_eq!(frames.len(), 1, "test frame must be wire-valid");
        frames.remove(0)
    }

    #[test]
    fn test_button_press_frame_becomes_clicked_event() {
        // The documented end-to-end shape: class 1, device 2, value 5,
        // voltage 100.
        let frame = make_report(1, 2, 0x11, 5, 100);

        let event = translate_frame(&frame).expect("click report must translate");

        assert_eq!(
            event,
            ClickerEvent::Clicked {
                address: "01:0a:ff:00:2b:9c".parse().unwrap(),
                class_number: 1,
                student_number: 2,
                value: 5,
                voltage: 100,
                raw: frame.bytes().to_vec(),
            }
        );
    }

    #[test]
    fn test_register_ack_frame_becomes_registered_event() {
        let frame = make_report(3, 17, 0x10, 0, 0);

        let event = translate_frame(&frame).expect("register ack must translate");

        match event {
            ClickerEvent::Registered {
                address,
                class_number,
                student_number,
                raw,
            } => {
                assert_eq!(address.to_string(), "01:0a:ff:00:2b:9c");
                assert_eq!(class_number, 3);
                assert_eq!(student_number, 17);
                assert_eq!(raw, frame.bytes());
            }
            other => panic!("expected Registered, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_message_type_yields_no_event() {
        let frame = make_report(1, 2, 0x7F, 0, 0);
        assert_eq!(translate_frame(&frame), None);
    }

    #[test]
    fn test_frame_of_unknown_length_yields_no_event() {
        // A wire-valid frame with LEN=4 (one field byte) is not a clicker
        // report and must be ignored.
        let mut bytes = vec![STX, 0x04, 0x11, 0x22];
        bytes.push(wire_checksum(&bytes[1..4]));
        bytes.push(ETX);
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&bytes);
        assert_eq!(frames.len(), 1);

        assert_eq!(translate_frame(&frames[0]), None);
    }

    #[test]
    fn test_transport_signals_pass_through_unchanged() {
        assert_eq!(
            translate_transport_signal(TransportSignal::Opened),
            ClickerEvent::Opened
        );
        assert_eq!(
            translate_transport_signal(TransportSignal::Closed),
            ClickerEvent::Closed
        );
        assert_eq!(
            translate_transport_signal(TransportSignal::Error {
                message: "device unplugged".to_string()
            }),
            ClickerEvent::TransportError {
                message: "device unplugged".to_string()
            }
        );
    }
}
