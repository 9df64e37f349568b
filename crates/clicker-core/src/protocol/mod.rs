//! Receiver wire protocol: framing, event translation, and outbound commands.

pub mod commands;
pub mod decoder;
pub mod events;
pub mod frame;

pub use commands::{encode_begin_registration, encode_finish_registration};
pub use decoder::FrameDecoder;
pub use events::{translate_frame, translate_transport_signal, ClickerEvent, TransportSignal};
pub use frame::RawFrame;
