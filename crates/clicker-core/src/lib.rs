//! # clicker-core
//!
//! Shared library for Clicker Desk containing the receiver wire protocol and
//! the domain types it produces.
//!
//! This crate is consumed by the host application. It has zero dependencies
//! on OS APIs, serial port drivers, or async runtimes.
//!
//! # Architecture overview
//!
//! Clicker Desk turns cheap IR/RF "clicker" remotes into a classroom polling
//! device. A USB receiver dongle shows up as a serial port and emits a
//! proprietary binary stream; this crate is the part that understands it:
//!
//! - **`protocol`** – How bytes travel over the serial line. A stateful
//!   [`protocol::FrameDecoder`] reassembles arbitrary byte chunks into
//!   checksum-validated frames, the event translator lifts frames into typed
//!   [`protocol::ClickerEvent`]s, and the command encoder builds the two
//!   outbound registration frames.
//!
//! - **`domain`** – Pure types with no wire knowledge. The most important is
//!   [`domain::DeviceAddress`]: the 6-byte hardware identity of a physical
//!   remote, rendered as `01:0a:ff:00:2b:9c`.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `clicker_core::ClickerEvent` instead of the full module path.
pub use domain::address::DeviceAddress;
pub use protocol::commands::{encode_begin_registration, encode_finish_registration};
pub use protocol::decoder::FrameDecoder;
pub use protocol::events::{translate_frame, translate_transport_signal, ClickerEvent, TransportSignal};
pub use protocol::frame::RawFrame;
