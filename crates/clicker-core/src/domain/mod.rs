//! Domain types for Clicker Desk.
//!
//! Pure data with no wire-format or infrastructure knowledge. The host's
//! application layer and any UI front end consume these types; nothing in
//! here reads bytes or touches the OS.

pub mod address;

pub use address::DeviceAddress;
