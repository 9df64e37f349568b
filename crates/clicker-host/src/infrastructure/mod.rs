//! Infrastructure layer for the clicker host.
//!
//! Contains OS-facing adapters: the serial port worker and file-system
//! configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `clicker_core`, but MUST NOT be imported by the application layer
//! (test code excepted).

pub mod serial;
pub mod storage;
