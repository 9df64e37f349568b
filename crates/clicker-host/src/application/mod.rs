//! Application layer for the clicker host.
//!
//! Use cases in this layer orchestrate `clicker-core` types to fulfil a user
//! goal and depend on abstractions (the [`session::SerialLink`] trait) rather
//! than concrete serial hardware, so the infrastructure can be swapped
//! without changing this code. No OS calls, no serial I/O, no file system
//! access happen here.
//!
//! # Sub-modules
//!
//! - **`session`** – The session controller: owns the frame decoder across
//!   open/close cycles, publishes decoded events to the single subscriber,
//!   and sends registration commands. This is the entry point every outer
//!   layer (UI bridge, binary) talks to.
//!
//! - **`roster`** – In-memory registry of the remotes that have registered
//!   with the receiver, keyed by hardware address.

pub mod roster;
pub mod session;
