//! Mock serial link for unit testing.
//!
//! Allows tests to drive a [`crate::application::session::ClickerSession`]
//! without hardware: requests are recorded for inspection and availability
//! can be toggled to simulate a missing receiver.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use crate::application::session::{SerialLink, SerialRequest};

/// A mock implementation of [`SerialLink`] recording every request.
///
/// Clones share state, so tests keep one clone and hand the other to the
/// session under test.
#[derive(Clone)]
pub struct MockSerialLink {
    requests: Arc<Mutex<Vec<SerialRequest>>>,
    available: Arc<AtomicBool>,
}

impl MockSerialLink {
    /// Creates an available mock with no recorded requests.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Snapshot of every request issued so far, in order.
    pub fn requests(&self) -> Vec<SerialRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }

    /// Simulates the transport worker dying (or never existing).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }
}

impl Default for MockSerialLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialLink for MockSerialLink {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    fn request(&self, request: SerialRequest) -> bool {
        if !self.is_available() {
            return false;
        }
        self.requests.lock().expect("lock poisoned").push(request);
        true
    }
}
