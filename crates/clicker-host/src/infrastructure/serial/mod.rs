//! Serial port transport worker.
//!
//! The `serialport` crate is blocking, so all port I/O runs on a dedicated
//! thread rather than on the Tokio runtime. The worker speaks the
//! request/notification protocol defined by the application layer:
//!
//! ```text
//! ClickerSession ──SerialRequest──► worker thread ──SerialNotification──► pump
//! ```
//!
//! The worker never panics on port trouble: open failures, write failures,
//! and read faults all become [`SerialNotification::Error`] messages, and a
//! hardware disconnect additionally closes the handle and emits `Closed`.
//!
//! # Read timeout
//!
//! The port is configured with a short read timeout. `read` blocks for at
//! most that long before returning a timeout error; on each timeout the
//! worker drains pending requests, so writes and close requests are serviced
//! within one timeout interval even when the line is silent.

pub mod mock;

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::session::{SerialLink, SerialNotification, SerialRequest};

/// Serial port parameters, loaded from the config file.
///
/// The defaults reproduce the receiver's factory settings; the port path in
/// particular varies per machine and OS (`COM3`, `/dev/ttyUSB0`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialSettings {
    /// OS path of the receiver's serial port.
    #[serde(default = "default_port_path")]
    pub port_path: String,
    /// Line speed in baud.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Blocking read timeout in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_port_path() -> String {
    "COM3".to_string()
}
fn default_baud_rate() -> u32 {
    9600
}
fn default_read_timeout_ms() -> u64 {
    20
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port_path: default_port_path(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// Handle to the serial worker thread.
///
/// Cheap to clone is not needed — the session owns the only copy. Dropping
/// the link disconnects the request channel, which makes the worker close
/// the port and exit.
pub struct SerialPortLink {
    request_tx: std_mpsc::Sender<SerialRequest>,
    alive: Arc<AtomicBool>,
}

impl SerialPortLink {
    /// Spawns the worker thread and returns the link plus the notification
    /// stream the caller must pump into the session.
    pub fn spawn(settings: SerialSettings) -> (Self, mpsc::UnboundedReceiver<SerialNotification>) {
        let (request_tx, request_rx) = std_mpsc::channel();
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let alive = Arc::new(AtomicBool::new(true));

        let worker_alive = Arc::clone(&alive);
        std::thread::Builder::new()
            .name("serial-worker".to_string())
            .spawn(move || {
                run_worker(settings, request_rx, notify_tx);
                worker_alive.store(false, Ordering::Relaxed);
                debug!("serial worker exited");
            })
            .expect("failed to spawn serial worker thread");

        (Self { request_tx, alive }, notify_rx)
    }
}

impl SerialLink for SerialPortLink {
    fn is_available(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    fn request(&self, request: SerialRequest) -> bool {
        self.request_tx.send(request).is_ok()
    }
}

/// How long the worker waits for a request while the port is closed.
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Worker main loop. Returns when the request channel disconnects.
fn run_worker(
    settings: SerialSettings,
    request_rx: std_mpsc::Receiver<SerialRequest>,
    notify_tx: mpsc::UnboundedSender<SerialNotification>,
) {
    let mut port: Option<Box<dyn serialport::SerialPort>> = None;
    let mut read_buf = [0u8; 256];

    loop {
        if port.is_some() {
            // Drain requests without blocking, then spend the rest of the
            // iteration inside the timed read.
            loop {
                match request_rx.try_recv() {
                    Ok(request) => handle_request(&settings, request, &mut port, &notify_tx),
                    Err(std_mpsc::TryRecvError::Empty) => break,
                    Err(std_mpsc::TryRecvError::Disconnected) => return,
                }
            }

            let Some(handle) = port.as_mut() else {
                continue; // a Close request just dropped the port
            };
            match handle.read(&mut read_buf) {
                Ok(0) => {}
                Ok(n) => {
                    let _ = notify_tx.send(SerialNotification::Data(read_buf[..n].to_vec()));
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::TimedOut
                        || e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => {
                    // Hardware disconnect or driver fault: surface it and
                    // drop the dead handle so we stop hammering it.
                    warn!(error = %e, "serial read failed, closing port");
                    let _ = notify_tx.send(SerialNotification::Error(e.to_string()));
                    port = None;
                    let _ = notify_tx.send(SerialNotification::Closed);
                }
            }
        } else {
            match request_rx.recv_timeout(IDLE_POLL) {
                Ok(request) => handle_request(&settings, request, &mut port, &notify_tx),
                Err(std_mpsc::RecvTimeoutError::Timeout) => {}
                Err(std_mpsc::RecvTimeoutError::Disconnected) => return,
            }
        }
    }
}

fn handle_request(
    settings: &SerialSettings,
    request: SerialRequest,
    port: &mut Option<Box<dyn serialport::SerialPort>>,
    notify_tx: &mpsc::UnboundedSender<SerialNotification>,
) {
    match request {
        SerialRequest::Open => {
            if port.is_some() {
                debug!("open request while port already open, ignoring");
                return;
            }
            let result = serialport::new(&settings.port_path, settings.baud_rate)
                .timeout(Duration::from_millis(settings.read_timeout_ms))
                .open();
            match result {
                Ok(handle) => {
                    info!(path = %settings.port_path, baud = settings.baud_rate, "serial port opened");
                    *port = Some(handle);
                    let _ = notify_tx.send(SerialNotification::Opened);
                }
                Err(e) => {
                    warn!(path = %settings.port_path, error = %e, "serial port open failed");
                    let _ = notify_tx.send(SerialNotification::Error(e.to_string()));
                }
            }
        }
        SerialRequest::Write(bytes) => {
            let Some(handle) = port.as_mut() else {
                debug!("write request while port closed, dropping {} bytes", bytes.len());
                return;
            };
            if let Err(e) = std::io::Write::write_all(handle, &bytes) {
                warn!(error = %e, "serial write failed");
                let _ = notify_tx.send(SerialNotification::Error(e.to_string()));
            }
        }
        SerialRequest::Close => {
            if port.take().is_some() {
                info!("serial port closed");
                let _ = notify_tx.send(SerialNotification::Closed);
            }
        }
    }
}
