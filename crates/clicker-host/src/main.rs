//! Clicker Desk host entry point.
//!
//! Wires the serial worker, the session controller, and the roster together
//! and starts the Tokio async runtime. A UI front end would subscribe to the
//! same session this binary pumps; headless, it logs every event instead.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()                -- TOML config (serial port, log level)
//!  └─ SerialPortLink::spawn()     -- blocking serial I/O thread
//!  └─ ClickerSession              -- decoder + event channel
//!       ├─ notification pump      -- Tokio task: serial → session
//!       └─ event pump             -- Tokio task: session → roster + log
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use clicker_core::ClickerEvent;
use clicker_host::application::roster::ClickerRoster;
use clicker_host::application::session::ClickerSession;
use clicker_host::infrastructure::serial::SerialPortLink;
use clicker_host::infrastructure::storage::config::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    // Initialise structured logging. `RUST_LOG` overrides the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.host.log_level.clone())),
        )
        .init();

    info!(
        port = %config.serial.port_path,
        baud = config.serial.baud_rate,
        "Clicker Desk host starting"
    );

    let (link, mut notifications) = SerialPortLink::spawn(config.serial.clone());
    let mut session = ClickerSession::new(Box::new(link));
    let mut events = session.subscribe_events();

    if !session.open() {
        warn!("serial worker unavailable at startup");
    }

    let session = Arc::new(Mutex::new(session));

    // ── Notification pump: serial worker → session ────────────────────────────
    let pump_session = Arc::clone(&session);
    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            pump_session.lock().await.handle_notification(notification);
        }
    });

    // ── Event pump: session → roster + log ────────────────────────────────────
    tokio::spawn(async move {
        let mut roster = ClickerRoster::new();
        while let Some(event) = events.recv().await {
            roster.apply_event(&event);
            match &event {
                ClickerEvent::Opened => info!("receiver connected"),
                ClickerEvent::Closed => info!("receiver disconnected"),
                ClickerEvent::TransportError { message } => {
                    warn!(%message, "transport error");
                }
                ClickerEvent::Clicked {
                    address,
                    student_number,
                    value,
                    voltage,
                    ..
                } => {
                    info!(%address, student_number, value, voltage, "button press");
                }
                ClickerEvent::Registered {
                    address,
                    class_number,
                    student_number,
                    ..
                } => {
                    info!(
                        %address,
                        class_number,
                        student_number,
                        total = roster.len(),
                        "clicker registered"
                    );
                }
            }
        }
    });

    info!("Clicker Desk host ready.  Press Ctrl-C to exit.");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    session.lock().await.close();
    // Give the worker a moment to flush the Closed notification.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    info!("Clicker Desk host stopped");
    Ok(())
}
