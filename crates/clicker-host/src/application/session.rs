//! ClickerSession: the session controller owning one serial connection.
//!
//! The session sits between the transport worker and whoever consumes
//! events (the UI bridge, or the log pump in the headless binary):
//!
//! ```text
//! serial worker ──SerialNotification──► ClickerSession ──ClickerEvent──► subscriber
//!                                           │
//!               ◄──────SerialRequest────────┘  (open / write / close)
//! ```
//!
//! All decoding happens synchronously inside [`ClickerSession::handle_notification`]
//! on whatever task delivers the notification; the session itself never
//! blocks. Transport open/close are asynchronous requests whose completion
//! arrives later as `Opened`/`Closed`/`TransportError` events — callers must
//! not assume the port is ready just because [`ClickerSession::open`]
//! returned `true`.
//!
//! One session owns one decoder and therefore serves one physical receiver;
//! driving several receivers means one independent session per port.

use clicker_core::{
    encode_begin_registration, encode_finish_registration, translate_frame,
    translate_transport_signal, ClickerEvent, FrameDecoder, TransportSignal,
};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

// ── Transport abstraction ─────────────────────────────────────────────────────

/// Requests the session issues to the transport worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialRequest {
    /// Open the configured serial port. Ignored by the worker while open.
    Open,
    /// Write raw bytes to the port.
    Write(Vec<u8>),
    /// Close the port if it is open.
    Close,
}

/// Notifications the transport worker delivers back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialNotification {
    /// The port finished opening.
    Opened,
    /// The port closed (requested or hardware disconnect).
    Closed,
    /// The port reported a fault; the message is driver-supplied text.
    Error(String),
    /// A chunk of bytes arrived. Chunk boundaries are arbitrary.
    Data(Vec<u8>),
}

/// The session's view of the transport.
///
/// Implemented by [`crate::infrastructure::serial::SerialPortLink`] for real
/// hardware and by the mock in `infrastructure::serial::mock` for tests.
/// Requests are fire-and-forget; results come back as [`SerialNotification`]s.
pub trait SerialLink: Send {
    /// Whether the backing transport worker is still alive.
    fn is_available(&self) -> bool;

    /// Hands a request to the worker. Returns `false` when the worker is gone.
    fn request(&self, request: SerialRequest) -> bool;
}

// ── Session controller ────────────────────────────────────────────────────────

/// Owns the frame decoder lifecycle across open/close cycles and the
/// at-most-one subscriber event channel.
pub struct ClickerSession {
    link: Box<dyn SerialLink>,
    decoder: FrameDecoder,
    /// Set once the first `open()` succeeds; mirrors the fact that the
    /// notification pump is wired exactly once, so repeated opens never
    /// double-deliver.
    listening: bool,
    subscriber: Option<mpsc::UnboundedSender<ClickerEvent>>,
}

impl ClickerSession {
    /// Creates a closed session over the given transport link.
    pub fn new(link: Box<dyn SerialLink>) -> Self {
        Self {
            link,
            decoder: FrameDecoder::new(),
            listening: false,
            subscriber: None,
        }
    }

    /// Requests the transport to open.
    ///
    /// Discards any bytes buffered from a previous connection so a stale
    /// partial frame can never prefix fresh data. Returns `false` when no
    /// transport is available; `true` means the request was issued, not that
    /// the port is open — wait for the `Opened` event.
    pub fn open(&mut self) -> bool {
        if !self.link.is_available() {
            warn!("open requested but no transport is available");
            return false;
        }
        self.listening = true;
        self.decoder.reset();
        self.link.request(SerialRequest::Open)
    }

    /// Requests the transport to close and discards any partial frame.
    ///
    /// A no-op at the transport level when already closed. Returns `false`
    /// when no transport is available.
    pub fn close(&mut self) -> bool {
        if !self.link.is_available() {
            return false;
        }
        self.decoder.reset();
        self.link.request(SerialRequest::Close)
    }

    /// Subscribes to the event stream.
    ///
    /// At most one subscription is active at a time: a new call silently
    /// evicts the previous subscriber by closing its channel. Events that
    /// arrive while nobody is subscribed are dropped.
    pub fn subscribe_events(&mut self) -> mpsc::UnboundedReceiver<ClickerEvent> {
        if self.subscriber.is_some() {
            debug!("replacing existing event subscriber");
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriber = Some(tx);
        rx
    }

    /// Drops the current subscription, if any. Idempotent.
    pub fn unsubscribe_events(&mut self) {
        self.subscriber = None;
    }

    /// Sends the begin-registration command.
    ///
    /// Remotes that press their register button while the receiver is in
    /// registration mode are assigned `class_number`/`device_number`; each
    /// assignment comes back as a `Registered` event. Returns `false` when no
    /// transport is available — command success itself is asynchronous.
    pub fn start_register(
        &mut self,
        class_number: u8,
        device_number: u8,
        registration_key: u8,
    ) -> bool {
        if !self.link.is_available() {
            return false;
        }
        let frame = encode_begin_registration(class_number, device_number, registration_key);
        debug!(class_number, device_number, "sending begin-registration command");
        self.link.request(SerialRequest::Write(frame.to_vec()))
    }

    /// Sends the finish-registration command, taking the receiver out of
    /// registration mode.
    pub fn finish_register(&mut self) -> bool {
        if !self.link.is_available() {
            return false;
        }
        debug!("sending finish-registration command");
        self.link
            .request(SerialRequest::Write(encode_finish_registration().to_vec()))
    }

    /// Feeds one transport notification through the protocol engine.
    ///
    /// Data chunks run through the frame decoder and event translator; all
    /// other notifications pass through unchanged. Resulting events are
    /// published in arrival order. Corrupt or unrecognized bytes are absorbed
    /// silently — frames are either valid or invisible.
    pub fn handle_notification(&mut self, notification: SerialNotification) {
        if !self.listening {
            trace!("notification before first open, ignoring");
            return;
        }
        match notification {
            SerialNotification::Data(bytes) => {
                trace!(len = bytes.len(), "serial data chunk");
                for frame in self.decoder.feed(&bytes) {
                    if let Some(event) = translate_frame(&frame) {
                        self.publish(event);
                    }
                }
            }
            SerialNotification::Opened => {
                self.publish(translate_transport_signal(TransportSignal::Opened));
            }
            SerialNotification::Closed => {
                self.publish(translate_transport_signal(TransportSignal::Closed));
            }
            SerialNotification::Error(message) => {
                warn!(%message, "transport fault");
                self.publish(translate_transport_signal(TransportSignal::Error { message }));
            }
        }
    }

    fn publish(&mut self, event: ClickerEvent) {
        if let Some(tx) = &self.subscriber {
            if tx.send(event).is_err() {
                // Receiver was dropped without unsubscribing.
                debug!("event subscriber gone, clearing subscription");
                self.subscriber = None;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::serial::mock::MockSerialLink;
    use clicker_core::protocol::frame::{wire_checksum, ETX, STX};
    use tokio::sync::mpsc::error::TryRecvError;

    fn make_click_frame(class: u8, student: u8, value: u8) -> Vec<u8> {
        let fields = [class, student, 0x11, value, 100, 1, 2, 3, 4, 5, 6];
        let mut frame = vec![STX, 0x0D];
        frame.extend_from_slice(&fields);
        frame.push(wire_checksum(&frame[1..13]));
        frame.push(ETX);
        frame
    }

    fn make_session() -> (ClickerSession, MockSerialLink) {
        let link = MockSerialLink::new();
        let session = ClickerSession::new(Box::new(link.clone()));
        (session, link)
    }

    #[test]
    fn test_open_issues_open_request_and_returns_true() {
        let (mut session, link) = make_session();

        assert!(session.open());
        assert_eq!(link.requests(), vec![SerialRequest::Open]);
    }

    #[test]
    fn test_open_returns_false_without_transport() {
        let (mut session, link) = make_session();
        link.set_available(false);

        assert!(!session.open());
        assert!(link.requests().is_empty());
    }

    #[test]
    fn test_data_chunk_produces_clicked_event() {
        let (mut session, _link) = make_session();
        let mut rx = session.subscribe_events();
        session.open();

        session.handle_notification(SerialNotification::Data(make_click_frame(1, 2, 5)));

        match rx.try_recv().unwrap() {
            ClickerEvent::Clicked {
                class_number,
                student_number,
                value,
                ..
            } => {
                assert_eq!((class_number, student_number, value), (1, 2, 5));
            }
            other => panic!("expected Clicked, got {other:?}"),
        }
    }

    #[test]
    fn test_events_arrive_in_notification_order() {
        let (mut session, _link) = make_session();
        let mut rx = session.subscribe_events();
        session.open();

        session.handle_notification(SerialNotification::Opened);
        session.handle_notification(SerialNotification::Data(make_click_frame(1, 2, 5)));
        session.handle_notification(SerialNotification::Data(make_click_frame(1, 3, 7)));
        session.handle_notification(SerialNotification::Closed);

        assert_eq!(rx.try_recv().unwrap(), ClickerEvent::Opened);
        assert!(matches!(
            rx.try_recv().unwrap(),
            ClickerEvent::Clicked { student_number: 2, .. }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ClickerEvent::Clicked { student_number: 3, .. }
        ));
        assert_eq!(rx.try_recv().unwrap(), ClickerEvent::Closed);
    }

    #[test]
    fn test_error_notification_becomes_transport_error_event() {
        let (mut session, _link) = make_session();
        let mut rx = session.subscribe_events();
        session.open();

        session.handle_notification(SerialNotification::Error("read failed".to_string()));

        assert_eq!(
            rx.try_recv().unwrap(),
            ClickerEvent::TransportError {
                message: "read failed".to_string()
            }
        );
    }

    #[test]
    fn test_close_then_open_discards_partial_frame() {
        let (mut session, _link) = make_session();
        let mut rx = session.subscribe_events();
        session.open();

        // Half a frame, then a close/open cycle, then a fresh frame: only the
        // fresh frame may surface.
        let half = make_click_frame(1, 2, 5)[..7].to_vec();
        session.handle_notification(SerialNotification::Data(half));
        session.close();
        session.open();
        session.handle_notification(SerialNotification::Data(make_click_frame(4, 9, 1)));

        match rx.try_recv().unwrap() {
            ClickerEvent::Clicked {
                class_number,
                student_number,
                ..
            } => assert_eq!((class_number, student_number), (4, 9)),
            other => panic!("expected Clicked, got {other:?}"),
        }
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_new_subscription_evicts_previous_subscriber() {
        let (mut session, _link) = make_session();
        let mut first = session.subscribe_events();

        let mut second = session.subscribe_events();
        session.open();
        session.handle_notification(SerialNotification::Opened);

        assert_eq!(
            first.try_recv(),
            Err(TryRecvError::Disconnected),
            "evicted subscriber's channel must be closed"
        );
        assert_eq!(second.try_recv().unwrap(), ClickerEvent::Opened);
    }

    #[test]
    fn test_unsubscribe_is_idempotent_and_drops_events() {
        let (mut session, _link) = make_session();
        let mut rx = session.subscribe_events();
        session.open();

        session.unsubscribe_events();
        session.unsubscribe_events();
        session.handle_notification(SerialNotification::Opened);

        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_start_register_writes_command_bytes() {
        let (mut session, link) = make_session();
        session.open();

        assert!(session.start_register(3, 7, 42));

        let requests = link.requests();
        assert_eq!(
            requests[1],
            SerialRequest::Write(vec![0x02, 0x07, 0x03, 0x07, 0x10, 0x01, 0x2A, 0x1E, 0x03, 0x0D])
        );
    }

    #[test]
    fn test_finish_register_writes_constant_command() {
        let (mut session, link) = make_session();

        assert!(session.finish_register());

        assert_eq!(
            link.requests(),
            vec![SerialRequest::Write(vec![
                0x02, 0x07, 0x00, 0x00, 0x10, 0x10, 0x00, 0x19, 0x03, 0x0D
            ])]
        );
    }

    #[test]
    fn test_register_commands_fail_without_transport() {
        let (mut session, link) = make_session();
        link.set_available(false);

        assert!(!session.start_register(1, 1, 1));
        assert!(!session.finish_register());
    }

    #[test]
    fn test_notifications_before_first_open_are_ignored() {
        let (mut session, _link) = make_session();
        let mut rx = session.subscribe_events();

        session.handle_notification(SerialNotification::Opened);

        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_publishing_to_dropped_receiver_clears_subscription() {
        let (mut session, _link) = make_session();
        let rx = session.subscribe_events();
        session.open();
        drop(rx);

        // Must not panic, and a later subscriber sees later events only.
        session.handle_notification(SerialNotification::Opened);
        let mut rx2 = session.subscribe_events();
        session.handle_notification(SerialNotification::Closed);

        assert_eq!(rx2.try_recv().unwrap(), ClickerEvent::Closed);
    }
}
