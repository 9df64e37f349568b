//! Stateful frame reassembly for the receiver's serial stream.
//!
//! The serial driver hands us arbitrary-sized chunks: a frame may arrive in
//! one piece, split across several reads, or glued to the tail of the
//! previous frame. On top of that the line can carry garbage — dropped bytes,
//! stray sentinels from partial RF captures, truncated frames after a
//! replug. [`FrameDecoder`] absorbs all of it.
//!
//! # Resynchronization strategy
//!
//! Every failure mode discards the minimum number of bytes needed to make
//! progress, so a single corrupt byte can never stall the stream and two
//! frames are never silently merged:
//!
//! - no `STX` anywhere → the whole buffer is garbage, clear it;
//! - `LEN` below the legal minimum → drop 2 bytes (the spurious sentinel and
//!   its bogus length) and rescan;
//! - missing `ETX` or checksum mismatch → drop 1 byte (the `STX` was
//!   spurious) and rescan, preserving any valid frame that starts inside the
//!   discarded frame's body.
//!
//! The decoder never fails: corrupt input is dropped, incomplete input is
//! retained until the next [`feed`](FrameDecoder::feed).

use tracing::trace;

use crate::protocol::frame::{wire_checksum, RawFrame, ETX, MIN_FRAME_LEN, MIN_LEN_FIELD, STX};

/// Reassembles an arbitrary stream of byte chunks into validated frames.
///
/// The decoder owns an accumulation buffer that is exclusively its own. After
/// every [`feed`](Self::feed) the buffer holds either nothing or the prefix
/// of a single incomplete frame — never a complete valid frame, and never
/// bytes in front of a discoverable `STX`.
///
/// One decoder instance serves one serial connection; all calls must come
/// from a single owner.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    /// Creates a decoder with an empty accumulation buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and extracts every complete, checksum-valid frame.
    ///
    /// Frames are returned in the order their final byte arrived. Bytes that
    /// cannot yet form a complete frame stay buffered for the next call;
    /// bytes that can never form a valid frame are dropped.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RawFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(total) = self.scan() {
            let frame: Vec<u8> = self.buffer.drain(..total).collect();
            trace!(len = frame.len(), "frame extracted");
            frames.push(RawFrame::new(frame));
        }
        frames
    }

    /// Discards any partially accumulated frame.
    ///
    /// Called when a session opens or closes so stale bytes from a previous
    /// connection can never prefix fresh data.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes currently waiting for more data.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Advances the buffer to the next valid frame and returns its total wire
    /// size, or `None` when no complete frame can be found yet.
    ///
    /// On return of `Some(total)` the frame occupies `buffer[..total]`. On
    /// `None` the buffer is either empty or a prefix of an incomplete frame.
    fn scan(&mut self) -> Option<usize> {
        loop {
            let Some(start) = self.buffer.iter().position(|&b| b == STX) else {
                // No sync point at all: nothing in here is worth keeping.
                if !self.buffer.is_empty() {
                    trace!(dropped = self.buffer.len(), "no STX in buffer, clearing");
                    self.buffer.clear();
                }
                return None;
            };
            if start > 0 {
                trace!(dropped = start, "skipping bytes before STX");
                self.buffer.drain(..start);
            }

            if self.buffer.len() < MIN_FRAME_LEN {
                return None; // wait for more data
            }

            let len = self.buffer[1] as usize;
            if self.buffer[1] < MIN_LEN_FIELD {
                // Impossible LEN: this STX and its length byte are noise, but
                // the bytes after them may still hold a real frame.
                trace!(len, "implausible LEN field, dropping 2 bytes");
                self.buffer.drain(..2);
                continue;
            }

            if self.buffer.len() < len + 2 {
                return None; // frame incomplete, wait for more data
            }

            if self.buffer[len + 1] != ETX {
                // The STX was spurious; resume the search one byte later.
                trace!("missing ETX, dropping 1 byte");
                self.buffer.drain(..1);
                continue;
            }

            let expected = wire_checksum(&self.buffer[1..len]);
            if self.buffer[len] != expected {
                trace!(
                    stored = self.buffer[len],
                    expected,
                    "checksum mismatch, dropping 1 byte"
                );
                self.buffer.drain(..1);
                continue;
            }

            return Some(len + 2);
        }
    }
}
