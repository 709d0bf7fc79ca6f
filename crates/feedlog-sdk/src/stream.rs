use std::time::Duration;

use feedlog_types::Message;
use tracing::trace;

use crate::error::FeedResult;
use crate::subfeed::{FetchOptions, Subfeed};

/// Long-poll wait used to refill the buffer.
pub const STREAM_WAIT_MSEC: u64 = 5000;

/// Pause between empty polls on a live feed.
pub const EMPTY_POLL_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// Buffer exhausted; the next call polls.
    Buffering,
    /// Messages are waiting in the buffer.
    HasBuffered,
    /// Snapshot fully consumed. Terminal.
    Done,
}

/// Pull-based consumer over a [`Subfeed`].
///
/// Refills with non-advancing fetches and moves the subfeed's position by
/// one for every message it yields, so the position always counts what the
/// caller has actually received. On a live feed `next` waits until a
/// message arrives and never reports the end; on a snapshot it returns
/// `Ok(None)` once the frozen list is exhausted.
///
/// Dropping the stream stops consumption; nothing is sent to the daemon.
#[derive(Debug)]
pub struct MessageStream<'a> {
    subfeed: &'a mut Subfeed,
    signed: bool,
    buffer: Vec<Message>,
    offset: usize,
    state: StreamState,
}

impl<'a> MessageStream<'a> {
    pub(crate) fn new(subfeed: &'a mut Subfeed, signed: bool) -> Self {
        Self {
            subfeed,
            signed,
            buffer: Vec::new(),
            offset: 0,
            state: StreamState::Buffering,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Position of the underlying subfeed.
    pub fn position(&self) -> u64 {
        self.subfeed.position()
    }

    /// The next message, or `Ok(None)` at the end of a snapshot.
    ///
    /// An error leaves the stream in [`StreamState::Buffering`]; calling
    /// again retries the poll.
    pub async fn next(&mut self) -> FeedResult<Option<Message>> {
        loop {
            match self.state {
                StreamState::Done => return Ok(None),
                StreamState::HasBuffered => {
                    if let Some(slot) = self.buffer.get_mut(self.offset) {
                        let message = std::mem::take(slot);
                        self.offset += 1;
                        self.subfeed.position += 1;
                        if self.offset == self.buffer.len() {
                            self.state = StreamState::Buffering;
                        }
                        return Ok(Some(message));
                    }
                    self.state = StreamState::Buffering;
                }
                StreamState::Buffering => {
                    let mut options = FetchOptions::wait(STREAM_WAIT_MSEC).peek();
                    options.signed = self.signed;
                    let batch = self.subfeed.fetch_next(options).await?;
                    if batch.is_empty() {
                        if self.subfeed.is_snapshot() {
                            self.state = StreamState::Done;
                            return Ok(None);
                        }
                        trace!(position = self.subfeed.position(), "empty poll");
                        tokio::time::sleep(EMPTY_POLL_BACKOFF).await;
                        continue;
                    }
                    self.buffer = batch;
                    self.offset = 0;
                    self.state = StreamState::HasBuffered;
                }
            }
        }
    }

    /// Collect up to `limit` messages. Stops early at the end of a snapshot.
    pub async fn take(&mut self, limit: usize) -> FeedResult<Vec<Message>> {
        let mut out = Vec::with_capacity(limit);
        while out.len() < limit {
            match self.next().await? {
                Some(message) => out.push(message),
                None => break,
            }
        }
        Ok(out)
    }
}
