//! Time-windowed double-buffered picture cache
//!
//! The flipper keeps two buffers: the picture currently being served and the
//! one on deck. Serving never touches the network — when the current
//! picture's window expires, the on-deck buffer is promoted (a "flip") and a
//! background task refills the freed slot from the underlying source.
//!
//! If a refill fails, the previous on-deck bytes are kept: the next flip
//! promotes slightly stale content and schedules another attempt, which is
//! graceful degradation rather than an outage.

use crate::error::Result;
use crate::PictureSource;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

/// The two buffers and the deadline, only ever touched under the mutex.
struct FlipState {
    current: Bytes,
    on_deck: Bytes,
    flip_at: Instant,
}

struct FlipShared {
    source: Arc<dyn PictureSource>,
    picture_life: Duration,
    state: Mutex<FlipState>,
    /// Single-flight guard: at most one refill in flight at a time
    refill_guard: Arc<tokio::sync::Mutex<()>>,
    /// Counts completed refill attempts (success or failure), so callers can
    /// await a refill instead of polling
    refill_seq: watch::Sender<u64>,
}

/// Double-buffered flip cache over any [`PictureSource`].
///
/// `next()` is infallible and performs no I/O; construction is the only
/// fallible step. Cloning is cheap and clones share the same buffers.
#[derive(Clone)]
pub struct Flipper {
    shared: Arc<FlipShared>,
}

impl Flipper {
    /// Prime both buffers with two synchronous fetches and arm the deadline.
    ///
    /// Construction is all-or-nothing: an error from either fetch is
    /// propagated untouched and no flipper is built.
    pub async fn new(source: Arc<dyn PictureSource>, picture_life: Duration) -> Result<Self> {
        let current = source.next_picture().await?;
        let on_deck = source.next_picture().await?;

        let (refill_seq, _) = watch::channel(0);

        Ok(Self {
            shared: Arc::new(FlipShared {
                source,
                picture_life,
                state: Mutex::new(FlipState {
                    current,
                    on_deck,
                    flip_at: Instant::now() + picture_life,
                }),
                refill_guard: Arc::new(tokio::sync::Mutex::new(())),
                refill_seq,
            }),
        })
    }

    /// Return the picture currently being served.
    ///
    /// Flips first if the window has expired. Never blocks on the network:
    /// the refill that follows a flip runs on a detached task. Must be called
    /// from within a Tokio runtime (the refill task is spawned on it).
    pub fn next(&self) -> Bytes {
        let deadline_passed = {
            let state = self.shared.state.lock().unwrap();
            Instant::now() >= state.flip_at
        };

        if deadline_passed {
            self.shared.flip();
        }

        self.shared.state.lock().unwrap().current.clone()
    }

    /// Watch completed refill attempts.
    ///
    /// The value increments once per finished attempt, whether it succeeded
    /// or not. Tests use this to wait for a refill deterministically.
    pub fn refill_watcher(&self) -> watch::Receiver<u64> {
        self.shared.refill_seq.subscribe()
    }
}

impl FlipShared {
    /// Promote the on-deck buffer and schedule a refill.
    ///
    /// The deadline is re-checked under the lock: of several callers racing
    /// past the expiry, only the first one flips, the others find the
    /// deadline already advanced.
    fn flip(self: &Arc<Self>) {
        {
            let mut state = self.state.lock().unwrap();
            if Instant::now() < state.flip_at {
                return;
            }

            debug!("flipping to on-deck picture");
            state.current = state.on_deck.clone();
            state.flip_at = Instant::now() + self.picture_life;
        }

        self.spawn_refill();
    }

    /// Refill the on-deck slot on a detached task.
    ///
    /// If a refill is already in flight the new task bails out immediately:
    /// the flip that triggered it has already done its swap and the running
    /// refill will complete on its own.
    fn spawn_refill(self: &Arc<Self>) {
        let shared = Arc::clone(self);

        tokio::spawn(async move {
            let Ok(_guard) = shared.refill_guard.clone().try_lock_owned() else {
                debug!("refill already in flight, skipping");
                return;
            };

            match shared.source.next_picture().await {
                Ok(picture) => {
                    shared.state.lock().unwrap().on_deck = picture;
                }
                Err(err) => {
                    warn!(%err, "refill failed, keeping previous on-deck picture");
                }
            }

            shared.refill_seq.send_modify(|n| *n += 1);
        });
    }
}

#[async_trait]
impl PictureSource for Flipper {
    async fn next_picture(&self) -> Result<Bytes> {
        Ok(self.next())
    }
}
