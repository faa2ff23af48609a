//! Rotating picture picker
//!
//! Walks a listing snapshot in shuffled order. The listing is taken once at
//! construction and reused for the lifetime of the picker; only the ordering
//! changes, on every wraparound, according to the [`ShufflePolicy`].
//!
//! A failed fetch triggers exactly one credential refresh followed by one
//! retry of the same picture. The cursor only advances on success, so after a
//! failure the next call targets the same picture again.

use crate::error::{Result, SourceError};
use crate::{PictureRef, PictureSource, PictureStore};
use async_trait::async_trait;
use bytes::Bytes;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// How the collection is reordered on construction and on every wraparound.
///
/// Built from the signed `shuffle_seed` configuration value:
/// `0` derives a seed from the clock, a negative value disables shuffling,
/// and a positive value is used verbatim on every reshuffle — so every
/// rotation after the first replays the same permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShufflePolicy {
    /// Seed derived from the current time; every reshuffle differs
    TimeSeeded,
    /// Listing order preserved, including across wraparounds
    Disabled,
    /// The literal seed is reused for every reshuffle (deterministic)
    Seeded(u64),
}

impl ShufflePolicy {
    /// Map the signed configuration value onto a policy.
    pub fn from_seed(seed: i64) -> Self {
        if seed == 0 {
            Self::TimeSeeded
        } else if seed < 0 {
            Self::Disabled
        } else {
            Self::Seeded(seed as u64)
        }
    }
}

/// Rotation state: the (re)ordered listing snapshot and the cursor into it.
///
/// Invariants: `pictures` is never empty (construction fails otherwise) and
/// `cursor` is always a valid index when read.
struct RotationState {
    pictures: Vec<PictureRef>,
    cursor: usize,
}

/// Picks pictures from a [`PictureStore`] in rotating, shuffled order.
///
/// `next()` is safe for concurrent invocation: the rotation state lives under
/// a mutex scoped tightly around state access, and the network fetch happens
/// outside of it. The store handle sits in its own slot and is replaced
/// wholesale when a credential refresh produces a new one, so later calls
/// always see the latest handle.
pub struct RotatingPicker<S: PictureStore> {
    store: RwLock<Arc<S>>,
    policy: ShufflePolicy,
    state: Mutex<RotationState>,
}

impl<S: PictureStore> RotatingPicker<S> {
    /// List the store and build a picker over the snapshot.
    ///
    /// # Errors
    ///
    /// * [`SourceError::EmptyCollection`] - the listing contained no picture
    /// * [`SourceError::Store`] - the listing itself failed
    pub async fn new(store: S, policy: ShufflePolicy) -> Result<Self> {
        let mut pictures = store.list().await?;

        if pictures.is_empty() {
            return Err(SourceError::EmptyCollection);
        }

        info!(count = pictures.len(), ?policy, "picture listing loaded");
        shuffle_pictures(&mut pictures, policy);

        Ok(Self {
            store: RwLock::new(Arc::new(store)),
            policy,
            state: Mutex::new(RotationState {
                pictures,
                cursor: 0,
            }),
        })
    }

    /// Number of pictures in the rotation.
    pub fn picture_count(&self) -> usize {
        self.state.lock().unwrap().pictures.len()
    }

    /// Fetch the current picture and advance the rotation.
    ///
    /// On reaching the end of the collection the listing is reshuffled per
    /// policy and the cursor resets to 0 — after the bytes of the last
    /// picture have been returned, so wraparound is only observed on the
    /// following call.
    pub async fn next(&self) -> Result<Bytes> {
        let picture = {
            let state = self.state.lock().unwrap();
            state.pictures[state.cursor].clone()
        };

        let bytes = self.fetch_with_refresh(&picture).await?;

        let mut state = self.state.lock().unwrap();
        state.cursor += 1;
        if state.cursor >= state.pictures.len() {
            debug!("rotation complete, reshuffling");
            shuffle_pictures(&mut state.pictures, self.policy);
            state.cursor = 0;
        }

        Ok(bytes)
    }

    /// Fetch one picture; on failure, refresh the credential once and retry
    /// the same picture once.
    ///
    /// The refreshed handle is published before the retry so that concurrent
    /// and subsequent calls pick it up as well.
    async fn fetch_with_refresh(&self, picture: &PictureRef) -> Result<Bytes> {
        let store = self.store.read().unwrap().clone();

        match store.fetch(picture).await {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                warn!(picture = %picture.path, %err, "fetch failed, refreshing credentials");

                let fresh = Arc::new(store.refresh_credentials().await?);
                *self.store.write().unwrap() = fresh.clone();
                info!("store credentials refreshed");

                fresh
                    .fetch(picture)
                    .await
                    .map_err(|retry_err| SourceError::fetch(retry_err.to_string()))
            }
        }
    }
}

#[async_trait]
impl<S: PictureStore> PictureSource for RotatingPicker<S> {
    async fn next_picture(&self) -> Result<Bytes> {
        self.next().await
    }
}

/// Reorder the collection in place according to the policy.
///
/// The RNG is owned by the call and explicitly seeded, so determinism is
/// local to the picker rather than depending on process-global state.
fn shuffle_pictures(pictures: &mut [PictureRef], policy: ShufflePolicy) {
    let seed = match policy {
        ShufflePolicy::Disabled => return,
        ShufflePolicy::Seeded(seed) => seed,
        ShufflePolicy::TimeSeeded => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default(),
    };

    let mut rng = StdRng::seed_from_u64(seed);
    pictures.shuffle(&mut rng);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(n: usize) -> Vec<PictureRef> {
        (0..n)
            .map(|i| PictureRef::new(format!("id:{i}"), format!("/pics/{i}.jpg"), format!("{i}.jpg")))
            .collect()
    }

    #[test]
    fn test_policy_from_seed() {
        assert_eq!(ShufflePolicy::from_seed(0), ShufflePolicy::TimeSeeded);
        assert_eq!(ShufflePolicy::from_seed(-1), ShufflePolicy::Disabled);
        assert_eq!(ShufflePolicy::from_seed(42), ShufflePolicy::Seeded(42));
    }

    #[test]
    fn test_disabled_shuffle_preserves_order() {
        let original = refs(8);
        let mut pictures = original.clone();
        shuffle_pictures(&mut pictures, ShufflePolicy::Disabled);
        assert_eq!(pictures, original);
    }

    #[test]
    fn test_seeded_shuffle_is_deterministic() {
        let mut a = refs(16);
        let mut b = refs(16);
        shuffle_pictures(&mut a, ShufflePolicy::Seeded(7));
        shuffle_pictures(&mut b, ShufflePolicy::Seeded(7));
        assert_eq!(a, b);

        // Reapplying the same seed replays the same permutation again
        let snapshot = a.clone();
        shuffle_pictures(&mut a, ShufflePolicy::Seeded(7));
        let mut c = snapshot.clone();
        shuffle_pictures(&mut c, ShufflePolicy::Seeded(7));
        assert_eq!(a, c);
    }

    #[test]
    fn test_seeded_shuffle_keeps_all_entries() {
        let original = refs(16);
        let mut pictures = original.clone();
        shuffle_pictures(&mut pictures, ShufflePolicy::Seeded(3));
        let mut sorted = pictures.clone();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));
        let mut expected = original.clone();
        expected.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(sorted, expected);
    }
}
