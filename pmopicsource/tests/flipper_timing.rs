use async_trait::async_trait;
use bytes::Bytes;
use pmopicsource::{Flipper, PictureSource, Result, SourceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source that numbers its pictures and can be scripted to fail on exactly
/// one call (1-based), which is how a refill outage is simulated.
struct CountingSource {
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl CountingSource {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    fn failing_on_call(n: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on_call: Some(n),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PictureSource for CountingSource {
    async fn next_picture(&self) -> Result<Bytes> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(SourceError::store("simulated refill outage"));
        }
        Ok(Bytes::from(format!("picture-{call}")))
    }
}

const WINDOW: Duration = Duration::from_secs(9);

/// Advance the paused clock just past the flip deadline.
async fn expire_window() {
    tokio::time::advance(WINDOW + Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_construction_primes_both_buffers() {
    let source = Arc::new(CountingSource::new());
    let flipper = Flipper::new(source.clone(), WINDOW).await.unwrap();

    assert_eq!(source.calls(), 2);
    assert_eq!(flipper.next(), Bytes::from("picture-1"));
}

#[tokio::test(start_paused = true)]
async fn test_construction_fails_if_priming_fetch_fails() {
    let source = Arc::new(CountingSource::failing_on_call(2));
    let err = Flipper::new(source, WINDOW)
        .await
        .err()
        .expect("construction must be all-or-nothing");
    assert!(matches!(err, SourceError::Store(_)));
}

#[tokio::test(start_paused = true)]
async fn test_no_flip_within_the_window() {
    let source = Arc::new(CountingSource::new());
    let flipper = Flipper::new(source.clone(), WINDOW).await.unwrap();

    for _ in 0..10 {
        assert_eq!(flipper.next(), Bytes::from("picture-1"));
        tokio::time::advance(Duration::from_millis(500)).await;
    }

    // Still only the two construction-time fetches
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_flip_promotes_on_deck_and_refills_once() {
    let source = Arc::new(CountingSource::new());
    let flipper = Flipper::new(source.clone(), WINDOW).await.unwrap();
    let mut refills = flipper.refill_watcher();

    expire_window().await;

    // The expired deadline promotes the on-deck picture...
    assert_eq!(flipper.next(), Bytes::from("picture-2"));
    // ...and a second call within the fresh window must not flip again
    assert_eq!(flipper.next(), Bytes::from("picture-2"));

    refills.changed().await.unwrap();
    assert_eq!(*refills.borrow(), 1);
    assert_eq!(source.calls(), 3);

    // The refilled picture surfaces on the following flip
    expire_window().await;
    assert_eq!(flipper.next(), Bytes::from("picture-3"));
}

#[tokio::test(start_paused = true)]
async fn test_source_calls_are_two_plus_one_per_flip() {
    let source = Arc::new(CountingSource::new());
    let flipper = Flipper::new(source.clone(), WINDOW).await.unwrap();
    let mut refills = flipper.refill_watcher();

    for flip in 1..=5 {
        expire_window().await;
        flipper.next();
        refills.changed().await.unwrap();
        assert_eq!(source.calls(), 2 + flip);
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_refill_serves_stale_and_retries() {
    // Call 3 is the first refill; it fails
    let source = Arc::new(CountingSource::failing_on_call(3));
    let flipper = Flipper::new(source.clone(), WINDOW).await.unwrap();
    let mut refills = flipper.refill_watcher();

    expire_window().await;
    assert_eq!(flipper.next(), Bytes::from("picture-2"));

    // The failed attempt still completes (and is counted)
    refills.changed().await.unwrap();
    assert_eq!(source.calls(), 3);

    // Next flip promotes the unchanged on-deck bytes and schedules a retry
    expire_window().await;
    assert_eq!(flipper.next(), Bytes::from("picture-2"));
    refills.changed().await.unwrap();
    assert_eq!(source.calls(), 4);

    // The retry succeeded, so the following flip moves on
    expire_window().await;
    assert_eq!(flipper.next(), Bytes::from("picture-4"));
}

#[tokio::test(start_paused = true)]
async fn test_flipper_exposes_the_source_interface_it_wraps() {
    let source = Arc::new(CountingSource::new());
    let flipper = Flipper::new(source, WINDOW).await.unwrap();

    // The assembled cache can stand in wherever a picture source is expected
    let as_source: &dyn PictureSource = &flipper;
    assert_eq!(
        as_source.next_picture().await.unwrap(),
        Bytes::from("picture-1")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_callers_collapse_to_one_flip() {
    let window = Duration::from_millis(200);
    let source = Arc::new(CountingSource::new());
    let flipper = Flipper::new(source.clone(), window).await.unwrap();
    let mut refills = flipper.refill_watcher();

    tokio::time::sleep(window + Duration::from_millis(50)).await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let flipper = flipper.clone();
        handles.push(tokio::spawn(async move { flipper.next() }));
    }

    for handle in handles {
        // Every racing caller observes the once-flipped buffer
        assert_eq!(handle.await.unwrap(), Bytes::from("picture-2"));
    }

    refills.changed().await.unwrap();
    assert_eq!(*refills.borrow(), 1, "exactly one refill for the race");
    assert_eq!(source.calls(), 3);
}
