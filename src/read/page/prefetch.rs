//! Bounded-concurrency read-ahead scheduler.
//!
//! Turns a prefetch plan — a sequence of logical byte ranges, typically the upcoming page
//! offsets of the column chunk currently being scanned (see [`crate::indexes::FilteredPage`])
//! — into a [`Stream`] of their bytes. Reads are dispatched up to `max_inflight` at a time and
//! delivered in issue order, not completion order: [`FuturesOrdered`] already resolves pushed
//! futures in push order, which is exactly the ordering guarantee this scheduler owes its
//! consumer, so no separate reordering buffer is needed on top of it.
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::stream::{FuturesOrdered, Stream, StreamExt};

use crate::error::Result;

/// A single logical range read: the bytes `[offset, offset + length)` of the column chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchRange {
    pub offset: u64,
    pub length: usize,
}

impl PrefetchRange {
    pub fn new(offset: u64, length: usize) -> Self {
        Self { offset, length }
    }
}

/// A handle capable of issuing an independent range read. `Clone` is required because every
/// in-flight read needs its own handle to the underlying reader — the scheduler drives up to
/// `max_inflight` of these concurrently, so a single `&mut` borrow of one reader will not do;
/// implementations typically wrap a cloned file descriptor, an `Arc`-shared reader, or an
/// object-store client that already supports concurrent range reads.
pub trait RangeReader: Clone + Send + Sync + 'static {
    fn read_range(&self, range: PrefetchRange) -> BoxFuture<'static, Result<Vec<u8>>>;
}

/// Adapts a plain async closure into a [`RangeReader`], for callers whose positional-read
/// primitive is already a `Fn(offset, length) -> impl Future<Output = Result<Vec<u8>>>`.
#[derive(Clone)]
pub struct FnRangeReader<F> {
    read_at: F,
}

impl<F> FnRangeReader<F> {
    pub fn new(read_at: F) -> Self {
        Self { read_at }
    }
}

impl<F, Fut> RangeReader for FnRangeReader<F>
where
    F: Fn(u64, usize) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
{
    fn read_range(&self, range: PrefetchRange) -> BoxFuture<'static, Result<Vec<u8>>> {
        Box::pin((self.read_at)(range.offset, range.length))
    }
}

/// Dispatches a prefetch plan against `reader`, bounding the number of outstanding range
/// reads to `max_inflight` and yielding their bytes in issue order. `max_inflight == 1`
/// degenerates to the synchronous, one-read-at-a-time policy.
pub struct PrefetchScheduler<R: RangeReader> {
    reader: R,
    pending: VecDeque<PrefetchRange>,
    in_flight: FuturesOrdered<BoxFuture<'static, Result<Vec<u8>>>>,
    max_inflight: usize,
}

impl<R: RangeReader> PrefetchScheduler<R> {
    /// Creates a scheduler over `ranges`, none of which are dispatched yet: dispatch happens
    /// lazily as the returned stream is polled, so a scheduler that's never polled never
    /// issues any reads.
    pub fn new(reader: R, ranges: Vec<PrefetchRange>, max_inflight: usize) -> Self {
        assert!(max_inflight > 0, "max_inflight must be positive");
        Self {
            reader,
            pending: ranges.into(),
            in_flight: FuturesOrdered::new(),
            max_inflight,
        }
    }

    /// The number of ranges not yet completed (in flight or still queued).
    pub fn remaining(&self) -> usize {
        self.pending.len() + self.in_flight.len()
    }

    /// Discards every range not yet dispatched and abandons any in-flight reads, for when
    /// the consumer gives up on the current scan (e.g. a seek to an earlier row group).
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
        self.in_flight = FuturesOrdered::new();
    }

    fn fill(&mut self) {
        while self.in_flight.len() < self.max_inflight {
            let Some(range) = self.pending.pop_front() else {
                break;
            };
            let reader = self.reader.clone();
            self.in_flight
                .push_back(Box::pin(async move { reader.read_range(range).await }));
        }
    }
}

impl<R: RangeReader> Stream for PrefetchScheduler<R> {
    type Item = Result<Vec<u8>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.fill();
        if this.in_flight.is_empty() {
            return Poll::Ready(None);
        }
        Pin::new(&mut this.in_flight).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct CountingReader {
        in_flight_peak: Arc<AtomicUsize>,
        current: Arc<AtomicUsize>,
    }

    impl RangeReader for CountingReader {
        fn read_range(&self, range: PrefetchRange) -> BoxFuture<'static, Result<Vec<u8>>> {
            let in_flight_peak = self.in_flight_peak.clone();
            let current = self.current.clone();
            Box::pin(async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                in_flight_peak.fetch_max(now, Ordering::SeqCst);
                // Yield once so genuinely concurrent polls can overlap.
                tokio::task::yield_now().await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok(vec![0u8; range.length])
            })
        }
    }

    #[tokio::test]
    async fn delivers_in_issue_order() {
        let reader = CountingReader {
            in_flight_peak: Arc::new(AtomicUsize::new(0)),
            current: Arc::new(AtomicUsize::new(0)),
        };
        let ranges: Vec<_> = (0..8).map(|i| PrefetchRange::new(i * 10, i as usize + 1)).collect();
        let scheduler = PrefetchScheduler::new(reader, ranges.clone(), 3);
        let results: Vec<_> = scheduler.collect().await;
        assert_eq!(results.len(), ranges.len());
        for (range, result) in ranges.iter().zip(results) {
            assert_eq!(result.unwrap().len(), range.length);
        }
    }

    #[tokio::test]
    async fn bounds_concurrency_to_max_inflight() {
        let peak = Arc::new(AtomicUsize::new(0));
        let reader = CountingReader {
            in_flight_peak: peak.clone(),
            current: Arc::new(AtomicUsize::new(0)),
        };
        let ranges: Vec<_> = (0..20).map(|i| PrefetchRange::new(i * 10, 4)).collect();
        let scheduler = PrefetchScheduler::new(reader, ranges, 4);
        let _: Vec<_> = scheduler.collect().await;
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn cancel_pending_drops_unissued_ranges() {
        let reader = CountingReader {
            in_flight_peak: Arc::new(AtomicUsize::new(0)),
            current: Arc::new(AtomicUsize::new(0)),
        };
        let ranges: Vec<_> = (0..10).map(|i| PrefetchRange::new(i * 10, 4)).collect();
        let mut scheduler = PrefetchScheduler::new(reader, ranges, 2);
        assert_eq!(scheduler.remaining(), 10);
        scheduler.cancel_pending();
        assert_eq!(scheduler.remaining(), 0);
        let results: Vec<_> = scheduler.collect().await;
        assert!(results.is_empty());
    }
}
