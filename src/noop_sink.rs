use crate::record::LogEvent;
use crate::sink::LogSink;
use async_trait::async_trait;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};

/// Accepts every event and formats nothing, keeping only a count.
///
/// Separates the cost of capturing and queueing events from the cost of
/// CSV formatting and file I/O.
#[derive(Default)]
pub struct NoopSink {
    discarded: AtomicU64,
}

impl NoopSink {
    /// Number of events accepted so far.
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.discarded.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_discarded_events() {
        let sink = NoopSink::default();
        sink.send(&LogEvent::default()).await.unwrap();
        sink.send(&LogEvent::default().with_message("again")).await.unwrap();
        sink.flush().await.unwrap();
        assert_eq!(sink.discarded(), 2);
    }
}
