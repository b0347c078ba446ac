use crate::record::LogEvent;
use async_trait::async_trait;
use std::error::Error;

/// Destination for [`LogEvent`]s drained from the layer's queue.
///
/// [`CsvSink`](crate::csv_sink::CsvSink) renders events as CSV lines;
/// custom implementations can route them anywhere. Calls come from the
/// layer's background task, one batch at a time.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Accept one event.
    ///
    /// An error marks the event as not written: the layer retries the batch
    /// from this event onwards with backoff, and events already accepted
    /// are not sent again.
    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Called after every batch has been fully accepted. No-op by default.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
