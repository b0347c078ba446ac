use crate::init::LayerConfig;
use crate::record::{LocationInfo, LogEvent};
use crate::sink::LogSink;
use chrono::Local;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Duration, Instant, MissedTickBehavior};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

const MAX_SEND_ATTEMPTS: u32 = 5;

/// `tracing_subscriber` layer that turns events into [`LogEvent`]s and
/// forwards them to an asynchronous [`LogSink`] via a bounded channel and
/// background task.
///
/// Only events at or above the configured `max_level` are captured. Sink
/// I/O is fully decoupled from application threads; when the channel is
/// full new events are dropped rather than blocking the caller.
pub struct CsvLogLayer {
    sender: mpsc::Sender<LogEvent>,
    max_level: Level,
    app_domain: Option<String>,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full or closed.
    pub dropped_events: Arc<AtomicU64>,
}

impl CsvLogLayer {
    /// Create a new layer and spawn a background task that pulls
    /// [`LogEvent`]s from a bounded channel and sends them to the provided
    /// [`LogSink`] in batches.
    ///
    /// The returned handle completes once the layer is dropped and the last
    /// batch is flushed.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime; the `init` functions
    /// check for one and return [`InitError::NoRuntime`] instead.
    ///
    /// [`InitError::NoRuntime`]: crate::error::InitError::NoRuntime
    pub fn new(sink: Arc<dyn LogSink>, config: &LayerConfig) -> (Self, JoinHandle<()>) {
        let config = config.clone().clamped();
        let batch_size = config.batch_size;
        let flush_interval = config.flush_interval;

        let (tx, mut rx) = mpsc::channel::<LogEvent>(config.channel_buffer);

        let total_events = Arc::new(AtomicU64::new(0));
        let enqueued_events = Arc::new(AtomicU64::new(0));
        let dropped_events = Arc::new(AtomicU64::new(0));

        let handle = tokio::spawn(async move {
            let mut batch = Vec::with_capacity(batch_size);
            // Shared across loop passes: a partial batch waits at most one
            // flush interval regardless of incoming traffic.
            let mut ticker = interval_at(Instant::now() + flush_interval, flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(event) => {
                            batch.push(event);
                            if batch.len() >= batch_size {
                                if let Err(e) = send_batch(&*sink, &mut batch).await {
                                    eprintln!("error sending csv log batch: {}", e);
                                }
                            }
                        }
                        None => {
                            if let Err(e) = send_batch(&*sink, &mut batch).await {
                                eprintln!("error flushing final csv log batch: {}", e);
                            }
                            break;
                        }
                    },
                    _ = ticker.tick() => {
                        if !batch.is_empty() {
                            if let Err(e) = send_batch(&*sink, &mut batch).await {
                                eprintln!("error flushing csv log batch: {}", e);
                            }
                        }
                    }
                }
            }
        });

        (Self {
            sender: tx,
            max_level: config.max_level,
            app_domain: config.app_domain,
            total_events,
            enqueued_events,
            dropped_events,
        }, handle)
    }
}

/// Send every event in `batch`, retrying the remainder with exponential
/// backoff. The batch is cleared on success and after the last attempt.
async fn send_batch(
    sink: &dyn LogSink,
    batch: &mut Vec<LogEvent>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut backoff = Duration::from_millis(100);
    let max_backoff = Duration::from_secs(10);
    let mut sent = 0;
    let mut attempt = 1;

    loop {
        let mut last_err = None;
        for event in &batch[sent..] {
            if let Err(e) = sink.send(event).await {
                last_err = Some(e);
                break;
            }
            sent += 1;
        }

        match last_err {
            None => {
                batch.clear();
                return sink.flush().await;
            }
            Some(e) if attempt >= MAX_SEND_ATTEMPTS => {
                let lost = batch.len() - sent;
                batch.clear();
                return Err(format!("giving up on {} csv log events: {}", lost, e).into());
            }
            Some(_) => {
                eprintln!("csv log sink send failed, retrying in {:?}", backoff);
                sleep(backoff).await;
                backoff = std::cmp::min(backoff * 2, max_backoff);
                attempt += 1;
            }
        }
    }
}

impl<S> Layer<S> for CsvLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let location = LocationInfo {
            class_name: meta.module_path().map(str::to_string),
            method_name: None,
            file_name: meta.file().map(str::to_string),
            line_number: meta.line(),
        };

        let log_event = LogEvent {
            timestamp: Local::now().fixed_offset(),
            level: meta.level().to_string(),
            logger_name: meta.target().to_string(),
            message: visitor.message,
            location: Some(location),
            exception: visitor.exception,
            identity: None,
            thread_name: std::thread::current().name().map(str::to_string),
            user_name: None,
            domain: self.app_domain.clone(),
            properties: visitor.properties,
        };

        match self.sender.try_send(log_event) {
            Ok(()) => {
                self.enqueued_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(_e) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("csv log channel full, dropping log event");
            }
        }
    }
}

/// Collects the message, exception text and remaining fields of an event.
#[derive(Default)]
pub struct FieldVisitor {
    pub message: Option<String>,
    pub exception: Option<String>,
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl FieldVisitor {
    fn record_text(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            "error" | "exception" => self.exception = Some(value),
            name => {
                self.properties.insert(name.to_string(), serde_json::Value::String(value));
            }
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.properties.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.properties.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.properties.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.properties.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_error(&mut self, _field: &Field, value: &(dyn Error + 'static)) {
        let mut text = value.to_string();
        let mut source = value.source();
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        self.exception = Some(text);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_text(field, format!("{:?}", value));
    }
}
