use crate::csv_sink::CsvSink;
use crate::env::{
    env_or, CSV_LOG_APP_DOMAIN_ENV, CSV_LOG_PATH_ENV, DEFAULT_CSV_LOG_PATH,
};
use crate::error::InitError;
use crate::layer::CsvLogLayer;
use crate::layout::CsvLayout;
use crate::sink::LogSink;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the logging layer.
///
/// Controls the size of the internal queue, the batch size used when
/// sending to the sink, how often a partial batch is flushed, which events
/// are captured and whether events are also printed to stdout.
///
/// **Fields**
/// - `channel_buffer`: maximum number of queued [`LogEvent`]s before new
///   events are dropped.
/// - `batch_size`: number of events sent to the sink per batch.
/// - `flush_interval`: maximum time a partial batch waits before flushing.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt` layer is added
///   next to [`CsvLogLayer`].
/// - `max_level`: most verbose level captured into the CSV output.
/// - `app_domain`: value of the `appdomain` field on captured events.
///
/// [`LogEvent`]: crate::record::LogEvent
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub enable_stdout: bool,
    pub max_level: Level,
    pub app_domain: Option<String>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
            enable_stdout: false,
            max_level: Level::INFO,
            app_domain: None,
        }
    }
}

impl LayerConfig {
    /// Defaults, with `app_domain` taken from `CSV_LOG_APP_DOMAIN` if set.
    pub fn from_env() -> Self {
        let app_domain = env_or(CSV_LOG_APP_DOMAIN_ENV, "");
        Self {
            app_domain: (!app_domain.is_empty()).then_some(app_domain),
            ..Self::default()
        }
    }

    /// Enforce minimal thresholds to avoid degenerate configs.
    pub fn clamped(mut self) -> Self {
        self.channel_buffer = self.channel_buffer.max(16);
        self.batch_size = self.batch_size.max(1);
        self.flush_interval = self.flush_interval.max(Duration::from_millis(10));
        self
    }
}

/// Initialize the global `tracing` subscriber using the provided sink and
/// [`LayerConfig`].
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`CsvLogLayer`] as the global
/// default subscriber, so all `tracing` events in the process are observed
/// by the layer. The returned handle belongs to the background task
/// draining the queue.
///
/// Returns [`InitError::NoRuntime`] when called outside a Tokio runtime.
pub fn init_tracing_with_config(
    sink: Arc<dyn LogSink>,
    config: LayerConfig,
) -> Result<JoinHandle<()>, InitError> {
    Handle::try_current()?;
    let (layer, handle) = CsvLogLayer::new(sink, &config);

    // The two branches build differently typed subscribers.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(handle)
}

/// Initialize tracing with [`LayerConfig::default`].
pub fn init_tracing(sink: Arc<dyn LogSink>) -> Result<JoinHandle<()>, InitError> {
    init_tracing_with_config(sink, LayerConfig::default())
}

/// Write every captured event to the CSV file at `path` using `layout`.
pub fn init_csv_file(
    path: impl AsRef<Path>,
    layout: CsvLayout,
) -> Result<JoinHandle<()>, InitError> {
    Handle::try_current()?;
    let sink = CsvSink::open(path, layout)?;
    init_tracing(Arc::new(sink))
}

/// Like [`init_csv_file`], configured entirely from the environment:
/// `CSV_LOG_PATH`, `CSV_LOG_FIELDS` and `CSV_LOG_APP_DOMAIN`.
pub fn init_csv_file_from_env() -> Result<JoinHandle<()>, InitError> {
    Handle::try_current()?;
    let path = env_or(CSV_LOG_PATH_ENV, DEFAULT_CSV_LOG_PATH);
    let sink = CsvSink::open(path, CsvLayout::from_env())?;
    init_tracing_with_config(Arc::new(sink), LayerConfig::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noop_sink::NoopSink;

    #[test]
    fn init_outside_runtime_is_an_error() {
        let err = init_tracing(Arc::new(NoopSink::default())).unwrap_err();
        assert!(matches!(err, InitError::NoRuntime(_)));
    }

    #[test]
    fn csv_file_init_outside_runtime_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.csv");

        let err = init_csv_file(&path, CsvLayout::new()).unwrap_err();
        assert!(matches!(err, InitError::NoRuntime(_)));
        assert!(!path.exists());
    }

    #[test]
    fn clamps_degenerate_values() {
        let config = LayerConfig {
            channel_buffer: 0,
            batch_size: 0,
            flush_interval: Duration::ZERO,
            ..LayerConfig::default()
        }
        .clamped();

        assert_eq!(config.channel_buffer, 16);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.flush_interval, Duration::from_millis(10));
    }

    #[test]
    fn defaults_capture_info_and_above() {
        let config = LayerConfig::default();
        assert_eq!(config.max_level, Level::INFO);
        assert!(!config.enable_stdout);
        assert_eq!(config.app_domain, None);
    }
}
