use crate::layout::CsvLayout;
use crate::record::LogEvent;
use crate::sink::LogSink;
use async_trait::async_trait;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tokio::sync::Mutex;

/// [`LogSink`] that renders each event with a [`CsvLayout`] and writes the
/// line to an owned writer.
///
/// The layout is activated on construction if it was not already, so the
/// configured fields are always honoured.
pub struct CsvSink<W> {
    layout: CsvLayout,
    writer: Mutex<W>,
}

impl<W: Write + Send> CsvSink<W> {
    pub fn new(mut layout: CsvLayout, writer: W) -> Self {
        if layout.included_fields().is_none() {
            layout.activate_options();
        }
        Self {
            layout,
            writer: Mutex::new(writer),
        }
    }

    pub fn layout(&self) -> &CsvLayout {
        &self.layout
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }
}

impl CsvSink<BufWriter<File>> {
    /// Append to the CSV file at `path`, creating it if needed.
    ///
    /// When the file is empty the layout header is written first, so a file
    /// reopened across restarts carries exactly one header row.
    pub fn open(path: impl AsRef<Path>, mut layout: CsvLayout) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let needs_header = file.metadata()?.len() == 0;

        if layout.included_fields().is_none() {
            layout.activate_options();
        }
        let mut writer = BufWriter::new(file);
        if needs_header {
            writer.write_all(layout.header().as_bytes())?;
            writer.flush()?;
        }
        tracing::debug!(path = %path.display(), needs_header, "opened csv log file");
        Ok(Self::new(layout, writer))
    }
}

#[async_trait]
impl<W: Write + Send> LogSink for CsvSink<W> {
    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut writer = self.writer.lock().await;
        self.layout.format(Some(&mut *writer), event)?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.writer.lock().await.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_one_line_per_event() {
        let sink = CsvSink::new(CsvLayout::with_fields("level message"), Vec::new());
        sink.send(&LogEvent::default().with_level("INFO").with_message("one")).await.unwrap();
        sink.send(&LogEvent::default().with_level("WARN").with_message("t\"wo")).await.unwrap();

        let out = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(out, "\"INFO\",\"one\"\r\n\"WARN\",\"t\"\"wo\"\r\n");
    }

    #[test]
    fn activates_layout_on_construction() {
        let sink = CsvSink::new(CsvLayout::new(), Vec::new());
        assert_eq!(
            sink.layout().included_fields().unwrap(),
            ["level", "message", "logger", "date"]
        );
        assert!(!sink.layout().ignores_exception());
    }
}
