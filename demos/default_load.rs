use std::io;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::info;

use tracing_csv_layout::csv_sink::CsvSink;
use tracing_csv_layout::init::init_tracing;
use tracing_csv_layout::CsvLayout;

/// Measures capture, queueing and CSV formatting throughput. Lines are
/// rendered with the full built-in field set and written to `io::sink()`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let layout = CsvLayout::with_fields(
        "utcdate level logger class thread message exception iteration",
    );
    let sink = Arc::new(CsvSink::new(layout, io::sink()));
    init_tracing(sink)?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        info!(iteration = i, "csv load test event with \"quotes\", commas");
    }

    let elapsed = start.elapsed();
    println!(
        "captured {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    // Let the background task format what is still queued.
    sleep(Duration::from_secs(2)).await;
    Ok(())
}
