use tracing::{error, info, warn};
use tracing_csv_layout::init::init_csv_file;
use tracing_csv_layout::CsvLayout;

/// Logs a few events into `demo.csv` using the default field set
/// (level, message, logger, date).
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handle = init_csv_file("demo.csv", CsvLayout::new())?;

    info!("csv file demo started");
    warn!("messages with \"quotes\", commas and\nnewlines stay in one field");
    error!(error = "disk full", "could not persist order");

    // The global subscriber lives for the whole process, so give the
    // background task one flush interval to write the batch.
    tokio::time::sleep(std::time::Duration::from_millis(1200)).await;
    drop(handle);
    println!("wrote demo.csv");
    Ok(())
}
