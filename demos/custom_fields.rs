use chrono::Local;
use std::io::Write;
use tracing_csv_layout::{CsvLayout, LocationInfo, LogEvent};

/// Formats hand-built events without installing any subscriber, mixing
/// built-in fields with a custom `CustomProperty` column.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut layout = CsvLayout::with_fields("utcdate thread level logger class method message exception CustomProperty");
    layout.activate_options();

    let mut stdout = std::io::stdout();
    stdout.write_all(layout.header().as_bytes())?;

    let event = LogEvent::default()
        .with_timestamp(Local::now().fixed_offset())
        .with_thread_name("main")
        .with_level("DEBUG")
        .with_logger("ExampleApp.Program")
        .with_location(LocationInfo::new("Program", "main"))
        .with_message("You Wrote: \"Throw\"")
        .with_exception("InvalidOperation: Doh!")
        .with_property("CustomProperty", "Custom value");
    layout.format(Some(&mut stdout), &event)?;
    Ok(())
}

