pub mod date;
pub mod error;
pub mod record;
pub mod resolver;
pub mod layout;

pub mod sink;
pub mod csv_sink;
pub mod noop_sink;
pub mod layer;

pub mod env;
pub mod init;

pub use error::CsvError;
pub use layout::{CsvLayout, DEFAULT_PATTERN};
pub use record::{LocationInfo, LogEvent};
