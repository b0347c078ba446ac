//! Environment variable names used by this crate for convenient
//! configuration of the CSV layout and file sink.
//!
//! These are purely helpers; [`CsvLayout`](crate::layout::CsvLayout) and the
//! sinks can always be configured explicitly instead.

/// Field specification, e.g. `date, level, logger, message`.
pub const CSV_LOG_FIELDS_ENV: &str = "CSV_LOG_FIELDS";

/// Path of the CSV file written by [`init_csv_file_from_env`](crate::init::init_csv_file_from_env).
pub const CSV_LOG_PATH_ENV: &str = "CSV_LOG_PATH";

/// Optional application domain stamped on every captured event.
pub const CSV_LOG_APP_DOMAIN_ENV: &str = "CSV_LOG_APP_DOMAIN";

/// Default file used when `CSV_LOG_PATH` is unset.
pub const DEFAULT_CSV_LOG_PATH: &str = "logs.csv";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_when_unset() {
        assert_eq!(env_or("CSV_LOG_TEST_SURELY_UNSET", "fallback"), "fallback");
    }
}
