use std::io;

/// Errors raised while formatting a [`LogEvent`](crate::record::LogEvent).
///
/// Unknown field names and missing properties are never errors; they
/// resolve to an empty string.
#[derive(thiserror::Error, Debug)]
pub enum CsvError {
    /// A required collaborator (output writer or event) was not supplied.
    #[error("required argument `{0}` was not supplied")]
    InvalidArgument(&'static str),

    #[error("failed to write csv line: {0}")]
    Io(#[from] io::Error),
}

/// Error type returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("failed to open csv log file: {0}")]
    Io(#[from] io::Error),

    #[error("no tokio runtime to run the csv log task: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error("global subscriber already set: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_names_the_argument() {
        let err = CsvError::InvalidArgument("writer");
        assert_eq!(err.to_string(), "required argument `writer` was not supplied");
    }

    #[test]
    fn io_errors_convert() {
        let err: CsvError = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert!(matches!(err, CsvError::Io(_)));
    }
}
