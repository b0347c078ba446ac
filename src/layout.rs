use crate::env::{env_or, CSV_LOG_FIELDS_ENV};
use crate::error::CsvError;
use crate::record::LogEvent;
use crate::resolver;
use std::convert::Infallible;
use std::io::Write;
use std::str::FromStr;

/// Field specification used when none is supplied.
///
/// The `%` prefixes are accepted for compatibility with pattern-style
/// configuration and are stripped like any other separator.
pub const DEFAULT_PATTERN: &str = "%level, %message, %logger, %date";

const SEPARATORS: &[char] = &['%', ' ', ','];
const LINE_ENDING: &str = "\r\n";

/// Renders [`LogEvent`]s as one escaped CSV row each.
///
/// Every field is wrapped in double quotes and embedded quotes are doubled,
/// so the output is safe for any reader honouring quoted fields. Supported
/// field names are the built-ins listed in [`resolver::BUILTIN_FIELDS`];
/// any other name is looked up case-sensitively in the event properties.
///
/// The layout must be activated with [`CsvLayout::activate_options`] before
/// formatting. Until then no fields are included and each line is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLayout {
    fields: String,
    included_fields: Option<Vec<String>>,
    ignores_exception: bool,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for CsvLayout {
    type Err = Infallible;

    fn from_str(fields: &str) -> Result<Self, Self::Err> {
        Ok(Self::with_fields(fields))
    }
}

impl CsvLayout {
    /// Layout using [`DEFAULT_PATTERN`].
    pub fn new() -> Self {
        Self::with_fields(DEFAULT_PATTERN)
    }

    /// Layout using a field specification such as `"date, level, message"`.
    pub fn with_fields(fields: impl Into<String>) -> Self {
        Self {
            fields: fields.into(),
            included_fields: None,
            ignores_exception: true,
        }
    }

    /// Layout configured from `CSV_LOG_FIELDS`, falling back to
    /// [`DEFAULT_PATTERN`]. Not yet activated.
    pub fn from_env() -> Self {
        Self::with_fields(env_or(CSV_LOG_FIELDS_ENV, DEFAULT_PATTERN))
    }

    /// The raw field specification.
    pub fn fields(&self) -> &str {
        &self.fields
    }

    /// Replace the field specification. Takes effect on the next
    /// [`CsvLayout::activate_options`].
    pub fn set_fields(&mut self, fields: impl Into<String>) {
        self.fields = fields.into();
    }

    /// Parsed field names in output order, or `None` before activation.
    pub fn included_fields(&self) -> Option<&[String]> {
        self.included_fields.as_deref()
    }

    /// Always `false` once activated: exception text is part of the
    /// formatted output rather than left for the caller to append.
    pub fn ignores_exception(&self) -> bool {
        self.ignores_exception
    }

    pub fn content_type(&self) -> &'static str {
        "text/plain"
    }

    /// Parse the field specification into the ordered field list.
    ///
    /// `%`, space and `,` are all separators and empty tokens are dropped.
    /// Safe to call repeatedly; each call re-derives the list from scratch.
    pub fn activate_options(&mut self) {
        self.ignores_exception = false;
        let included = parse_fields(&self.fields);
        tracing::debug!(fields = ?included, "activated csv layout");
        self.included_fields = Some(included);
    }

    /// Write `event` as a single CRLF-terminated CSV line.
    ///
    /// Returns [`CsvError::InvalidArgument`] when no writer is supplied.
    pub fn format<W>(&self, writer: Option<&mut W>, event: &LogEvent) -> Result<(), CsvError>
    where
        W: Write + ?Sized,
    {
        let writer = writer.ok_or(CsvError::InvalidArgument("writer"))?;
        writer.write_all(self.format_to_string(event).as_bytes())?;
        Ok(())
    }

    /// Render `event` as a CRLF-terminated CSV line.
    pub fn format_to_string(&self, event: &LogEvent) -> String {
        let fields = self.included_fields().unwrap_or_default();
        render_row(fields.iter().map(|field| resolver::resolve(field, event)))
    }

    /// Resolve a single field; see [`resolver::get_field_value`].
    pub fn get_field_value(&self, field: &str, event: Option<&LogEvent>) -> Result<String, CsvError> {
        resolver::get_field_value(field, event)
    }

    /// The included field names rendered as a CSV row, suitable as a file
    /// header.
    pub fn header(&self) -> String {
        render_row(self.included_fields().unwrap_or_default().iter().cloned())
    }
}

/// Split a field specification into its tokens, preserving order.
pub fn parse_fields(spec: &str) -> Vec<String> {
    spec.split(SEPARATORS)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Wrap `value` in double quotes, doubling any embedded quote.
pub fn escape_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn render_row(values: impl Iterator<Item = String>) -> String {
    let mut line = values
        .map(|value| escape_field(&value))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str(LINE_ENDING);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mixed_separators() {
        assert_eq!(
            parse_fields("%level,,  %message%logger ,date, "),
            vec!["level", "message", "logger", "date"]
        );
        assert!(parse_fields(" ,%% ").is_empty());
    }

    #[test]
    fn escape_doubles_each_quote_once() {
        assert_eq!(escape_field(r#"Th"e "ans"wer"#), r#""Th""e ""ans""wer""#);
        assert_eq!(escape_field(""), r#""""#);
        assert_eq!(escape_field("a,b\nc"), "\"a,b\nc\"");
    }

    #[test]
    fn unconfigured_layout_formats_empty_line() {
        let layout = CsvLayout::new();
        assert_eq!(layout.included_fields(), None);
        assert!(layout.ignores_exception());
        assert_eq!(layout.format_to_string(&LogEvent::default()), "\r\n");
    }

    #[test]
    fn set_fields_applies_on_next_activation() {
        let mut layout = CsvLayout::new();
        layout.activate_options();
        layout.set_fields("thread");
        assert_eq!(layout.included_fields().unwrap().len(), 4);
        layout.activate_options();
        assert_eq!(layout.included_fields().unwrap(), ["thread"]);
    }

    #[test]
    fn header_quotes_field_names() {
        let mut layout: CsvLayout = "date level Quote\"d".parse().unwrap();
        layout.activate_options();
        assert_eq!(layout.header(), "\"date\",\"level\",\"Quote\"\"d\"\r\n");
    }
}
