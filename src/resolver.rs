use crate::date::format_iso8601;
use crate::error::CsvError;
use crate::record::LogEvent;

type Accessor = fn(&LogEvent) -> String;

/// Built-in field names and their accessors, matched case-sensitively
/// before falling back to custom properties.
pub const BUILTIN_FIELDS: &[(&str, Accessor)] = &[
    ("date", date),
    ("utcdate", utc_date),
    ("message", message),
    ("logger", logger),
    ("level", level),
    ("class", class),
    ("method", method),
    ("exception", exception),
    ("identity", identity),
    ("thread", thread),
    ("username", username),
    ("appdomain", appdomain),
];

fn text(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

fn date(e: &LogEvent) -> String {
    format_iso8601(&e.timestamp)
}

fn utc_date(e: &LogEvent) -> String {
    format_iso8601(&e.timestamp_utc())
}

fn message(e: &LogEvent) -> String {
    text(e.message.as_ref())
}

fn logger(e: &LogEvent) -> String {
    e.logger_name.clone()
}

fn level(e: &LogEvent) -> String {
    e.level.clone()
}

fn class(e: &LogEvent) -> String {
    text(e.location.as_ref().and_then(|l| l.class_name.as_ref()))
}

fn method(e: &LogEvent) -> String {
    text(e.location.as_ref().and_then(|l| l.method_name.as_ref()))
}

fn exception(e: &LogEvent) -> String {
    text(e.exception.as_ref())
}

fn identity(e: &LogEvent) -> String {
    text(e.identity.as_ref())
}

fn thread(e: &LogEvent) -> String {
    text(e.thread_name.as_ref())
}

fn username(e: &LogEvent) -> String {
    text(e.user_name.as_ref())
}

fn appdomain(e: &LogEvent) -> String {
    text(e.domain.as_ref())
}

pub fn is_builtin(field: &str) -> bool {
    BUILTIN_FIELDS.iter().any(|(name, _)| *name == field)
}

/// Resolve `field` against `event`. Never fails: unknown names and
/// missing values yield an empty string.
pub fn resolve(field: &str, event: &LogEvent) -> String {
    match BUILTIN_FIELDS.iter().find(|(name, _)| *name == field) {
        Some((_, accessor)) => accessor(event),
        None => event.property_string(field).unwrap_or_default(),
    }
}

/// Like [`resolve`], but rejects an absent event with
/// [`CsvError::InvalidArgument`].
pub fn get_field_value(field: &str, event: Option<&LogEvent>) -> Result<String, CsvError> {
    let event = event.ok_or(CsvError::InvalidArgument("event"))?;
    Ok(resolve(field, event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LocationInfo;
    use chrono::{FixedOffset, TimeZone};

    fn event() -> LogEvent {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        LogEvent::default()
            .with_timestamp(offset.with_ymd_and_hms(2012, 12, 14, 7, 20, 42).unwrap())
            .with_level("ERROR")
            .with_logger("Bob")
            .with_message("The answer")
            .with_location(LocationInfo::new("Foo", "Bar").with_file("FooBar.exe", 42))
            .with_exception("Don't Panic!")
            .with_identity("Bob")
            .with_thread_name("OriginalBob")
            .with_user_name("Ryker")
            .with_domain("Homer")
    }

    #[test]
    fn resolves_every_builtin() {
        let e = event();
        let expected = [
            ("date", "2012-12-14 07:20:42,000"),
            ("utcdate", "2012-12-14 12:20:42,000"),
            ("message", "The answer"),
            ("logger", "Bob"),
            ("level", "ERROR"),
            ("class", "Foo"),
            ("method", "Bar"),
            ("exception", "Don't Panic!"),
            ("identity", "Bob"),
            ("thread", "OriginalBob"),
            ("username", "Ryker"),
            ("appdomain", "Homer"),
        ];
        for (field, value) in expected {
            assert_eq!(resolve(field, &e), value, "field {field}");
        }
        assert_eq!(BUILTIN_FIELDS.len(), expected.len());
    }

    #[test]
    fn absent_values_are_empty() {
        let e = LogEvent::default();
        for field in ["message", "class", "method", "exception", "identity", "thread", "username", "appdomain"] {
            assert_eq!(resolve(field, &e), "", "field {field}");
        }
    }

    #[test]
    fn builtins_shadow_properties() {
        let e = LogEvent::default()
            .with_message("real")
            .with_property("message", "shadowed");
        assert_eq!(resolve("message", &e), "real");
    }

    #[test]
    fn builtin_names_are_case_sensitive() {
        let e = LogEvent::default()
            .with_level("INFO")
            .with_property("Level", "custom");
        assert!(!is_builtin("Level"));
        assert_eq!(resolve("Level", &e), "custom");
        assert_eq!(resolve("LEVEL", &e), "");
    }

    #[test]
    fn missing_event_is_invalid_argument() {
        let err = get_field_value("message", None).unwrap_err();
        assert!(matches!(err, CsvError::InvalidArgument("event")));
    }
}
