use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Call-site information attached to a [`LogEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub file_name: Option<String>,
    pub line_number: Option<u32>,
}

impl LocationInfo {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            method_name: Some(method_name.into()),
            file_name: None,
            line_number: None,
        }
    }

    pub fn with_file(mut self, file_name: impl Into<String>, line_number: u32) -> Self {
        self.file_name = Some(file_name.into());
        self.line_number = Some(line_number);
        self
    }
}

/// A finalized log occurrence, read by the layout and never mutated by it.
///
/// `timestamp` carries the local offset of the process that produced the
/// event; the UTC timestamp is derived from it so both always agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<FixedOffset>,
    pub level: String,
    pub logger_name: String,
    pub message: Option<String>,
    pub location: Option<LocationInfo>,
    pub exception: Option<String>,
    pub identity: Option<String>,
    pub thread_name: Option<String>,
    pub user_name: Option<String>,
    pub domain: Option<String>,
    /// Custom properties, keyed case-sensitively.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Default for LogEvent {
    fn default() -> Self {
        Self {
            timestamp: DateTime::<Utc>::default().fixed_offset(),
            level: String::new(),
            logger_name: String::new(),
            message: None,
            location: None,
            exception: None,
            identity: None,
            thread_name: None,
            user_name: None,
            domain: None,
            properties: BTreeMap::new(),
        }
    }
}

impl LogEvent {
    /// An empty event stamped with the current local time.
    pub fn now() -> Self {
        Self {
            timestamp: Local::now().fixed_offset(),
            ..Self::default()
        }
    }

    pub fn timestamp_utc(&self) -> DateTime<Utc> {
        self.timestamp.with_timezone(&Utc)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_logger(mut self, logger_name: impl Into<String>) -> Self {
        self.logger_name = logger_name.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_location(mut self, location: LocationInfo) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = Some(thread_name.into());
        self
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up a custom property by exact key and render it as text.
    ///
    /// JSON strings yield their contents, `null` yields an empty string and
    /// every other value yields its JSON text.
    pub fn property_string(&self, key: &str) -> Option<String> {
        self.properties.get(key).map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}
