use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity level attached to every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    /// Informational event.
    Info,
    /// Something unexpected that the service recovered from.
    Warning,
    /// A failure that needs attention.
    Error,
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventLevel::Info => write!(f, "info"),
            EventLevel::Warning => write!(f, "warning"),
            EventLevel::Error => write!(f, "error"),
        }
    }
}

/// Wire payload sent to the monitoring endpoint for a single event.
///
/// Constructed immediately before each send and discarded afterwards;
/// nothing outlives a dispatch call. `data` carries an arbitrary structured
/// value supplied by the caller and is serialized as JSON `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Name of the event, shown as the headline in the dashboard.
    pub name: String,
    /// Name of the service the event belongs to.
    pub service_name: String,
    /// Severity of the event.
    pub level: EventLevel,
    /// Further details of the event.
    pub message: String,
    /// Additional structured data attached by the caller.
    pub data: Option<serde_json::Value>,
    /// Whether this event was produced by the uncaught-fault hook rather
    /// than an explicit call.
    pub uncaught: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn levels_use_the_documented_wire_names() {
        assert_eq!(serde_json::to_string(&EventLevel::Info).unwrap(), r#""info""#);
        assert_eq!(
            serde_json::to_string(&EventLevel::Warning).unwrap(),
            r#""warning""#
        );
        assert_eq!(serde_json::to_string(&EventLevel::Error).unwrap(), r#""error""#);
    }

    #[test]
    fn payload_round_trips_through_json() {
        let payload = EventPayload {
            name: "cache-miss-storm".to_owned(),
            service_name: "billing".to_owned(),
            level: EventLevel::Warning,
            message: "cache hit rate dropped below 10%".to_owned(),
            data: Some(json!({ "hit_rate": 0.07, "region": "eu-west-1" })),
            uncaught: false,
        };

        let encoded = serde_json::to_string(&payload).unwrap();
        let decoded: EventPayload = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, payload);
    }

    #[test]
    fn absent_data_is_serialized_as_null() {
        let payload = EventPayload {
            name: "startup".to_owned(),
            service_name: "billing".to_owned(),
            level: EventLevel::Info,
            message: "service started".to_owned(),
            data: None,
            uncaught: false,
        };

        let encoded: serde_json::Value =
            serde_json::to_value(&payload).unwrap();

        assert_eq!(encoded.get("data"), Some(&serde_json::Value::Null));

        let decoded: EventPayload = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, payload);
    }
}
