//! External service interface and the simulated in-process stubs
//!
//! Nothing here touches the network. `SimulatedServices` answers every known
//! endpoint with a canned success payload that echoes the request.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::ExtractedInfo;

/// Service response payload. A string `result` entry, when present, becomes the
/// result text of the API response.
pub type ServicePayload = Map<String, Value>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("unknown endpoint '{0}'")]
    UnknownEndpoint(String),
}

/// Anything the executor can route a non-calculator `call_api` decision to
pub trait ExternalService: Send + Sync {
    fn call(&self, endpoint: &str, payload: &ExtractedInfo) -> Result<ServicePayload, ServiceError>;
}

/// Canned responses for weather, flight_booking, email and calendar
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedServices;

impl SimulatedServices {
    pub fn new() -> Self {
        Self
    }
}

impl ExternalService for SimulatedServices {
    fn call(&self, endpoint: &str, payload: &ExtractedInfo) -> Result<ServicePayload, ServiceError> {
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(|value| value.as_text())
                .unwrap_or("unknown")
                .to_string()
        };

        let result = match endpoint {
            "weather" => format!("Weather information for {}", field("location")),
            "flight_booking" => format!(
                "Flight booked from {} to {} on {}",
                field("origin"),
                field("destination"),
                field("date")
            ),
            "email" => format!(
                "Email sent to {} with subject: {}",
                field("recipient"),
                field("subject")
            ),
            "calendar" => format!(
                "Meeting scheduled with {} on {} for {}",
                field("participants"),
                field("date"),
                field("duration")
            ),
            other => return Err(ServiceError::UnknownEndpoint(other.to_string())),
        };

        let mut response = ServicePayload::new();
        for (slot, value) in payload {
            // SlotValue is untagged, so this never fails
            if let Ok(value) = serde_json::to_value(value) {
                response.insert(slot.clone(), value);
            }
        }
        response.insert("result".to_string(), Value::String(result));
        response.insert("simulated".to_string(), Value::Bool(true));
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SlotValue;

    #[test]
    fn test_weather_stub_echoes_location() {
        let mut payload = ExtractedInfo::new();
        payload.insert("location".to_string(), SlotValue::from("Oslo"));

        let response = SimulatedServices::new().call("weather", &payload).unwrap();
        assert_eq!(response["result"], "Weather information for Oslo");
        assert_eq!(response["location"], "Oslo");
        assert_eq!(response["simulated"], true);
    }

    #[test]
    fn test_calendar_stub() {
        let payload: ExtractedInfo = [
            ("participants", "Ann"),
            ("date", "Friday"),
            ("duration", "30 minutes"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), SlotValue::from(*v)))
        .collect();

        let response = SimulatedServices::new().call("calendar", &payload).unwrap();
        assert_eq!(response["result"], "Meeting scheduled with Ann on Friday for 30 minutes");
    }

    #[test]
    fn test_unknown_endpoint() {
        let err = SimulatedServices::new()
            .call("teleport", &ExtractedInfo::new())
            .unwrap_err();
        assert_eq!(err, ServiceError::UnknownEndpoint("teleport".to_string()));
        assert_eq!(err.to_string(), "unknown endpoint 'teleport'");
    }

    #[test]
    fn test_search_is_not_an_endpoint() {
        let mut payload = ExtractedInfo::new();
        payload.insert("query".to_string(), SlotValue::from("rust"));

        let err = SimulatedServices::new().call("search", &payload).unwrap_err();
        assert_eq!(err, ServiceError::UnknownEndpoint("search".to_string()));
    }
}
