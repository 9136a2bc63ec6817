//! Action executor - turns a decision into an `ActionResult`

use serde_json::Value;

use crate::calculator::Calculator;
use crate::decision::ActionDecision;
use crate::schema::Endpoint;
use crate::services::{ExternalService, ServiceError};
use crate::types::{ActionResult, ApiResponse, ErrorKind, ExtractedInfo};

pub struct ActionExecutor {
    calculator: Calculator,
    services: Box<dyn ExternalService>,
}

impl ActionExecutor {
    pub fn new(calculator: Calculator, services: Box<dyn ExternalService>) -> Self {
        Self { calculator, services }
    }

    pub fn execute(&self, decision: &ActionDecision) -> ActionResult {
        match decision {
            ActionDecision::AskForInfo {
                intent,
                missing_fields,
                message,
            } => ActionResult::AskForInfo {
                response: message.clone(),
                missing_fields: missing_fields.clone(),
                intent: *intent,
            },
            ActionDecision::AnswerDirectly { intent, message } => ActionResult::DirectAnswer {
                response: message.clone(),
                intent: *intent,
            },
            ActionDecision::CallApi {
                endpoint: Endpoint::Calculator,
                payload,
                ..
            } => ActionResult::ApiResponse(self.calculator.respond(payload)),
            ActionDecision::CallApi { endpoint, payload, .. } => {
                ActionResult::ApiResponse(self.call_service(endpoint.as_str(), payload))
            }
        }
    }

    fn call_service(&self, endpoint: &str, payload: &ExtractedInfo) -> ApiResponse {
        tracing::info!(endpoint, slots = payload.len(), "calling external service");

        match self.services.call(endpoint, payload) {
            Ok(response) => {
                let result = response
                    .get("result")
                    .and_then(Value::as_str)
                    .unwrap_or("API call completed")
                    .to_string();
                ApiResponse::success(endpoint, result, Value::Object(response))
            }
            Err(err @ ServiceError::UnknownEndpoint(_)) => {
                tracing::warn!(endpoint, error = %err, "service call failed");
                ApiResponse::error(
                    endpoint,
                    ErrorKind::UnknownEndpoint,
                    format!("Error: {}", err),
                    Value::Null,
                )
            }
        }
    }
}
