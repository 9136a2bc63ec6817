//! Top-level pipeline: detect, check slots, decide, execute, assemble

use crate::calculator::Calculator;
use crate::config::ControllerConfig;
use crate::decision::decide_action;
use crate::detector::IntentDetector;
use crate::error::Result;
use crate::executor::ActionExecutor;
use crate::schema::missing_fields;
use crate::services::{ExternalService, SimulatedServices};
use crate::types::{Detection, ProcessResult};

/// Immutable after construction; safe to share across threads.
pub struct IntentController {
    config: ControllerConfig,
    detector: IntentDetector,
    executor: ActionExecutor,
}

impl IntentController {
    /// Controller backed by the simulated services
    pub fn new(config: ControllerConfig) -> Result<Self> {
        Self::with_services(config, Box::new(SimulatedServices::new()))
    }

    pub fn with_services(config: ControllerConfig, services: Box<dyn ExternalService>) -> Result<Self> {
        config.validate()?;

        let detector = IntentDetector::new(&config.detection)?;
        let executor = ActionExecutor::new(Calculator::new(&config.calculator), services);

        Ok(Self {
            config,
            detector,
            executor,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn detect(&self, text: &str) -> Detection {
        self.detector.detect(text)
    }

    /// Run one utterance through the whole pipeline. Failures come back as data.
    pub fn process_input(&self, text: &str) -> ProcessResult {
        tracing::info!(input = text, "processing input");

        let detection = self.detector.detect(text);
        let missing = missing_fields(detection.intent, &detection.extracted_info);
        tracing::debug!(intent = %detection.intent, missing = ?missing, "checked required fields");

        let decision = decide_action(detection.intent, &missing, &detection.extracted_info);
        let action_taken = decision.action_type();
        tracing::debug!(action = ?action_taken, "decided action");

        let result = self.executor.execute(&decision);

        ProcessResult {
            input: text.to_string(),
            intent: detection.intent,
            confidence: detection.confidence,
            detection_method: detection.method,
            extracted_info: detection.extracted_info,
            missing_info: missing,
            action_taken,
            result,
        }
    }
}
