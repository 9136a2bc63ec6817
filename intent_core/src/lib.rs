//! Intent core - rule-based intent detection and action dispatch
//!
//! Classifies an utterance into a fixed set of intents, extracts slots, checks
//! for missing information and decides whether to ask, call an endpoint
//! (the built-in calculator or a simulated service) or answer directly.

pub mod types;
pub mod schema;
pub mod config;
pub mod error;
pub mod extract;
pub mod patterns;
pub mod keywords;
pub mod detector;
pub mod decision;
pub mod calculator;
pub mod services;
pub mod executor;
pub mod controller;

pub use types::*;
pub use schema::{missing_fields, Endpoint};
pub use config::{CalculatorConfig, ConfigError, ControllerConfig, DetectionConfig};
pub use error::{Error, Result};
pub use detector::IntentDetector;
pub use decision::{decide_action, ActionDecision};
pub use calculator::{CalcError, Calculation, Calculator, CalculatorRequest, Operation};
pub use services::{ExternalService, ServiceError, ServicePayload, SimulatedServices};
pub use executor::ActionExecutor;
pub use controller::IntentController;

// Python bindings
#[cfg(feature = "python")]
pub mod py;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn intent_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use py::*;
    m.add_class::<PyIntentController>()?;
    m.add_function(wrap_pyfunction!(py_calculate, m)?)?;
    Ok(())
}
