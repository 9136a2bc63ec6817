//! Python bindings for intent core using PyO3

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use serde::Serialize;

use crate::calculator::Calculator;
use crate::config::ControllerConfig;
use crate::controller::IntentController;
use crate::types::{ExtractedInfo, SlotValue};

fn to_json<T: Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value)
        .map_err(|e| PyErr::new::<PyValueError, _>(format!("Failed to serialize result: {}", e)))
}

/// Evaluate a calculation and return the calculator response as JSON
#[pyfunction]
#[pyo3(name = "calculate")]
pub fn py_calculate(operation: &str, numbers: Vec<String>) -> PyResult<String> {
    let mut payload = ExtractedInfo::new();
    payload.insert("operation".to_string(), SlotValue::from(operation));
    payload.insert("numbers".to_string(), SlotValue::List(numbers));

    to_json(&Calculator::default().respond(&payload))
}

/// Python wrapper for the intent controller
#[pyclass(name = "IntentController")]
pub struct PyIntentController {
    inner: IntentController,
}

#[pymethods]
impl PyIntentController {
    /// Build a controller, optionally from a TOML config file
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<&str>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => ControllerConfig::from_file(path)
                .map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))?,
            None => ControllerConfig::default(),
        };

        let inner = IntentController::new(config)
            .map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Run the full pipeline; returns the result as a JSON string
    fn process_input(&self, text: &str) -> PyResult<String> {
        to_json(&self.inner.process_input(text))
    }

    /// Detect the intent only
    fn detect<'py>(&self, text: &str, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let detection = self.inner.detect(text);

        let dict = PyDict::new_bound(py);
        dict.set_item("intent", detection.intent.as_str())?;
        dict.set_item("confidence", detection.confidence)?;
        dict.set_item("method", detection.method.as_str())?;

        let slots = PyDict::new_bound(py);
        for (name, value) in &detection.extracted_info {
            match value {
                SlotValue::Text(text) => slots.set_item(name, text)?,
                SlotValue::List(items) => slots.set_item(name, items)?,
            }
        }
        dict.set_item("extracted_info", slots)?;
        Ok(dict)
    }
}
