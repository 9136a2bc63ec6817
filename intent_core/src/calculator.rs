//! Calculator evaluator
//!
//! Validation runs in a fixed order: operation, operand count, number format,
//! arity, then the arithmetic itself with its domain checks. The first failing
//! stage decides the error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::CalculatorConfig;
use crate::schema::Endpoint;
use crate::types::{ApiResponse, ErrorKind, ExtractedInfo, SlotValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Sqrt,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Power => "power",
            Operation::Sqrt => "sqrt",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
            Operation::Power => "^",
            Operation::Sqrt => "√",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(Operation::Add),
            "subtract" => Ok(Operation::Subtract),
            "multiply" => Ok(Operation::Multiply),
            "divide" => Ok(Operation::Divide),
            "power" => Ok(Operation::Power),
            "sqrt" => Ok(Operation::Sqrt),
            _ => Err(CalcError::UnknownOperation(s.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("no operation provided")]
    MissingOperation,

    #[error("unknown operation '{0}' (supported: add, subtract, multiply, divide, power, sqrt)")]
    UnknownOperation(String),

    #[error("no numbers provided")]
    NoNumbers,

    #[error("too many numbers provided (maximum {0})")]
    TooManyNumbers(usize),

    #[error("invalid number format: '{0}'")]
    InvalidNumber(String),

    #[error("square root requires exactly one number")]
    SqrtArity,

    #[error("need at least two numbers for calculation")]
    NotEnoughNumbers,

    #[error("cannot divide by zero")]
    DivideByZero,

    #[error("cannot calculate square root of negative number")]
    NegativeSqrt,

    #[error("calculation result is too large")]
    Overflow,

    #[error("result is not a real number")]
    NotReal,
}

/// Operation plus the raw operand tokens, parsed lazily so bad tokens can be reported
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorRequest {
    pub operation: Operation,
    pub numbers: Vec<String>,
}

impl CalculatorRequest {
    pub fn new(operation: Operation, numbers: Vec<String>) -> Self {
        Self { operation, numbers }
    }

    /// Read `operation` and `numbers` from a slot payload.
    ///
    /// A single text `numbers` slot is split on whitespace.
    pub fn from_payload(payload: &ExtractedInfo) -> Result<Self, CalcError> {
        let operation = match payload.get("operation") {
            Some(SlotValue::Text(op)) if !op.trim().is_empty() => op.parse()?,
            _ => return Err(CalcError::MissingOperation),
        };

        let numbers = match payload.get("numbers") {
            Some(SlotValue::List(items)) => items.clone(),
            Some(SlotValue::Text(text)) => text.split_whitespace().map(str::to_string).collect(),
            None => Vec::new(),
        };

        Ok(Self::new(operation, numbers))
    }
}

/// A successful calculation
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub operation: Operation,
    pub operands: Vec<f64>,
    /// Final value after rounding; this is what `expression` prints
    pub value: f64,
    pub expression: String,
}

#[derive(Debug, Clone)]
pub struct Calculator {
    max_operands: usize,
    precision: u32,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(&CalculatorConfig::default())
    }
}

impl Calculator {
    pub fn new(config: &CalculatorConfig) -> Self {
        Self {
            max_operands: config.max_operands,
            precision: config.precision,
        }
    }

    pub fn evaluate(&self, request: &CalculatorRequest) -> Result<Calculation, CalcError> {
        let operands = self.validate_numbers(&request.numbers)?;
        check_arity(request.operation, operands.len())?;

        let raw = apply(request.operation, &operands)?;
        if raw.is_nan() {
            return Err(CalcError::NotReal);
        }
        if raw.is_infinite() {
            return Err(CalcError::Overflow);
        }

        let value = self.round(raw);
        let expression = format!(
            "{} = {}",
            render_operands(request.operation, &operands),
            format_value(value)
        );

        Ok(Calculation {
            operation: request.operation,
            operands,
            value,
            expression,
        })
    }

    /// Evaluate a `calculate` payload into the calculator's API response.
    ///
    /// `data` always echoes the payload's `operation` and `numbers` as given.
    pub fn respond(&self, payload: &ExtractedInfo) -> ApiResponse {
        let data = json!({
            "operation": payload.get("operation"),
            "numbers": payload.get("numbers"),
        });

        let outcome = CalculatorRequest::from_payload(payload).and_then(|request| self.evaluate(&request));

        match outcome {
            Ok(calculation) => {
                tracing::debug!(expression = %calculation.expression, "calculation succeeded");
                ApiResponse::success(Endpoint::Calculator.as_str(), calculation.expression, data)
            }
            Err(err) => {
                tracing::warn!(error = %err, "calculation failed");
                ApiResponse::error(
                    Endpoint::Calculator.as_str(),
                    ErrorKind::CalculationError,
                    format!("Error: {}", err),
                    data,
                )
            }
        }
    }

    fn validate_numbers(&self, tokens: &[String]) -> Result<Vec<f64>, CalcError> {
        if tokens.is_empty() {
            return Err(CalcError::NoNumbers);
        }
        if tokens.len() > self.max_operands {
            return Err(CalcError::TooManyNumbers(self.max_operands));
        }

        tokens
            .iter()
            .map(|token| match token.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                _ => Err(CalcError::InvalidNumber(token.clone())),
            })
            .collect()
    }

    fn round(&self, value: f64) -> f64 {
        // -0.0 would print as "-0"
        if value == 0.0 {
            return 0.0;
        }
        if value.fract() == 0.0 {
            return value;
        }
        let scale = 10f64.powi(self.precision as i32);
        let rounded = (value * scale).round() / scale;
        if rounded == 0.0 {
            0.0
        } else {
            rounded
        }
    }
}

fn check_arity(operation: Operation, count: usize) -> Result<(), CalcError> {
    match operation {
        Operation::Sqrt if count != 1 => Err(CalcError::SqrtArity),
        Operation::Sqrt => Ok(()),
        _ if count < 2 => Err(CalcError::NotEnoughNumbers),
        _ => Ok(()),
    }
}

/// Fold operands left to right. Callers have already checked arity.
fn apply(operation: Operation, operands: &[f64]) -> Result<f64, CalcError> {
    let (first, rest) = match operands.split_first() {
        Some(split) => split,
        None => return Err(CalcError::NoNumbers),
    };

    match operation {
        Operation::Add => Ok(operands.iter().sum()),
        Operation::Subtract => Ok(rest.iter().fold(*first, |acc, n| acc - n)),
        Operation::Multiply => Ok(operands.iter().product()),
        Operation::Divide => {
            let mut acc = *first;
            for divisor in rest {
                if *divisor == 0.0 {
                    return Err(CalcError::DivideByZero);
                }
                acc /= divisor;
            }
            Ok(acc)
        }
        Operation::Power => Ok(rest.iter().fold(*first, |acc, n| acc.powf(*n))),
        Operation::Sqrt => {
            if *first < 0.0 {
                return Err(CalcError::NegativeSqrt);
            }
            Ok(first.sqrt())
        }
    }
}

fn render_operands(operation: Operation, operands: &[f64]) -> String {
    match operation {
        Operation::Sqrt => format!("{}({})", operation.symbol(), format_operand(operands[0])),
        _ => operands
            .iter()
            .map(|n| format_operand(*n))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", operation.symbol())),
    }
}

/// Operands always print in float form: `15.0`, `2.5`, `-4.0`.
fn format_operand(n: f64) -> String {
    format!("{:?}", n)
}

/// Integral values print without a fractional part: `42`.
fn format_value(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}
