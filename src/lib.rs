//! # omnicalc
//!
//! Expression engine for an interactive calculator. Input strings go through
//! a glyph normalizer, a tokenizer and a precedence-climbing parser into an
//! [`ast::ASTNode`] tree, which is evaluated over exact rational numbers and
//! formatted to a configurable number of significant digits.
//!
//! ```
//! use omnicalc::{evaluate_to_display, EvaluationConfig};
//!
//! let config = EvaluationConfig::default();
//! assert_eq!(evaluate_to_display("2+2*2", &config), "6");
//! assert_eq!(evaluate_to_display("1/0", &config), "Error");
//! ```
//!
//! Besides evaluation the crate carries the pieces a calculator front end
//! needs around it: plot sampling ([`plot`]), a persisted history
//! ([`history`]) and a keystroke session ([`session`]).

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod functions;
pub mod history;
pub mod number;
pub mod plot;
pub mod session;

pub use config::{AngleUnit, CalcMode, EvaluationConfig, Notation, NumeralBase};
pub use engine::{Engine, Evaluation, EvaluationResult};
pub use error::{CalcError, ErrorKind, HistoryError, Result};
pub use number::Number;
pub use plot::{Domain, SampleGenerator, SamplePoint};

use ast::{differentiate, simplify};
use format::format_number;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Sampler behind `generate_samples`, so its program cache spans calls.
static SAMPLER: Lazy<SampleGenerator> =
    Lazy::new(|| SampleGenerator::new(Arc::clone(Engine::new().registry())));

/// Evaluates `expression` with the built-in function table.
pub fn evaluate(expression: &str, config: &EvaluationConfig) -> EvaluationResult {
    Engine::new().evaluate(expression, config)
}

/// Evaluates and formats for the display: blank for empty input, `"Error"`
/// for any failure.
pub fn evaluate_to_display(expression: &str, config: &EvaluationConfig) -> String {
    match evaluate(expression, config) {
        Ok(Evaluation::Empty) => String::new(),
        Ok(Evaluation::Value(value)) => format_number(&value, config),
        Err(_) => session::ERROR_DISPLAY.to_string(),
    }
}

/// Samples `expression` in `x` over `domain` with `steps` intervals, in radians.
pub fn generate_samples(expression: &str, domain: Domain, steps: usize) -> Vec<SamplePoint> {
    SAMPLER.generate(expression, domain, steps, &EvaluationConfig::default())
}

/// Simplified form of `expression`, printed back as an expression.
pub fn simplify_expression(expression: &str) -> Result<String> {
    let engine = Engine::new();
    Ok(engine
        .parse(expression)?
        .map(|ast| simplify(&ast).to_string())
        .unwrap_or_default())
}

/// Derivative of `expression` with respect to `variable`.
pub fn differentiate_expression(expression: &str, variable: &str) -> Result<String> {
    let engine = Engine::new();
    match engine.parse(expression)? {
        Some(ast) => Ok(differentiate(&ast, variable)?.to_string()),
        None => Ok(String::new()),
    }
}
