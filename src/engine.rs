//! The evaluation pipeline: normalize, tokenize, parse, evaluate.

use crate::ast::{ASTNode, Evaluator, Parser};
use crate::config::EvaluationConfig;
use crate::error::Result;
use crate::functions::{Builtin, FunctionRegistry};
use crate::number::Number;
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Built-in table, built on first use and shared by every default engine.
static BUILTINS: Lazy<Arc<FunctionRegistry>> =
    Lazy::new(|| Arc::new(FunctionRegistry::with_builtins()));

/// Outcome of a successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Input held nothing to evaluate; displayed as a blank.
    Empty,
    Value(Number),
}

impl Evaluation {
    pub fn value(&self) -> Option<&Number> {
        match self {
            Evaluation::Empty => None,
            Evaluation::Value(n) => Some(n),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Evaluation::Empty)
    }
}

pub type EvaluationResult = Result<Evaluation>;

/// Owns the function table. Evaluation borrows it immutably, so one engine
/// can be shared across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<FunctionRegistry>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with the built-in functions and constants. The table is shared
    /// until the first `register` call on this engine.
    pub fn new() -> Self {
        Self {
            registry: Arc::clone(&BUILTINS),
        }
    }

    pub fn with_registry(registry: FunctionRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    /// Adds or replaces a function. Clones the table if it is shared.
    pub fn register(&mut self, name: &str, builtin: Builtin) {
        Arc::make_mut(&mut self.registry).register(name, builtin);
    }

    pub fn register_constant(&mut self, name: &str, value: Number) {
        Arc::make_mut(&mut self.registry).register_constant(name, value);
    }

    pub fn parse(&self, expression: &str) -> Result<Option<ASTNode>> {
        Parser::parse(expression, &self.registry)
    }

    pub fn evaluate(&self, expression: &str, config: &EvaluationConfig) -> EvaluationResult {
        self.evaluate_with(expression, config, &HashMap::new())
    }

    /// Evaluates with variables bound from `context`.
    pub fn evaluate_with(
        &self,
        expression: &str,
        config: &EvaluationConfig,
        context: &HashMap<String, Number>,
    ) -> EvaluationResult {
        let ast = match self.parse(expression)? {
            Some(ast) => ast,
            None => return Ok(Evaluation::Empty),
        };
        let value = self.evaluate_ast(&ast, config, context)?;
        debug!("{} = {}", expression, value);
        Ok(Evaluation::Value(value))
    }

    pub fn evaluate_ast(
        &self,
        ast: &ASTNode,
        config: &EvaluationConfig,
        context: &HashMap<String, Number>,
    ) -> Result<Number> {
        Evaluator::new(&self.registry, config).evaluate(ast, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;

    #[test]
    fn test_default_engines_share_builtins() {
        let first = Engine::new();
        let mut second = Engine::new();
        assert!(Arc::ptr_eq(first.registry(), second.registry()));

        second.register_constant("g", Number::from_integer(9));
        assert!(!Arc::ptr_eq(first.registry(), second.registry()));
        assert!(!first.registry().is_constant("g"));
        assert!(!Engine::new().registry().is_constant("g"));
    }

    #[test]
    fn test_empty_expression() {
        let engine = Engine::new();
        let config = EvaluationConfig::default();
        assert_eq!(engine.evaluate("", &config), Ok(Evaluation::Empty));
        assert_eq!(engine.evaluate(" \t", &config), Ok(Evaluation::Empty));
    }

    #[test]
    fn test_value() {
        let engine = Engine::new();
        let result = engine.evaluate("6×7", &EvaluationConfig::default()).unwrap();
        assert_eq!(result.value(), Some(&Number::from_integer(42)));
    }

    #[test]
    fn test_register_extends_engine() {
        fn half(args: &[f64]) -> Result<f64> {
            Ok(args[0] / 2.0)
        }

        let mut engine = Engine::new();
        let config = EvaluationConfig::default();
        assert_eq!(
            engine.evaluate("half(4)", &config),
            Err(CalcError::name("half"))
        );

        engine.register("half", Builtin::new(1, half));
        engine.register_constant("answer", Number::from_integer(42));
        let result = engine.evaluate("half(answer)", &config).unwrap();
        assert_eq!(result, Evaluation::Value(Number::from_integer(21)));
    }

    #[test]
    fn test_context_variables() {
        let engine = Engine::new();
        let context = HashMap::from([("r".to_string(), Number::from_integer(3))]);
        let result = engine
            .evaluate_with("r^2", &EvaluationConfig::default(), &context)
            .unwrap();
        assert_eq!(result.value(), Some(&Number::from_integer(9)));
    }
}
