pub mod exponential;
pub mod other;
pub mod trig;

use crate::error::{CalcError, Result};
use crate::number::Number;
use std::collections::HashMap;

pub type BuiltinFn = fn(&[f64]) -> Result<f64>;

/// How a built-in interacts with the configured angle unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AngleHandling {
    None,
    /// Argument is an angle (`sin`, `cos`, `tan`).
    Argument,
    /// Result is an angle (`asin`, `acos`, `atan`).
    Result,
}

#[derive(Debug, Copy, Clone)]
pub struct Builtin {
    pub arity: usize,
    pub function: BuiltinFn,
    pub angle: AngleHandling,
}

impl Builtin {
    pub fn new(arity: usize, function: BuiltinFn) -> Self {
        Self {
            arity,
            function,
            angle: AngleHandling::None,
        }
    }

    pub fn with_angle(mut self, angle: AngleHandling) -> Self {
        self.angle = angle;
        self
    }

    /// Invokes the function; a non-finite result is a domain error.
    pub fn call(&self, args: &[f64]) -> Result<f64> {
        let value = (self.function)(args)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CalcError::domain("Result is not a finite number"))
        }
    }
}

/// Name tables consulted by the parser (arity), the evaluator and the compiler.
/// Extending the calculator means registering another entry here.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Builtin>,
    constants: HashMap<String, Number>,
}

impl FunctionRegistry {
    /// An empty registry; see `with_builtins` for the standard set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_functions(&mut registry);
        registry
    }

    pub fn register(&mut self, name: &str, builtin: Builtin) {
        self.functions.insert(name.to_string(), builtin);
    }

    pub fn register_function(&mut self, name: &str, arity: usize, function: BuiltinFn) {
        self.register(name, Builtin::new(arity, function));
    }

    pub fn register_constant(&mut self, name: &str, value: Number) {
        self.constants.insert(name.to_string(), value);
    }

    pub fn function(&self, name: &str) -> Option<&Builtin> {
        self.functions.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<&Number> {
        self.constants.get(name)
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn is_constant(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

pub fn register_functions(registry: &mut FunctionRegistry) {
    trig::register(registry);
    exponential::register(registry);
    other::register(registry);
    register_constants(registry);
}

fn register_constants(registry: &mut FunctionRegistry) {
    let pi = Number::pi();
    registry.register_constant("tau", pi.clone() * Number::from_integer(2));
    registry.register_constant("pi", pi);
    registry.register_constant("e", Number::e());
    registry.register_constant("phi", Number::phi());
}
