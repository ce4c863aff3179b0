use crate::error::Result;
use crate::functions::FunctionRegistry;
use crate::number::Number;
use num_traits::Signed;
use omnicalc_macros::builtin;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_function("abs", 1, abs);
    registry.register_function("floor", 1, floor);
    registry.register_function("ceil", 1, ceil);
    registry.register_function("round", 1, round);
    registry.register_function("sign", 1, sign);
    registry.register_function("max", 2, max);
    registry.register_function("min", 2, min);
}

/// Rounding, sign and comparison functions computed on the exact values, so
/// they work at any magnitude.
pub(crate) fn exact(name: &str, values: &[Number]) -> Option<Number> {
    let value = match (name, values) {
        ("abs", [x]) => x.as_ratio().abs(),
        ("floor", [x]) => x.as_ratio().floor(),
        ("ceil", [x]) => x.as_ratio().ceil(),
        // Half away from zero, like `f64::round`.
        ("round", [x]) => x.as_ratio().round(),
        ("sign", [x]) => x.as_ratio().signum(),
        ("max", [a, b]) => return Some(a.max(b).clone()),
        ("min", [a, b]) => return Some(a.min(b).clone()),
        _ => return None,
    };
    Some(Number::from_ratio(value))
}

#[builtin]
fn abs(x: f64) -> Result<f64> {
    Ok(x.abs())
}

#[builtin]
fn floor(x: f64) -> Result<f64> {
    Ok(x.floor())
}

#[builtin]
fn ceil(x: f64) -> Result<f64> {
    Ok(x.ceil())
}

/// Half away from zero.
#[builtin]
fn round(x: f64) -> Result<f64> {
    Ok(x.round())
}

#[builtin]
fn sign(x: f64) -> Result<f64> {
    Ok(if x == 0.0 { 0.0 } else { x.signum() })
}

#[builtin]
fn max(a: f64, b: f64) -> Result<f64> {
    Ok(a.max(b))
}

#[builtin]
fn min(a: f64, b: f64) -> Result<f64> {
    Ok(a.min(b))
}
