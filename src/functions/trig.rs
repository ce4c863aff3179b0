use crate::error::{CalcError, Result};
use crate::functions::{AngleHandling, Builtin, FunctionRegistry};
use omnicalc_macros::builtin;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register("sin", Builtin::new(1, sin).with_angle(AngleHandling::Argument));
    registry.register("cos", Builtin::new(1, cos).with_angle(AngleHandling::Argument));
    registry.register("tan", Builtin::new(1, tan).with_angle(AngleHandling::Argument));
    registry.register("asin", Builtin::new(1, asin).with_angle(AngleHandling::Result));
    registry.register("acos", Builtin::new(1, acos).with_angle(AngleHandling::Result));
    registry.register("atan", Builtin::new(1, atan).with_angle(AngleHandling::Result));
    registry.register_function("sinh", 1, sinh);
    registry.register_function("cosh", 1, cosh);
    registry.register_function("tanh", 1, tanh);
    registry.register_function("asinh", 1, asinh);
    registry.register_function("acosh", 1, acosh);
    registry.register_function("atanh", 1, atanh);
}

/// Exact value of `name` at `quadrant * 90` degrees, for the functions that
/// have one. `tan` at 90 and 270 degrees is undefined.
pub(crate) fn right_angle(name: &str, quadrant: u8) -> Option<Result<i64>> {
    let quadrant = quadrant % 4;
    match name {
        "sin" => Some(Ok([0, 1, 0, -1][quadrant as usize])),
        "cos" => Some(Ok([1, 0, -1, 0][quadrant as usize])),
        "tan" if quadrant % 2 == 0 => Some(Ok(0)),
        "tan" => Some(Err(CalcError::domain("Tangent is undefined at this angle"))),
        _ => None,
    }
}

#[builtin]
fn sin(x: f64) -> Result<f64> {
    Ok(x.sin())
}

#[builtin]
fn cos(x: f64) -> Result<f64> {
    Ok(x.cos())
}

#[builtin]
fn tan(x: f64) -> Result<f64> {
    Ok(x.tan())
}

#[builtin]
fn asin(x: f64) -> Result<f64> {
    if !(-1.0..=1.0).contains(&x) {
        return Err(CalcError::domain("asin is only defined on [-1, 1]"));
    }
    Ok(x.asin())
}

#[builtin]
fn acos(x: f64) -> Result<f64> {
    if !(-1.0..=1.0).contains(&x) {
        return Err(CalcError::domain("acos is only defined on [-1, 1]"));
    }
    Ok(x.acos())
}

#[builtin]
fn atan(x: f64) -> Result<f64> {
    Ok(x.atan())
}

#[builtin]
fn sinh(x: f64) -> Result<f64> {
    Ok(x.sinh())
}

#[builtin]
fn cosh(x: f64) -> Result<f64> {
    Ok(x.cosh())
}

#[builtin]
fn tanh(x: f64) -> Result<f64> {
    Ok(x.tanh())
}

#[builtin]
fn asinh(x: f64) -> Result<f64> {
    Ok(x.asinh())
}

#[builtin]
fn acosh(x: f64) -> Result<f64> {
    if x < 1.0 {
        return Err(CalcError::domain("acosh is only defined for x >= 1"));
    }
    Ok(x.acosh())
}

#[builtin]
fn atanh(x: f64) -> Result<f64> {
    if x <= -1.0 || x >= 1.0 {
        return Err(CalcError::domain("atanh is only defined on (-1, 1)"));
    }
    Ok(x.atanh())
}
