use crate::error::{CalcError, Result};
use crate::functions::FunctionRegistry;
use crate::number::Number;
use omnicalc_macros::builtin;
use std::f64::consts::{LN_2, LOG10_2};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_function("sqrt", 1, sqrt);
    registry.register_function("cbrt", 1, cbrt);
    registry.register_function("exp", 1, exp);
    registry.register_function("ln", 1, ln);
    // `log` is the base-10 logarithm on a calculator keypad.
    registry.register_function("log", 1, log10);
    registry.register_function("log10", 1, log10);
    registry.register_function("log2", 1, log2);
}

fn check_positive(x: f64) -> Result<()> {
    if x <= 0.0 {
        return Err(CalcError::domain("Logarithm of a non-positive number"));
    }
    Ok(())
}

/// Logarithms and roots of arguments that do not fit an `f64`, computed from
/// the split `x = m * 2^k`. `None` when the plain `f64` builtin applies.
pub(crate) fn wide_range(name: &str, x: &Number) -> Option<Result<Number>> {
    if x.is_zero() || x.to_f64().is_normal() {
        return None;
    }
    let (m, k) = x.abs().split_exp2()?;
    let negative = x.is_negative();

    let value = match name {
        "ln" | "log" | "log10" | "log2" if negative => {
            return Some(Err(CalcError::domain("Logarithm of a non-positive number")))
        }
        "ln" => m.ln() + k as f64 * LN_2,
        "log" | "log10" => m.log10() + k as f64 * LOG10_2,
        "log2" => m.log2() + k as f64,
        "sqrt" if negative => {
            return Some(Err(CalcError::domain("Square root of a negative number")))
        }
        "sqrt" => {
            let (m, k) = if k % 2 == 0 { (m, k) } else { (m * 2.0, k - 1) };
            return Some(Number::from_f64(m.sqrt()).map(|root| root.mul_exp2(k / 2)));
        }
        "cbrt" => {
            let r = k.rem_euclid(3);
            let root = (m * 2f64.powi(r as i32)).cbrt();
            return Some(Number::from_f64(root).map(|root| {
                let root = root.mul_exp2((k - r) / 3);
                if negative {
                    -root
                } else {
                    root
                }
            }));
        }
        _ => return None,
    };
    Some(Number::from_f64(value))
}

#[builtin]
fn sqrt(x: f64) -> Result<f64> {
    if x < 0.0 {
        return Err(CalcError::domain("Square root of a negative number"));
    }
    Ok(x.sqrt())
}

#[builtin]
fn cbrt(x: f64) -> Result<f64> {
    Ok(x.cbrt())
}

#[builtin]
fn exp(x: f64) -> Result<f64> {
    Ok(x.exp())
}

#[builtin]
fn ln(x: f64) -> Result<f64> {
    check_positive(x)?;
    Ok(x.ln())
}

#[builtin]
fn log10(x: f64) -> Result<f64> {
    check_positive(x)?;
    Ok(x.log10())
}

#[builtin]
fn log2(x: f64) -> Result<f64> {
    check_positive(x)?;
    Ok(x.log2())
}
