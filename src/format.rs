//! Display formatting: significant-digit rounding and programmer-mode
//! base conversion.

use crate::config::{EvaluationConfig, NumeralBase};
use crate::number::{pow10, Number};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

fn pow10_ratio(exp: i64) -> BigRational {
    let magnitude = BigRational::from_integer(pow10(exp.unsigned_abs() as u32));
    if exp < 0 {
        magnitude.recip()
    } else {
        magnitude
    }
}

/// Decimal exponent of the leading digit of a positive value.
fn leading_exponent(value: &BigRational) -> i64 {
    let numer_digits = value.numer().to_str_radix(10).len() as i64;
    let denom_digits = value.denom().to_str_radix(10).len() as i64;
    let estimate = numer_digits - denom_digits;
    if *value >= pow10_ratio(estimate) {
        estimate
    } else {
        estimate - 1
    }
}

/// Rounds `value` (positive) half up to `digits` significant digits. Returns
/// the digit string, exactly `digits` long, and the exponent of its first digit.
fn round_significant(value: &BigRational, digits: usize) -> (String, i64) {
    let mut exponent = leading_exponent(value);
    let scaled = value * pow10_ratio(digits as i64 - 1 - exponent);
    let two = BigInt::from(2);
    let mut mantissa = (scaled.numer() * &two + scaled.denom()) / (scaled.denom() * &two);

    if mantissa == pow10(digits as u32) {
        mantissa = pow10(digits as u32 - 1);
        exponent += 1;
    }
    (mantissa.to_str_radix(10), exponent)
}

/// Formats a result for the display.
///
/// Rounds half up to the configured number of significant digits and trims
/// trailing zeros. Values whose leading digit sits at a decimal exponent
/// outside the configured `Notation` window use `d.ddde+k` form, as in
/// `1e+21` or `1.5e-7`. Zero, including a negative zero, prints as `0`.
pub fn format_number(value: &Number, config: &EvaluationConfig) -> String {
    let ratio = value.as_ratio();
    if ratio.is_zero() {
        return "0".to_string();
    }

    let (digits, exponent) = round_significant(&ratio.abs(), config.digits());
    let digits = digits.trim_end_matches('0');
    let sign = if ratio.is_negative() { "-" } else { "" };

    let notation = config.notation;
    if exponent >= notation.exp_pos || exponent <= notation.exp_neg {
        let (lead, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{}", rest)
        };
        let exp_sign = if exponent < 0 { "-" } else { "+" };
        return format!("{}{}{}e{}{}", sign, lead, fraction, exp_sign, exponent.abs());
    }

    let body = if exponent < 0 {
        format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
    } else {
        let int_len = exponent as usize + 1;
        if digits.len() <= int_len {
            format!("{}{}", digits, "0".repeat(int_len - digits.len()))
        } else {
            let (int_part, frac_part) = digits.split_at(int_len);
            format!("{}.{}", int_part, frac_part)
        }
    };
    format!("{}{}", sign, body)
}

/// Renders the integer part (truncated toward zero) in `base`.
///
/// Digits are upper-case. Binary is left-padded with zeros to a multiple of
/// four digits, at least eight, and grouped by four.
pub fn to_base(value: &Number, base: NumeralBase) -> String {
    let integer = value.trunc_to_bigint();
    let mut digits = integer.abs().to_str_radix(base.radix()).to_uppercase();

    if base == NumeralBase::Bin {
        let width = digits.len().max(8).div_ceil(4) * 4;
        digits = format!("{:0>width$}", digits, width = width);
        digits = digits
            .as_bytes()
            .chunks(4)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(" ");
    }

    if integer.is_negative() {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// `value` in every base of `NumeralBase::ALL`, labelled.
pub fn base_conversions(value: &Number) -> Vec<(NumeralBase, String)> {
    NumeralBase::ALL
        .iter()
        .map(|base| (*base, to_base(value, *base)))
        .collect()
}
