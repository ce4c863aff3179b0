//! Exact numeric value used by the evaluator.
//!
//! `Number` wraps a `BigRational`, so every decimal literal is represented
//! exactly and `+ - * / %` plus integer powers never pick up binary floating
//! point artifacts. Transcendental results come back through `f64` and are
//! converted exactly from that `f64`.

use crate::error::{CalcError, Result};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Exact powers whose estimated result exceeds this many bits go through `f64`.
const MAX_EXACT_POW_BITS: u64 = 1 << 16;

/// Largest operand accepted by `factorial`.
pub const MAX_FACTORIAL: u64 = 1000;

// Truncated to `CONSTANT_SCALE` decimals, which leaves guard digits beyond
// `MAX_SIGNIFICANT_DIGITS`.
const PI_DIGITS: &[u8] = b"314159265358979323846264338327950288419716939937510582097494459230781640628620899862803482534211706798214808651";
const E_DIGITS: &[u8] = b"271828182845904523536028747135266249775724709369995957496696762772407663035354759457138217852516642742746639193";
const PHI_DIGITS: &[u8] = b"161803398874989484820458683436563811772030917980576286213544862270526046281890244970720720418939113748475408807";
const CONSTANT_SCALE: u32 = 110;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Number(BigRational);

impl Number {
    pub fn zero() -> Self {
        Number(BigRational::zero())
    }

    pub fn one() -> Self {
        Number(BigRational::one())
    }

    pub fn from_integer(value: i64) -> Self {
        Number(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn from_bigint(value: BigInt) -> Self {
        Number(BigRational::from_integer(value))
    }

    pub fn from_ratio(value: BigRational) -> Self {
        Number(value)
    }

    /// Parses an unsigned decimal literal: digits with at most one `.`.
    pub fn parse_decimal(text: &str) -> Option<Number> {
        let (int_part, frac_part) = match text.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (text, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let digits = format!("{}{}", int_part, frac_part);
        let numer = BigInt::parse_bytes(digits.as_bytes(), 10)?;
        let denom = pow10(frac_part.len() as u32);
        Some(Number(BigRational::new(numer, denom)))
    }

    /// Converts a finite `f64` exactly. Non-finite input is a domain error.
    pub fn from_f64(value: f64) -> Result<Number> {
        if !value.is_finite() {
            return Err(CalcError::domain("Result is not a finite number"));
        }
        BigRational::from_float(value)
            .map(Number)
            .ok_or_else(|| CalcError::domain("Result is not a finite number"))
    }

    pub fn pi() -> Number {
        Self::constant(PI_DIGITS, std::f64::consts::PI)
    }

    pub fn e() -> Number {
        Self::constant(E_DIGITS, std::f64::consts::E)
    }

    /// The golden ratio `(1 + sqrt(5)) / 2`.
    pub fn phi() -> Number {
        Self::constant(PHI_DIGITS, (1.0 + 5f64.sqrt()) / 2.0)
    }

    fn constant(digits: &[u8], fallback: f64) -> Number {
        BigInt::parse_bytes(digits, 10)
            .map(|numer| Number(BigRational::new(numer, pow10(CONSTANT_SCALE))))
            .unwrap_or_else(|| {
                Number(BigRational::from_float(fallback).unwrap_or_else(BigRational::zero))
            })
    }

    pub fn as_ratio(&self) -> &BigRational {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    pub fn abs(&self) -> Number {
        Number(self.0.abs())
    }

    /// Integer part, truncated toward zero.
    pub fn trunc_to_bigint(&self) -> BigInt {
        self.0.trunc().to_integer()
    }

    /// Nearest `f64`. Huge magnitudes become infinities, tiny ones zero.
    pub fn to_f64(&self) -> f64 {
        let numer = self.0.numer();
        let denom = self.0.denom();
        let shift = numer.bits().max(denom.bits()).saturating_sub(1000) as usize;
        let n = (numer >> shift).to_f64().unwrap_or(f64::NAN);
        let d = (denom >> shift).to_f64().unwrap_or(f64::NAN);
        n / d
    }

    /// Splits a positive value into `m * 2^k` with `m` in `[1, 2)`, so its
    /// logarithms and roots can be taken even when the value itself is out of
    /// `f64` range. `None` for zero and negative values.
    pub fn split_exp2(&self) -> Option<(f64, i64)> {
        if !self.0.is_positive() {
            return None;
        }
        let numer = self.0.numer();
        let denom = self.0.denom();
        let mut k = numer.bits() as i64 - denom.bits() as i64;
        let scaled = if k >= 0 {
            BigRational::new_raw(numer.clone(), denom << k as usize)
        } else {
            BigRational::new_raw(numer << k.unsigned_abs() as usize, denom.clone())
        };
        let mut m = Number(scaled).to_f64();
        if m < 1.0 {
            m *= 2.0;
            k -= 1;
        }
        Some((m, k))
    }

    /// Exact `self * 2^k`.
    pub fn mul_exp2(&self, k: i64) -> Number {
        let factor = BigRational::from_integer(BigInt::one() << k.unsigned_abs() as usize);
        if k < 0 {
            Number(&self.0 / factor)
        } else {
            Number(&self.0 * factor)
        }
    }

    pub fn checked_div(&self, rhs: &Number) -> Result<Number> {
        if rhs.is_zero() {
            return Err(CalcError::domain("Division by zero"));
        }
        Ok(Number(&self.0 / &rhs.0))
    }

    /// Remainder with the sign of the dividend: `a - b * trunc(a / b)`.
    pub fn checked_rem(&self, rhs: &Number) -> Result<Number> {
        if rhs.is_zero() {
            return Err(CalcError::domain("Modulo by zero"));
        }
        let quotient = (&self.0 / &rhs.0).trunc();
        Ok(Number(&self.0 - &rhs.0 * quotient))
    }

    /// Real-valued power. Integer exponents stay exact while the result is of
    /// reasonable size; fractional exponents of negative bases are rejected.
    pub fn pow(&self, exponent: &Number) -> Result<Number> {
        if exponent.is_integer() {
            if let Some(exp) = exponent.trunc_to_bigint().to_i64() {
                if self.is_zero() && exp < 0 {
                    return Err(CalcError::domain("Division by zero"));
                }
                let bits = self.0.numer().bits().max(self.0.denom().bits()).max(1);
                if bits.saturating_mul(exp.unsigned_abs()) <= MAX_EXACT_POW_BITS {
                    return Ok(self.powi(exp));
                }
            }
        } else if self.is_negative() {
            return Err(CalcError::domain(
                "Fractional power of a negative number is not real",
            ));
        }

        Number::from_f64(self.to_f64().powf(exponent.to_f64()))
    }

    fn powi(&self, exp: i64) -> Number {
        let magnitude = exp.unsigned_abs() as u32;
        let numer = self.0.numer().pow(magnitude);
        let denom = self.0.denom().pow(magnitude);
        if exp < 0 {
            Number(BigRational::new(denom, numer))
        } else {
            Number(BigRational::new(numer, denom))
        }
    }

    /// `n!` for non-negative integers up to `MAX_FACTORIAL`.
    pub fn factorial(&self) -> Result<Number> {
        if !self.is_integer() || self.is_negative() {
            return Err(CalcError::domain(
                "Factorial is only defined for non-negative integers",
            ));
        }
        let n = self
            .trunc_to_bigint()
            .to_u64()
            .filter(|n| *n <= MAX_FACTORIAL)
            .ok_or_else(|| CalcError::domain("Factorial operand is too large"))?;

        let product = (2..=n).fold(BigInt::one(), |acc, k| acc * BigInt::from(k));
        Ok(Number::from_bigint(product))
    }

    /// Decimal expansion when the value terminates, `None` for values like 1/3.
    pub fn to_terminating_decimal(&self) -> Option<String> {
        let denom = self.0.denom();
        let (twos, fives, rest) = strip_two_five(denom.clone());
        if !rest.is_one() {
            return None;
        }

        let scale = twos.max(fives);
        let scaled = self.0.numer() * (pow10(scale) / denom);
        let digits = scaled.abs().to_str_radix(10);
        let sign = if scaled.is_negative() { "-" } else { "" };
        if scale == 0 {
            return Some(format!("{}{}", sign, digits));
        }

        let scale = scale as usize;
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        Some(format!("{}{}.{}", sign, int_part, frac_part))
    }
}

pub(crate) fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

fn strip_two_five(mut value: BigInt) -> (u32, u32, BigInt) {
    let two = BigInt::from(2u32);
    let five = BigInt::from(5u32);
    let mut twos = 0;
    let mut fives = 0;
    while !value.is_zero() && (&value % &two).is_zero() {
        value /= &two;
        twos += 1;
    }
    while !value.is_zero() && (&value % &five).is_zero() {
        value /= &five;
        fives += 1;
    }
    (twos, fives, value)
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Self) -> Self::Output {
        Number(self.0 + rhs.0)
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, rhs: Self) -> Self::Output {
        Number(self.0 - rhs.0)
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Self) -> Self::Output {
        Number(self.0 * rhs.0)
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Self::Output {
        Number(-self.0)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::from_integer(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_terminating_decimal() {
            Some(decimal) => f.write_str(&decimal),
            None => write!(f, "{}/{}", self.0.numer(), self.0.denom()),
        }
    }
}
