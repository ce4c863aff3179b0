//! Evaluation configuration and display modes.
//!
//! A configuration is always passed explicitly into evaluation and formatting;
//! nothing here is global.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SIGNIFICANT_DIGITS: usize = 12;
pub const MAX_SIGNIFICANT_DIGITS: usize = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NumeralBase {
    Bin,
    Oct,
    #[default]
    Dec,
    Hex,
}

impl NumeralBase {
    pub const ALL: [NumeralBase; 4] = [
        NumeralBase::Hex,
        NumeralBase::Dec,
        NumeralBase::Oct,
        NumeralBase::Bin,
    ];

    pub fn radix(&self) -> u32 {
        match self {
            NumeralBase::Bin => 2,
            NumeralBase::Oct => 8,
            NumeralBase::Dec => 10,
            NumeralBase::Hex => 16,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NumeralBase::Bin => "BIN",
            NumeralBase::Oct => "OCT",
            NumeralBase::Dec => "DEC",
            NumeralBase::Hex => "HEX",
        }
    }
}

/// Exponent thresholds for switching to scientific notation.
///
/// A rounded value whose leading digit sits at decimal exponent `k` renders as
/// `d.ddde+k` when `k >= exp_pos` or `k <= exp_neg`, and in plain positional
/// notation otherwise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notation {
    pub exp_pos: i64,
    pub exp_neg: i64,
}

impl Default for Notation {
    fn default() -> Self {
        Self {
            exp_pos: 21,
            exp_neg: -7,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub angle_unit: AngleUnit,
    pub significant_digits: usize,
    /// Only consulted by programmer-mode display.
    pub base: NumeralBase,
    pub notation: Notation,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            angle_unit: AngleUnit::Radians,
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
            base: NumeralBase::Dec,
            notation: Notation::default(),
        }
    }
}

impl EvaluationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_angle_unit(mut self, angle_unit: AngleUnit) -> Self {
        self.angle_unit = angle_unit;
        self
    }

    pub fn with_significant_digits(mut self, digits: usize) -> Self {
        self.significant_digits = digits;
        self
    }

    pub fn with_base(mut self, base: NumeralBase) -> Self {
        self.base = base;
        self
    }

    pub fn with_notation(mut self, notation: Notation) -> Self {
        self.notation = notation;
        self
    }

    /// Significant digits clamped to `1..=MAX_SIGNIFICANT_DIGITS`.
    pub fn digits(&self) -> usize {
        self.significant_digits.clamp(1, MAX_SIGNIFICANT_DIGITS)
    }
}

/// Active display mode. Chooses which keypad and which config fields matter;
/// never changes how an expression evaluates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CalcMode {
    #[default]
    Basic,
    Scientific,
    Graphing,
    Programmer,
    Matrix,
    Converter,
}

impl CalcMode {
    pub const ALL: [CalcMode; 6] = [
        CalcMode::Basic,
        CalcMode::Scientific,
        CalcMode::Graphing,
        CalcMode::Programmer,
        CalcMode::Matrix,
        CalcMode::Converter,
    ];

    pub fn uses_angle_unit(&self) -> bool {
        matches!(self, CalcMode::Scientific | CalcMode::Graphing)
    }

    pub fn uses_numeral_base(&self) -> bool {
        matches!(self, CalcMode::Programmer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvaluationConfig::default();
        assert_eq!(config.angle_unit, AngleUnit::Radians);
        assert_eq!(config.significant_digits, 12);
        assert_eq!(config.base, NumeralBase::Dec);
        assert_eq!(config.notation, Notation { exp_pos: 21, exp_neg: -7 });
    }

    #[test]
    fn test_digits_are_clamped() {
        assert_eq!(EvaluationConfig::new().with_significant_digits(0).digits(), 1);
        assert_eq!(
            EvaluationConfig::new()
                .with_significant_digits(10_000)
                .digits(),
            MAX_SIGNIFICANT_DIGITS
        );
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: EvaluationConfig =
            serde_json::from_str(r#"{"angle_unit":"DEGREES"}"#).unwrap();
        assert_eq!(config.angle_unit, AngleUnit::Degrees);
        assert_eq!(config.significant_digits, DEFAULT_SIGNIFICANT_DIGITS);
    }

    #[test]
    fn test_mode_relevance() {
        assert!(CalcMode::Scientific.uses_angle_unit());
        assert!(!CalcMode::Basic.uses_angle_unit());
        assert!(CalcMode::Programmer.uses_numeral_base());
    }
}
