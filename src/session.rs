//! Keystroke-level calculator state, the layer a UI drives.

use crate::config::{AngleUnit, CalcMode, EvaluationConfig, NumeralBase};
use crate::engine::{Engine, Evaluation};
use crate::error::{CalcError, HistoryError};
use crate::format::{base_conversions, format_number};
use crate::history::{HistoryItem, SharedHistory};
use crate::number::Number;
use crate::plot::{Domain, SampleGenerator, SamplePoint, DEFAULT_VARIABLE};
use log::{debug, warn};

/// Display text for any failed evaluation.
pub const ERROR_DISPLAY: &str = "Error";

pub const CLEAR_KEY: &str = "AC";
pub const DELETE_KEY: &str = "DEL";
pub const EVALUATE_KEY: &str = "=";

/// Steps used by `Calculator::plot`.
pub const PLOT_STEPS: usize = 100;

pub struct Calculator {
    engine: Engine,
    sampler: SampleGenerator,
    history: SharedHistory,
    config: EvaluationConfig,
    mode: CalcMode,
    expression: String,
    result: String,
    last_error: Option<CalcError>,
}

impl Calculator {
    pub fn new(engine: Engine, history: SharedHistory) -> Self {
        let sampler = SampleGenerator::new(engine.registry().clone());
        Self {
            engine,
            sampler,
            history,
            config: EvaluationConfig::default(),
            mode: CalcMode::default(),
            expression: String::new(),
            result: String::new(),
            last_error: None,
        }
    }

    pub fn with_config(mut self, config: EvaluationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    /// Specific failure behind the last `"Error"` display, for diagnostics.
    pub fn last_error(&self) -> Option<&CalcError> {
        self.last_error.as_ref()
    }

    pub fn mode(&self) -> CalcMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CalcMode) {
        debug!("mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn set_angle_unit(&mut self, angle_unit: AngleUnit) {
        self.config.angle_unit = angle_unit;
    }

    pub fn set_base(&mut self, base: NumeralBase) {
        self.config.base = base;
    }

    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    /// Applies one key press. `AC` clears, `DEL` drops the last character,
    /// `=` evaluates and anything else is appended to the expression.
    pub fn handle_input(&mut self, key: &str) {
        match key {
            CLEAR_KEY => {
                self.expression.clear();
                self.result.clear();
                self.last_error = None;
            }
            DELETE_KEY => {
                self.expression.pop();
            }
            EVALUATE_KEY => self.commit(),
            _ => self.expression.push_str(key),
        }
    }

    pub fn set_expression(&mut self, expression: impl Into<String>) {
        self.expression = expression.into();
    }

    fn commit(&mut self) {
        self.last_error = None;
        match self.engine.evaluate(&self.expression, &self.config) {
            Ok(Evaluation::Empty) => self.result.clear(),
            Ok(Evaluation::Value(value)) => {
                let display = format_number(&value, &self.config);
                if let Err(e) = self.history.record(self.expression.as_str(), display.as_str()) {
                    warn!("Failed to save history: {}", e);
                }
                self.result = display;
            }
            Err(e) => {
                debug!("evaluation of '{}' failed: {}", self.expression, e);
                self.result = ERROR_DISPLAY.to_string();
                self.last_error = Some(e);
            }
        }
    }

    /// Live result of the current expression without touching history or the
    /// result display. `None` while the expression is empty or invalid.
    pub fn preview(&self) -> Option<String> {
        match self.engine.evaluate(&self.expression, &self.config) {
            Ok(Evaluation::Value(value)) => Some(format_number(&value, &self.config)),
            _ => None,
        }
    }

    /// Loads a past entry back into the display.
    pub fn recall(&mut self, item: &HistoryItem) {
        self.expression = item.expression.clone();
        self.result = item.result.clone();
        self.last_error = None;
    }

    pub fn clear_history(&mut self) -> Result<(), HistoryError> {
        self.history.clear()
    }

    /// Graph of the current expression over [-10, 10]. Without an `x` in the
    /// expression the identity `x` is plotted.
    pub fn plot(&self) -> Vec<SamplePoint> {
        let expression = if self.expression.contains(DEFAULT_VARIABLE) {
            self.expression.as_str()
        } else {
            DEFAULT_VARIABLE
        };
        self.sampler
            .generate(expression, Domain::default(), PLOT_STEPS, &self.config)
    }

    /// Programmer-mode view: the result (or, before `=`, the expression)
    /// read as a number in every base. Unreadable input shows as zero.
    pub fn base_view(&self) -> Vec<(NumeralBase, String)> {
        let source = if self.result.is_empty() {
            &self.expression
        } else {
            &self.result
        };
        let value = match self.engine.evaluate(source, &self.config) {
            Ok(Evaluation::Value(value)) => value,
            _ => Number::zero(),
        };
        base_conversions(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{History, HistoryStore, MemoryStorage};

    fn calculator() -> Calculator {
        let history = History::open(HistoryStore::new(MemoryStorage::new()));
        Calculator::new(Engine::new(), SharedHistory::new(history))
    }

    fn press(calc: &mut Calculator, keys: &[&str]) {
        for key in keys {
            calc.handle_input(key);
        }
    }

    #[test]
    fn test_keystrokes_build_expression() {
        let mut calc = calculator();
        press(&mut calc, &["1", "2", "+", "3", "DEL", "4"]);
        assert_eq!(calc.expression(), "12+4");
        assert_eq!(calc.preview().as_deref(), Some("16"));
        assert_eq!(calc.result(), "");
    }

    #[test]
    fn test_evaluate_records_history() {
        let mut calc = calculator();
        press(&mut calc, &["2", "×", "3", "="]);
        assert_eq!(calc.result(), "6");
        let items = calc.history().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].expression, "2×3");
        assert_eq!(items[0].result, "6");
    }

    #[test]
    fn test_error_and_empty() {
        let mut calc = calculator();
        press(&mut calc, &["="]);
        assert_eq!(calc.result(), "");

        press(&mut calc, &["1", "/", "0", "="]);
        assert_eq!(calc.result(), ERROR_DISPLAY);
        assert!(matches!(calc.last_error(), Some(CalcError::Domain(_))));
        assert!(calc.history().is_empty());

        press(&mut calc, &["AC"]);
        assert_eq!(calc.expression(), "");
        assert_eq!(calc.result(), "");
        assert!(calc.last_error().is_none());
    }

    #[test]
    fn test_angle_unit() {
        let mut calc = calculator();
        calc.set_angle_unit(AngleUnit::Degrees);
        press(&mut calc, &["sin(", "90", ")", "="]);
        assert_eq!(calc.result(), "1");
    }

    #[test]
    fn test_recall_and_clear_history() {
        let mut calc = calculator();
        press(&mut calc, &["5", "!", "="]);
        let item = calc.history().items()[0].clone();
        press(&mut calc, &["AC"]);
        calc.recall(&item);
        assert_eq!(calc.expression(), "5!");
        assert_eq!(calc.result(), "120");
        calc.clear_history().unwrap();
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_plot_falls_back_to_identity() {
        let mut calc = calculator();
        calc.set_mode(CalcMode::Graphing);
        let points = calc.plot();
        assert_eq!(points.len(), PLOT_STEPS + 1);
        assert_eq!(points[0].y, -10.0);

        calc.set_expression("x^2");
        assert_eq!(calc.plot()[0].y, 100.0);
    }

    #[test]
    fn test_base_view() {
        let mut calc = calculator();
        calc.set_mode(CalcMode::Programmer);
        press(&mut calc, &["2", "5", "5"]);
        let view = calc.base_view();
        assert_eq!(view[0], (NumeralBase::Hex, "FF".to_string()));

        press(&mut calc, &["+", "1", "="]);
        assert_eq!(calc.base_view()[3], (NumeralBase::Bin, "0001 0000 0000".to_string()));

        calc.set_expression("oops(");
        calc.handle_input("AC");
        assert_eq!(calc.base_view()[1], (NumeralBase::Dec, "0".to_string()));
    }
}
