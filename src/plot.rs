//! Sample generation for function plots.

use crate::ast::{normalize, Compiler, Executor, Parser, Program};
use crate::config::EvaluationConfig;
use crate::error::Result;
use crate::functions::FunctionRegistry;
use log::{debug, trace};
use lru::LruCache;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Compiled programs kept per generator.
pub const DEFAULT_CACHE_SIZE: usize = 32;

/// Name of the free variable in plotted expressions.
pub const DEFAULT_VARIABLE: &str = "x";

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
}

/// Closed interval `[min, max]` to sample.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// The `i`-th of `steps + 1` evenly spaced points, computed directly from
    /// the index so no rounding error accumulates across the domain.
    pub fn x_at(&self, i: usize, steps: usize) -> f64 {
        if steps == 0 {
            return self.min;
        }
        self.min + (self.max - self.min) * i as f64 / steps as f64
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::new(-10.0, 10.0)
    }
}

/// Evaluates a one-variable expression over a domain.
///
/// Expressions are compiled once to a postfix program and cached; samples are
/// then run in parallel, one executor per worker thread. Points whose
/// evaluation fails are left out, which shows up as a gap in the curve.
pub struct SampleGenerator {
    registry: Arc<FunctionRegistry>,
    variable: String,
    cache: Mutex<LruCache<String, Arc<Program>>>,
}

impl SampleGenerator {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        Self::with_capacity(registry, DEFAULT_CACHE_SIZE)
    }

    pub fn with_capacity(registry: Arc<FunctionRegistry>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            registry,
            variable: DEFAULT_VARIABLE.to_string(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn with_variable(mut self, variable: &str) -> Self {
        self.variable = variable.to_string();
        self.cache.lock().clear();
        self
    }

    /// Compiles `expression`, reusing a cached program when the normalized
    /// text has been seen before. `Ok(None)` for an empty expression.
    pub fn compile(&self, expression: &str) -> Result<Option<Arc<Program>>> {
        let key = normalize(expression).trim().to_string();
        if let Some(program) = self.cache.lock().get(&key) {
            trace!("program cache hit for '{}'", key);
            return Ok(Some(Arc::clone(program)));
        }

        let ast = match Parser::parse(expression, &self.registry)? {
            Some(ast) => ast,
            None => return Ok(None),
        };
        let program = Arc::new(Compiler::compile(&ast, &self.registry, &self.variable)?);
        self.cache.lock().put(key, Arc::clone(&program));
        Ok(Some(program))
    }

    /// `steps + 1` samples of `expression` over `domain`, ordered by x.
    pub fn generate(
        &self,
        expression: &str,
        domain: Domain,
        steps: usize,
        config: &EvaluationConfig,
    ) -> Vec<SamplePoint> {
        if !domain.is_valid() {
            debug!("invalid plot domain {:?}", domain);
            return Vec::new();
        }

        let program = match self.compile(expression) {
            Ok(Some(program)) => program,
            Ok(None) => return Vec::new(),
            Err(e) => {
                debug!("cannot plot '{}': {}", expression, e);
                return Vec::new();
            }
        };

        let angle_unit = config.angle_unit;
        let samples: Vec<Option<SamplePoint>> = (0..=steps)
            .into_par_iter()
            .map_init(
                || Executor::new(angle_unit),
                |executor, i| {
                    let x = domain.x_at(i, steps);
                    match executor.execute(&program, x) {
                        Ok(y) => Some(SamplePoint { x, y }),
                        Err(e) => {
                            trace!("no sample at x = {}: {}", x, e);
                            None
                        }
                    }
                },
            )
            .collect();

        let points: Vec<SamplePoint> = samples.into_iter().flatten().collect();
        debug!(
            "sampled '{}' at {} of {} points",
            expression,
            points.len(),
            steps + 1
        );
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AngleUnit;

    fn generator() -> SampleGenerator {
        SampleGenerator::new(Arc::new(FunctionRegistry::with_builtins()))
    }

    #[test]
    fn test_evenly_spaced() {
        let points = generator().generate("2x", Domain::new(0.0, 1.0), 4, &EvaluationConfig::default());
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(points[4].y, 2.0);
    }

    #[test]
    fn test_failed_samples_are_omitted() {
        let points = generator().generate(
            "1/x",
            Domain::new(-10.0, 10.0),
            100,
            &EvaluationConfig::default(),
        );
        assert_eq!(points.len(), 100);
        assert!(points.iter().all(|p| p.x != 0.0 && p.y.is_finite()));
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn test_sqrt_gap() {
        let points = generator().generate("sqrt(x)", Domain::new(-1.0, 1.0), 2, &EvaluationConfig::default());
        assert_eq!(points, vec![SamplePoint { x: 0.0, y: 0.0 }, SamplePoint { x: 1.0, y: 1.0 }]);
    }

    #[test]
    fn test_degenerate_inputs() {
        let config = EvaluationConfig::default();
        let generator = generator();
        assert_eq!(generator.generate("x", Domain::new(3.0, 5.0), 0, &config).len(), 1);
        assert!(generator.generate("x", Domain::new(5.0, 3.0), 10, &config).is_empty());
        assert!(generator.generate("x", Domain::new(f64::NAN, 3.0), 10, &config).is_empty());
        assert!(generator.generate("", Domain::default(), 10, &config).is_empty());
        assert!(generator.generate("x +", Domain::default(), 10, &config).is_empty());
        assert!(generator.generate("x + y", Domain::default(), 10, &config).is_empty());
    }

    #[test]
    fn test_angle_unit_is_respected() {
        let config = EvaluationConfig::default().with_angle_unit(AngleUnit::Degrees);
        let points = generator().generate("sin(x)", Domain::new(0.0, 90.0), 1, &config);
        assert_eq!(points[1].y, 1.0);
    }

    #[test]
    fn test_programs_are_cached() {
        let generator = generator();
        let first = generator.compile("x^2").unwrap().unwrap();
        let second = generator.compile("x^2").unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(generator.compile("   ").unwrap().is_none());
    }

    #[test]
    fn test_deterministic() {
        let generator = generator();
        let config = EvaluationConfig::default();
        let a = generator.generate("sin(x) * x", Domain::default(), 500, &config);
        let b = generator.generate("sin(x) * x", Domain::default(), 500, &config);
        assert_eq!(a, b);
    }
}
