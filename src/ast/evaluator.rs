use crate::ast::ASTNode;
use crate::config::{AngleUnit, EvaluationConfig};
use crate::error::{CalcError, Result};
use crate::functions::{exponential, other, trig, AngleHandling, Builtin, FunctionRegistry};
use crate::number::Number;
use log::trace;
use num_traits::ToPrimitive;
use std::collections::HashMap;

/// Tree-walking evaluator over exact `Number`s.
///
/// Holds only shared references, so one evaluator can serve any number of
/// calls (and threads); nothing is mutated while evaluating.
pub struct Evaluator<'a> {
    registry: &'a FunctionRegistry,
    config: &'a EvaluationConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a FunctionRegistry, config: &'a EvaluationConfig) -> Self {
        Self { registry, config }
    }

    /// Evaluates `ast`, resolving `Variable` nodes from `context`.
    pub fn evaluate(&self, ast: &ASTNode, context: &HashMap<String, Number>) -> Result<Number> {
        match ast {
            ASTNode::Number(n) => Ok(n.clone()),

            ASTNode::Constant(name) => self
                .registry
                .constant(name)
                .cloned()
                .ok_or_else(|| CalcError::name(name.as_str())),

            ASTNode::Variable(name) => context
                .get(name)
                .cloned()
                .ok_or_else(|| CalcError::name(name.as_str())),

            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => {
                let left_value = self.evaluate(left, context)?;
                let right_value = self.evaluate(right, context)?;
                operator.apply(&left_value, &right_value)
            }

            ASTNode::UnaryOperation { operator, operand } => {
                operator.apply(&self.evaluate(operand, context)?)
            }

            ASTNode::FunctionCall { name, args } => {
                let builtin = self
                    .registry
                    .function(name)
                    .ok_or_else(|| CalcError::name(name.as_str()))?;
                if args.len() != builtin.arity {
                    return Err(CalcError::arity(name.as_str(), builtin.arity, args.len()));
                }

                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg, context))
                    .collect::<Result<Vec<_>>>()?;
                let result = self.call(name, builtin, &values)?;
                trace!("{}({:?}) = {}", name, values, result);
                Ok(result)
            }
        }
    }

    fn call(&self, name: &str, builtin: &Builtin, values: &[Number]) -> Result<Number> {
        let degrees = self.config.angle_unit == AngleUnit::Degrees;

        if builtin.angle == AngleHandling::None {
            if let Some(value) = other::exact(name, values) {
                return Ok(value);
            }
            if let [x] = values {
                if let Some(result) = exponential::wide_range(name, x) {
                    return result;
                }
            }
        }

        let args = match (builtin.angle, degrees, values) {
            (AngleHandling::Argument, true, [angle]) => {
                let reduced = reduce_degrees(angle)?;
                if let Some(exact) = right_angle_of(name, &reduced) {
                    return exact.map(Number::from_integer);
                }
                let radians = (reduced * Number::pi()).checked_div(&Number::from_integer(180))?;
                vec![radians.to_f64()]
            }
            _ => values.iter().map(Number::to_f64).collect(),
        };

        let mut result = builtin.call(&args)?;
        if builtin.angle == AngleHandling::Result && degrees {
            result = result.to_degrees();
        }
        Number::from_f64(result)
    }
}

/// Angle reduced exactly into `[0, 360)`.
fn reduce_degrees(angle: &Number) -> Result<Number> {
    let full_turn = Number::from_integer(360);
    let reduced = angle.checked_rem(&full_turn)?;
    if reduced.is_negative() {
        Ok(reduced + full_turn)
    } else {
        Ok(reduced)
    }
}

fn right_angle_of(name: &str, reduced: &Number) -> Option<Result<i64>> {
    let quadrants = reduced.checked_div(&Number::from_integer(90)).ok()?;
    if !quadrants.is_integer() {
        return None;
    }
    let quadrant = quadrants.trunc_to_bigint().to_u8()?;
    trig::right_angle(name, quadrant)
}
