//! Symbolic rewriting of expression trees: constant folding with algebraic
//! identities, and differentiation with respect to one variable.
//!
//! Both work on angles in radians whatever the configured angle unit.

use crate::ast::{ASTNode, Operator, UnaryOperator};
use crate::error::{CalcError, Result};
use crate::number::Number;

fn is_value(node: &ASTNode, value: i64) -> bool {
    matches!(node, ASTNode::Number(n) if *n == Number::from_integer(value))
}

fn negate(node: ASTNode) -> ASTNode {
    ASTNode::unary(UnaryOperator::Negate, node)
}

/// Folds numeric subtrees and drops neutral elements (`x + 0`, `x * 1`,
/// `x ^ 1`, `--x`). Operations that would fail, like `1 / 0`, are left as is.
pub fn simplify(node: &ASTNode) -> ASTNode {
    match node {
        ASTNode::BinaryOperation {
            left,
            operator,
            right,
        } => simplify_binary(simplify(left), *operator, simplify(right)),

        ASTNode::UnaryOperation {
            operator: UnaryOperator::Negate,
            operand,
        } => match simplify(operand) {
            ASTNode::Number(n) => ASTNode::Number(-n),
            ASTNode::UnaryOperation {
                operator: UnaryOperator::Negate,
                operand,
            } => *operand,
            other => negate(other),
        },

        ASTNode::UnaryOperation { operator, operand } => {
            let operand = simplify(operand);
            if let ASTNode::Number(n) = &operand {
                if let Ok(value) = operator.apply(n) {
                    return ASTNode::Number(value);
                }
            }
            ASTNode::unary(*operator, operand)
        }

        ASTNode::FunctionCall { name, args } => {
            let args: Vec<ASTNode> = args.iter().map(simplify).collect();
            let folded = match (name.as_str(), args.as_slice()) {
                ("ln", [ASTNode::Constant(c)]) if c == "e" => Some(1),
                ("ln" | "log", [arg]) if is_value(arg, 1) => Some(0),
                _ => None,
            };
            match folded {
                Some(value) => ASTNode::number(value),
                None => ASTNode::call(name.as_str(), args),
            }
        }

        _ => node.clone(),
    }
}

fn simplify_binary(left: ASTNode, operator: Operator, right: ASTNode) -> ASTNode {
    if let (ASTNode::Number(a), ASTNode::Number(b)) = (&left, &right) {
        // Non-integer powers would come back as inexact binary floats.
        if operator != Operator::Power || b.is_integer() {
            if let Ok(value) = operator.apply(a, b) {
                return ASTNode::Number(value);
            }
        }
    }

    match operator {
        Operator::Add if is_value(&left, 0) => right,
        Operator::Add | Operator::Subtract if is_value(&right, 0) => left,
        Operator::Subtract if is_value(&left, 0) => simplify(&negate(right)),
        Operator::Add | Operator::Subtract => match right {
            // `a + -2` reads better as `a - 2`.
            ASTNode::Number(n) if n.is_negative() => {
                let flipped = if operator == Operator::Add {
                    Operator::Subtract
                } else {
                    Operator::Add
                };
                ASTNode::binary(left, flipped, ASTNode::Number(-n))
            }
            right => ASTNode::binary(left, operator, right),
        },
        Operator::Multiply if is_value(&left, 0) || is_value(&right, 0) => ASTNode::number(0),
        Operator::Multiply if is_value(&left, 1) => right,
        Operator::Multiply | Operator::Divide if is_value(&right, 1) => left,
        Operator::Power if is_value(&right, 0) => ASTNode::number(1),
        Operator::Power if is_value(&right, 1) => left,
        _ => ASTNode::binary(left, operator, right),
    }
}

/// Derivative of `node` with respect to `variable`, simplified.
///
/// Factorials, `%` and functions without a known derivative are rejected
/// with a `DomainError`.
pub fn differentiate(node: &ASTNode, variable: &str) -> Result<ASTNode> {
    Ok(simplify(&derive(node, variable)?))
}

fn derive(node: &ASTNode, variable: &str) -> Result<ASTNode> {
    if !node.contains_variable(variable) {
        return Ok(ASTNode::number(0));
    }

    match node {
        ASTNode::Variable(_) => Ok(ASTNode::number(1)),

        ASTNode::BinaryOperation {
            left,
            operator,
            right,
        } => {
            let (u, v) = (left.as_ref(), right.as_ref());
            match operator {
                Operator::Add | Operator::Subtract => Ok(ASTNode::binary(
                    derive(u, variable)?,
                    *operator,
                    derive(v, variable)?,
                )),
                Operator::Multiply => Ok(ASTNode::binary(
                    ASTNode::binary(derive(u, variable)?, Operator::Multiply, v.clone()),
                    Operator::Add,
                    ASTNode::binary(u.clone(), Operator::Multiply, derive(v, variable)?),
                )),
                Operator::Divide => {
                    let numerator = ASTNode::binary(
                        ASTNode::binary(derive(u, variable)?, Operator::Multiply, v.clone()),
                        Operator::Subtract,
                        ASTNode::binary(u.clone(), Operator::Multiply, derive(v, variable)?),
                    );
                    let denominator = ASTNode::binary(v.clone(), Operator::Power, ASTNode::number(2));
                    Ok(ASTNode::binary(numerator, Operator::Divide, denominator))
                }
                Operator::Power => derive_power(u, v, variable),
                Operator::Modulo => Err(CalcError::domain("Cannot differentiate '%'")),
            }
        }

        ASTNode::UnaryOperation {
            operator: UnaryOperator::Negate,
            operand,
        } => Ok(negate(derive(operand, variable)?)),

        ASTNode::UnaryOperation {
            operator: UnaryOperator::Factorial,
            ..
        } => Err(CalcError::domain("Cannot differentiate a factorial")),

        ASTNode::FunctionCall { name, args } => match args.as_slice() {
            [u] => {
                let outer = derive_function(name, u)?;
                Ok(ASTNode::binary(outer, Operator::Multiply, derive(u, variable)?))
            }
            _ => Err(CalcError::domain(format!("Cannot differentiate '{}'", name))),
        },

        // Constants and numbers never contain the variable.
        _ => Ok(ASTNode::number(0)),
    }
}

fn derive_power(base: &ASTNode, exponent: &ASTNode, variable: &str) -> Result<ASTNode> {
    let power = || ASTNode::binary(base.clone(), Operator::Power, exponent.clone());
    let ln_base = || ASTNode::call("ln", vec![base.clone()]);

    if !exponent.contains_variable(variable) {
        // n * u^(n-1) * u'
        let reduced = ASTNode::binary(exponent.clone(), Operator::Subtract, ASTNode::number(1));
        return Ok(ASTNode::binary(
            ASTNode::binary(
                exponent.clone(),
                Operator::Multiply,
                ASTNode::binary(base.clone(), Operator::Power, reduced),
            ),
            Operator::Multiply,
            derive(base, variable)?,
        ));
    }

    if !base.contains_variable(variable) {
        // a^v * ln(a) * v'
        return Ok(ASTNode::binary(
            ASTNode::binary(power(), Operator::Multiply, ln_base()),
            Operator::Multiply,
            derive(exponent, variable)?,
        ));
    }

    // u^v * (v' * ln(u) + v * u' / u)
    let inner = ASTNode::binary(
        ASTNode::binary(derive(exponent, variable)?, Operator::Multiply, ln_base()),
        Operator::Add,
        ASTNode::binary(
            ASTNode::binary(exponent.clone(), Operator::Multiply, derive(base, variable)?),
            Operator::Divide,
            base.clone(),
        ),
    );
    Ok(ASTNode::binary(power(), Operator::Multiply, inner))
}

/// Derivative of the outer function `name` evaluated at `u`.
fn derive_function(name: &str, u: &ASTNode) -> Result<ASTNode> {
    let call = |f: &str| ASTNode::call(f, vec![u.clone()]);
    let reciprocal = |denominator: ASTNode| {
        ASTNode::binary(ASTNode::number(1), Operator::Divide, denominator)
    };

    match name {
        "sin" => Ok(call("cos")),
        "cos" => Ok(negate(call("sin"))),
        "tan" => Ok(reciprocal(ASTNode::binary(
            call("cos"),
            Operator::Power,
            ASTNode::number(2),
        ))),
        "exp" => Ok(call("exp")),
        "ln" => Ok(reciprocal(u.clone())),
        "log" | "log10" => Ok(reciprocal(ASTNode::binary(
            u.clone(),
            Operator::Multiply,
            ASTNode::call("ln", vec![ASTNode::number(10)]),
        ))),
        "sqrt" => Ok(reciprocal(ASTNode::binary(
            ASTNode::number(2),
            Operator::Multiply,
            call("sqrt"),
        ))),
        _ => Err(CalcError::domain(format!("Cannot differentiate '{}'", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Parser;
    use crate::functions::FunctionRegistry;

    fn parse(input: &str) -> ASTNode {
        let registry = FunctionRegistry::with_builtins();
        Parser::parse(input, &registry).unwrap().unwrap()
    }

    fn simplified(input: &str) -> String {
        simplify(&parse(input)).to_string()
    }

    fn derivative(input: &str) -> String {
        differentiate(&parse(input), "x").unwrap().to_string()
    }

    #[test]
    fn test_constant_folding() {
        assert_eq!(simplified("2 + 3 * 4"), "14");
        assert_eq!(simplified("x * (2 + 3)"), "x * 5");
        assert_eq!(simplified("2^10"), "1024");
        assert_eq!(simplified("1/3"), "1/3");
        assert_eq!(simplified("1/0"), "1 / 0");
    }

    #[test]
    fn test_identities() {
        assert_eq!(simplified("x + 0"), "x");
        assert_eq!(simplified("0 + x"), "x");
        assert_eq!(simplified("1 * x"), "x");
        assert_eq!(simplified("x * 0"), "0");
        assert_eq!(simplified("x^1"), "x");
        assert_eq!(simplified("x^0"), "1");
        assert_eq!(simplified("--x"), "x");
        assert_eq!(simplified("x + -2"), "x - 2");
        assert_eq!(simplified("ln(e)"), "1");
    }

    #[test]
    fn test_polynomial_derivatives() {
        assert_eq!(derivative("3x"), "3");
        assert_eq!(derivative("x^2"), "2 * x");
        assert_eq!(derivative("x^3 + 5"), "3 * x^2");
        assert_eq!(derivative("7"), "0");
    }

    #[test]
    fn test_chain_rule() {
        assert_eq!(derivative("sin(x)"), "cos(x)");
        assert_eq!(derivative("sin(2x)"), "cos(2 * x) * 2");
        assert_eq!(derivative("ln(x)"), "1 / x");
        assert_eq!(derivative("cos(x)"), "-sin(x)");
    }

    #[test]
    fn test_exponentials() {
        assert_eq!(derivative("e^x"), "e^x");
        assert_eq!(derivative("exp(x)"), "exp(x)");
    }

    #[test]
    fn test_unsupported() {
        let err = differentiate(&parse("x!"), "x").unwrap_err();
        assert!(matches!(err, CalcError::Domain(_)));
        assert!(differentiate(&parse("x % 2"), "x").is_err());
        assert!(differentiate(&parse("abs(x)"), "x").is_err());
    }

    #[test]
    fn test_other_variables_are_constants() {
        assert_eq!(derivative("y * x"), "y");
    }
}
