use crate::error::Result;
use crate::number::Number;
use std::fmt;

mod compiler;
mod evaluator;
mod lexer;
mod normalizer;
mod parser;
mod symbolic;

pub use compiler::*;
pub use evaluator::Evaluator;
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use normalizer::{normalize, normalize_chars};
pub use parser::{ExpressionParser as Parser, MAX_DEPTH, MAX_TOKENS};
pub use symbolic::{differentiate, simplify};

#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    Number(Number),
    Constant(String),
    Variable(String),
    BinaryOperation {
        left: Box<ASTNode>,
        operator: Operator,
        right: Box<ASTNode>,
    },
    UnaryOperation {
        operator: UnaryOperator,
        operand: Box<ASTNode>,
    },
    FunctionCall {
        name: String,
        args: Vec<ASTNode>,
    },
}

impl ASTNode {
    pub fn number(value: i64) -> Self {
        ASTNode::Number(Number::from_integer(value))
    }

    pub fn binary(left: ASTNode, operator: Operator, right: ASTNode) -> Self {
        ASTNode::BinaryOperation {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn unary(operator: UnaryOperator, operand: ASTNode) -> Self {
        ASTNode::UnaryOperation {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<ASTNode>) -> Self {
        ASTNode::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Whether `variable` occurs anywhere in the tree.
    pub fn contains_variable(&self, variable: &str) -> bool {
        match self {
            ASTNode::Variable(name) => name == variable,
            ASTNode::Number(_) | ASTNode::Constant(_) => false,
            ASTNode::BinaryOperation { left, right, .. } => {
                left.contains_variable(variable) || right.contains_variable(variable)
            }
            ASTNode::UnaryOperation { operand, .. } => operand.contains_variable(variable),
            ASTNode::FunctionCall { args, .. } => {
                args.iter().any(|arg| arg.contains_variable(variable))
            }
        }
    }

    /// Binding strength used when printing; atoms bind tightest.
    fn precedence(&self) -> u8 {
        match self {
            ASTNode::Number(n) if n.is_negative() => 3,
            ASTNode::Number(n) if n.to_terminating_decimal().is_none() => 2,
            ASTNode::BinaryOperation { operator, .. } => operator.precedence(),
            ASTNode::UnaryOperation { operator, .. } => operator.precedence(),
            _ => 6,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, node: &ASTNode, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", node)
    } else {
        write!(f, "{}", node)
    }
}

impl fmt::Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ASTNode::Number(n) => write!(f, "{}", n),
            ASTNode::Constant(name) | ASTNode::Variable(name) => f.write_str(name),
            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => {
                let p = operator.precedence();
                if *operator == Operator::Power {
                    write_operand(f, left, left.precedence() <= p)?;
                    f.write_str("^")?;
                    write_operand(f, right, right.precedence() < p)
                } else {
                    write_operand(f, left, left.precedence() < p)?;
                    write!(f, " {} ", operator.symbol())?;
                    write_operand(f, right, right.precedence() <= p)
                }
            }
            ASTNode::UnaryOperation {
                operator: UnaryOperator::Negate,
                operand,
            } => {
                f.write_str("-")?;
                write_operand(f, operand, operand.precedence() < UnaryOperator::Negate.precedence())
            }
            ASTNode::UnaryOperation {
                operator: UnaryOperator::Factorial,
                operand,
            } => {
                write_operand(
                    f,
                    operand,
                    operand.precedence() < UnaryOperator::Factorial.precedence(),
                )?;
                f.write_str("!")
            }
            ASTNode::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl Operator {
    pub fn apply(&self, left: &Number, right: &Number) -> Result<Number> {
        match self {
            Operator::Add => Ok(left.clone() + right.clone()),
            Operator::Subtract => Ok(left.clone() - right.clone()),
            Operator::Multiply => Ok(left.clone() * right.clone()),
            Operator::Divide => left.checked_div(right),
            Operator::Modulo => left.checked_rem(right),
            Operator::Power => left.pow(right),
        }
    }

    /// Left and right binding power for precedence climbing.
    pub fn binding_power(&self) -> (u8, u8) {
        match self {
            Operator::Add | Operator::Subtract => (1, 2),
            Operator::Multiply | Operator::Divide | Operator::Modulo => (3, 4),
            Operator::Power => (8, 7),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Power => "^",
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Operator::Add | Operator::Subtract => 1,
            Operator::Multiply | Operator::Divide | Operator::Modulo => 2,
            Operator::Power => 4,
        }
    }
}

impl TryFrom<&str> for Operator {
    type Error = String;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            "%" => Ok(Operator::Modulo),
            "^" => Ok(Operator::Power),
            _ => Err(format!("Unknown operator: {}", value)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Negate,
    Factorial,
}

impl UnaryOperator {
    pub fn apply(&self, operand: &Number) -> Result<Number> {
        match self {
            UnaryOperator::Negate => Ok(-operand.clone()),
            UnaryOperator::Factorial => operand.factorial(),
        }
    }

    /// Right binding power of prefix minus, left binding power of postfix `!`.
    pub fn binding_power(&self) -> u8 {
        match self {
            UnaryOperator::Negate => 5,
            UnaryOperator::Factorial => 9,
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            UnaryOperator::Negate => 3,
            UnaryOperator::Factorial => 5,
        }
    }
}
