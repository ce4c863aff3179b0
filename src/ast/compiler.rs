use crate::ast::{ASTNode, Operator, UnaryOperator};
use crate::config::AngleUnit;
use crate::error::{CalcError, Result};
use crate::functions::{trig, AngleHandling, Builtin, FunctionRegistry};
use log::trace;

/// Largest `n` whose factorial is finite in `f64`.
const MAX_F64_FACTORIAL: f64 = 170.0;

/// Instructions of the postfix program run by `Executor`.
#[derive(Debug, Clone)]
pub enum Instruction {
    Push(f64),
    /// Pushes the value bound to the program's variable.
    LoadVariable,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Neg,
    Factorial,
    Call { name: String, builtin: Builtin },
}

impl From<Operator> for Instruction {
    fn from(value: Operator) -> Self {
        match value {
            Operator::Add => Instruction::Add,
            Operator::Subtract => Instruction::Sub,
            Operator::Multiply => Instruction::Mul,
            Operator::Divide => Instruction::Div,
            Operator::Modulo => Instruction::Mod,
            Operator::Power => Instruction::Pow,
        }
    }
}

impl From<UnaryOperator> for Instruction {
    fn from(value: UnaryOperator) -> Self {
        match value {
            UnaryOperator::Negate => Instruction::Neg,
            UnaryOperator::Factorial => Instruction::Factorial,
        }
    }
}

/// A compiled expression of a single free variable.
#[derive(Debug, Clone)]
pub struct Program {
    variable: String,
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

pub struct Compiler;

impl Compiler {
    /// Compiles `ast` against `registry`. Names are resolved here, so a
    /// program never fails with a `NameError` at run time.
    pub fn compile(ast: &ASTNode, registry: &FunctionRegistry, variable: &str) -> Result<Program> {
        let mut instructions = Vec::new();
        Self::compile_node(ast, registry, variable, &mut instructions)?;
        trace!("compiled {} into {} instructions", ast, instructions.len());
        Ok(Program {
            variable: variable.to_string(),
            instructions,
        })
    }

    fn compile_node(
        node: &ASTNode,
        registry: &FunctionRegistry,
        variable: &str,
        instructions: &mut Vec<Instruction>,
    ) -> Result<()> {
        match node {
            ASTNode::Number(n) => instructions.push(Instruction::Push(n.to_f64())),
            ASTNode::Constant(name) => {
                let value = registry
                    .constant(name)
                    .ok_or_else(|| CalcError::name(name.as_str()))?;
                instructions.push(Instruction::Push(value.to_f64()));
            }
            ASTNode::Variable(name) if name == variable => {
                instructions.push(Instruction::LoadVariable)
            }
            ASTNode::Variable(name) => return Err(CalcError::name(name.as_str())),
            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => {
                Self::compile_node(left, registry, variable, instructions)?;
                Self::compile_node(right, registry, variable, instructions)?;
                instructions.push(Instruction::from(*operator));
            }
            ASTNode::UnaryOperation { operator, operand } => {
                Self::compile_node(operand, registry, variable, instructions)?;
                instructions.push(Instruction::from(*operator));
            }
            ASTNode::FunctionCall { name, args } => {
                let builtin = registry
                    .function(name)
                    .ok_or_else(|| CalcError::name(name.as_str()))?;
                if args.len() != builtin.arity {
                    return Err(CalcError::arity(name.as_str(), builtin.arity, args.len()));
                }
                for arg in args {
                    Self::compile_node(arg, registry, variable, instructions)?;
                }
                instructions.push(Instruction::Call {
                    name: name.clone(),
                    builtin: *builtin,
                });
            }
        }
        Ok(())
    }
}

/// Stack machine for compiled programs. Reuses its stack between runs, so keep
/// one executor per thread.
pub struct Executor {
    angle_unit: AngleUnit,
    stack: Vec<f64>,
}

impl Executor {
    pub fn new(angle_unit: AngleUnit) -> Self {
        Self {
            angle_unit,
            stack: Vec::new(),
        }
    }

    /// Runs `program` with its variable bound to `value`. Non-finite results
    /// are reported as domain errors.
    pub fn execute(&mut self, program: &Program, value: f64) -> Result<f64> {
        self.stack.clear();

        for instr in &program.instructions {
            match instr {
                Instruction::Push(n) => self.stack.push(*n),
                Instruction::LoadVariable => self.stack.push(value),

                Instruction::Add
                | Instruction::Sub
                | Instruction::Mul
                | Instruction::Div
                | Instruction::Mod
                | Instruction::Pow => {
                    let right = self.pop()?;
                    let left = self.pop()?;
                    let result = match instr {
                        Instruction::Add => left + right,
                        Instruction::Sub => left - right,
                        Instruction::Mul => left * right,
                        Instruction::Div if right == 0.0 => {
                            return Err(CalcError::domain("Division by zero"))
                        }
                        Instruction::Div => left / right,
                        Instruction::Mod if right == 0.0 => {
                            return Err(CalcError::domain("Modulo by zero"))
                        }
                        Instruction::Mod => left % right,
                        _ => power(left, right)?,
                    };
                    self.stack.push(result);
                }

                Instruction::Neg => {
                    let operand = self.pop()?;
                    self.stack.push(-operand);
                }

                Instruction::Factorial => {
                    let operand = self.pop()?;
                    self.stack.push(factorial(operand)?);
                }

                Instruction::Call { name, builtin } => {
                    if self.stack.len() < builtin.arity {
                        return Err(CalcError::domain("Stack underflow in function call"));
                    }
                    let args = self.stack.split_off(self.stack.len() - builtin.arity);
                    let result = self.call(name, builtin, &args)?;
                    self.stack.push(result);
                }
            }
        }

        let result = self.pop()?;
        if result.is_finite() {
            Ok(result)
        } else {
            Err(CalcError::domain("Result is not a finite number"))
        }
    }

    fn call(&self, name: &str, builtin: &Builtin, args: &[f64]) -> Result<f64> {
        let degrees = self.angle_unit == AngleUnit::Degrees;

        if let (AngleHandling::Argument, true, [angle]) = (builtin.angle, degrees, args) {
            let reduced = angle.rem_euclid(360.0);
            if reduced % 90.0 == 0.0 {
                if let Some(exact) = trig::right_angle(name, (reduced / 90.0) as u8) {
                    return exact.map(|v| v as f64);
                }
            }
            return builtin.call(&[reduced.to_radians()]);
        }

        let result = builtin.call(args)?;
        if builtin.angle == AngleHandling::Result && degrees {
            Ok(result.to_degrees())
        } else {
            Ok(result)
        }
    }

    fn pop(&mut self) -> Result<f64> {
        self.stack
            .pop()
            .ok_or_else(|| CalcError::domain("Expected a value on the stack"))
    }
}

fn power(base: f64, exponent: f64) -> Result<f64> {
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(CalcError::domain(
            "Fractional power of a negative number is not real",
        ));
    }
    if base == 0.0 && exponent < 0.0 {
        return Err(CalcError::domain("Division by zero"));
    }
    Ok(base.powf(exponent))
}

fn factorial(n: f64) -> Result<f64> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(CalcError::domain(
            "Factorial is only defined for non-negative integers",
        ));
    }
    if n > MAX_F64_FACTORIAL {
        return Err(CalcError::domain("Factorial operand is too large"));
    }
    Ok((2..=n as u64).fold(1.0, |acc, k| acc * k as f64))
}
