use crate::ast::lexer::{tokenize, Token, TokenKind};
use crate::ast::{ASTNode, Operator, UnaryOperator};
use crate::error::{CalcError, Result};
use crate::functions::FunctionRegistry;
use log::debug;

/// Deepest operator/parenthesis nesting the parser accepts.
pub const MAX_DEPTH: usize = 256;
/// Longest token stream (excluding the end marker) the parser accepts.
pub const MAX_TOKENS: usize = 2048;

/// `√` takes the operand right after it, postfix `!` included, so `√4^2`
/// reads as `(√4)^2`.
const ROOT_BINDING_POWER: u8 = 9;

/// Precedence-climbing parser over a token vector.
///
/// Function names and constants are looked up in the registry while parsing,
/// so a known function must be called with parentheses and its exact arity.
/// Any other identifier becomes a `Variable`.
pub struct ExpressionParser<'a> {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
    registry: &'a FunctionRegistry,
}

impl<'a> ExpressionParser<'a> {
    pub fn new(input: &str, registry: &'a FunctionRegistry) -> Result<Self> {
        let tokens = tokenize(input)?;
        if tokens.len() > MAX_TOKENS + 1 {
            return Err(CalcError::parse(
                format!("at most {} tokens", MAX_TOKENS),
                tokens[MAX_TOKENS].position,
            ));
        }
        Ok(Self {
            tokens,
            index: 0,
            depth: 0,
            registry,
        })
    }

    /// Parses `input`. `Ok(None)` means the input held no tokens at all.
    pub fn parse(input: &str, registry: &'a FunctionRegistry) -> Result<Option<ASTNode>> {
        Self::new(input, registry)?.parse_expression()
    }

    pub fn parse_expression(&mut self) -> Result<Option<ASTNode>> {
        if self.peek().kind == TokenKind::End {
            return Ok(None);
        }
        let ast = self.expression(0)?;
        self.expect(TokenKind::End, "end of input")?;
        debug!("parsed {} tokens into {}", self.tokens.len() - 1, ast);
        Ok(Some(ast))
    }

    fn peek(&self) -> &Token {
        // `tokenize` always ends with `End`, and `advance` never moves past it.
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::End {
            self.index += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(CalcError::parse(expected, self.peek().position))
        }
    }

    fn expression(&mut self, min_bp: u8) -> Result<ASTNode> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::parse(
                format!("nesting depth of at most {}", MAX_DEPTH),
                self.peek().position,
            ));
        }
        let result = self.climb(min_bp);
        self.depth -= 1;
        result
    }

    fn climb(&mut self, min_bp: u8) -> Result<ASTNode> {
        let mut lhs = self.prefix()?;

        loop {
            let kind = self.peek().kind;

            if kind == TokenKind::Bang {
                if UnaryOperator::Factorial.binding_power() < min_bp {
                    break;
                }
                self.advance();
                lhs = ASTNode::unary(UnaryOperator::Factorial, lhs);
                continue;
            }

            // An identifier or `(` right after a complete operand multiplies it.
            let (operator, implicit) = match kind {
                TokenKind::Plus => (Operator::Add, false),
                TokenKind::Minus => (Operator::Subtract, false),
                TokenKind::Star => (Operator::Multiply, false),
                TokenKind::Slash => (Operator::Divide, false),
                TokenKind::Percent => (Operator::Modulo, false),
                TokenKind::Caret => (Operator::Power, false),
                TokenKind::Identifier | TokenKind::LParen | TokenKind::Root => {
                    (Operator::Multiply, true)
                }
                _ => break,
            };

            let (lbp, rbp) = operator.binding_power();
            if lbp < min_bp {
                break;
            }
            if !implicit {
                self.advance();
            }
            let rhs = self.expression(rbp)?;
            lhs = ASTNode::binary(lhs, operator, rhs);
        }

        Ok(lhs)
    }

    fn prefix(&mut self) -> Result<ASTNode> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number => token
                .value
                .map(ASTNode::Number)
                .ok_or_else(|| CalcError::parse("a number", token.position)),
            TokenKind::Minus => {
                let operand = self.expression(UnaryOperator::Negate.binding_power())?;
                Ok(ASTNode::unary(UnaryOperator::Negate, operand))
            }
            // Unary plus is accepted and dropped.
            TokenKind::Plus => self.expression(UnaryOperator::Negate.binding_power()),
            TokenKind::LParen => {
                let inner = self.expression(0)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Root => {
                let operand = self.expression(ROOT_BINDING_POWER)?;
                Ok(ASTNode::call("sqrt", vec![operand]))
            }
            TokenKind::Identifier => self.identifier(token),
            _ => Err(CalcError::parse("an operand", token.position)),
        }
    }

    fn identifier(&mut self, token: Token) -> Result<ASTNode> {
        let name = token.lexeme;

        if let Some(builtin) = self.registry.function(&name) {
            let arity = builtin.arity;
            self.expect(TokenKind::LParen, &format!("'(' after '{}'", name))?;
            let mut args = Vec::with_capacity(arity);
            for i in 0..arity {
                if i > 0 {
                    self.expect(TokenKind::Comma, "','")?;
                }
                args.push(self.expression(0)?);
            }
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(ASTNode::call(name, args));
        }

        if self.registry.is_constant(&name) {
            return Ok(ASTNode::Constant(name));
        }

        Ok(ASTNode::Variable(name))
    }
}
