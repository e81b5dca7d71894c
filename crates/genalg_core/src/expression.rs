//! Text expressions compiled to [`Operation`] values.
//!
//! Grammar, loosest to tightest: `+ -`, `* /`, unary minus, `^` (right
//! associative), then literals, variables, parentheses and calls such as
//! `sin(x)` or `atan2(y, x)`. Variables become argument projections in the
//! order they were declared.

use crate::kinds::{BinaryKind, NullaryKind, StandardConstant, UnaryKind};
use crate::operation::Operation;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("unexpected character `{0}`")]
    UnexpectedCharacter(char),

    #[error("invalid number literal `{0}`")]
    InvalidNumber(String),

    #[error("unexpected token {found}, expected {expected}")]
    UnexpectedToken { found: String, expected: &'static str },

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(&'static str),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("`{function}` takes {expected} argument(s), got {got}")]
    WrongArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Binary(Box<Expr>, BinaryKind, Box<Expr>),
    Negate(Box<Expr>),
    Call(String, Vec<Expr>),
}

/// Resolves variable names to argument positions and emits operations.
pub struct Compiler {
    var_map: HashMap<String, usize>,
}

impl Compiler {
    pub fn new<S: AsRef<str>>(var_names: &[S]) -> Self {
        let var_map = var_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_ref().to_string(), i))
            .collect();
        Self { var_map }
    }

    pub fn compile(&self, expr: &Expr) -> Result<Operation, ExpressionError> {
        match expr {
            Expr::Number(n) => Ok(literal(*n)),
            Expr::Variable(name) => {
                if let Some(&index) = self.var_map.get(name) {
                    Ok(Operation::argument(index))
                } else {
                    match name.parse::<NullaryKind>() {
                        Ok(kind @ (NullaryKind::Pi | NullaryKind::E)) => Ok(Operation::nullary(kind)),
                        _ => Err(ExpressionError::UnknownVariable(name.clone())),
                    }
                }
            }
            Expr::Negate(operand) => Ok(Operation::negate().compose(&self.compile(operand)?)),
            Expr::Binary(left, kind, right) => self.compile_binary(*kind, left, right),
            Expr::Call(name, args) => self.compile_call(name, args),
        }
    }

    fn compile_binary(
        &self,
        kind: BinaryKind,
        left: &Expr,
        right: &Expr,
    ) -> Result<Operation, ExpressionError> {
        // Literals other than 0 and 1 mix in as scalars instead of becoming
        // their own constant operands.
        match (left, right) {
            (_, Expr::Number(n)) if !is_standard(*n) => {
                Ok(Operation::with_scalar(kind, *n).compose(&self.compile(left)?))
            }
            (Expr::Number(n), _) if !is_standard(*n) => {
                Ok(Operation::scalar_with(*n, kind).compose(&self.compile(right)?))
            }
            _ => {
                let slots = vec![self.slot(left, 0)?, self.slot(right, 1)?];
                Ok(Operation::binary(kind).apply(slots))
            }
        }
    }

    fn compile_call(&self, name: &str, args: &[Expr]) -> Result<Operation, ExpressionError> {
        if let Ok(kind) = name.parse::<UnaryKind>() {
            check_arguments(name, 1, args.len())?;
            return Ok(Operation::unary(kind).compose(&self.compile(&args[0])?));
        }
        if let Ok(kind) = name.parse::<BinaryKind>() {
            check_arguments(name, 2, args.len())?;
            let slots = vec![self.slot(&args[0], 0)?, self.slot(&args[1], 1)?];
            return Ok(Operation::binary(kind).apply(slots));
        }
        Err(ExpressionError::UnknownFunction(name.to_string()))
    }

    /// An `apply` slot; a variable already sitting at `position` passes
    /// through.
    fn slot(&self, expr: &Expr, position: usize) -> Result<Option<Operation>, ExpressionError> {
        if let Expr::Variable(name) = expr {
            if self.var_map.get(name) == Some(&position) {
                return Ok(None);
            }
        }
        self.compile(expr).map(Some)
    }
}

fn is_standard(n: f64) -> bool {
    n == 0.0 || n == 1.0
}

fn literal(n: f64) -> Operation {
    if n == 0.0 {
        Operation::constant(StandardConstant::Zero)
    } else if n == 1.0 {
        Operation::constant(StandardConstant::RealOne)
    } else {
        Operation::scalar(n)
    }
}

fn check_arguments(function: &str, expected: usize, got: usize) -> Result<(), ExpressionError> {
    if expected == got {
        Ok(())
    } else {
        Err(ExpressionError::WrongArgumentCount {
            function: function.to_string(),
            expected,
            got,
        })
    }
}

/// A compiled expression over named variables.
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    variables: Vec<String>,
    operation: Operation,
}

impl Expression {
    /// The resulting operation takes one argument per variable, in order.
    pub fn compile<S: AsRef<str>>(source: &str, variables: &[S]) -> Result<Self, ExpressionError> {
        let expr = parse(source)?;
        let operation = Compiler::new(variables).compile(&expr)?;
        let operation = if operation.arity() < variables.len() {
            operation.widen(variables.len())
        } else {
            operation
        };
        Ok(Self {
            source: source.to_string(),
            variables: variables.iter().map(|v| v.as_ref().to_string()).collect(),
            operation,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }
}

// --- Parser ---

pub fn parse(input: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expression()?;
    match parser.consume() {
        None => Ok(expr),
        Some(token) => Err(ExpressionError::UnexpectedToken {
            found: format!("{token:?}"),
            expected: "end of input",
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Comma,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut num_str = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    num_str.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let value = num_str
                .parse()
                .map_err(|_| ExpressionError::InvalidNumber(num_str.clone()))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Identifier(ident));
        } else {
            let token = match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '^' => Token::Caret,
                ',' => Token::Comma,
                '(' => Token::LParen,
                ')' => Token::RParen,
                other => return Err(ExpressionError::UnexpectedCharacter(other)),
            };
            tokens.push(token);
            chars.next();
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, wanted: Token, expected: &'static str) -> Result<(), ExpressionError> {
        match self.consume() {
            Some(token) if token == wanted => Ok(()),
            Some(token) => Err(ExpressionError::UnexpectedToken {
                found: format!("{token:?}"),
                expected,
            }),
            None => Err(ExpressionError::UnexpectedEnd(expected)),
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_term()?;
        loop {
            let kind = match self.peek() {
                Some(Token::Plus) => BinaryKind::Add,
                Some(Token::Minus) => BinaryKind::Subtract,
                _ => break,
            };
            self.consume();
            let right = self.parse_term()?;
            left = Expr::Binary(Box::new(left), kind, Box::new(right));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary()?;
        loop {
            let kind = match self.peek() {
                Some(Token::Star) => BinaryKind::Multiply,
                Some(Token::Slash) => BinaryKind::Divide,
                _ => break,
            };
            self.consume();
            let right = self.parse_unary()?;
            left = Expr::Binary(Box::new(left), kind, Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            let operand = self.parse_unary()?;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            // right associative, and `2^-x` is allowed
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(
                Box::new(base),
                BinaryKind::Power,
                Box::new(exponent),
            ));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Identifier(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume();
                    let args = self.parse_arguments()?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expression()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(expr)
            }
            Some(token) => Err(ExpressionError::UnexpectedToken {
                found: format!("{token:?}"),
                expected: "a number, variable or `(`",
            }),
            None => Err(ExpressionError::UnexpectedEnd("an operand")),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ExpressionError> {
        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.consume();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            match self.consume() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                Some(token) => {
                    return Err(ExpressionError::UnexpectedToken {
                        found: format!("{token:?}"),
                        expected: "`,` or `)`",
                    })
                }
                None => return Err(ExpressionError::UnexpectedEnd("`)`")),
            }
        }
    }
}
