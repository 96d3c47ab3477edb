//! Infix expression syntax used in benchmark documents.
//!
//! Precedence, loosest first: `||`, `&&`, comparisons, `+ -`, `* / %`, unary
//! `-`/`!`. All binary operators are left-associative. `@id` reads the result
//! of the call carrying that id.

use thiserror::Error;

use crate::model::{BinOp, Expr};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct ExprParseError {
    pub message: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Int(i64),
    Ident(String),
    CallRef(String),
    Op(&'static str),
    LParen,
    RParen,
}

const OPERATORS: [&str; 15] =
    ["||", "&&", "==", "!=", "<=", ">=", "<", ">", "+", "-", "*", "/", "%", "!", "="];

fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, ExprParseError> {
    let bytes = src.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        if c.is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let value = src[start..i].parse::<i64>().map_err(|_| ExprParseError {
                message: format!("integer literal `{}` is out of range", &src[start..i]),
                offset: start,
            })?;
            out.push((start, Token::Int(value)));
        } else if c.is_ascii_alphabetic() || c == '_' || c == '@' {
            i += 1;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            if c == '@' {
                if i == start + 1 {
                    return Err(ExprParseError {
                        message: "expected a call id after `@`".into(),
                        offset: start,
                    });
                }
                out.push((start, Token::CallRef(src[start + 1..i].to_string())));
            } else {
                out.push((start, Token::Ident(src[start..i].to_string())));
            }
        } else if c == '(' {
            out.push((start, Token::LParen));
            i += 1;
        } else if c == ')' {
            out.push((start, Token::RParen));
            i += 1;
        } else {
            let Some(op) = OPERATORS.iter().find(|op| src[i..].starts_with(**op)) else {
                return Err(ExprParseError {
                    message: format!("unexpected character `{c}`"),
                    offset: start,
                });
            };
            if *op == "=" {
                return Err(ExprParseError {
                    message: "`=` is not an operator; use `==` for equality".into(),
                    offset: start,
                });
            }
            out.push((start, Token::Op(op)));
            i += op.len();
        }
    }
    Ok(out)
}

/// Parse one expression, e.g. `(a + b) * 2 > @c1 && flag`.
pub fn parse_expr(src: &str) -> Result<Expr, ExprParseError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0, end: src.len() };
    let expr = parser.binary(0)?;
    if let Some((offset, token)) = parser.tokens.get(parser.pos) {
        return Err(ExprParseError {
            message: format!("unexpected trailing {token:?}"),
            offset: *offset,
        });
    }
    Ok(expr)
}

/// Binary operator table: `(symbol, op, precedence level)`.
const BINARY: [(&str, BinOp, usize); 13] = [
    ("||", BinOp::Or, 0),
    ("&&", BinOp::And, 1),
    ("==", BinOp::Eq, 2),
    ("!=", BinOp::Ne, 2),
    ("<", BinOp::Lt, 2),
    ("<=", BinOp::Le, 2),
    (">", BinOp::Gt, 2),
    (">=", BinOp::Ge, 2),
    ("+", BinOp::Add, 3),
    ("-", BinOp::Sub, 3),
    ("*", BinOp::Mul, 4),
    ("/", BinOp::Div, 4),
    ("%", BinOp::Rem, 4),
];

const UNARY_LEVEL: usize = 5;

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(o, _)| *o)
    }

    fn binary(&mut self, level: usize) -> Result<Expr, ExprParseError> {
        if level == UNARY_LEVEL {
            return self.unary();
        }
        let mut lhs = self.binary(level + 1)?;
        while let Some(Token::Op(sym)) = self.peek() {
            let Some(&(_, op, _)) = BINARY.iter().find(|(s, _, l)| s == sym && *l == level) else {
                break;
            };
            self.pos += 1;
            let rhs = self.binary(level + 1)?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprParseError> {
        match self.peek() {
            Some(Token::Op("-")) => {
                self.pos += 1;
                Ok(match self.unary()? {
                    Expr::Const(v) => Expr::Const(v.wrapping_neg()),
                    other => Expr::binary(BinOp::Sub, Expr::Const(0), other),
                })
            }
            Some(Token::Op("!")) => {
                self.pos += 1;
                let operand = self.unary()?;
                Ok(Expr::binary(BinOp::Eq, operand, Expr::Const(0)))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, ExprParseError> {
        let offset = self.offset();
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        match token {
            Some(Token::Int(v)) => Ok(Expr::Const(v)),
            Some(Token::Ident(name)) => Ok(Expr::Var(name)),
            Some(Token::CallRef(id)) => Ok(Expr::CallResult(id)),
            Some(Token::LParen) => {
                let inner = self.binary(0)?;
                match self.peek() {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(ExprParseError { message: "expected `)`".into(), offset: self.offset() }),
                }
            }
            Some(other) => {
                Err(ExprParseError { message: format!("unexpected {other:?}"), offset })
            }
            None => Err(ExprParseError { message: "unexpected end of expression".into(), offset }),
        }
    }
}
