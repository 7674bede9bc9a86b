//! Arithmetic expression evaluation.
//!
//! Input is plain arithmetic: numbers, `+ - * / % ^`, parentheses and
//! whitespace. Cell references and function calls must already have been
//! substituted by the resolver. Evaluation runs in three passes:
//!
//! 1. tokenize (and fold a leading/after-`(` unary minus into its number),
//! 2. shunting-yard conversion to postfix,
//! 3. stack evaluation of the postfix sequence.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::error::{ArithmeticError, ExprError, ParseError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl Operator {
    pub const CHARS: [char; 6] = ['+', '-', '*', '/', '%', '^'];

    pub fn from_char(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            '%' => Some(Operator::Rem),
            '^' => Some(Operator::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Rem => '%',
            Operator::Pow => '^',
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div | Operator::Rem => 2,
            Operator::Pow => 3,
        }
    }

    pub fn is_right_associative(self) -> bool {
        self == Operator::Pow
    }

    fn apply(self, lhs: f64, rhs: f64) -> Result<f64, ArithmeticError> {
        Ok(match self {
            Operator::Add => lhs + rhs,
            Operator::Sub => lhs - rhs,
            Operator::Mul => lhs * rhs,
            Operator::Div => {
                if rhs == 0.0 {
                    return Err(ArithmeticError::DivisionByZero);
                }
                lhs / rhs
            }
            // Truncated remainder: the sign follows the dividend.
            Operator::Rem => lhs % rhs,
            Operator::Pow => lhs.powf(rhs),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    Op(Operator),
    LParen,
    RParen,
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d+\.?\d*|\.\d+|[-+*/%^()]|\s+").expect("expression token regex must compile")
    })
}

/// Split an arithmetic string into tokens, folding unary minus.
pub fn tokenize(formula: &str) -> Result<Vec<Token>, ParseError> {
    let mut raw: Vec<&str> = Vec::new();
    let mut last_end = 0;
    for m in token_re().find_iter(formula) {
        if m.start() != last_end {
            return Err(ParseError::InvalidToken(
                formula[last_end..m.start()].to_string(),
            ));
        }
        last_end = m.end();
        if !m.as_str().trim().is_empty() {
            raw.push(m.as_str());
        }
    }
    if last_end != formula.len() {
        return Err(ParseError::InvalidToken(formula[last_end..].to_string()));
    }
    if raw.is_empty() {
        return Err(ParseError::NoTokens);
    }

    let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let text = raw[i];
        let unary = text == "-" && (i == 0 || raw[i - 1] == "(");
        if unary {
            let Some(n) = raw.get(i + 1).and_then(|next| parse_number(next)) else {
                return Err(ParseError::DanglingUnaryMinus);
            };
            tokens.push(Token::Number(-n));
            i += 2;
            continue;
        }

        let token = match text {
            "(" => Token::LParen,
            ")" => Token::RParen,
            _ => match text.chars().next().and_then(Operator::from_char) {
                Some(op) if text.len() == 1 => Token::Op(op),
                _ => Token::Number(
                    parse_number(text).ok_or_else(|| ParseError::InvalidToken(text.to_string()))?,
                ),
            },
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

fn parse_number(text: &str) -> Option<f64> {
    if !text.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Shunting-yard: reorder infix tokens into postfix.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>, ParseError> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) => output.push(token.clone()),
            Token::Op(op) => {
                while let Some(Token::Op(top)) = operators.last() {
                    let pops = if op.is_right_associative() {
                        op.precedence() < top.precedence()
                    } else {
                        op.precedence() <= top.precedence()
                    };
                    if !pops {
                        break;
                    }
                    output.push(Token::Op(*top));
                    operators.pop();
                }
                operators.push(Token::Op(*op));
            }
            Token::LParen => operators.push(Token::LParen),
            Token::RParen => loop {
                match operators.pop() {
                    Some(Token::LParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(ParseError::UnmatchedClose),
                }
            },
        }
    }

    while let Some(token) = operators.pop() {
        if matches!(token, Token::LParen | Token::RParen) {
            return Err(ParseError::UnclosedOpen);
        }
        output.push(token);
    }

    Ok(output)
}

/// Evaluate a postfix token sequence.
pub fn eval_postfix(postfix: &[Token]) -> Result<f64, ExprError> {
    let mut stack: Vec<f64> = Vec::new();

    for token in postfix {
        match token {
            Token::Number(n) => stack.push(*n),
            Token::Op(op) => {
                if stack.len() < 2 {
                    return Err(ArithmeticError::InsufficientOperands(op.symbol()).into());
                }
                let rhs = stack.pop().unwrap_or_default();
                let lhs = stack.pop().unwrap_or_default();
                stack.push(op.apply(lhs, rhs)?);
            }
            Token::LParen | Token::RParen => return Err(ParseError::UnclosedOpen.into()),
        }
    }

    if stack.len() != 1 {
        return Err(ParseError::Incomplete.into());
    }
    let result = stack[0];
    if !result.is_finite() {
        return Err(ArithmeticError::NonFinite.into());
    }
    Ok(result)
}

/// Evaluate an arithmetic-only formula string.
pub fn evaluate(formula: &str) -> Result<f64, ExprError> {
    let tokens = tokenize(formula)?;
    let postfix = to_postfix(&tokens)?;
    log::trace!("evaluate {:?} -> {} postfix tokens", formula, postfix.len());
    eval_postfix(&postfix)
}
