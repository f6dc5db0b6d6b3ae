//! Integer arithmetic and comparisons.
//!
//! Values are `i64`. Every operation is checked: division by zero and results
//! that do not fit are errors instead of wrapping.

use crate::error::ErrorKind;
use crate::token::{Symbol, TokenKind};
use derive_more::Display;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ArithOp {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
}

impl ArithOp {
    /// `+` or `-`, the operators between terms.
    pub fn additive(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Sym(Symbol::Plus) => Some(Self::Add),
            TokenKind::Sym(Symbol::Minus) => Some(Self::Sub),
            _ => None,
        }
    }

    /// `*` or `/`, the operators between factors.
    pub fn multiplicative(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Sym(Symbol::Star) => Some(Self::Mul),
            TokenKind::Sym(Symbol::Slash) => Some(Self::Div),
            _ => None,
        }
    }

    pub fn apply(self, lhs: i64, rhs: i64) -> Result<i64, ErrorKind> {
        use ArithOp::*;
        let result = match self {
            Add => lhs.checked_add(rhs),
            Sub => lhs.checked_sub(rhs),
            Mul => lhs.checked_mul(rhs),
            Div if rhs == 0 => return Err(ErrorKind::DivisionByZero),
            // Truncates toward zero.
            Div => lhs.checked_div(rhs),
        };
        result.ok_or(ErrorKind::Overflow)
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum RelOp {
    #[display("=")]
    Eq,
    #[display("#")]
    Ne,
    #[display("<")]
    Lt,
    #[display("<=")]
    Le,
    #[display(">")]
    Gt,
    #[display(">=")]
    Ge,
}

impl RelOp {
    pub fn from_kind(kind: &TokenKind) -> Option<Self> {
        let TokenKind::Sym(symbol) = kind else {
            return None;
        };
        Some(match symbol {
            Symbol::Equal => Self::Eq,
            Symbol::Hashtag => Self::Ne,
            Symbol::Less => Self::Lt,
            Symbol::LessEqual => Self::Le,
            Symbol::Greater => Self::Gt,
            Symbol::GreaterEqual => Self::Ge,
            _ => return None,
        })
    }

    pub fn apply(self, lhs: i64, rhs: i64) -> bool {
        use RelOp::*;
        match self {
            Eq => lhs == rhs,
            Ne => lhs != rhs,
            Lt => lhs < rhs,
            Le => lhs <= rhs,
            Gt => lhs > rhs,
            Ge => lhs >= rhs,
        }
    }
}

pub fn negate(value: i64) -> Result<i64, ErrorKind> {
    value.checked_neg().ok_or(ErrorKind::Overflow)
}

pub fn odd(value: i64) -> bool {
    value % 2 != 0
}
