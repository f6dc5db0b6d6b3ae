//! Fatal errors and recoverable notes, both tagged with a source position.

use crate::position::Position;
use derive_more::Display;
use std::io;
use std::rc::Rc;
use thiserror::Error;

/// Something that stops the run.
#[derive(Debug, Error)]
#[error("{position} {kind}")]
pub struct Error {
    pub position: Position,
    pub kind: ErrorKind,
}

impl Error {
    pub fn at(position: Position, kind: impl Into<ErrorKind>) -> Self {
        Self {
            position,
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    // Lexical
    #[error("invalid symbol: {0}")]
    InvalidSymbol(Rc<str>),
    #[error("malformed number: {0}")]
    MalformedNumber(Rc<str>),

    // Syntax
    #[error("expected \"{expected}\" but got \"{found}\"")]
    Syntax { expected: Rc<str>, found: Rc<str> },

    // Names
    #[error("cannot declare \"{0}\", it is not an identifier")]
    InvalidDeclarationTarget(Rc<str>),
    #[error("cannot add ident \"{0}\" twice in the same scope")]
    DuplicateName(Rc<str>),
    #[error("variable \"{0}\" used but undefined")]
    UndefinedName(Rc<str>),
    #[error("cannot assign value to const {0}")]
    ConstReassignment(Rc<str>),
    #[error("cannot store a value in procedure {0}")]
    NotAVariable(Rc<str>),
    #[error("cannot call {0}, it is not a procedure")]
    NotAProcedure(Rc<str>),
    #[error("procedure {0} has no value")]
    ProcedureAsValue(Rc<str>),
    #[error("procedure {0} called while it is already running")]
    RecursiveCall(Rc<str>),

    // Arithmetic
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,

    #[error("cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A condition the run recovers from. The run goes on after it is reported.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display("{position} {kind}")]
pub struct Note {
    pub position: Position,
    pub kind: NoteKind,
}

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum NoteKind {
    #[display("variable \"{_0}\" used but undefined, default to 0")]
    UndefinedName(Rc<str>),
    #[display("variable {_0} not initialized, default to 0")]
    Uninitialized(Rc<str>),
    #[display("could not read a number into {_0}, it keeps its value")]
    ReadFailed(Rc<str>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_message() {
        let err = Error::at(
            Position::new(2, 7, 12),
            ErrorKind::Syntax {
                expected: ":=".into(),
                found: "=".into(),
            },
        );
        assert_eq!(err.to_string(), "[2:7] expected \":=\" but got \"=\"");
    }

    #[test]
    fn note_message() {
        let note = Note {
            position: Position::new(1, 9, 8),
            kind: NoteKind::Uninitialized("x".into()),
        };
        assert_eq!(note.to_string(), "[1:9] variable x not initialized, default to 0");
    }
}
