//! Parses and runs PL/0 programs in a single pass, without building a syntax tree.

pub mod position;
pub mod char_reader;
/// Defines the tokens of the language.
pub mod token;
pub mod lex;
pub mod cache;
pub mod symbols;
/// Defines the scopes of a running program.
pub mod context;
pub mod error;
/// Integer arithmetic.
pub mod eval;
pub mod input;
/// The parser-evaluator.
pub mod interpret;
pub mod repl;


pub use error::{Error, ErrorKind, Note, NoteKind};
pub use interpret::Interpreter;

use position::Position;
use std::io::{BufRead, Read, Write};

/// Run one program read from `source`. `read` statements take their numbers
/// from `input`, and `write` statements print to `output`.
pub fn run<'a>(
    source: impl Read + 'a,
    input: impl BufRead + 'a,
    output: impl Write + 'a,
) -> Result<(), Error> {
    Interpreter::new(source, input, output).run()
}

/// Run one program from a stream that also carries its input.
///
/// The program is everything up to and including the first `.`, which only
/// ever ends a program. It is taken off the stream before anything runs, and
/// `read` statements then take their numbers from what follows it.
pub fn run_stream(stream: &mut impl BufRead, output: impl Write) -> Result<(), Error> {
    let mut source = Vec::new();
    stream
        .read_until(b'.', &mut source)
        .map_err(|err| Error::at(Position::START, err))?;
    Interpreter::new(&source[..], stream, output).run()
}

/// Run a program held in a string and return what it printed.
pub fn execute_string(source_code: &str, input: &str) -> Result<String, Error> {
    let mut out = Vec::new();
    run(source_code.as_bytes(), input.as_bytes(), &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

// Re-export
pub mod prelude {
    use super::*;
    pub use super::{execute_string, run, run_stream};
    pub use error::{Error, ErrorKind, Note, NoteKind};
    pub use interpret::Interpreter;
    pub use repl::{REPL_TIMEOUT, repl};
}
