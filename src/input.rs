//! Reading the numbers that `read` statements ask for.

use std::io::{BufRead, ErrorKind, Result};

/// Reads whitespace-separated integers from a buffered stream.
///
/// Only the bytes of the numbers taken (and the whitespace around them) are
/// consumed. Whatever follows stays in the stream for its owner, so a REPL can
/// keep reading programs from the same stream after a `read`.
#[derive(derive_more::Debug)]
pub struct NumberReader<'a> {
    #[debug(skip)]
    input: Box<dyn BufRead + 'a>,
}

impl<'a, R: BufRead + 'a> From<R> for NumberReader<'a> {
    fn from(input: R) -> Self {
        Self {
            input: Box::new(input),
        }
    }
}

impl NumberReader<'_> {
    fn peek(&mut self) -> Result<Option<u8>> {
        loop {
            match self.input.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// The next integer, or `None` at the end of the input or when the next
    /// word is not an integer. A bad word is consumed so that the following
    /// read can make progress.
    ///
    /// The rest of the line after the word is consumed too when it is blank,
    /// so that a number typed on a line of its own leaves nothing behind.
    pub fn read_number(&mut self) -> Result<Option<i64>> {
        while self.peek()?.is_some_and(|b| b.is_ascii_whitespace()) {
            self.input.consume(1);
        }
        let mut word = String::new();
        while let Some(b) = self.peek()? {
            if b.is_ascii_whitespace() {
                break;
            }
            self.input.consume(1);
            word.push(b.into());
        }
        while let Some(b) = self.peek()? {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.input.consume(1);
            if b == b'\n' {
                break;
            }
        }
        Ok(word.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_all(text: &str) -> Vec<Option<i64>> {
        let mut reader = NumberReader::from(text.as_bytes());
        (0..4).map(|_| reader.read_number().unwrap()).collect()
    }

    #[test]
    fn numbers_on_lines_and_spaces() {
        assert_eq!(read_all("1 -2\n  +3\n"), [Some(1), Some(-2), Some(3), None]);
    }

    #[test]
    fn garbage_is_skipped_one_word_at_a_time() {
        assert_eq!(read_all("12x 5 - 6"), [None, Some(5), None, Some(6)]);
    }

    #[test]
    fn too_large() {
        assert_eq!(read_all("99999999999999999999 1"), [None, Some(1), None, None]);
    }

    #[test]
    fn leaves_the_next_line_in_the_stream() {
        let mut stream = "21\nwrite(5).\n".as_bytes();
        let mut reader = NumberReader::from(&mut stream);
        assert_eq!(reader.read_number().unwrap(), Some(21));
        drop(reader);
        let mut rest = String::new();
        stream.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "write(5).\n");
    }

    #[test]
    fn stops_at_the_next_word_on_the_same_line() {
        let mut stream = "4 7\n".as_bytes();
        let mut reader = NumberReader::from(&mut stream);
        assert_eq!(reader.read_number().unwrap(), Some(4));
        drop(reader);
        assert_eq!(stream, b"7\n");
    }
}
