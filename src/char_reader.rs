// TODO: Add support for utf-8 chars? Currently we support only single byte chars.

use crate::position::Position;
use derive_more::Debug;
use std::io::{self, Read, Result};

const BUFFER_SIZE: usize = 256;

/// Reads characters one at a time from a stream, keeping track of where the
/// next one sits in the text.
///
/// The underlying stream is only read when a character is peeked and the
/// buffer is empty, so popping the last character of a line never blocks on
/// an interactive stream.
#[derive(Debug)]
#[debug("CharReader {{ pos: {pos:?}, ... }}")]
pub struct CharReader<'a> {
    read: Box<dyn Read + 'a>,
    /// The position of the next character to read.
    pos: Position,
    /// The amount of valid bytes in the buffer.
    buf_size: usize,
    /// The index of the next byte to read in the buffer.
    buf_idx: usize,
    /// Whether we have reached the end of the input.
    done: bool,
    buf: [u8; BUFFER_SIZE],
}

impl<'a, R: Read + 'a> From<R> for CharReader<'a> {
    fn from(value: R) -> Self {
        CharReader::new(value)
    }
}

impl<'a> CharReader<'a> {
    pub fn new(read: impl Read + 'a) -> Self {
        CharReader {
            read: Box::new(read),
            pos: Position::START,
            buf_size: 0,
            buf_idx: 0,
            done: false,
            buf: [0; BUFFER_SIZE],
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        while !self.done && self.buf_idx >= self.buf_size {
            match self.read.read(&mut self.buf) {
                Ok(0) => self.done = true,
                Ok(n) => {
                    self.buf_size = n;
                    self.buf_idx = 0;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    // --- Public ---

    pub fn pos(&self) -> Position {
        self.pos
    }

    pub fn peek(&mut self) -> Result<Option<char>> {
        self.fill()?;
        if self.buf_idx >= self.buf_size {
            return Ok(None);
        }
        Ok(Some(self.buf[self.buf_idx].into()))
    }

    pub fn pop(&mut self) -> Result<Option<char>> {
        let c = self.peek()?;
        if let Some(c) = c {
            self.buf_idx += 1;
            self.pos = self.pos.after(c);
        }
        Ok(c)
    }

    /// Pop characters into `into` for as long as they satisfy `pred`.
    pub fn pop_while(&mut self, pred: impl Fn(char) -> bool, into: &mut String) -> Result<()> {
        while let Some(c) = self.peek()? {
            if !pred(c) {
                break;
            }
            self.pop()?;
            into.push(c);
        }
        Ok(())
    }
}
