//! The token cache of a context.
//!
//! Tokens are appended as they are scanned and never removed. Loops and
//! procedure calls move the cursor back to a [`Mark`] and walk the same tokens
//! again; only when the cursor runs past the last cached token is the scanner
//! asked for a new one.

use crate::token::Token;

/// A saved cursor position.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Mark(usize);

#[derive(Clone, Debug)]
pub struct TokenCache {
    tokens: Vec<Token>,
    /// Index of the current token. Always inside `tokens`.
    cursor: usize,
}

impl TokenCache {
    /// A cache whose current token is `first`.
    pub fn new(first: Token) -> Self {
        Self {
            tokens: vec![first],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    /// Move to the next token. It comes from the cache while replaying, and
    /// from `scan` (and is then appended) once the cache is exhausted.
    pub fn advance<E>(&mut self, scan: impl FnOnce() -> Result<Token, E>) -> Result<&Token, E> {
        if self.is_replaying() {
            self.cursor += 1;
        } else {
            self.append(scan()?);
        }
        Ok(self.current())
    }

    /// Append `token` and make it the current one.
    ///
    /// Used when a nested context hands its lookahead token back to its
    /// parent; the parent is never replaying at that point.
    pub fn append(&mut self, token: Token) {
        self.tokens.push(token);
        self.cursor = self.tokens.len() - 1;
    }

    /// Whether the tokens after the current one are already cached.
    pub fn is_replaying(&self) -> bool {
        self.cursor + 1 < self.tokens.len()
    }

    pub fn mark(&self) -> Mark {
        Mark(self.cursor)
    }

    pub fn rewind_to(&mut self, mark: Mark) {
        debug_assert!(mark.0 < self.tokens.len(), "mark is outside of the cache");
        self.cursor = mark.0;
    }
}
