//! This module is responsible for lexing (tokenizing) source code into tokens.

use crate::char_reader::CharReader;
use crate::error::{Error, ErrorKind};
use crate::token::*;

#[derive(derive_more::Debug)]
pub struct Lexer<'a> {
    chars: CharReader<'a>,
}

impl<'a> Lexer<'a> {
    pub const fn new(char_reader: CharReader<'a>) -> Self {
        Self { chars: char_reader }
    }

    pub fn pop(&mut self) -> Result<Token, Error> {
        lex_single(&mut self.chars)
    }
}

impl<'a, T: Into<CharReader<'a>>> From<T> for Lexer<'a> {
    fn from(x: T) -> Self {
        Self::new(x.into())
    }
}

/// Scan the next token. Whitespace (any character up to and including space)
/// is skipped, and the end of the input is an `Eof` token rather than an
/// error.
pub fn lex_single(chars: &mut CharReader) -> Result<Token, Error> {
    skip_whitespace(chars).map_err(|err| Error::at(chars.pos(), err))?;
    let start = chars.pos();
    let mut text = String::new();
    let kind = scan(chars, &mut text).map_err(|kind| Error::at(start, kind))?;
    Ok(Token::new(kind, text, start))
}

fn skip_whitespace(chars: &mut CharReader) -> std::io::Result<()> {
    while chars.peek()?.is_some_and(|c| c <= ' ') {
        chars.pop()?;
    }
    Ok(())
}

fn scan(chars: &mut CharReader, text: &mut String) -> Result<TokenKind, ErrorKind> {
    let Some(c) = chars.peek()? else {
        text.push_str(TokenKind::Eof.describe());
        return Ok(TokenKind::Eof);
    };
    if c.is_ascii_digit() {
        number(chars, text)
    } else if c.is_ascii_alphabetic() {
        word(chars, text)
    } else {
        chars.pop()?;
        text.push(c);
        symbol(c, chars, text)
    }
}

fn number(chars: &mut CharReader, text: &mut String) -> Result<TokenKind, ErrorKind> {
    chars.pop_while(|c| c.is_ascii_digit(), text)?;
    if chars.peek()?.is_some_and(|c| c.is_ascii_alphabetic()) {
        // Take the whole word so the message shows what was written.
        chars.pop_while(|c| c.is_ascii_alphanumeric(), text)?;
        return Err(ErrorKind::MalformedNumber(text.as_str().into()));
    }
    text.parse()
        .map(TokenKind::Number)
        .map_err(|_| ErrorKind::MalformedNumber(text.as_str().into()))
}

fn word(chars: &mut CharReader, text: &mut String) -> Result<TokenKind, ErrorKind> {
    chars.pop_while(|c| c.is_ascii_alphanumeric(), text)?;
    Ok(text
        .parse::<Keyword>()
        .map_or(TokenKind::Ident, TokenKind::Kw))
}

fn symbol(first: char, chars: &mut CharReader, text: &mut String) -> Result<TokenKind, ErrorKind> {
    // `:`, `<` and `>` may be followed by `=`.
    if matches!(first, ':' | '<' | '>') && chars.peek()? == Some('=') {
        chars.pop()?;
        text.push('=');
    }
    text.parse::<Symbol>()
        .map(TokenKind::Sym)
        .map_err(|()| ErrorKind::InvalidSymbol(text.as_str().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use indoc::indoc;

    fn single(source: &str) -> Result<Token, Error> {
        lex_single(&mut CharReader::from(source.as_bytes()))
    }

    #[test]
    fn empty_source() {
        assert_eq!(
            single("").unwrap(),
            Token::new(TokenKind::Eof, "EOF", Position::START),
        );
        assert_eq!(single(" \n\t ").unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn number_token() {
        assert_eq!(
            single("  12345 ").unwrap(),
            Token::new(TokenKind::Number(12345), "12345", Position::new(1, 3, 2)),
        );
    }

    #[test]
    fn ident() {
        assert_eq!(
            single("   counter2  ").unwrap(),
            Token::new(TokenKind::Ident, "counter2", Position::new(1, 4, 3)),
        );
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(single("while").unwrap().kind, TokenKind::Kw(Keyword::While));
        assert_eq!(single("While").unwrap().kind, TokenKind::Ident);
        assert_eq!(single("whilex").unwrap().kind, TokenKind::Ident);
    }

    #[test]
    fn test_symbols() {
        for symbol in Symbol::ALL {
            let source = format!("{symbol}  ");
            let token = single(&source).unwrap();
            assert_eq!(token.kind, TokenKind::Sym(*symbol));
            assert_eq!(token.text.as_ref(), symbol.as_str());
        }
    }

    #[test]
    fn less_than_is_not_glued_to_what_follows() {
        let mut lexer = Lexer::from("<5".as_bytes());
        assert_eq!(lexer.pop().unwrap().kind, TokenKind::Sym(Symbol::Less));
        assert_eq!(lexer.pop().unwrap().kind, TokenKind::Number(5));
    }

    #[test]
    fn lone_colon_is_invalid() {
        let err = single("  : x").unwrap_err();
        assert_eq!(err.position, Position::new(1, 3, 2));
        assert!(matches!(err.kind, ErrorKind::InvalidSymbol(s) if &*s == ":"));
    }

    #[test]
    fn unknown_character_is_invalid() {
        let err = single("?").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidSymbol(s) if &*s == "?"));
    }

    #[test]
    fn digits_followed_by_letters() {
        let err = single("12ab3 ").unwrap_err();
        assert_eq!(err.position, Position::START);
        assert!(matches!(err.kind, ErrorKind::MalformedNumber(s) if &*s == "12ab3"));
    }

    #[test]
    fn number_too_large() {
        let err = single("99999999999999999999").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedNumber(_)));
    }

    #[test]
    fn varied_tokens() {
        let source = indoc! {"
            var x;
            x := x+1.
        "};
        let mut lexer = Lexer::from(source.as_bytes());
        let expected_tokens = [
            Token::new(Keyword::Var.into(), "var", Position::new(1, 1, 0)),
            Token::new(TokenKind::Ident, "x", Position::new(1, 5, 4)),
            Token::new(Symbol::Semicolon.into(), ";", Position::new(1, 6, 5)),
            Token::new(TokenKind::Ident, "x", Position::new(2, 1, 7)),
            Token::new(Symbol::Becomes.into(), ":=", Position::new(2, 3, 9)),
            Token::new(TokenKind::Ident, "x", Position::new(2, 6, 12)),
            Token::new(Symbol::Plus.into(), "+", Position::new(2, 7, 13)),
            Token::new(TokenKind::Number(1), "1", Position::new(2, 8, 14)),
            Token::new(Symbol::Period.into(), ".", Position::new(2, 9, 15)),
            Token::new(TokenKind::Eof, "EOF", Position::new(3, 1, 17)),
        ];
        for expected in expected_tokens {
            assert_eq!(lexer.pop().unwrap(), expected);
        }
    }
}
