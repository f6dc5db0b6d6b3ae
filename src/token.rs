use crate::position::Position;
use std::fmt;
use std::rc::Rc;

/// Implement an enum where each case maps to a string literal.
macro_rules! string_enum {
    (
      $( #[$($attr:meta)*] )*
      pub enum $name:ident {
        $($case:ident = $value:literal,)+
      }
    ) => {
        $( #[$($attr)*] )*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum $name {
            $( $case, )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[
                $( Self::$case, )+
            ];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$case => $value, )+
                }
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ();
            fn from_str(s: &str) -> Result<Self, ()> {
                match s {
                    $( $value => Ok(Self::$case), )+
                    _ => Err(()),
                }
            }
        }
    };
}

string_enum! {
    pub enum Keyword {
        Begin = "begin",
        Call = "call",
        Const = "const",
        Do = "do",
        End = "end",
        If = "if",
        Odd = "odd",
        Procedure = "procedure",
        Read = "read",
        Then = "then",
        Var = "var",
        While = "while",
        Write = "write",
    }
}

string_enum! {
    /// Each case is named after the symbol, not after the operation it stands
    /// for (e.g., "Plus" instead of "Add"). "L" is short for left, "R" for right.
    pub enum Symbol {
        Plus = "+",
        Minus = "-",
        Star = "*",
        Slash = "/",
        LParen = "(",
        RParen = ")",
        Comma = ",",
        Semicolon = ";",
        Period = ".",
        Becomes = ":=",
        Equal = "=",
        Hashtag = "#",
        Less = "<",
        LessEqual = "<=",
        Greater = ">",
        GreaterEqual = ">=",
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Eof,
    /// The name itself is the token's text.
    Ident,
    Number(i64),
    /// Keyword
    Kw(Keyword),
    /// Symbol
    Sym(Symbol),
}

impl TokenKind {
    /// How the kind is named in diagnostics.
    pub const fn describe(&self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "ident",
            TokenKind::Number(_) => "number",
            TokenKind::Kw(k) => k.as_str(),
            TokenKind::Sym(s) => s.as_str(),
        }
    }
}

/// A token, as spelled in the source, and where it starts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Rc<str>,
    pub start: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<Rc<str>>, start: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
        }
    }

    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }
}

impl<T> PartialEq<T> for Token
where
    TokenKind: PartialEq<T>,
{
    fn eq(&self, other: &T) -> bool {
        &self.kind == other
    }
}

impl From<Keyword> for TokenKind {
    fn from(value: Keyword) -> Self {
        TokenKind::Kw(value)
    }
}

impl From<Symbol> for TokenKind {
    fn from(value: Symbol) -> Self {
        TokenKind::Sym(value)
    }
}

impl PartialEq<Keyword> for TokenKind {
    fn eq(&self, other: &Keyword) -> bool {
        self == &TokenKind::Kw(*other)
    }
}

impl PartialEq<Symbol> for TokenKind {
    fn eq(&self, other: &Symbol) -> bool {
        self == &TokenKind::Sym(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip_through_their_spelling() {
        assert_eq!(Keyword::ALL.len(), 13);
        for keyword in Keyword::ALL {
            assert_eq!(keyword.as_str().parse::<Keyword>(), Ok(*keyword));
        }
        assert_eq!("Begin".parse::<Keyword>(), Err(()));
    }

    #[test]
    fn token_compares_against_keywords_and_symbols() {
        let token = Token::new(Keyword::While.into(), "while", Position::START);
        assert!(token == Keyword::While);
        assert!(token != Keyword::Do);
        assert!(token != Symbol::Period);
    }

    #[test]
    fn describe() {
        assert_eq!(TokenKind::Eof.describe(), "EOF");
        assert_eq!(TokenKind::Number(4).describe(), "number");
        assert_eq!(TokenKind::Sym(Symbol::Becomes).describe(), ":=");
        assert_eq!(Symbol::GreaterEqual.to_string(), ">=");
    }
}
