//! The parser that runs the program while it reads it.
//!
//! There is no syntax tree. Each grammar rule checks the tokens it expects
//! and, when its `exec` argument is set, performs its effect right away.
//! Statements under a false `if` or `while` condition, and procedure bodies at
//! their declaration, are walked with `exec` unset: names are declared and
//! checked, but nothing is computed, stored or printed.
//!
//! Tokens flow through the token cache of the current context. `while` and
//! `call` rewind that cache instead of reading the source again.

use crate::cache::{Mark, TokenCache};
use crate::context::{ContextId, Contexts};
use crate::error::{Error, ErrorKind, Note, NoteKind};
use crate::eval::{self, ArithOp, RelOp};
use crate::input::NumberReader;
use crate::lex::Lexer;
use crate::position::Position;
use crate::symbols::Binding;
use crate::token::*;
use std::io::{BufRead, Read, Write};
use std::rc::Rc;
use tracing::{debug, trace, warn};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Runs PL/0 programs.
///
/// The program text, the numbers consumed by `read`, and the output written by
/// `write` are three separate streams. `read` takes only the bytes it parses
/// from its stream, so the rest stays there for whoever owns it.
#[derive(derive_more::Debug)]
pub struct Interpreter<'a> {
    lexer: Lexer<'a>,
    contexts: Contexts,
    current: ContextId,
    input: NumberReader<'a>,
    #[debug(skip)]
    output: Box<dyn Write + 'a>,
    notes: Vec<Note>,
    #[debug(skip)]
    cancel: Option<Box<dyn Fn() -> bool + 'a>>,
}

impl<'a> Interpreter<'a> {
    pub fn new(source: impl Read + 'a, input: impl BufRead + 'a, output: impl Write + 'a) -> Self {
        Self {
            lexer: Lexer::from(source),
            contexts: Contexts::default(),
            current: Contexts::ROOT,
            input: NumberReader::from(input),
            output: Box::new(output),
            notes: vec![],
            cancel: None,
        }
    }

    /// Check `cancelled` before every statement that is about to run, and stop
    /// with [`ErrorKind::Cancelled`] once it returns true.
    pub fn with_cancellation(mut self, cancelled: impl Fn() -> bool + 'a) -> Self {
        self.cancel = Some(Box::new(cancelled));
        self
    }

    /// Notes about recoverable problems, oldest first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Parse and run one program, up to and including its final `.`.
    ///
    /// Nothing after the `.` is read, so calling this again runs the next
    /// program in the source. Every run starts with fresh scopes.
    pub fn run(&mut self) -> Result<()> {
        let first = self.lexer.pop()?;
        self.current = self.contexts.reset(TokenCache::new(first));
        self.block(true)?;
        let end = self.check(Symbol::Period)?.start;
        self.output.flush().map_err(|err| Error::at(end, err))?;
        Ok(())
    }

    // --- Some helpers ---

    fn token(&self) -> &Token {
        self.contexts[self.current].tokens.current()
    }

    fn advance(&mut self) -> Result<()> {
        let Self {
            lexer,
            contexts,
            current,
            ..
        } = self;
        contexts[*current].tokens.advance(|| lexer.pop())?;
        Ok(())
    }

    fn mark(&self) -> Mark {
        self.contexts[self.current].tokens.mark()
    }

    fn rewind_to(&mut self, mark: Mark) {
        self.contexts[self.current].tokens.rewind_to(mark);
    }

    /// Skip the current token if it is `other`.
    fn pop_eq<T>(&mut self, other: T) -> Result<bool>
    where
        Token: PartialEq<T>,
    {
        Ok(if *self.token() == other {
            self.advance()?;
            true
        } else {
            false
        })
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.token();
        Error::at(
            token.start,
            ErrorKind::Syntax {
                expected: expected.into(),
                found: Rc::clone(&token.text),
            },
        )
    }

    /// Fail unless the current token is `expected`. Does not advance.
    fn check<T>(&self, expected: T) -> Result<&Token>
    where
        T: AsRef<str>,
        Token: PartialEq<T>,
    {
        if *self.token() == expected {
            Ok(self.token())
        } else {
            Err(self.unexpected(expected.as_ref()))
        }
    }

    /// Take the current token if it is `expected`.
    fn expect<T>(&mut self, expected: T) -> Result<Token>
    where
        T: AsRef<str>,
        Token: PartialEq<T>,
    {
        let token = self.check(expected)?.clone();
        self.advance()?;
        Ok(token)
    }

    fn expect_ident(&mut self) -> Result<Token> {
        let token = self.token().clone();
        if !token.is_ident() {
            return Err(self.unexpected(TokenKind::Ident.describe()));
        }
        self.advance()?;
        Ok(token)
    }

    fn note(&mut self, position: Position, kind: NoteKind) {
        let note = Note { position, kind };
        warn!("{note}");
        self.notes.push(note);
    }

    /// Run `op` only when executing. Suppressed code computes nothing and so
    /// cannot fail on arithmetic.
    fn arith(
        &self,
        exec: bool,
        at: &Token,
        op: impl FnOnce() -> Result<i64, ErrorKind>,
    ) -> Result<i64> {
        if !exec {
            return Ok(0);
        }
        op().map_err(|kind| Error::at(at.start, kind))
    }

    fn check_cancelled(&self) -> Result<()> {
        if let Some(cancelled) = &self.cancel {
            if cancelled() {
                return Err(Error::at(self.token().start, ErrorKind::Cancelled));
            }
        }
        Ok(())
    }

    // --- Declarations ---

    /// block = ["const" ident "=" number {"," ident "=" number} ";"]
    ///         ["var" ident {"," ident} ";"]
    ///         {"procedure" ident ";" block ";"}
    ///         statement
    fn block(&mut self, exec: bool) -> Result<()> {
        if self.pop_eq(Keyword::Const)? {
            loop {
                let name = self.declaration_name()?;
                self.expect(Symbol::Equal)?;
                let value = self.number()?;
                self.declare(&name, Binding::Const(value))?;
                if !self.pop_eq(Symbol::Comma)? {
                    break;
                }
            }
            self.expect(Symbol::Semicolon)?;
        }

        if self.pop_eq(Keyword::Var)? {
            loop {
                let name = self.declaration_name()?;
                self.declare(&name, Binding::Var(None))?;
                if !self.pop_eq(Symbol::Comma)? {
                    break;
                }
            }
            self.expect(Symbol::Semicolon)?;
        }

        while self.pop_eq(Keyword::Procedure)? {
            let name = self.declaration_name()?;
            self.expect(Symbol::Semicolon)?;
            self.procedure(&name)?;
            self.expect(Symbol::Semicolon)?;
        }

        let start = self.mark();
        self.contexts[self.current].body_start = start;
        self.statement(exec)
    }

    /// The name being declared. Anything but an identifier is rejected here,
    /// before the grammar gets a chance to complain.
    fn declaration_name(&mut self) -> Result<Token> {
        let token = self.token().clone();
        if !token.is_ident() {
            return Err(Error::at(
                token.start,
                ErrorKind::InvalidDeclarationTarget(token.text),
            ));
        }
        self.advance()?;
        Ok(token)
    }

    fn number(&mut self) -> Result<i64> {
        let kind = self.token().kind;
        match kind {
            TokenKind::Number(value) => {
                self.advance()?;
                Ok(value)
            }
            _ => Err(self.unexpected(TokenKind::Number(0).describe())),
        }
    }

    fn declare(&mut self, name: &Token, binding: Binding) -> Result<()> {
        self.contexts[self.current]
            .symbols
            .declare(Rc::clone(&name.text), binding)
            .map_err(|kind| Error::at(name.start, kind))
    }

    /// The block of a procedure. It is read into a context of its own and
    /// checked without running; `call` runs it later.
    fn procedure(&mut self, name: &Token) -> Result<()> {
        let parent = self.current;
        let first = self.token().clone();
        let child = self.contexts.fork(parent, TokenCache::new(first));
        self.declare(name, Binding::Procedure(child))?;
        debug!(procedure = %name.text, depth = self.contexts[child].depth, "declaring");

        self.current = child;
        let parsed = self.block(false);
        self.current = parent;
        parsed?;

        // The token after the block was scanned by the child; it is the
        // parent's to continue with.
        let next = self.contexts[child].tokens.current().clone();
        self.contexts[parent].tokens.append(next);
        Ok(())
    }

    // --- Statements ---

    fn statement(&mut self, exec: bool) -> Result<()> {
        if exec {
            self.check_cancelled()?;
        }
        let kind = self.token().kind;
        match kind {
            TokenKind::Ident => self.assignment(exec),
            TokenKind::Kw(Keyword::Call) => self.call(exec),
            TokenKind::Kw(Keyword::Read) => self.read(exec),
            TokenKind::Kw(Keyword::Write) => self.write(exec),
            TokenKind::Kw(Keyword::Begin) => self.begin(exec),
            TokenKind::Kw(Keyword::If) => self.if_statement(exec),
            TokenKind::Kw(Keyword::While) => self.while_statement(exec),
            // The empty statement.
            _ => Ok(()),
        }
    }

    /// Check that `name` can be stored into. Resolution is lexical, so this
    /// holds whether or not the statement runs.
    fn target(&self, name: &Token) -> Result<()> {
        let kind = match self.contexts.resolve(self.current, &name.text) {
            Some(Binding::Var(_) | Binding::Const(_)) => return Ok(()),
            Some(Binding::Procedure(_)) => ErrorKind::NotAVariable(Rc::clone(&name.text)),
            None => ErrorKind::UndefinedName(Rc::clone(&name.text)),
        };
        Err(Error::at(name.start, kind))
    }

    fn assign(&mut self, name: &Token, value: i64) -> Result<()> {
        self.contexts
            .assign(self.current, &name.text, value)
            .map_err(|kind| Error::at(name.start, kind))
    }

    /// ident ":=" expression
    fn assignment(&mut self, exec: bool) -> Result<()> {
        let name = self.expect_ident()?;
        self.target(&name)?;
        self.expect(Symbol::Becomes)?;
        let value = self.expression(exec)?;
        if exec {
            self.assign(&name, value)?;
        }
        Ok(())
    }

    /// "call" ident
    fn call(&mut self, exec: bool) -> Result<()> {
        self.expect(Keyword::Call)?;
        let name = self.expect_ident()?;
        let callee = match self.contexts.resolve(self.current, &name.text) {
            Some(Binding::Procedure(id)) => *id,
            Some(_) => {
                return Err(Error::at(
                    name.start,
                    ErrorKind::NotAProcedure(Rc::clone(&name.text)),
                ));
            }
            None => {
                return Err(Error::at(
                    name.start,
                    ErrorKind::UndefinedName(Rc::clone(&name.text)),
                ));
            }
        };
        if exec {
            self.invoke(callee, &name)?;
        }
        Ok(())
    }

    /// Run the statement of a procedure from its cached tokens. Names resolve
    /// from the procedure's own context outward, not from the caller's.
    #[tracing::instrument(level = "debug", skip_all, fields(procedure = %name.text))]
    fn invoke(&mut self, callee: ContextId, name: &Token) -> Result<()> {
        let procedure = &mut self.contexts[callee];
        if procedure.active {
            return Err(Error::at(
                name.start,
                ErrorKind::RecursiveCall(Rc::clone(&name.text)),
            ));
        }
        procedure.active = true;
        let start = procedure.body_start;
        procedure.tokens.rewind_to(start);
        debug!(depth = procedure.depth, "call");

        let caller = std::mem::replace(&mut self.current, callee);
        let result = self.statement(true);
        self.current = caller;
        self.contexts[callee].active = false;
        result
    }

    /// "read" "(" ident {"," ident} ")"
    fn read(&mut self, exec: bool) -> Result<()> {
        self.expect(Keyword::Read)?;
        self.expect(Symbol::LParen)?;
        let mut names = vec![];
        loop {
            let name = self.expect_ident()?;
            self.target(&name)?;
            names.push(name);
            if !self.pop_eq(Symbol::Comma)? {
                break;
            }
        }
        self.expect(Symbol::RParen)?;
        if !exec {
            return Ok(());
        }
        for name in names {
            match self.input.read_number() {
                Ok(Some(value)) => self.assign(&name, value)?,
                Ok(None) => self.note(name.start, NoteKind::ReadFailed(name.text)),
                Err(err) => {
                    debug!(%err, "reading input failed");
                    self.note(name.start, NoteKind::ReadFailed(name.text));
                }
            }
        }
        Ok(())
    }

    /// "write" "(" expression {"," expression} ")"
    ///
    /// All expressions are evaluated before anything is printed.
    fn write(&mut self, exec: bool) -> Result<()> {
        self.expect(Keyword::Write)?;
        self.expect(Symbol::LParen)?;
        let mut values = vec![self.expression(exec)?];
        while self.pop_eq(Symbol::Comma)? {
            values.push(self.expression(exec)?);
        }
        let close = self.expect(Symbol::RParen)?;
        if exec {
            let line = values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(self.output, "{line}").map_err(|err| Error::at(close.start, err))?;
        }
        Ok(())
    }

    /// "begin" statement {";" statement} "end"
    fn begin(&mut self, exec: bool) -> Result<()> {
        self.expect(Keyword::Begin)?;
        self.statement(exec)?;
        while self.pop_eq(Symbol::Semicolon)? {
            self.statement(exec)?;
        }
        self.expect(Keyword::End)?;
        Ok(())
    }

    /// "if" condition "then" statement
    fn if_statement(&mut self, exec: bool) -> Result<()> {
        self.expect(Keyword::If)?;
        let holds = self.condition(exec)?;
        self.expect(Keyword::Then)?;
        self.statement(exec && holds)
    }

    /// "while" condition "do" statement
    ///
    /// The first pass scans the loop into the cache. Every further iteration
    /// rewinds to the condition and replays it. The last pass, where the
    /// condition is false, walks the body without running it and leaves the
    /// cursor on the token after the loop.
    fn while_statement(&mut self, exec: bool) -> Result<()> {
        self.expect(Keyword::While)?;
        let condition = self.mark();
        let mut iterations = 0u64;
        loop {
            let holds = self.condition(exec)?;
            self.expect(Keyword::Do)?;
            let live = exec && holds;
            self.statement(live)?;
            if !live {
                break;
            }
            iterations += 1;
            trace!(iterations, "loop");
            self.rewind_to(condition);
        }
        Ok(())
    }

    // --- Expressions ---

    /// condition = "odd" expression
    ///           | expression ("="|"#"|"<"|"<="|">"|">=") expression
    fn condition(&mut self, exec: bool) -> Result<bool> {
        if self.pop_eq(Keyword::Odd)? {
            let value = self.expression(exec)?;
            return Ok(exec && eval::odd(value));
        }
        let lhs = self.expression(exec)?;
        let Some(op) = RelOp::from_kind(&self.token().kind) else {
            return Err(self.unexpected("relational operator"));
        };
        self.advance()?;
        let rhs = self.expression(exec)?;
        Ok(exec && op.apply(lhs, rhs))
    }

    /// expression = ["+"|"-"] term {("+"|"-") term}
    fn expression(&mut self, exec: bool) -> Result<i64> {
        let sign = self.token().clone();
        let negative = sign == Symbol::Minus;
        if negative || sign == Symbol::Plus {
            self.advance()?;
        }
        let mut value = self.term(exec)?;
        if negative {
            value = self.arith(exec, &sign, || eval::negate(value))?;
        }
        while let Some(op) = ArithOp::additive(&self.token().kind) {
            let at = self.token().clone();
            self.advance()?;
            let rhs = self.term(exec)?;
            value = self.arith(exec, &at, || op.apply(value, rhs))?;
        }
        Ok(value)
    }

    /// term = factor {("*"|"/") factor}
    fn term(&mut self, exec: bool) -> Result<i64> {
        let mut value = self.factor(exec)?;
        while let Some(op) = ArithOp::multiplicative(&self.token().kind) {
            let at = self.token().clone();
            self.advance()?;
            let rhs = self.factor(exec)?;
            value = self.arith(exec, &at, || op.apply(value, rhs))?;
        }
        Ok(value)
    }

    /// factor = ident | number | "(" expression ")"
    fn factor(&mut self, exec: bool) -> Result<i64> {
        let token = self.token().clone();
        match token.kind {
            TokenKind::Ident => {
                self.advance()?;
                self.value_of(&token, exec)
            }
            TokenKind::Number(value) => {
                self.advance()?;
                Ok(value)
            }
            TokenKind::Sym(Symbol::LParen) => {
                self.advance()?;
                let value = self.expression(exec)?;
                self.expect(Symbol::RParen)?;
                Ok(value)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// The value of a name used in an expression. Unknown and unset names
    /// read as 0, with a note when the code is running.
    fn value_of(&mut self, name: &Token, exec: bool) -> Result<i64> {
        let missing = match self.contexts.resolve(self.current, &name.text) {
            Some(Binding::Const(value) | Binding::Var(Some(value))) => return Ok(*value),
            Some(Binding::Procedure(_)) => {
                return Err(Error::at(
                    name.start,
                    ErrorKind::ProcedureAsValue(Rc::clone(&name.text)),
                ));
            }
            Some(Binding::Var(None)) => NoteKind::Uninitialized(Rc::clone(&name.text)),
            None => NoteKind::UndefinedName(Rc::clone(&name.text)),
        };
        if exec {
            self.note(name.start, missing);
        }
        Ok(0)
    }
}
