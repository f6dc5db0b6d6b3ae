use crate::cache::{Mark, TokenCache};
use crate::error::ErrorKind;
use crate::symbols::{Binding, SymbolTable};
use derive_more::Display;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

/// Refers to a context inside [`Contexts`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("#{_0}")]
pub struct ContextId(usize);

/// A scope: the whole program, or the body of one procedure.
#[derive(Clone, Debug)]
pub struct Context {
    pub tokens: TokenCache,
    pub symbols: SymbolTable,
    /// The context this one was declared in. Names that are not found here
    /// are looked up there.
    pub parent: Option<ContextId>,
    /// How many contexts enclose this one.
    pub depth: usize,
    /// Where the statement of the block starts in `tokens`.
    pub body_start: Mark,
    /// Set while a `call` is running the body.
    pub active: bool,
}

impl Context {
    fn new(tokens: TokenCache, parent: Option<ContextId>, depth: usize) -> Self {
        Self {
            tokens,
            symbols: SymbolTable::default(),
            parent,
            depth,
            body_start: Mark::default(),
            active: false,
        }
    }
}

/// Owns every context of one program run. Contexts refer to each other by
/// [`ContextId`], and all of them are dropped together when the run ends.
#[derive(Clone, Debug, Default)]
pub struct Contexts(Vec<Context>);

impl Contexts {
    pub const ROOT: ContextId = ContextId(0);

    /// Start over with a single outermost context.
    pub fn reset(&mut self, tokens: TokenCache) -> ContextId {
        self.0.clear();
        self.0.push(Context::new(tokens, None, 0));
        Self::ROOT
    }

    /// Add a context nested in `parent`.
    pub fn fork(&mut self, parent: ContextId, tokens: TokenCache) -> ContextId {
        let depth = self[parent].depth + 1;
        let id = ContextId(self.0.len());
        self.0.push(Context::new(tokens, Some(parent), depth));
        id
    }

    /// `from` and the contexts enclosing it, innermost first.
    pub fn scopes(&self, from: ContextId) -> impl Iterator<Item = ContextId> + '_ {
        std::iter::successors(Some(from), |&id| self[id].parent)
    }

    /// The innermost context, starting at `from`, that declares `name`.
    pub fn owner_of(&self, from: ContextId, name: &str) -> Option<ContextId> {
        self.scopes(from)
            .find(|&id| self[id].symbols.get(name).is_some())
    }

    pub fn resolve(&self, from: ContextId, name: &str) -> Option<&Binding> {
        let owner = self.owner_of(from, name)?;
        self[owner].symbols.get(name)
    }

    /// Store `value` in whatever `name` resolves to from `from`.
    pub fn assign(&mut self, from: ContextId, name: &Rc<str>, value: i64) -> Result<(), ErrorKind> {
        let owner = self
            .owner_of(from, name)
            .ok_or_else(|| ErrorKind::UndefinedName(Rc::clone(name)))?;
        match self[owner].symbols.get_mut(name) {
            Some(binding) => binding.assign(name, value),
            None => Err(ErrorKind::UndefinedName(Rc::clone(name))),
        }
    }
}

impl Index<ContextId> for Contexts {
    type Output = Context;

    fn index(&self, id: ContextId) -> &Context {
        &self.0[id.0]
    }
}

impl IndexMut<ContextId> for Contexts {
    fn index_mut(&mut self, id: ContextId) -> &mut Context {
        &mut self.0[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::token::{Token, TokenKind};

    fn cache() -> TokenCache {
        TokenCache::new(Token::new(TokenKind::Eof, "EOF", Position::START))
    }

    /// A program with `x` and `y`, and a procedure `p` declaring its own `x`.
    fn nested() -> (Contexts, ContextId, ContextId) {
        let mut contexts = Contexts::default();
        let root = contexts.reset(cache());
        let p = contexts.fork(root, cache());
        let symbols = &mut contexts[root].symbols;
        symbols.declare("x".into(), Binding::Var(Some(1))).unwrap();
        symbols.declare("y".into(), Binding::Const(2)).unwrap();
        symbols.declare("p".into(), Binding::Procedure(p)).unwrap();
        contexts[p]
            .symbols
            .declare("x".into(), Binding::Var(None))
            .unwrap();
        (contexts, root, p)
    }

    #[test]
    fn inner_names_shadow_outer_ones() {
        let (contexts, root, p) = nested();
        assert_eq!(contexts.resolve(p, "x"), Some(&Binding::Var(None)));
        assert_eq!(contexts.resolve(root, "x"), Some(&Binding::Var(Some(1))));
        assert_eq!(contexts.resolve(p, "y"), Some(&Binding::Const(2)));
        assert_eq!(contexts.resolve(p, "p"), Some(&Binding::Procedure(p)));
        assert_eq!(contexts.resolve(p, "z"), None);
    }

    #[test]
    fn inner_names_are_invisible_outside() {
        let (mut contexts, root, p) = nested();
        contexts[p]
            .symbols
            .declare("local".into(), Binding::Var(None))
            .unwrap();
        assert_eq!(contexts.resolve(root, "local"), None);
        assert!(contexts.resolve(p, "local").is_some());
    }

    #[test]
    fn assignment_goes_to_the_innermost_binding() {
        let (mut contexts, root, p) = nested();
        contexts.assign(p, &"x".into(), 10).unwrap();
        assert_eq!(contexts.resolve(p, "x"), Some(&Binding::Var(Some(10))));
        assert_eq!(contexts.resolve(root, "x"), Some(&Binding::Var(Some(1))));

        let err = contexts.assign(p, &"y".into(), 3).unwrap_err();
        assert!(matches!(err, ErrorKind::ConstReassignment(_)));
        let err = contexts.assign(root, &"nope".into(), 3).unwrap_err();
        assert!(matches!(err, ErrorKind::UndefinedName(_)));
    }

    #[test]
    fn depth_and_scopes() {
        let (contexts, root, p) = nested();
        assert_eq!(contexts[root].depth, 0);
        assert_eq!(contexts[p].depth, 1);
        assert_eq!(contexts.scopes(p).collect::<Vec<_>>(), vec![p, root]);
    }
}
