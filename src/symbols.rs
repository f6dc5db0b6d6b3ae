use crate::context::ContextId;
use crate::error::ErrorKind;
use std::collections::HashMap;
use std::rc::Rc;

/// What a declared name stands for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Binding {
    /// Constants get their value when they are declared.
    Const(i64),
    /// `None` until the variable is first assigned.
    Var(Option<i64>),
    /// The body of the procedure lives in its own context.
    Procedure(ContextId),
}

impl Binding {
    /// Store `value`. Only variables accept it.
    pub fn assign(&mut self, name: &Rc<str>, value: i64) -> Result<(), ErrorKind> {
        match self {
            Binding::Var(slot) => {
                *slot = Some(value);
                Ok(())
            }
            Binding::Const(_) => Err(ErrorKind::ConstReassignment(Rc::clone(name))),
            Binding::Procedure(_) => Err(ErrorKind::NotAVariable(Rc::clone(name))),
        }
    }
}

/// The names declared directly in one context.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    bindings: HashMap<Rc<str>, Binding>,
}

impl SymbolTable {
    pub fn declare(&mut self, name: Rc<str>, binding: Binding) -> Result<(), ErrorKind> {
        if self.bindings.contains_key(&name) {
            return Err(ErrorKind::DuplicateName(name));
        }
        self.bindings.insert(name, binding);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings.get_mut(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut table = SymbolTable::default();
        table.declare("x".into(), Binding::Var(None)).unwrap();
        let err = table.declare("x".into(), Binding::Const(1)).unwrap_err();
        assert!(matches!(err, ErrorKind::DuplicateName(name) if &*name == "x"));
        assert_eq!(table.get("x"), Some(&Binding::Var(None)));
    }

    #[test]
    fn only_variables_take_values() {
        let name: Rc<str> = "a".into();
        let mut var = Binding::Var(None);
        var.assign(&name, 7).unwrap();
        assert_eq!(var, Binding::Var(Some(7)));

        let mut constant = Binding::Const(5);
        assert!(matches!(
            constant.assign(&name, 6),
            Err(ErrorKind::ConstReassignment(_))
        ));
        assert_eq!(constant, Binding::Const(5));
    }
}
