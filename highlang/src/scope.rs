//! Lexical environment with parent pointers. Variable lookup walks from the
//! innermost frame outward; a variable's type is fixed at declaration and a
//! name may not be redeclared within the same frame.

use std::collections::HashMap;

use crate::ast::Type;
use crate::errors::CompileError;

#[derive(Debug, Clone)]
pub struct VarInfo {
    pub ty: Type,
    label: String,
}

impl VarInfo {
    /// Data-segment labels backing this variable: one for `u8`/`char`, two
    /// (high byte, low byte) for `u16`.
    pub fn data_labels(&self) -> Vec<String> {
        match self.ty {
            Type::U8 | Type::Char => vec![self.label.clone()],
            Type::U16 => vec![format!("{}_hi", self.label), format!("{}_lo", self.label)],
        }
    }
}

#[derive(Clone)]
pub struct Scope {
    parent: Option<Box<Scope>>,
    vars: HashMap<String, VarInfo>,
    func_prefix: Option<String>,
}

impl Scope {
    pub fn global() -> Self {
        Scope { parent: None, vars: HashMap::new(), func_prefix: None }
    }

    /// Enter a function body: a fresh frame whose variables mangle to
    /// `<func>__<name>` so that two functions may reuse a local's name.
    pub fn enter_function(self, func_name: &str) -> Self {
        Scope { parent: Some(Box::new(self)), vars: HashMap::new(), func_prefix: Some(func_name.to_string()) }
    }

    pub fn declare(&mut self, name: &str, ty: Type, line: usize) -> Result<(), CompileError> {
        if self.vars.contains_key(name) {
            return Err(CompileError::Semantic { line, reason: format!("'{name}' is already declared in this scope") });
        }
        let label = match &self.func_prefix {
            Some(prefix) => format!("{prefix}__{name}"),
            None => name.to_string(),
        };
        self.vars.insert(name.to_string(), VarInfo { ty, label });
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&VarInfo> {
        if let Some(info) = self.vars.get(name) {
            return Some(info);
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }

    pub fn lookup_or_err(&self, name: &str, line: usize) -> Result<&VarInfo, CompileError> {
        self.lookup(name).ok_or_else(|| CompileError::Semantic { line, reason: format!("undeclared variable '{name}'") })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaration_in_same_frame_is_an_error() {
        let mut s = Scope::global();
        s.declare("x", Type::U8, 1).unwrap();
        assert!(s.declare("x", Type::U8, 2).is_err());
    }

    #[test]
    fn nested_function_frame_sees_outer_variable() {
        let mut outer = Scope::global();
        outer.declare("x", Type::U8, 1).unwrap();
        let inner = outer.enter_function("f");
        assert!(inner.lookup("x").is_some());
    }

    #[test]
    fn function_locals_mangle_with_func_name() {
        let mut f = Scope::global().enter_function("inc");
        f.declare("n", Type::U8, 1).unwrap();
        assert_eq!(f.lookup("n").unwrap().data_labels(), vec!["inc__n".to_string()]);
    }

    #[test]
    fn u16_variable_splits_into_hi_lo_labels() {
        let mut g = Scope::global();
        g.declare("a", Type::U16, 1).unwrap();
        assert_eq!(g.lookup("a").unwrap().data_labels(), vec!["a_hi".to_string(), "a_lo".to_string()]);
    }
}
