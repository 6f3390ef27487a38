/// A symbolic variable operand carried by formula nodes and SSA instructions.
use std::collections::HashMap;
use std::fmt;

use crate::errors::TypingError;
use crate::ir::types::Ty;

/// Synthetic name for a function's return value inside path formulas.
pub const RESULT_VAR: &str = "$result";

#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub ty: Ty,
    /// When true, `name` is the literal's printable form rather than an
    /// SSA register name.
    pub is_constant: bool,
}

impl Var {
    pub fn register(name: impl Into<String>, ty: Ty) -> Self {
        Var { name: name.into(), ty, is_constant: false }
    }

    pub fn constant(literal: impl Into<String>, ty: Ty) -> Self {
        Var { name: literal.into(), ty, is_constant: true }
    }

    pub fn result(ty: Ty) -> Self {
        Var { name: RESULT_VAR.into(), ty, is_constant: false }
    }

    /// Record this operand in the free-variable accumulator used before
    /// encoding (`scan_vars`). Constants are never free variables.
    pub fn scan_vars(&self, vars: &mut HashMap<String, Var>) -> Result<(), TypingError> {
        if self.is_constant {
            return Ok(());
        }
        if let Some(existing) = vars.get(&self.name) {
            if existing.ty != self.ty {
                return Err(TypingError::MixedTypeBinOp {
                    op: "<redefinition>".into(),
                    left: existing.ty.to_string(),
                    right: self.ty.to_string(),
                });
            }
            return Ok(());
        }
        vars.insert(self.name.clone(), self.clone());
        Ok(())
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_never_scanned_as_free_vars() {
        let mut vars = HashMap::new();
        Var::constant("5", Ty::Int).scan_vars(&mut vars).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn redefinition_with_same_type_is_idempotent() {
        let mut vars = HashMap::new();
        let v = Var::register("t1", Ty::Int);
        v.scan_vars(&mut vars).unwrap();
        v.scan_vars(&mut vars).unwrap();
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn redefinition_with_different_type_errors() {
        let mut vars = HashMap::new();
        Var::register("t1", Ty::Int).scan_vars(&mut vars).unwrap();
        let err = Var::register("t1", Ty::Bool).scan_vars(&mut vars).unwrap_err();
        assert!(matches!(err, TypingError::MixedTypeBinOp { .. }));
    }
}
