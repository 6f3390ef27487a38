/// The closed formula algebra a path's instructions translate into.
///
/// Every variant is either a single-instruction semantic encoding
/// (`BinOp`, `UnOp`, `Convert`, `Call`, `IndexAddr`, `FieldAddr`,
/// `Return`) or a structural combinator over them (`And`, `Condition`,
/// and the static-only `If`). Parse-only SSA instructions never reach
/// this layer — `engine::translate`/`engine::static_encoder` skip them.
use std::collections::HashMap;

use crate::errors::{EngineError, TypingError};
use crate::ir::encode;
use crate::ir::var::Var;
use crate::smt::ctx::EncodingContext;
use crate::smt::term::Term;
use crate::smt::value::SymValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    BinOp { result: Var, op: String, left: Var, right: Var },
    UnOp { result: Var, op: String, arg: Var },
    Convert { result: Var, arg: Var },
    /// `result == value`, used for phi resolution: once the taken
    /// predecessor is known, the phi collapses to a plain alias.
    Alias { result: Var, value: Var },
    /// A built-in call (`real`, `imag`, `len`) — user-defined calls are
    /// expanded by the engine into a fresh callee frame rather than
    /// appearing here.
    Call { result: Var, callee: String, args: Vec<Var> },
    IndexAddr { result: Var, array: Var, index: Var },
    FieldAddr { result: Var, base: Var, field_index: usize },
    Return { value: Option<Var> },
    /// A conjunction of already-encoded sub-formulas, e.g. all of a path's
    /// straight-line assignments plus its branch conditions.
    And(Vec<Formula>),
    /// A bare boolean condition, asserted true or false depending on which
    /// arm of a branch the path took.
    Condition { var: Var, expect: bool },
    /// Static-encoder-only: both arms are folded into a single `ite`
    /// instead of being explored as separate paths. Requires an acyclic
    /// CFG (`StructuralError::CyclicCfg` otherwise).
    If { cond: Var, then: Box<Formula>, els: Box<Formula> },
}

impl Formula {
    /// Accumulate every free variable this formula (transitively) touches.
    pub fn scan_vars(&self, vars: &mut HashMap<String, Var>) -> Result<(), TypingError> {
        match self {
            Formula::BinOp { result, left, right, .. } => {
                result.scan_vars(vars)?;
                left.scan_vars(vars)?;
                right.scan_vars(vars)
            }
            Formula::UnOp { result, arg, .. } => {
                result.scan_vars(vars)?;
                arg.scan_vars(vars)
            }
            Formula::Convert { result, arg } => {
                result.scan_vars(vars)?;
                arg.scan_vars(vars)
            }
            Formula::Alias { result, value } => {
                result.scan_vars(vars)?;
                value.scan_vars(vars)
            }
            Formula::Call { result, args, .. } => {
                result.scan_vars(vars)?;
                for a in args {
                    a.scan_vars(vars)?;
                }
                Ok(())
            }
            Formula::IndexAddr { result, array, index } => {
                result.scan_vars(vars)?;
                array.scan_vars(vars)?;
                index.scan_vars(vars)
            }
            Formula::FieldAddr { result, base, .. } => {
                result.scan_vars(vars)?;
                base.scan_vars(vars)
            }
            Formula::Return { value } => {
                if let Some(v) = value {
                    v.scan_vars(vars)?;
                }
                Ok(())
            }
            Formula::And(parts) => {
                for p in parts {
                    p.scan_vars(vars)?;
                }
                Ok(())
            }
            Formula::Condition { var, .. } => var.scan_vars(vars),
            Formula::If { cond, then, els } => {
                cond.scan_vars(vars)?;
                then.scan_vars(vars)?;
                els.scan_vars(vars)
            }
        }
    }

    /// Lower this formula to a boolean SMT term, declaring whatever
    /// operands it needs along the way.
    pub fn encode(&self, ctx: &mut EncodingContext) -> Result<Term, EngineError> {
        match self {
            Formula::BinOp { result, op, left, right } => {
                let lt = ctx.declare_var(left)?;
                let rt = ctx.declare_var(right)?;
                let rhs = encode::encode_binop(ctx, op, &left.ty, lt, rt)?;
                let res = ctx.declare_var(result)?;
                Ok(Term::eq(res, rhs))
            }
            Formula::UnOp { result, op, arg } => {
                let rhs = if op == "*" {
                    deref_pointer(ctx, arg)?
                } else {
                    let at = ctx.declare_var(arg)?;
                    encode::encode_unop(op, &arg.ty, at)?
                };
                let res = ctx.declare_var(result)?;
                Ok(Term::eq(res, rhs))
            }
            Formula::Convert { result, arg } => {
                let at = ctx.declare_var(arg)?;
                let rhs = encode::encode_convert(&arg.ty, &result.ty, at)?;
                let res = ctx.declare_var(result)?;
                Ok(Term::eq(res, rhs))
            }
            Formula::Alias { result, value } => {
                let vt = ctx.declare_var(value)?;
                let res = ctx.declare_var(result)?;
                Ok(Term::eq(res, vt))
            }
            Formula::Call { result, callee, args } => {
                if args.len() != 1 {
                    return Err(TypingError::UnknownBuiltin { name: callee.clone() }.into());
                }
                // `real`/`imag`/`len` all take a non-scalar operand
                // (Complex128/Slice/String) — resolve it to its `SymValue`
                // so the builtin table reads off the carried element/payload
                // type instead of re-deriving it from the raw `Var`.
                let value = ctx.resolve_value(&args[0])?;
                let at = value.handle().clone();
                let rhs = encode::encode_builtin(ctx, callee, &value.ty(), at)?;
                let res = ctx.declare_var(result)?;
                Ok(Term::eq(res, rhs))
            }
            Formula::IndexAddr { result, array, index } => {
                let value = ctx.resolve_value(array)?;
                let elem = match &value {
                    SymValue::Array { elem, .. } => elem.clone(),
                    _ => return Err(TypingError::UnsupportedConversion { from: array.ty.to_string(), to: "slice".into() }.into()),
                };
                let array_term = value.handle().clone();
                let index_term = ctx.declare_var(index)?;
                let (vals_array, _) = ctx.vals_len_arrays_for(&elem)?;
                let row = Term::app("select", vec![Term::atom(vals_array), array_term]);
                let rhs = Term::app("select", vec![row, index_term]);
                let res = ctx.declare_var(result)?;
                Ok(Term::eq(res, rhs))
            }
            Formula::FieldAddr { result, base, field_index } => {
                let value = ctx.resolve_value(base)?;
                let struct_ty = match &value {
                    SymValue::Struct { ty, .. } => ty.clone(),
                    _ => return Err(TypingError::UnsupportedConversion { from: base.ty.to_string(), to: "struct".into() }.into()),
                };
                let base_term = value.handle().clone();
                let (field_array, _) = ctx.field_array_for(&struct_ty, *field_index)?;
                let rhs = Term::app("select", vec![Term::atom(field_array), base_term]);
                let res = ctx.declare_var(result)?;
                Ok(Term::eq(res, rhs))
            }
            Formula::Return { value } => match value {
                Some(v) => {
                    let vt = ctx.declare_var(v)?;
                    let res = ctx.declare_var(&Var::result(v.ty.clone()))?;
                    Ok(Term::eq(res, vt))
                }
                None => Ok(Term::atom("true")),
            },
            Formula::And(parts) => {
                let mut terms = Vec::with_capacity(parts.len());
                for p in parts {
                    terms.push(p.encode(ctx)?);
                }
                Ok(Term::and(terms))
            }
            Formula::Condition { var, expect } => {
                let t = ctx.declare_var(var)?;
                Ok(if *expect { t } else { Term::not(t) })
            }
            Formula::If { cond, then, els } => {
                let ct = ctx.declare_var(cond)?;
                let tt = then.encode(ctx)?;
                let et = els.encode(ctx)?;
                Ok(Term::ite(ct, tt, et))
            }
        }
    }
}

/// Dereferencing a plain `*T` pointer (as opposed to an address produced by
/// `IndexAddr`/`FieldAddr`, which already denote the loaded value) reads
/// the generic `MEM_T` heap array.
fn deref_pointer(ctx: &mut EncodingContext, arg: &Var) -> Result<Term, EngineError> {
    let value = ctx.resolve_value(arg)?;
    let pointee = match &value {
        SymValue::Pointer { pointee, .. } => pointee.clone(),
        _ => return Err(TypingError::UnsupportedConversion { from: arg.ty.to_string(), to: "pointer".into() }.into()),
    };
    let addr_term = value.handle().clone();
    let (mem_array, _) = ctx.mem_array_for(&pointee)?;
    Ok(Term::app("select", vec![Term::atom(mem_array), addr_term]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::Ty;

    #[test]
    fn binop_scan_vars_collects_both_operands_and_result() {
        let f = Formula::BinOp {
            result: Var::register("t1", Ty::Int),
            op: "+".into(),
            left: Var::register("a", Ty::Int),
            right: Var::register("b", Ty::Int),
        };
        let mut vars = HashMap::new();
        f.scan_vars(&mut vars).unwrap();
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn binop_encode_produces_equality_of_result_and_expression() {
        let f = Formula::BinOp {
            result: Var::register("t1", Ty::Int),
            op: "+".into(),
            left: Var::register("a", Ty::Int),
            right: Var::register("b", Ty::Int),
        };
        let mut ctx = EncodingContext::new();
        let t = f.encode(&mut ctx).unwrap();
        assert_eq!(t.to_smt_string(), "(= t1 (+ a b))");
    }

    #[test]
    fn condition_negates_when_expect_is_false() {
        let f = Formula::Condition { var: Var::register("c", Ty::Bool), expect: false };
        let mut ctx = EncodingContext::new();
        let t = f.encode(&mut ctx).unwrap();
        assert_eq!(t.to_smt_string(), "(not c)");
    }

    #[test]
    fn and_of_empty_list_is_true() {
        let mut ctx = EncodingContext::new();
        assert_eq!(Formula::And(vec![]).encode(&mut ctx).unwrap().to_smt_string(), "true");
    }

    #[test]
    fn pointer_deref_selects_from_the_pointee_mem_array() {
        let f = Formula::UnOp {
            result: Var::register("v", Ty::Int),
            op: "*".into(),
            arg: Var::register("p", Ty::Pointer(Box::new(Ty::Int))),
        };
        let mut ctx = EncodingContext::new();
        let t = f.encode(&mut ctx).unwrap();
        assert_eq!(t.to_smt_string(), "(= v (select MEM_int p))");
    }

    #[test]
    fn index_addr_selects_through_vals_array_then_index() {
        let f = Formula::IndexAddr {
            result: Var::register("e", Ty::Int),
            array: Var::register("s", Ty::Slice(Box::new(Ty::Int))),
            index: Var::register("i", Ty::Int),
        };
        let mut ctx = EncodingContext::new();
        let t = f.encode(&mut ctx).unwrap();
        assert_eq!(t.to_smt_string(), "(= e (select (select VALS_[]int s) i))");
    }

    #[test]
    fn field_addr_selects_from_the_struct_field_array() {
        let struct_ty = Ty::Named("Person".into(), Box::new(Ty::Struct(vec![("Age".into(), Ty::Int)])));
        let f = Formula::FieldAddr {
            result: Var::register("age", Ty::Int),
            base: Var::register("s", struct_ty),
            field_index: 0,
        };
        let mut ctx = EncodingContext::new();
        let t = f.encode(&mut ctx).unwrap();
        assert_eq!(t.to_smt_string(), "(= age (select FIELD_0_Person s))");
    }
}
