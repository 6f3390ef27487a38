/// Per-solve scratchpad: lazily declares sorts, heap arrays, and range
/// axioms the first time a type is touched, and hands out fresh names for
/// intermediate values. One `EncodingContext` is built per path solve and
/// discarded afterwards — nothing here outlives a single `check_sat` call.
use std::collections::HashSet;

use crate::errors::{EngineError, TypingError};
use crate::ir::types::{Ty, WIDTH};
use crate::ir::var::Var;
use crate::smt::term::{Sort, Term};
use crate::smt::value::SymValue;

/// Uninterpreted sort backing every pointer, slice, and struct address.
pub const ADDR_SORT: &str = "$addr";

pub struct EncodingContext {
    fresh_counter: u64,
    declared_sorts: HashSet<String>,
    declared_funs: HashSet<String>,
    /// Declarations and range axioms collected so far; flushed to the
    /// solver by the caller before each `check_sat`.
    pub pending_decls: Vec<String>,
    pub pending_axioms: Vec<Term>,
}

impl EncodingContext {
    pub fn new() -> Self {
        let mut declared_sorts = HashSet::new();
        declared_sorts.insert(ADDR_SORT.to_string());
        EncodingContext {
            fresh_counter: 0,
            declared_sorts,
            declared_funs: HashSet::new(),
            pending_decls: vec![format!("(declare-sort {ADDR_SORT} 0)")],
            pending_axioms: Vec::new(),
        }
    }

    pub fn make_fresh(&mut self, prefix: &str) -> String {
        self.fresh_counter += 1;
        format!("{prefix}!{}", self.fresh_counter)
    }

    /// The SMT-LIB sort for a scalar type. Panics (a caller bug, not a
    /// modeling gap) if called on a non-scalar type — use `mem_array_for`/
    /// `vals_len_arrays_for`/`field_array_for` for those.
    pub fn scalar_sort(&mut self, ty: &Ty) -> Result<Sort, EngineError> {
        match ty.underlying() {
            Ty::Int | Ty::Uint => Ok(Sort::of("Int")),
            Ty::Bool => Ok(Sort::of("Bool")),
            Ty::Float64 => Ok(Sort::of("(_ FloatingPoint 11 53)")),
            Ty::Complex128 => {
                self.declare_sort_once("Complex128");
                Ok(Sort::of("Complex128"))
            }
            Ty::String => {
                self.declare_sort_once("Str");
                Ok(Sort::of("Str"))
            }
            other => Err(TypingError::UnsupportedConversion { from: other.to_string(), to: "scalar sort".into() }.into()),
        }
    }

    /// Declares a variable and returns its reference term, plus any range
    /// axioms it carries (`Int`/`Uint` are fixed at `WIDTH` bits but modeled
    /// as mathematical integers with explicit bound axioms, not bit-vectors).
    /// Heap-addressed types (`Pointer`/`Slice`/`Struct`) are declared as a
    /// plain `$addr` constant here too — `resolve_value` is what turns that
    /// address into the typed `SymValue` a caller actually needs.
    pub fn declare_var(&mut self, var: &Var) -> Result<Term, EngineError> {
        if var.is_constant {
            return Ok(self.constant_term(var));
        }
        let sort = self.scalar_or_struct_sort(&var.ty)?;
        let decl = format!("(declare-const {} {})", var.name, sort.0);
        if self.declared_funs.insert(var.name.clone()) {
            self.pending_decls.push(decl);
            if let Some(axiom) = self.range_axiom(&var.ty, &var.name) {
                self.pending_axioms.push(axiom);
            }
        }
        Ok(Term::atom(var.name.clone()))
    }

    /// Resolves a non-scalar SSA variable to its `SymValue` representation:
    /// a heap address tagged with enough type information (pointee/element/
    /// struct type) for the caller to pick the right backing array without
    /// re-deriving it from `var.ty` by hand. Scalars have no `SymValue`
    /// variant — they're bound directly to a same-sort SMT constant by
    /// `declare_var` and never need this indirection.
    pub fn resolve_value(&mut self, var: &Var) -> Result<SymValue, EngineError> {
        let handle = self.declare_var(var)?;
        match var.ty.underlying() {
            Ty::Complex128 => Ok(SymValue::Complex { handle }),
            Ty::String => Ok(SymValue::Str { handle }),
            Ty::Pointer(inner) => Ok(SymValue::Pointer { addr: handle, pointee: (**inner).clone() }),
            Ty::Slice(inner) => Ok(SymValue::Array { addr: handle, elem: (**inner).clone() }),
            Ty::Struct(_) => Ok(SymValue::Struct { addr: handle, ty: var.ty.clone() }),
            other => Err(TypingError::UnsupportedConversion { from: other.to_string(), to: "non-scalar symbolic value".into() }.into()),
        }
    }

    fn constant_term(&mut self, var: &Var) -> Term {
        match var.ty.underlying() {
            Ty::Bool => Term::atom(var.name.clone()),
            Ty::Float64 => Term::atom(float_literal(&var.name)),
            _ => Term::atom(var.name.clone()),
        }
    }

    fn range_axiom(&self, ty: &Ty, name: &str) -> Option<Term> {
        match ty.underlying() {
            Ty::Int => {
                let max = Term::atom(format!("{}", (1i128 << (WIDTH - 1)) - 1));
                let min = Term::atom(format!("(- {})", 1i128 << (WIDTH - 1)));
                Some(Term::and(vec![
                    Term::app("<=", vec![min, Term::atom(name)]),
                    Term::app("<=", vec![Term::atom(name), max]),
                ]))
            }
            Ty::Uint => {
                let max = Term::atom(format!("{}", (1u128 << WIDTH) - 1));
                Some(Term::and(vec![
                    Term::app("<=", vec![Term::atom("0"), Term::atom(name)]),
                    Term::app("<=", vec![Term::atom(name), max]),
                ]))
            }
            _ => None,
        }
    }

    /// Declares the uninterpreted `Complex128` sort plus its `complex_mk`
    /// constructor and `complex_re`/`complex_im` accessors, the first time
    /// a complex operation is encoded.
    pub fn declare_sort_for_complex(&mut self) {
        if self.declared_funs.insert("complex_mk".to_string()) {
            self.declare_sort_once("Complex128");
            self.pending_decls.push("(declare-fun complex_mk ((_ FloatingPoint 11 53) (_ FloatingPoint 11 53)) Complex128)".into());
            self.pending_decls.push("(declare-fun complex_re (Complex128) (_ FloatingPoint 11 53))".into());
            self.pending_decls.push("(declare-fun complex_im (Complex128) (_ FloatingPoint 11 53))".into());
        }
    }

    /// Declares the uninterpreted `str_len` function over the `Str` sort,
    /// the first time `len` is applied to a string.
    pub fn declare_sort_for_string_len(&mut self) {
        if self.declared_funs.insert("str_len".to_string()) {
            self.declare_sort_once("Str");
            self.pending_decls.push("(declare-fun str_len (Str) Int)".into());
        }
    }

    fn declare_sort_once(&mut self, name: &str) {
        if self.declared_sorts.insert(name.to_string()) {
            self.pending_decls.push(format!("(declare-sort {name} 0)"));
        }
    }

    /// `MEM_<T>`: the heap array backing every `*T` pointer dereference.
    pub fn mem_array_for(&mut self, pointee: &Ty) -> Result<(String, Sort), EngineError> {
        let key = format!("MEM_{}", pointee.heap_key());
        let elem_sort = self.scalar_or_struct_sort(pointee)?;
        if self.declared_funs.insert(key.clone()) {
            self.pending_decls.push(format!("(declare-const {key} (Array {ADDR_SORT} {}))", elem_sort.0));
        }
        Ok((key, elem_sort))
    }

    /// `VALS_[]T` / `LEN_[]T`: the pair of arrays backing a slice's elements
    /// and its length.
    pub fn vals_len_arrays_for(&mut self, elem: &Ty) -> Result<(String, String), EngineError> {
        let elem_sort = self.scalar_or_struct_sort(elem)?;
        let vals_key = format!("VALS_[]{}", elem.heap_key());
        let len_key = format!("LEN_[]{}", elem.heap_key());
        if self.declared_funs.insert(vals_key.clone()) {
            self.pending_decls.push(format!("(declare-const {vals_key} (Array {ADDR_SORT} (Array Int {})))", elem_sort.0));
        }
        if self.declared_funs.insert(len_key.clone()) {
            self.pending_decls.push(format!("(declare-const {len_key} (Array {ADDR_SORT} Int))"));
            // Every live slice handle has a non-negative length, asserted
            // once per element type rather than per handle.
            self.pending_axioms.push(Term::atom(format!(
                "(forall ((a {ADDR_SORT})) (>= (select {len_key} a) 0))"
            )));
        }
        Ok((vals_key, len_key))
    }

    /// `FIELD_<i>_<Struct>`: one array per field of a struct type.
    pub fn field_array_for(&mut self, struct_ty: &Ty, field_index: usize) -> Result<(String, Sort), EngineError> {
        let fields = struct_ty
            .as_struct_fields()
            .ok_or_else(|| TypingError::UnsupportedConversion { from: struct_ty.to_string(), to: "struct".into() })?;
        let (_, field_ty) = fields
            .get(field_index)
            .ok_or_else(|| TypingError::UnresolvedName { name: format!("field #{field_index}") })?
            .clone();
        let key = format!("FIELD_{field_index}_{}", struct_ty.heap_key());
        let elem_sort = self.scalar_or_struct_sort(&field_ty)?;
        if self.declared_funs.insert(key.clone()) {
            self.pending_decls.push(format!("(declare-const {key} (Array {ADDR_SORT} {}))", elem_sort.0));
        }
        Ok((key, elem_sort))
    }

    fn scalar_or_struct_sort(&mut self, ty: &Ty) -> Result<Sort, EngineError> {
        match ty.underlying() {
            Ty::Struct(_) | Ty::Pointer(_) | Ty::Slice(_) => {
                self.declare_sort_once(ADDR_SORT);
                Ok(Sort::of(ADDR_SORT))
            }
            _ => self.scalar_sort(ty),
        }
    }

    pub fn take_decls(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_decls)
    }

    pub fn take_axioms(&mut self) -> Vec<Term> {
        std::mem::take(&mut self.pending_axioms)
    }
}

impl Default for EncodingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a Go-style float literal (`1`, `1.5`, `-0.25`) as an SMT-LIB
/// `(fp ...)` term. Exhaustive IEEE-754 bit-pattern handling lives in
/// `reify`; this only needs to round-trip ordinary literals that appear in
/// source-level constants.
fn float_literal(text: &str) -> String {
    match text.parse::<f64>() {
        Ok(v) if v == 0.0 && v.is_sign_positive() => "(_ +zero 11 53)".to_string(),
        Ok(v) if v == 0.0 => "(_ -zero 11 53)".to_string(),
        Ok(v) if v.is_nan() => "(_ NaN 11 53)".to_string(),
        Ok(v) if v.is_infinite() && v > 0.0 => "(_ +oo 11 53)".to_string(),
        Ok(v) if v.is_infinite() => "(_ -oo 11 53)".to_string(),
        Ok(v) => format!("((_ to_fp 11 53) RNE {v})"),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::var::Var;

    #[test]
    fn scalar_sort_maps_int_and_uint_to_lia() {
        let mut ctx = EncodingContext::new();
        assert_eq!(ctx.scalar_sort(&Ty::Int).unwrap().0, "Int");
        assert_eq!(ctx.scalar_sort(&Ty::Uint).unwrap().0, "Int");
    }

    #[test]
    fn declaring_the_same_var_twice_only_declares_once() {
        let mut ctx = EncodingContext::new();
        let v = Var::register("x", Ty::Int);
        ctx.declare_var(&v).unwrap();
        ctx.declare_var(&v).unwrap();
        let decls = ctx.take_decls();
        assert_eq!(decls.iter().filter(|d| d.contains("declare-const x")).count(), 1);
    }

    #[test]
    fn int_var_gets_a_range_axiom() {
        let mut ctx = EncodingContext::new();
        ctx.declare_var(&Var::register("x", Ty::Int)).unwrap();
        assert_eq!(ctx.take_axioms().len(), 1);
    }

    #[test]
    fn declare_var_declares_pointer_typed_vars_at_the_addr_sort() {
        let mut ctx = EncodingContext::new();
        ctx.declare_var(&Var::register("p", Ty::Pointer(Box::new(Ty::Int)))).unwrap();
        let decls = ctx.take_decls();
        assert!(decls.iter().any(|d| d.contains("declare-const p $addr")), "decls: {decls:?}");
    }

    #[test]
    fn resolve_value_tags_a_pointer_with_its_pointee_type() {
        let mut ctx = EncodingContext::new();
        let value = ctx.resolve_value(&Var::register("p", Ty::Pointer(Box::new(Ty::Int)))).unwrap();
        match value {
            SymValue::Pointer { pointee, .. } => assert_eq!(pointee, Ty::Int),
            other => panic!("expected SymValue::Pointer, got {other:?}"),
        }
    }

    #[test]
    fn resolve_value_rejects_scalar_types() {
        let mut ctx = EncodingContext::new();
        let err = ctx.resolve_value(&Var::register("x", Ty::Int)).unwrap_err();
        assert!(matches!(err, EngineError::Typing(TypingError::UnsupportedConversion { .. })));
    }

    #[test]
    fn slice_length_array_carries_a_nonnegative_forall_axiom() {
        let mut ctx = EncodingContext::new();
        ctx.vals_len_arrays_for(&Ty::Int).unwrap();
        let axioms = ctx.take_axioms();
        assert!(axioms.iter().any(|a| a.to_smt_string().contains("forall") && a.to_smt_string().contains(">= (select LEN_[]int")));
    }

    #[test]
    fn mem_array_is_shared_across_pointers_of_same_pointee() {
        let mut ctx = EncodingContext::new();
        let (k1, _) = ctx.mem_array_for(&Ty::Int).unwrap();
        let decls_after_first = ctx.pending_decls.len();
        let (k2, _) = ctx.mem_array_for(&Ty::Int).unwrap();
        assert_eq!(k1, k2);
        assert_eq!(ctx.pending_decls.len(), decls_after_first);
    }
}
