/// Symbolic bookkeeping for non-scalar SSA values.
///
/// A scalar (`Int`/`Uint`/`Bool`/`Float64`) SSA variable is bound directly
/// to an SMT constant of the matching sort. Everything else — pointers,
/// slices, structs, complex numbers, strings — is represented here as a
/// base address (or payload term) plus enough type information for
/// `smt::ctx::EncodingContext` to find the right backing array or
/// uninterpreted function.
use crate::ir::types::Ty;
use crate::smt::term::Term;

#[derive(Debug, Clone, PartialEq)]
pub enum SymValue {
    /// `Complex128`: real/imaginary parts are uninterpreted-function
    /// applications over an opaque complex sort, not a struct.
    Complex { handle: Term },
    /// `String`: an opaque handle into the uninterpreted string sort.
    Str { handle: Term },
    /// `Pointer(T)`: an address into `MEM_<T>`.
    Pointer { addr: Term, pointee: Ty },
    /// `Slice(T)`: an address into `VALS_[]T` / `LEN_[]T`.
    Array { addr: Term, elem: Ty },
    /// `Struct`/`Named(Struct)`: an address into that struct's `FIELD_i` arrays.
    Struct { addr: Term, ty: Ty },
}

impl SymValue {
    pub fn ty(&self) -> Ty {
        match self {
            SymValue::Complex { .. } => Ty::Complex128,
            SymValue::Str { .. } => Ty::String,
            SymValue::Pointer { pointee, .. } => Ty::Pointer(Box::new(pointee.clone())),
            SymValue::Array { elem, .. } => Ty::Slice(Box::new(elem.clone())),
            SymValue::Struct { ty, .. } => ty.clone(),
        }
    }

    pub fn handle(&self) -> &Term {
        match self {
            SymValue::Complex { handle } | SymValue::Str { handle } => handle,
            SymValue::Pointer { addr, .. } | SymValue::Array { addr, .. } | SymValue::Struct { addr, .. } => addr,
        }
    }
}
