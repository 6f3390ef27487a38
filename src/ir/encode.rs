/// Operator-by-sort dispatch tables: turns a BinOp/UnOp/Convert/builtin-Call
/// into an SMT term given the already-encoded operand terms. Kept separate
/// from `formula` so the "what sort gets what encoding" tables can be read
/// top to bottom without the surrounding plumbing.
use crate::errors::{EngineError, TypingError};
use crate::ir::types::{Ty, WIDTH};
use crate::smt::ctx::EncodingContext;
use crate::smt::term::Term;

fn is_bitwise(op: &str) -> bool {
    matches!(op, "&" | "|" | "^" | "<<" | ">>")
}

fn is_comparison(op: &str) -> bool {
    matches!(op, "<" | "<=" | ">" | ">=" | "==" | "!=")
}

pub fn encode_binop(ctx: &mut EncodingContext, op: &str, left_ty: &Ty, left: Term, right: Term) -> Result<Term, EngineError> {
    match left_ty.underlying() {
        Ty::Int | Ty::Uint => encode_integer_binop(op, left, right),
        Ty::Bool => encode_bool_binop(op, left, right),
        Ty::Float64 => encode_float_binop(op, left, right),
        Ty::Complex128 => encode_complex_binop(ctx, op, left, right),
        Ty::String => encode_string_binop(op, left, right),
        other => Err(TypingError::UnknownOperator { op: op.into(), sort: other.to_string() }.into()),
    }
}

fn encode_integer_binop(op: &str, left: Term, right: Term) -> Result<Term, EngineError> {
    if is_bitwise(op) {
        return encode_bitwise_via_bv_bridge(op, left, right);
    }
    let smt_op = match op {
        "+" => "+",
        "-" => "-",
        "*" => "*",
        "/" => "div",
        "%" => "mod",
        "<" => "<",
        "<=" => "<=",
        ">" => ">",
        ">=" => ">=",
        "==" => "=",
        "!=" => return Ok(Term::not(Term::eq(left, right))),
        other => return Err(TypingError::UnknownOperator { op: other.into(), sort: "int".into() }.into()),
    };
    Ok(Term::app(smt_op, vec![left, right]))
}

/// Bitwise operators have no LIA encoding, so operands are bitcast to a
/// `WIDTH`-bit bit-vector, combined there, then cast back.
fn encode_bitwise_via_bv_bridge(op: &str, left: Term, right: Term) -> Result<Term, EngineError> {
    let to_bv = |t: Term| Term::app(format!("(_ int2bv {WIDTH})"), vec![t]);
    let bv_op = match op {
        "&" => "bvand",
        "|" => "bvor",
        "^" => "bvxor",
        "<<" => "bvshl",
        ">>" => "bvashr",
        other => return Err(TypingError::UnknownOperator { op: other.into(), sort: "int (bitwise)".into() }.into()),
    };
    let bv_result = Term::app(bv_op, vec![to_bv(left), to_bv(right)]);
    Ok(Term::app("bv2int", vec![bv_result]))
}

fn encode_bool_binop(op: &str, left: Term, right: Term) -> Result<Term, EngineError> {
    let smt_op = match op {
        "&&" => "and",
        "||" => "or",
        "==" => "=",
        "!=" => return Ok(Term::not(Term::eq(left, right))),
        other => return Err(TypingError::UnknownOperator { op: other.into(), sort: "bool".into() }.into()),
    };
    Ok(Term::app(smt_op, vec![left, right]))
}

fn encode_float_binop(op: &str, left: Term, right: Term) -> Result<Term, EngineError> {
    let smt_op = match op {
        "+" => "fp.add",
        "-" => "fp.sub",
        "*" => "fp.mul",
        "/" => "fp.div",
        "<" => "fp.lt",
        "<=" => "fp.leq",
        ">" => "fp.gt",
        ">=" => "fp.geq",
        // IEEE equality: `fp.eq` treats +0/-0 as equal and NaN as unequal
        // to everything including itself, unlike bit-for-bit `=`.
        "==" => "fp.eq",
        "!=" => return Ok(Term::not(Term::app("fp.eq", vec![left, right]))),
        other => return Err(TypingError::UnknownOperator { op: other.into(), sort: "float64".into() }.into()),
    };
    let args = if matches!(op, "+" | "-" | "*" | "/") {
        vec![Term::atom("RNE"), left, right]
    } else {
        vec![left, right]
    };
    Ok(Term::app(smt_op, args))
}

fn encode_complex_binop(ctx: &mut EncodingContext, op: &str, left: Term, right: Term) -> Result<Term, EngineError> {
    // Complex128 has no SMT theory; arithmetic is defined over the
    // uninterpreted `complex_re`/`complex_im` accessor functions and a
    // `complex_mk` constructor, following the standard a+bi formulas.
    ctx.declare_sort_for_complex();
    let re = |t: &Term| Term::app("complex_re", vec![t.clone()]);
    let im = |t: &Term| Term::app("complex_im", vec![t.clone()]);
    match op {
        "==" => Ok(Term::and(vec![Term::eq(re(&left), re(&right)), Term::eq(im(&left), im(&right))])),
        "!=" => Ok(Term::not(Term::and(vec![Term::eq(re(&left), re(&right)), Term::eq(im(&left), im(&right))]))),
        "+" => Ok(Term::app("complex_mk", vec![
            Term::app("fp.add", vec![Term::atom("RNE"), re(&left), re(&right)]),
            Term::app("fp.add", vec![Term::atom("RNE"), im(&left), im(&right)]),
        ])),
        "-" => Ok(Term::app("complex_mk", vec![
            Term::app("fp.sub", vec![Term::atom("RNE"), re(&left), re(&right)]),
            Term::app("fp.sub", vec![Term::atom("RNE"), im(&left), im(&right)]),
        ])),
        "*" => {
            // (a+bi)(c+di) = (ac-bd) + (ad+bc)i
            let ac = Term::app("fp.mul", vec![Term::atom("RNE"), re(&left), re(&right)]);
            let bd = Term::app("fp.mul", vec![Term::atom("RNE"), im(&left), im(&right)]);
            let ad = Term::app("fp.mul", vec![Term::atom("RNE"), re(&left), im(&right)]);
            let bc = Term::app("fp.mul", vec![Term::atom("RNE"), im(&left), re(&right)]);
            Ok(Term::app("complex_mk", vec![
                Term::app("fp.sub", vec![Term::atom("RNE"), ac, bd]),
                Term::app("fp.add", vec![Term::atom("RNE"), ad, bc]),
            ]))
        }
        "/" => {
            // (a+bi)/(c+di) = ((ac+bd) + (bc-ad)i) / (c^2+d^2)
            let c2 = Term::app("fp.mul", vec![Term::atom("RNE"), re(&right), re(&right)]);
            let d2 = Term::app("fp.mul", vec![Term::atom("RNE"), im(&right), im(&right)]);
            let denom = Term::app("fp.add", vec![Term::atom("RNE"), c2, d2]);
            let ac = Term::app("fp.mul", vec![Term::atom("RNE"), re(&left), re(&right)]);
            let bd = Term::app("fp.mul", vec![Term::atom("RNE"), im(&left), im(&right)]);
            let bc = Term::app("fp.mul", vec![Term::atom("RNE"), im(&left), re(&right)]);
            let ad = Term::app("fp.mul", vec![Term::atom("RNE"), re(&left), im(&right)]);
            let num_re = Term::app("fp.add", vec![Term::atom("RNE"), ac, bd]);
            let num_im = Term::app("fp.sub", vec![Term::atom("RNE"), bc, ad]);
            Ok(Term::app("complex_mk", vec![
                Term::app("fp.div", vec![Term::atom("RNE"), num_re, denom.clone()]),
                Term::app("fp.div", vec![Term::atom("RNE"), num_im, denom]),
            ]))
        }
        other => Err(TypingError::UnknownOperator { op: other.into(), sort: "complex128".into() }.into()),
    }
}

fn encode_string_binop(op: &str, left: Term, right: Term) -> Result<Term, EngineError> {
    match op {
        "==" => Ok(Term::eq(left, right)),
        "!=" => Ok(Term::not(Term::eq(left, right))),
        other => Err(TypingError::UnknownOperator { op: other.into(), sort: "string".into() }.into()),
    }
}

pub fn encode_unop(op: &str, arg_ty: &Ty, arg: Term) -> Result<Term, EngineError> {
    match op {
        "-" => match arg_ty.underlying() {
            Ty::Float64 => Ok(Term::app("fp.neg", vec![arg])),
            Ty::Int | Ty::Uint => Ok(Term::app("-", vec![arg])),
            other => Err(TypingError::UnknownOperator { op: "-".into(), sort: other.to_string() }.into()),
        },
        "!" => Ok(Term::not(arg)),
        "^" => {
            let to_bv = Term::app(format!("(_ int2bv {WIDTH})"), vec![arg]);
            Ok(Term::app("bv2int", vec![Term::app("bvnot", vec![to_bv])]))
        }
        other => Err(TypingError::UnknownOperator { op: other.into(), sort: arg_ty.to_string() }.into()),
    }
}

/// `Convert`: `Int<->Uint` are free (both model as mathematical `Int`),
/// `Int/Uint -> Float64` is a bit-reinterpretation (`IEEEToFloat`, per
/// spec.md §4.1 and the original `symexec/formula.go`'s
/// `ToBV(intSize).IEEEToFloat(...)`), not a numeric rounding conversion:
/// the integer is bitcast to a `WIDTH`-bit bit-vector, then that
/// bit-vector's pattern is reinterpreted as the IEEE-754 double it
/// encodes. `Float64 -> Float64` is identity (only width-preserving
/// conversions are modeled), `Complex128 -> Complex128` is identity.
pub fn encode_convert(from: &Ty, to: &Ty, arg: Term) -> Result<Term, EngineError> {
    match (from.underlying(), to.underlying()) {
        (Ty::Int, Ty::Uint) | (Ty::Uint, Ty::Int) => Ok(arg),
        (Ty::Int, Ty::Float64) | (Ty::Uint, Ty::Float64) => {
            let bv = Term::app(format!("(_ int2bv {WIDTH})"), vec![arg]);
            Ok(Term::app("(_ to_fp 11 53)", vec![bv]))
        }
        (Ty::Float64, Ty::Float64) => Ok(arg),
        (Ty::Complex128, Ty::Complex128) => Ok(arg),
        (from, to) => Err(TypingError::UnsupportedConversion { from: from.to_string(), to: to.to_string() }.into()),
    }
}

/// `real`, `imag`, `len`: the only recognized built-in calls.
pub fn encode_builtin(ctx: &mut EncodingContext, name: &str, arg_ty: &Ty, arg: Term) -> Result<Term, EngineError> {
    match name {
        "real" => {
            ctx.declare_sort_for_complex();
            Ok(Term::app("complex_re", vec![arg]))
        }
        "imag" => {
            ctx.declare_sort_for_complex();
            Ok(Term::app("complex_im", vec![arg]))
        }
        "len" => match arg_ty.underlying() {
            Ty::Slice(elem) => {
                let (_, len_array) = ctx.vals_len_arrays_for(elem)?;
                Ok(Term::app("select", vec![Term::atom(len_array), arg]))
            }
            Ty::String => {
                ctx.declare_sort_for_string_len();
                Ok(Term::app("str_len", vec![arg]))
            }
            other => Err(TypingError::UnknownBuiltin { name: format!("len({other})") }.into()),
        },
        other => Err(TypingError::UnknownBuiltin { name: other.into() }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_not_equal_is_negated_equality() {
        let t = encode_integer_binop("!=", Term::atom("a"), Term::atom("b")).unwrap();
        assert_eq!(t.to_smt_string(), "(not (= a b))");
    }

    #[test]
    fn float_equality_uses_ieee_fp_eq_not_core_eq() {
        let t = encode_float_binop("==", Term::atom("a"), Term::atom("b")).unwrap();
        assert_eq!(t.to_smt_string(), "(fp.eq a b)");
    }

    #[test]
    fn bitwise_and_bridges_through_bitvector() {
        let t = encode_bitwise_via_bv_bridge("&", Term::atom("a"), Term::atom("b")).unwrap();
        assert!(t.to_smt_string().contains("bvand"));
        assert!(t.to_smt_string().contains("int2bv"));
    }

    #[test]
    fn unknown_operator_for_sort_is_a_typing_error() {
        let err = encode_integer_binop("@@", Term::atom("a"), Term::atom("b")).unwrap_err();
        assert!(matches!(err, EngineError::Typing(TypingError::UnknownOperator { .. })));
    }

    #[test]
    fn int_to_float_convert_bridges_through_bitvector_instead_of_rounding() {
        let t = encode_convert(&Ty::Int, &Ty::Float64, Term::atom("x")).unwrap();
        let s = t.to_smt_string();
        assert!(s.contains("int2bv"), "expected a bitvector bridge, got: {s}");
        assert!(s.contains("to_fp"));
        assert!(!s.contains("RNE"), "bit-reinterpretation takes no rounding mode, got: {s}");
    }
}
