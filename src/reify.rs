/// Turns a solved path's model into source-level literal initializers and
/// an executable unit test, following the SMT-LIB float syntax the solver
/// actually prints rather than a generic `f64` formatter.
use crate::engine::translate::Testcase;
use crate::errors::{EngineError, ReifierError};
use crate::ir::types::Ty;
use crate::ir::var::RESULT_VAR;

/// A decoded SMT-LIB float model entry, keeping apart the two syntaxes the
/// component design's float-syntax table distinguishes: the five symbolic
/// named constants (2b), which map to idiomatic constructors, and the
/// structured `(fp ...)` triplet (2a), which must round-trip through its
/// exact 64-bit pattern rather than a re-rounded decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedFloat {
    Named(f64),
    Bits(u64),
}

impl ParsedFloat {
    pub fn value(self) -> f64 {
        match self {
            ParsedFloat::Named(v) => v,
            ParsedFloat::Bits(bits) => f64::from_bits(bits),
        }
    }
}

/// Decode one SMT-LIB floating-point literal. Handles the four named
/// constants plus the general `(fp #b<sign> #b<exp> #x<mant>)` form;
/// anything else is reported rather than guessed at.
pub fn parse_smt_float(text: &str) -> Result<ParsedFloat, ReifierError> {
    let t = text.trim();
    if t.contains("+zero") {
        return Ok(ParsedFloat::Named(0.0));
    }
    if t.contains("-zero") {
        return Ok(ParsedFloat::Named(-0.0));
    }
    if t.contains("NaN") {
        return Ok(ParsedFloat::Named(f64::NAN));
    }
    if t.contains("+oo") {
        return Ok(ParsedFloat::Named(f64::INFINITY));
    }
    if t.contains("-oo") {
        return Ok(ParsedFloat::Named(f64::NEG_INFINITY));
    }
    if let Some(bits) = parse_fp_triplet(t) {
        return Ok(ParsedFloat::Bits(bits));
    }
    Err(ReifierError::UnparseableModelEntry { name: "float64".into(), text: text.into() })
}

/// `(fp #b0 #b01111111111 #x0000000000000)` -> sign/exponent/mantissa bits
/// packed into an IEEE-754 double.
fn parse_fp_triplet(text: &str) -> Option<u64> {
    let parts: Vec<&str> = text
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split_whitespace()
        .collect();
    if parts.len() != 4 || parts[0] != "fp" {
        return None;
    }
    let sign = u64::from_str_radix(parts[1].trim_start_matches("#b"), 2).ok()?;
    let exp = u64::from_str_radix(parts[2].trim_start_matches("#b"), 2).ok()?;
    let mant_str = parts[3];
    let mant = if let Some(hex) = mant_str.strip_prefix("#x") {
        u64::from_str_radix(hex, 16).ok()?
    } else {
        u64::from_str_radix(mant_str.trim_start_matches("#b"), 2).ok()?
    };
    Some((sign << 63) | (exp << 52) | mant)
}

fn strip_smt_int(text: &str) -> String {
    let t = text.trim();
    if let Some(inner) = t.strip_prefix("(- ").and_then(|s| s.strip_suffix(')')) {
        format!("-{}", inner.trim())
    } else {
        t.to_string()
    }
}

/// Render one model entry as a source literal for `ty`. Values this crate
/// cannot reconstruct from the raw model text (opaque string/complex/heap
/// handles) fall back to a commented TODO rather than a fabricated guess.
pub fn literal_for(ty: &Ty, raw: &str) -> Result<String, ReifierError> {
    match ty.underlying() {
        Ty::Int | Ty::Uint => Ok(strip_smt_int(raw)),
        Ty::Bool => Ok(if raw.trim() == "true" { "true".into() } else { "false".into() }),
        Ty::Float64 => match parse_smt_float(raw)? {
            ParsedFloat::Named(v) => Ok(format_named_float_literal(v)),
            ParsedFloat::Bits(bits) => Ok(format_float_from_bits(bits)),
        },
        Ty::String => Ok(format!("\"\" /* TODO: opaque model handle {raw} not reconstructed */")),
        Ty::Complex128 => Ok(format!("complex(0, 0) /* TODO: opaque model handle {raw} not reconstructed */")),
        Ty::Pointer(_) => Ok("nil".into()),
        Ty::Slice(_) => Ok(format!("nil /* TODO: array-of-arrays model {raw} not reconstructed */")),
        Ty::Struct(_) => Ok(format!("{ty}{{}}")),
        Ty::Named(name, inner) if inner.is_struct() => Ok(format!("&{name}{{}}")),
        Ty::Named(_, inner) => literal_for(inner, raw),
    }
}

/// Item 2(b): the five named symbolic constants map to Go's idiomatic
/// float constructors rather than a decimal literal.
fn format_named_float_literal(v: f64) -> String {
    if v.is_nan() {
        "math.NaN()".to_string()
    } else if v.is_infinite() && v > 0.0 {
        "math.Inf(1)".to_string()
    } else if v.is_infinite() {
        "math.Inf(-1)".to_string()
    } else if v == 0.0 && v.is_sign_negative() {
        "math.Copysign(0, -1)".to_string()
    } else {
        "0.0".to_string()
    }
}

/// Item 2(a): the structured `(fp sign expBits mantHex)` form reconstructs
/// the exact 64-bit pattern and is emitted bit-for-bit via
/// `math.Float64frombits`, with a comment showing the decimal value for
/// readability — a plain `{v:?}` literal would re-round through decimal
/// and is not guaranteed to parse back to the same bits.
fn format_float_from_bits(bits: u64) -> String {
    format!("math.Float64frombits(0x{bits:016x}) /* {} */", f64::from_bits(bits))
}

/// `want` comparisons use an explicit NaN check and a fixed tolerance for
/// finite floats, since `==` on a synthesized float literal is otherwise
/// flaky.
pub const FLOAT_TOLERANCE: f64 = 1e-6;

/// Emit one `Test_<function>_<index>` Go test function from a solved path.
pub fn emit_test(tc: &Testcase, index: usize) -> Result<String, EngineError> {
    let mut args = Vec::with_capacity(tc.params.len());
    for p in &tc.params {
        let raw = tc.model.get(&p.name).cloned().unwrap_or_default();
        args.push(literal_for(&p.ty, &raw)?);
    }

    let want_raw = tc.model.get(RESULT_VAR).cloned().unwrap_or_default();
    let want = literal_for(&tc.result_ty, &want_raw)?;

    let body = if matches!(tc.result_ty.underlying(), Ty::Float64) {
        format!(
            "\tgot := {name}({args})\n\twant := {want}\n\tif math.IsNaN(want) {{\n\t\tif !math.IsNaN(got) {{\n\t\t\tt.Fatalf(\"got %v, want NaN\", got)\n\t\t}}\n\t\treturn\n\t}}\n\tif math.Abs(got-want) > {tol} {{\n\t\tt.Fatalf(\"got %v, want %v\", got, want)\n\t}}",
            name = tc.function,
            args = args.join(", "),
            want = want,
            tol = FLOAT_TOLERANCE,
        )
    } else {
        format!(
            "\tgot := {name}({args})\n\twant := {want}\n\tif got != want {{\n\t\tt.Fatalf(\"got %v, want %v\", got, want)\n\t}}",
            name = tc.function,
            args = args.join(", "),
            want = want,
        )
    };

    Ok(format!("func Test_{}_{}(t *testing.T) {{\n{}\n}}\n", tc.function, index, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_named_float_constants() {
        assert_eq!(parse_smt_float("(_ +zero 11 53)").unwrap(), ParsedFloat::Named(0.0));
        assert!(matches!(parse_smt_float("(_ NaN 11 53)").unwrap(), ParsedFloat::Named(v) if v.is_nan()));
        assert_eq!(parse_smt_float("(_ +oo 11 53)").unwrap(), ParsedFloat::Named(f64::INFINITY));
    }

    #[test]
    fn parses_fp_triplet_as_bits_not_named() {
        // 1.5 = sign 0, exponent 01111111111, mantissa 1000...0
        let text = "(fp #b0 #b01111111111 #x8000000000000)";
        let parsed = parse_smt_float(text).unwrap();
        assert_eq!(parsed.value(), 1.5);
        assert!(matches!(parsed, ParsedFloat::Bits(_)), "structured fp form must stay distinct from the named constants");
    }

    #[test]
    fn structured_fp_form_reifies_as_float_from_bits_not_a_decimal_literal() {
        let lit = literal_for(&Ty::Float64, "(fp #b0 #b01111111111 #x8000000000000)").unwrap();
        assert!(lit.starts_with("math.Float64frombits(0x"));
        assert!(lit.contains("1.5"));
    }

    #[test]
    fn named_negative_zero_reifies_via_copysign() {
        let lit = literal_for(&Ty::Float64, "(_ -zero 11 53)").unwrap();
        assert_eq!(lit, "math.Copysign(0, -1)");
    }

    #[test]
    fn int_literal_strips_smt_negation_form() {
        assert_eq!(strip_smt_int("(- 5)"), "-5");
        assert_eq!(strip_smt_int("42"), "42");
    }

    #[test]
    fn emit_test_uses_tolerance_comparison_for_floats() {
        let tc = Testcase {
            function: "scale".into(),
            params: vec![crate::ir::var::Var::register("x", Ty::Float64)],
            result_ty: Ty::Float64,
            model: HashMap::from([("x".to_string(), "(_ +zero 11 53)".to_string()), (RESULT_VAR.to_string(), "(_ +zero 11 53)".to_string())]),
        };
        let src = emit_test(&tc, 0).unwrap();
        assert!(src.contains("math.Abs"));
        assert!(src.contains("Test_scale_0"));
    }

    #[test]
    fn emit_test_uses_plain_equality_for_ints() {
        let tc = Testcase {
            function: "add".into(),
            params: vec![crate::ir::var::Var::register("a", Ty::Int), crate::ir::var::Var::register("b", Ty::Int)],
            result_ty: Ty::Int,
            model: HashMap::from([("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string()), (RESULT_VAR.to_string(), "3".to_string())]),
        };
        let src = emit_test(&tc, 0).unwrap();
        assert!(src.contains("got != want"));
        assert!(src.contains("add(1, 2)"));
    }
}
