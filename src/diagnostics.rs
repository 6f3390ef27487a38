/// Diagnostic rendering for the symbolic execution engine — routes every
/// `EngineError` through `miette` for graphical terminal output.
///
/// Error code taxonomy (SYM_1xx-5xx), one bucket per `errors::EngineError`
/// variant family.
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::errors::{BoundaryError, EngineError, ReifierError, SolverError, StructuralError, TypingError};
use crate::ssa::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // SYM_100-199: structural
    UnknownInstruction = 100,
    CyclicCfg = 101,
    DanglingPhi = 102,
    // SYM_200-299: typing
    UnsupportedConversion = 200,
    UnknownBuiltin = 201,
    MixedTypeBinOp = 202,
    UnresolvedName = 203,
    UnknownOperator = 204,
    MultiValueReturn = 205,
    // SYM_300-399: boundary
    ExternalCall = 300,
    MaxDepthExceeded = 301,
    // SYM_400-499: solver
    SolverTimeout = 400,
    SolverInternal = 401,
    // SYM_500-599: reifier
    UnparseableModelEntry = 500,
}

impl ErrorCode {
    pub fn prefix(self) -> String {
        format!("[SYM_{:03}]", self as u32)
    }

    pub fn hint(self) -> &'static str {
        match self {
            Self::UnknownInstruction => "Only BinOp/UnOp/Convert/Call/Return/And/Condition/IndexAddr/FieldAddr carry semantic encodings; other kinds must at least parse.",
            Self::CyclicCfg => "The static encoder only accepts acyclic reducible CFGs. Loops must be modeled via bounded phi-unrolling in the dynamic engine instead.",
            Self::DanglingPhi => "Every phi edge must name a predecessor that actually appears earlier in this frame's block order.",
            Self::UnsupportedConversion => "Only Int<->Uint, Float<->Float, Int/Uint->Float, and Complex->Complex conversions are defined.",
            Self::UnknownBuiltin => "Only `real`, `imag`, and `len` are recognized built-ins.",
            Self::MixedTypeBinOp => "Insert an explicit Convert instruction before mixing operand types.",
            Self::UnresolvedName => "The variable was never materialized via scan_vars before encode was called.",
            Self::UnknownOperator => "This operator has no encoding for the operand's sort.",
            Self::MultiValueReturn => "Wrap multiple results in a struct before returning, or split into separate functions.",
            Self::ExternalCall => "Calls across package boundaries are not inlined; the path is abandoned rather than guessed at.",
            Self::MaxDepthExceeded => "Raise --max-depth if this is a legitimate deep/recursive path, or confirm the function terminates.",
            Self::SolverTimeout => "Raise --timeout-secs, or simplify the path (fewer nested calls, smaller range axioms).",
            Self::SolverInternal => "Check the solver binary is on PATH and supports model production.",
            Self::UnparseableModelEntry => "A TODO placeholder was emitted for this argument; check the raw model text in the log.",
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("{} {message}", self.code.prefix())]
#[diagnostic(help("{hint}"))]
pub struct EngineDiagnostic {
    pub message: String,
    pub code: ErrorCode,
    pub hint: String,
    #[source_code]
    pub src: NamedSource,
    #[label("here")]
    pub span: SourceSpan,
}

impl EngineDiagnostic {
    pub fn new(code: ErrorCode, message: impl Into<String>, source_name: &str, source_text: &str, span: Span) -> Self {
        EngineDiagnostic {
            hint: code.hint().into(),
            message: message.into(),
            code,
            src: NamedSource::new(source_name, source_text.to_string()),
            span: (span.start, (span.end.saturating_sub(span.start)).max(1)).into(),
        }
    }

    pub fn no_source(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message, "<unknown>", " ", Span::default())
    }
}

/// Map a structural/typing/boundary/solver/reifier error onto its code and
/// a best-effort span, for CLI-facing rendering.
pub fn classify(err: &EngineError) -> (ErrorCode, String, Span) {
    match err {
        EngineError::Structural(StructuralError::UnknownInstruction { kind, span }) => {
            (ErrorCode::UnknownInstruction, format!("unknown instruction '{kind}'"), *span)
        }
        EngineError::Structural(StructuralError::CyclicCfg { block }) => {
            (ErrorCode::CyclicCfg, format!("cycle reaches block {block}"), Span::default())
        }
        EngineError::Structural(StructuralError::DanglingPhi { block }) => {
            (ErrorCode::DanglingPhi, format!("phi in block {block} has no resolvable edge"), Span::default())
        }
        EngineError::Typing(TypingError::UnsupportedConversion { from, to }) => {
            (ErrorCode::UnsupportedConversion, format!("cannot convert '{from}' to '{to}'"), Span::default())
        }
        EngineError::Typing(TypingError::UnknownBuiltin { name }) => {
            (ErrorCode::UnknownBuiltin, format!("unknown builtin '{name}'"), Span::default())
        }
        EngineError::Typing(TypingError::MixedTypeBinOp { op, left, right }) => {
            (ErrorCode::MixedTypeBinOp, format!("'{op}' mixes '{left}' and '{right}'"), Span::default())
        }
        EngineError::Typing(TypingError::UnresolvedName { name }) => {
            (ErrorCode::UnresolvedName, format!("unresolved name '{name}'"), Span::default())
        }
        EngineError::Typing(TypingError::UnknownOperator { op, sort }) => {
            (ErrorCode::UnknownOperator, format!("'{op}' undefined for sort '{sort}'"), Span::default())
        }
        EngineError::Typing(TypingError::MultiValueReturn { count }) => {
            (ErrorCode::MultiValueReturn, format!("{count} return values"), Span::default())
        }
        EngineError::Boundary(BoundaryError::ExternalCall { callee }) => {
            (ErrorCode::ExternalCall, format!("call to foreign '{callee}'"), Span::default())
        }
        EngineError::Boundary(BoundaryError::MaxDepthExceeded { max_depth }) => {
            (ErrorCode::MaxDepthExceeded, format!("exceeded {max_depth} dequeues"), Span::default())
        }
        EngineError::Solver(SolverError::Timeout { timeout_secs }) => {
            (ErrorCode::SolverTimeout, format!("timed out after {timeout_secs}s"), Span::default())
        }
        EngineError::Solver(SolverError::Internal { message }) => {
            (ErrorCode::SolverInternal, message.clone(), Span::default())
        }
        EngineError::Reifier(ReifierError::UnparseableModelEntry { name, text }) => {
            (ErrorCode::UnparseableModelEntry, format!("'{name}' = '{text}'"), Span::default())
        }
    }
}

pub fn to_diagnostic(err: &EngineError, source_name: &str, source_text: &str) -> EngineDiagnostic {
    let (code, message, span) = classify(err);
    EngineDiagnostic::new(code, message, source_name, source_text, span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_three_digit() {
        assert_eq!(ErrorCode::UnknownInstruction.prefix(), "[SYM_100]");
        assert_eq!(ErrorCode::UnparseableModelEntry.prefix(), "[SYM_500]");
    }

    #[test]
    fn classify_preserves_message_content() {
        let err = EngineError::Boundary(BoundaryError::MaxDepthExceeded { max_depth: 64 });
        let (code, message, _) = classify(&err);
        assert_eq!(code, ErrorCode::MaxDepthExceeded);
        assert!(message.contains("64"));
    }
}
