/// Error taxonomy for the symbolic execution engine.
///
/// Mirrors the five buckets of the error handling design: Structural,
/// Typing, External boundary, Solver, and Reifier. Every bucket is
/// recoverable at the function boundary — see `engine::run_function`.
use thiserror::Error;

use crate::ssa::Span;

/// Structural failures: malformed or unsupported control flow.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StructuralError {
    #[error("unknown SSA instruction '{kind}' at {span:?}")]
    UnknownInstruction { kind: String, span: Span },

    #[error("cyclic CFG encountered at block {block} (static encoder requires acyclic reducible CFGs)")]
    CyclicCfg { block: usize },

    #[error("phi node in block {block} has no matching predecessor in block order")]
    DanglingPhi { block: usize },
}

/// Typing failures while encoding a single path's formula.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypingError {
    #[error("unsupported conversion from '{from}' to '{to}'")]
    UnsupportedConversion { from: String, to: String },

    #[error("unknown built-in function '{name}'")]
    UnknownBuiltin { name: String },

    #[error("mixed-type binary operation '{op}' between '{left}' and '{right}'")]
    MixedTypeBinOp { op: String, left: String, right: String },

    #[error("unresolved variable name '{name}'")]
    UnresolvedName { name: String },

    #[error("unknown binary operator '{op}' for sort '{sort}'")]
    UnknownOperator { op: String, sort: String },

    #[error("multiple return values are not supported (function returned {count})")]
    MultiValueReturn { count: usize },
}

/// Errors at the boundary of what this path exploration will cross.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoundaryError {
    #[error("call to '{callee}' crosses into a foreign package; path abandoned")]
    ExternalCall { callee: String },

    #[error("path exceeded MAX_DEPTH ({max_depth}) dequeues; state discarded")]
    MaxDepthExceeded { max_depth: usize },
}

/// Failures surfaced by the SMT oracle.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("solver timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("solver reported an internal error: {message}")]
    Internal { message: String },
}

/// Failures while turning a model into source-level literals.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReifierError {
    #[error("could not parse model entry for '{name}': '{text}'")]
    UnparseableModelEntry { name: String, text: String },
}

/// Top-level error wrapper, analogous to the teacher's `CompileError`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Typing(#[from] TypingError),
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Reifier(#[from] ReifierError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
