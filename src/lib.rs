/// Symex: a path-sensitive, constraint-based symbolic execution engine.
///
/// Module layout:
///   - ssa          — the SSA control-flow graph consumed by the engine,
///                    plus a small internal text format (`ssa::text`) for
///                    driving the CLI and tests without a real frontend
///   - ir           — the type lattice, variable operands, the closed
///                    `Formula` algebra, and its operator-by-sort encoding
///   - smt          — term construction, the per-solve encoding context,
///                    symbolic value bookkeeping, and the solver process
///   - engine       — path state, the pluggable exploration queue, the
///                    dynamic (feasibility-pruning) translator, and the
///                    static (whole-function) alternative
///   - reify        — model-to-source-literal reification and test emission
///   - config       — persisted engine configuration (~/.symex/conf.toml)
///   - errors       — the five-bucket error taxonomy
///   - diagnostics  — `miette`-backed diagnostic rendering (SYM_1xx-5xx)
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod ir;
pub mod reify;
pub mod smt;
pub mod ssa;

pub use config::EngineConfig;
pub use engine::{BfsQueue, DfsQueue, Queue, RandomQueue, State};
pub use errors::{EngineError, Result};
pub use ir::formula::Formula;
pub use ir::types::Ty;
pub use ir::var::Var;
pub use ssa::Function;
