/// The SMT-facing half of the engine: term construction, the per-solve
/// encoding context (lazy sorts, heap arrays, range axioms), the symbolic
/// value bookkeeping for non-scalar SSA values, and the solver process glue.
pub mod ctx;
pub mod solver;
pub mod term;
pub mod value;
