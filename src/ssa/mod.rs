/// The SSA control-flow graph consumed by the engine.
///
/// Building this from source text is explicitly out of scope (an external
/// frontend is assumed to deliver a well-typed SSA CFG); this module only
/// defines the data it consumes. `text` provides a small internal text
/// format used to drive the CLI and tests without a real frontend.
pub mod text;

use crate::ir::types::Ty;
use crate::ir::var::Var;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub source_id: u32,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(source_id: u32, start: usize, end: usize) -> Self {
        Span { source_id, start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span { source_id: self.source_id, start: self.start.min(other.start), end: self.end.max(other.end) }
    }
}

/// Instruction kinds the translator recognizes. Every variant listed in the
/// data model must at least parse; only the ones with a `Semantic` payload
/// carry an encoding (`engine::translate`, `engine::static_encoder`).
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    BinOp { result: Var, op: String, left: Var, right: Var },
    UnOp { result: Var, op: String, arg: Var },
    Convert { result: Var, arg: Var },
    Call { result: Var, callee: String, args: Vec<Var>, same_package: bool },
    IndexAddr { result: Var, array: Var, index: Var },
    FieldAddr { result: Var, base: Var, field_index: usize, field_name: String },
    Phi { result: Var, edges: Vec<Var> },
    /// Parse-only instruction kinds from the data model that carry no
    /// semantic encoding: `Alloc`, `Store`, `Extract`, `MakeMap`,
    /// `MakeSlice`, `Lookup`, `MapUpdate`, `Select`, `Index`, `Field`.
    Unsupported { kind: String, span: Span },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    If { cond: Var, then_block: usize, else_block: usize },
    Jump { target: usize },
    Return { results: Vec<Var> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub index: usize,
    pub instrs: Vec<Instr>,
    pub term: Terminator,
    /// Predecessor block indices, needed for phi resolution.
    pub preds: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    /// Package path this function belongs to; calls that cross packages
    /// abort the path (`BoundaryError::ExternalCall`).
    pub package: String,
    pub params: Vec<Var>,
    pub result_ty: Ty,
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn entry(&self) -> &BasicBlock {
        &self.blocks[0]
    }

    pub fn block(&self, index: usize) -> &BasicBlock {
        &self.blocks[index]
    }
}
