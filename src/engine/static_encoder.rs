/// The static encoder: folds an entire function into one formula using
/// nested `ite`s instead of exploring each path separately. No feasibility
/// pruning happens — every arm is encoded whether or not it is reachable.
/// Requires an acyclic, reducible CFG; anything else is a structural error,
/// not a silent wrong answer.
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::errors::{EngineError, StructuralError};
use crate::ir::formula::Formula;
use crate::ir::var::Var;
use crate::ssa::{BasicBlock, Function, Instr, Terminator};

/// Builds the single closed-form `Formula` for `func`, erroring if its CFG
/// is not acyclic.
pub fn encode_function(func: &Function) -> Result<Formula, EngineError> {
    check_acyclic(func)?;
    build_block(func, func.entry(), None)
}

/// Builds the function's CFG as a `petgraph` digraph (one node per block,
/// in block-index order so `NodeIndex` and block index coincide) and runs
/// `toposort` over it: `toposort` fails iff the graph has a cycle, and
/// names one block on that cycle for the error.
fn check_acyclic(func: &Function) -> Result<(), EngineError> {
    let mut graph = DiGraph::<(), ()>::with_capacity(func.blocks.len(), func.blocks.len());
    for _ in &func.blocks {
        graph.add_node(());
    }
    for block in &func.blocks {
        match &block.term {
            Terminator::If { then_block, else_block, .. } => {
                graph.add_edge(NodeIndex::new(block.index), NodeIndex::new(*then_block), ());
                graph.add_edge(NodeIndex::new(block.index), NodeIndex::new(*else_block), ());
            }
            Terminator::Jump { target } => {
                graph.add_edge(NodeIndex::new(block.index), NodeIndex::new(*target), ());
            }
            Terminator::Return { .. } => {}
        }
    }
    toposort(&graph, None)
        .map(|_| ())
        .map_err(|cycle| StructuralError::CyclicCfg { block: cycle.node_id().index() }.into())
}

fn build_block(func: &Function, block: &BasicBlock, prev: Option<usize>) -> Result<Formula, EngineError> {
    let mut parts = Vec::new();
    for instr in &block.instrs {
        parts.push(instr_to_formula(block, prev, instr)?);
    }

    let tail = match &block.term {
        Terminator::Return { results } => {
            if results.len() > 1 {
                return Err(crate::errors::TypingError::MultiValueReturn { count: results.len() }.into());
            }
            Formula::Return { value: results.first().cloned() }
        }
        Terminator::Jump { target } => build_block(func, func.block(*target), Some(block.index))?,
        Terminator::If { cond, then_block, else_block } => {
            let then = build_block(func, func.block(*then_block), Some(block.index))?;
            let els = build_block(func, func.block(*else_block), Some(block.index))?;
            Formula::If { cond: cond.clone(), then: Box::new(then), els: Box::new(els) }
        }
    };
    parts.push(tail);
    Ok(Formula::And(parts))
}

fn instr_to_formula(block: &BasicBlock, prev: Option<usize>, instr: &Instr) -> Result<Formula, EngineError> {
    Ok(match instr {
        Instr::BinOp { result, op, left, right } => {
            Formula::BinOp { result: result.clone(), op: op.clone(), left: left.clone(), right: right.clone() }
        }
        Instr::UnOp { result, op, arg } => Formula::UnOp { result: result.clone(), op: op.clone(), arg: arg.clone() },
        Instr::Convert { result, arg } => Formula::Convert { result: result.clone(), arg: arg.clone() },
        Instr::IndexAddr { result, array, index } => {
            Formula::IndexAddr { result: result.clone(), array: array.clone(), index: index.clone() }
        }
        Instr::FieldAddr { result, base, field_index, .. } => {
            Formula::FieldAddr { result: result.clone(), base: base.clone(), field_index: *field_index }
        }
        Instr::Call { result, callee, args, same_package } => {
            if !same_package {
                return Err(crate::errors::BoundaryError::ExternalCall { callee: callee.clone() }.into());
            }
            if matches!(callee.as_str(), "real" | "imag" | "len") && args.len() == 1 {
                Formula::Call { result: result.clone(), callee: callee.clone(), args: args.clone() }
            } else {
                // Interprocedural calls are not inlined by the static
                // encoder; only dynamic exploration expands them into
                // fresh frames.
                return Err(crate::errors::BoundaryError::ExternalCall { callee: callee.clone() }.into());
            }
        }
        Instr::Phi { result, edges } => {
            let idx = prev
                .and_then(|p| block.preds.iter().position(|pred| *pred == p))
                .ok_or(StructuralError::DanglingPhi { block: block.index })?;
            let chosen = edges.get(idx).ok_or(StructuralError::DanglingPhi { block: block.index })?;
            Formula::Alias { result: result.clone(), value: chosen.clone() }
        }
        Instr::Unsupported { kind, span } => return Err(StructuralError::UnknownInstruction { kind: kind.clone(), span: *span }.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::Ty;
    use crate::ssa::{BasicBlock, Span};

    fn two_branch_fn() -> Function {
        Function {
            name: "max".into(),
            package: "main".into(),
            params: vec![Var::register("a", Ty::Int), Var::register("b", Ty::Int)],
            result_ty: Ty::Int,
            blocks: vec![
                BasicBlock {
                    index: 0,
                    instrs: vec![Instr::BinOp {
                        result: Var::register("t1", Ty::Bool),
                        op: ">".into(),
                        left: Var::register("a", Ty::Int),
                        right: Var::register("b", Ty::Int),
                    }],
                    term: Terminator::If { cond: Var::register("t1", Ty::Bool), then_block: 1, else_block: 2 },
                    preds: vec![],
                },
                BasicBlock { index: 1, instrs: vec![], term: Terminator::Return { results: vec![Var::register("a", Ty::Int)] }, preds: vec![0] },
                BasicBlock { index: 2, instrs: vec![], term: Terminator::Return { results: vec![Var::register("b", Ty::Int)] }, preds: vec![0] },
            ],
        }
    }

    #[test]
    fn encodes_two_branch_function_as_nested_ite() {
        let f = two_branch_fn();
        let formula = encode_function(&f).unwrap();
        assert!(matches!(formula, Formula::And(_)));
    }

    #[test]
    fn cyclic_cfg_is_rejected() {
        let mut f = two_branch_fn();
        f.blocks[2].term = Terminator::Jump { target: 0 };
        let err = encode_function(&f).unwrap_err();
        assert!(matches!(err, EngineError::Structural(StructuralError::CyclicCfg { .. })));
    }

    #[test]
    fn unsupported_instruction_surfaces_as_structural_error() {
        let mut f = two_branch_fn();
        f.blocks[0].instrs.push(Instr::Unsupported { kind: "Alloc".into(), span: Span::default() });
        let err = encode_function(&f).unwrap_err();
        assert!(matches!(err, EngineError::Structural(StructuralError::UnknownInstruction { .. })));
    }
}
