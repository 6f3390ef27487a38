/// A single function activation on a path's call stack.
///
/// Deliberately holds only owned, plain data (no parent pointers, no
/// shared `Rc`s into other frames) — cloning a `State` therefore just
/// clones a flat `Vec<Frame>`, which sidesteps the cyclic-object-graph
/// problem that pointer-linked call frames run into under cloning.
/// Functions themselves live in an immutable registry held by the caller
/// and are referenced here by index, not by value.
use std::collections::HashMap;

use crate::ir::formula::Formula;
use crate::ir::var::Var;

#[derive(Debug, Clone)]
pub struct Frame {
    pub func_index: usize,
    pub block: usize,
    pub pc: usize,
    pub prev_block: Option<usize>,
    /// SSA register name -> the `Var` currently bound to it (renamed on
    /// entry for a callee frame so its register names never collide with
    /// the caller's).
    pub locals: HashMap<String, Var>,
    /// Every semantic formula produced while executing in this frame, in
    /// program order.
    pub formulas: Vec<Formula>,
    /// Where to bind this frame's `$result` once it returns, in the
    /// caller's frame. `None` for the outermost frame.
    pub result_binding: Option<Var>,
}

impl Frame {
    pub fn new_entry(func_index: usize, params: &[Var]) -> Self {
        let mut locals = HashMap::new();
        for p in params {
            locals.insert(p.name.clone(), p.clone());
        }
        Frame { func_index, block: 0, pc: 0, prev_block: None, locals, result_binding: None }
    }

    pub fn resolve(&self, var: &Var) -> Var {
        if var.is_constant {
            return var.clone();
        }
        self.locals.get(&var.name).cloned().unwrap_or_else(|| var.clone())
    }

    pub fn bind(&mut self, name: impl Into<String>, var: Var) {
        self.locals.insert(name.into(), var);
    }
}
