/// One path's cumulative exploration state: a call stack of `Frame`s plus
/// the bookkeeping the queue needs to bound and order exploration.
use crate::engine::frame::Frame;
use crate::ir::formula::Formula;
use crate::ir::var::Var;

#[derive(Debug, Clone)]
pub struct State {
    pub call_stack: Vec<Frame>,
    /// Formulas from frames that have already returned, preserved after
    /// their frame is popped off `call_stack`.
    pub history: Vec<Formula>,
    /// Number of dequeues this path has gone through; bounded by
    /// `MAX_DEPTH`.
    pub depth: usize,
    fresh_counter: u64,
}

impl State {
    pub fn entry(func_index: usize, params: &[Var]) -> Self {
        State { call_stack: vec![Frame::new_entry(func_index, params)], history: Vec::new(), depth: 0, fresh_counter: 0 }
    }

    pub fn current(&self) -> &Frame {
        self.call_stack.last().expect("call stack is never empty mid-exploration")
    }

    pub fn current_mut(&mut self) -> &mut Frame {
        self.call_stack.last_mut().expect("call stack is never empty mid-exploration")
    }

    pub fn make_fresh(&mut self, prefix: &str) -> String {
        self.fresh_counter += 1;
        format!("{prefix}@{}", self.fresh_counter)
    }

    /// The full path formula accumulated across every frame on the stack
    /// so far, oldest call first.
    pub fn path_formula(&self) -> Formula {
        let mut parts = self.history.clone();
        for frame in &self.call_stack {
            parts.extend(frame.formulas.iter().cloned());
        }
        Formula::And(parts)
    }
}
