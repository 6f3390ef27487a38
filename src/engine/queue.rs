/// Pluggable path-state exploration order. All three strategies hold
/// nothing but the pending states themselves — order is the only thing
/// that varies.
use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engine::state::State;

pub trait Queue {
    fn push(&mut self, state: State);
    fn pop(&mut self) -> Option<State>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Depth-first: always continues the most recently branched path.
pub struct DfsQueue {
    items: Vec<State>,
}

impl DfsQueue {
    pub fn new() -> Self {
        DfsQueue { items: Vec::new() }
    }
}

impl Default for DfsQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Queue for DfsQueue {
    fn push(&mut self, state: State) {
        self.items.push(state);
    }

    fn pop(&mut self) -> Option<State> {
        self.items.pop()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Breadth-first: explores all paths at a given depth before going deeper.
pub struct BfsQueue {
    items: VecDeque<State>,
}

impl BfsQueue {
    pub fn new() -> Self {
        BfsQueue { items: VecDeque::new() }
    }
}

impl Default for BfsQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Queue for BfsQueue {
    fn push(&mut self, state: State) {
        self.items.push_back(state);
    }

    fn pop(&mut self) -> Option<State> {
        self.items.pop_front()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Deterministic-random: seeded so a run can be reproduced exactly from
/// its `--seed`.
pub struct RandomQueue {
    items: Vec<State>,
    rng: StdRng,
}

impl RandomQueue {
    pub fn new(seed: u64) -> Self {
        RandomQueue { items: Vec::new(), rng: StdRng::seed_from_u64(seed) }
    }
}

impl Queue for RandomQueue {
    fn push(&mut self, state: State) {
        self.items.push(state);
    }

    fn pop(&mut self) -> Option<State> {
        if self.items.is_empty() {
            return None;
        }
        use rand::Rng;
        let i = self.rng.gen_range(0..self.items.len());
        Some(self.items.swap_remove(i))
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::Ty;
    use crate::ir::var::Var;

    fn dummy(n: usize) -> State {
        State::entry(n, &[Var::register("a", Ty::Int)])
    }

    #[test]
    fn dfs_pops_most_recently_pushed() {
        let mut q = DfsQueue::new();
        q.push(dummy(0));
        q.push(dummy(1));
        assert_eq!(q.pop().unwrap().call_stack[0].func_index, 1);
    }

    #[test]
    fn bfs_pops_oldest_first() {
        let mut q = BfsQueue::new();
        q.push(dummy(0));
        q.push(dummy(1));
        assert_eq!(q.pop().unwrap().call_stack[0].func_index, 0);
    }

    #[test]
    fn random_queue_is_deterministic_for_a_fixed_seed() {
        let mut a = RandomQueue::new(7);
        let mut b = RandomQueue::new(7);
        for i in 0..5 {
            a.push(dummy(i));
            b.push(dummy(i));
        }
        let order_a: Vec<usize> = std::iter::from_fn(|| a.pop().map(|s| s.call_stack[0].func_index)).collect();
        let order_b: Vec<usize> = std::iter::from_fn(|| b.pop().map(|s| s.call_stack[0].func_index)).collect();
        assert_eq!(order_a, order_b);
    }
}
