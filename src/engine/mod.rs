/// The path exploration engine: per-path state, the pluggable exploration
/// order, the dynamic (feasibility-pruning) translator, and the static
/// (whole-function, no-pruning) alternative.
pub mod frame;
pub mod queue;
pub mod state;
pub mod static_encoder;
pub mod translate;

pub use frame::Frame;
pub use queue::{BfsQueue, DfsQueue, Queue, RandomQueue};
pub use state::State;
