//! Resource Reservation Engine (C7): two parallel trees (test-bed, SUT)
//! sharing the same reservation state machine.

mod tree;

pub use tree::{NodeState, ResourceNode, ResourceTree};
