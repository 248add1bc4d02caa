//! Node strategy implementations

// Trust-based compliant node
pub mod compliant;

// Adversarial strategies used by the simulation
pub mod do_nothing;
pub mod intermittent;
pub mod send_one;

pub use compliant::{CompliantNode, Tally};
pub use do_nothing::DoNothingNode;
pub use intermittent::IntermittentNode;
pub use send_one::SendOneNode;
