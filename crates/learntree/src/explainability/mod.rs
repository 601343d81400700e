//! Human-readable tree renderings.

mod dot;

pub use dot::to_dot;
