//! Lockstep comparison of a golden and a target document tree.
//!
//! [`Traversal`] walks both trees with an explicit stack and compares every
//! pair of corresponding tables. [`run_bounded`] runs any such unit of work on
//! a worker thread under a wall-clock deadline.

mod supervisor;
mod traversal;

pub use supervisor::{compare_bounded, run_bounded, CancelFlag};
pub use traversal::{traverse, Traversal};
