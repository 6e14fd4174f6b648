//! Golden/target document tree comparison
//!
//! Each document holds a table whose rows link to child documents. Two trees
//! are walked in lockstep and every pair of corresponding tables is compared
//! row by row, ignoring the link column.

pub mod domain;
pub use domain::{
    Config, DiffRecord, DocumentReference, ErrorKind, PairingNote, Policy, Row, Table,
    TraversalResult,
};

/// Document parsing and in-memory document stores.
pub mod storage;
pub use storage::{DocumentParser, HtmlParser, MemoryStore, ParseError};

/// Lockstep traversal and deadline supervision.
pub mod engine;
pub use engine::{compare_bounded, run_bounded, traverse, CancelFlag, Traversal};
