//! Domain models for document tree comparison.
//!
//! This module contains the value types shared by the parser, the traversal
//! engine and the command line: references, tables, results and
//! configuration.

mod config;
pub use config::{Config, ConfigError};

mod reference;
pub use reference::DocumentReference;

/// Tables, rows and pairwise equality.
pub mod table;
pub use table::{equal, CellGrid, Row, Table};

mod result;
pub use result::{DiffRecord, ErrorKind, PairingNote, Policy, TraversalResult};
