use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::domain::DocumentReference;

/// When a traversal stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Stop at the first pair of differing documents.
    #[default]
    #[serde(alias = "f")]
    Fast,
    /// Keep going and report every reachable difference.
    #[serde(alias = "F")]
    Full,
}

impl Policy {
    /// Whether the traversal should stop as soon as a difference is found.
    #[must_use]
    pub const fn stops_at_first(self) -> bool {
        matches!(self, Self::Fast)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => f.write_str("fast"),
            Self::Full => f.write_str("full"),
        }
    }
}

/// Two corresponding documents whose tables differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffRecord {
    /// Document on the golden side.
    pub golden: DocumentReference,
    /// Document on the target side.
    pub target: DocumentReference,
}

impl DiffRecord {
    /// Pairs two references.
    #[must_use]
    pub const fn new(golden: DocumentReference, target: DocumentReference) -> Self {
        Self { golden, target }
    }
}

/// A pair whose child lists could not be matched one-to-one.
///
/// Pairing is positional and stops at the shorter list, so any surplus
/// children are never examined. Positions linked on one side only are
/// skipped as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingNote {
    /// Document on the golden side.
    pub golden: DocumentReference,
    /// Document on the target side.
    pub target: DocumentReference,
    /// Child count seen on the golden side.
    pub golden_children: usize,
    /// Child count seen on the target side.
    pub target_children: usize,
}

/// Why a comparison could not produce a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced document does not exist.
    #[error("document not found: {reference}")]
    InputNotFound {
        /// The missing document.
        reference: DocumentReference,
    },
    /// The document exists but holds no table.
    #[error("no table found in {reference}")]
    NoTableFound {
        /// The offending document.
        reference: DocumentReference,
    },
    /// The document exists but could not be read.
    #[error("failed to read {reference}: {message}")]
    Unreadable {
        /// The offending document.
        reference: DocumentReference,
        /// The underlying I/O error.
        message: String,
    },
    /// The wall-clock budget ran out.
    #[error("comparison aborted after {seconds} seconds")]
    TimeoutExceeded {
        /// The budget that was exceeded, in seconds.
        seconds: f64,
    },
    /// The traversal was told to stop before it finished.
    #[error("comparison cancelled")]
    Cancelled,
    /// The traversal worker died before producing a result.
    #[error("comparison worker terminated unexpectedly")]
    WorkerFailed,
}

/// Outcome of one comparison.
///
/// `same` is only ever `true` when the traversal completed without error and
/// found no differences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalResult {
    /// Whether the two trees are identical.
    pub same: bool,
    /// Differing document pairs in discovery order.
    pub diffs: Vec<DiffRecord>,
    /// Child lists that did not pair up cleanly.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<PairingNote>,
    /// Whether the deadline expired.
    pub timed_out: bool,
    /// Set when no verdict could be reached.
    pub error: Option<ErrorKind>,
}

impl TraversalResult {
    /// A finished traversal with the given differences.
    #[must_use]
    pub fn completed(diffs: Vec<DiffRecord>, notes: Vec<PairingNote>) -> Self {
        Self {
            same: diffs.is_empty(),
            diffs,
            notes,
            timed_out: false,
            error: None,
        }
    }

    /// A traversal aborted by an input error.
    ///
    /// Differences gathered before the failure are discarded.
    #[must_use]
    pub const fn failed(error: ErrorKind) -> Self {
        Self {
            same: false,
            diffs: Vec::new(),
            notes: Vec::new(),
            timed_out: false,
            error: Some(error),
        }
    }

    /// A traversal abandoned because `deadline` elapsed.
    #[must_use]
    pub const fn timed_out(deadline: Duration) -> Self {
        Self {
            same: false,
            diffs: Vec::new(),
            notes: Vec::new(),
            timed_out: true,
            error: Some(ErrorKind::TimeoutExceeded {
                seconds: deadline.as_secs_f64(),
            }),
        }
    }

    /// The first difference found, if any.
    #[must_use]
    pub fn first_diff(&self) -> Option<&DiffRecord> {
        self.diffs.first()
    }
}
