use std::io;

use crate::domain::{DocumentReference, ErrorKind, Table};

/// Produces the [`Table`] held by a referenced document.
///
/// Implementations resolve each row's outgoing link relative to the
/// referring document, so the references in [`Table::children`] can be
/// passed straight back to [`DocumentParser::parse`].
pub trait DocumentParser {
    /// Parses the document named by `reference`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist, cannot be read, or
    /// holds no table.
    fn parse(&self, reference: &DocumentReference) -> Result<Table, ParseError>;
}

impl<P: DocumentParser + ?Sized> DocumentParser for &P {
    fn parse(&self, reference: &DocumentReference) -> Result<Table, ParseError> {
        (**self).parse(reference)
    }
}

impl<P: DocumentParser + ?Sized> DocumentParser for std::sync::Arc<P> {
    fn parse(&self, reference: &DocumentReference) -> Result<Table, ParseError> {
        (**self).parse(reference)
    }
}

/// Errors that can occur when parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document does not exist.
    #[error("file not found: {0}")]
    NotFound(DocumentReference),
    /// The document contains no table.
    #[error("no tables found in file: {0}")]
    NoTable(DocumentReference),
    /// The document could not be read.
    #[error("failed to read {reference}")]
    Io {
        /// The document being read.
        reference: DocumentReference,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl ParseError {
    pub(crate) fn from_io(reference: &DocumentReference, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(reference.clone()),
            _ => Self::Io {
                reference: reference.clone(),
                source,
            },
        }
    }
}

impl From<ParseError> for ErrorKind {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::NotFound(reference) => Self::InputNotFound { reference },
            ParseError::NoTable(reference) => Self::NoTableFound { reference },
            ParseError::Io { reference, source } => Self::Unreadable {
                reference,
                message: source.to_string(),
            },
        }
    }
}
