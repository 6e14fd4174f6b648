//! Turning document references into tables.
//!
//! The traversal engine only knows the [`DocumentParser`] trait. The
//! [`HtmlParser`] reads generated HTML files from disk, while the
//! [`MemoryStore`] serves prebuilt tables and never touches the filesystem.

mod html;
mod memory;
mod parser;

pub use html::HtmlParser;
pub use memory::MemoryStore;
pub use parser::{DocumentParser, ParseError};
