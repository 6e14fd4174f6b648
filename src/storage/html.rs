//! Record table extraction from generated HTML documents.
//!
//! Documents are expected to end with a table whose first row is a header
//! and whose data rows carry exactly five cells. The second cell may hold an
//! anchor pointing at the child document for that row.
//!
//! Table structure is recovered by a small tag scanner rather than by
//! matching whole elements, so tables nested inside a cell and rows or cells
//! whose end tags are omitted keep their place in the outer table.

use std::{fs, ops::Range, sync::LazyLock};

use regex::Regex;
use tracing::instrument;

use crate::{
    domain::{DocumentReference, Row, Table},
    storage::{DocumentParser, ParseError},
};

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)</?(table|tr|td|th)\b[^>]*>").expect("markup pattern is valid")
});

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("anchor pattern is valid")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// Number of data cells a row must have to be part of the record table.
const CELLS_PER_ROW: usize = 5;

/// Reads record tables from HTML files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    /// Creates a parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Extracts the record table from HTML text.
    ///
    /// The record table is the last table that is not nested inside another
    /// one. `reference` names the document the text came from; child links
    /// are resolved against its directory.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoTable`] if the text contains no table.
    pub fn parse_str(reference: &DocumentReference, html: &str) -> Result<Table, ParseError> {
        let outline = Outline::scan(html);
        let table = outline
            .last_table()
            .ok_or_else(|| ParseError::NoTable(reference.clone()))?;

        let entries = outline.children(table, Kind::Row).skip(1).filter_map(|row| {
            let cells: Vec<&str> = outline
                .children(row, Kind::Data)
                .map(|cell| outline.content(cell))
                .collect();
            parse_row(reference, &cells)
        });

        Ok(Table::new(reference.clone(), entries))
    }
}

impl DocumentParser for HtmlParser {
    #[instrument(level = "trace", skip_all, fields(reference = %reference))]
    fn parse(&self, reference: &DocumentReference) -> Result<Table, ParseError> {
        let bytes = fs::read(reference.path()).map_err(|e| ParseError::from_io(reference, e))?;
        let html = String::from_utf8_lossy(&bytes);
        Self::parse_str(reference, &html)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Table,
    Row,
    Data,
    Heading,
}

impl Kind {
    fn from_tag(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "table" => Self::Table,
            "tr" => Self::Row,
            "td" => Self::Data,
            _ => Self::Heading,
        }
    }

    const fn is_cell(self) -> bool {
        matches!(self, Self::Data | Self::Heading)
    }

    const fn closes(self, open: Self) -> bool {
        match self {
            Self::Data | Self::Heading => open.is_cell(),
            Self::Row => matches!(open, Self::Row),
            Self::Table => matches!(open, Self::Table),
        }
    }
}

#[derive(Debug)]
struct Element {
    kind: Kind,
    content: Range<usize>,
    children: Vec<usize>,
    nested: bool,
}

/// Every table, row and cell of a document, in document order.
///
/// End tags are optional: a row ends at the next row of its table, a cell at
/// the next cell of its row, and anything still open ends with its enclosing
/// element or the document.
#[derive(Debug)]
struct Outline<'h> {
    html: &'h str,
    elements: Vec<Element>,
}

impl<'h> Outline<'h> {
    fn scan(html: &'h str) -> Self {
        let mut outline = Self {
            html,
            elements: Vec::new(),
        };
        let mut open: Vec<usize> = Vec::new();

        for tag in MARKUP.captures_iter(html) {
            let Some(whole) = tag.get(0) else { continue };
            let kind = Kind::from_tag(&tag[1]);
            // Rows and cells never reach past the innermost open table.
            let floor = open
                .iter()
                .rposition(|&i| outline.elements[i].kind == Kind::Table)
                .map_or(0, |position| position + 1);

            if whole.as_str().starts_with("</") {
                let position = if kind == Kind::Table {
                    floor.checked_sub(1)
                } else {
                    open[floor..]
                        .iter()
                        .rposition(|&i| kind.closes(outline.elements[i].kind))
                        .map(|position| floor + position)
                };
                // Stray end tags are ignored.
                if let Some(position) = position {
                    outline.close(&mut open, position, whole.start());
                }
                continue;
            }

            let implied = match kind {
                Kind::Row => Some(floor),
                Kind::Data | Kind::Heading => open[floor..]
                    .iter()
                    .position(|&i| outline.elements[i].kind.is_cell())
                    .map(|position| floor + position),
                Kind::Table => None,
            };
            if let Some(position) = implied {
                outline.close(&mut open, position, whole.start());
            }

            let index = outline.elements.len();
            let parent = open.last().copied();
            if let Some(parent) = parent {
                outline.elements[parent].children.push(index);
            }
            outline.elements.push(Element {
                kind,
                content: whole.end()..html.len(),
                children: Vec::new(),
                nested: floor > 0 || (kind == Kind::Table && parent.is_some()),
            });
            open.push(index);
        }

        outline
    }

    /// Ends every element from `position` up the stack at byte `at`.
    fn close(&mut self, open: &mut Vec<usize>, position: usize, at: usize) {
        for &index in &open[position..] {
            self.elements[index].content.end = at;
        }
        open.truncate(position);
    }

    /// The last table that is not nested inside another table.
    fn last_table(&self) -> Option<usize> {
        self.elements
            .iter()
            .rposition(|element| element.kind == Kind::Table && !element.nested)
    }

    fn children(&self, parent: usize, kind: Kind) -> impl Iterator<Item = usize> + '_ {
        self.elements[parent]
            .children
            .iter()
            .copied()
            .filter(move |&child| self.elements[child].kind == kind)
    }

    fn content(&self, index: usize) -> &'h str {
        &self.html[self.elements[index].content.clone()]
    }
}

fn parse_row(reference: &DocumentReference, cells: &[&str]) -> Option<(Row, Option<DocumentReference>)> {
    let [sequence, name, size, address, description] = cells else {
        tracing::trace!(
            "skipping row with {} cells (expected {CELLS_PER_ROW}) in {reference}",
            cells.len()
        );
        return None;
    };

    let link = link_target(name).map(|link| reference.resolve(&link));
    let row = Row::new(
        text(sequence),
        text(name),
        text(size),
        text(address),
        text(description),
    );
    Some((row, link))
}

/// The document an anchor inside `cell` points at.
///
/// Everything after the first `.htm` (anchors, query strings, a trailing `l`)
/// is dropped.
fn link_target(cell: &str) -> Option<String> {
    let captures = ANCHOR_HREF.captures(cell)?;
    let href = (1..=3).find_map(|i| captures.get(i))?.as_str();
    let href = html_escape::decode_html_entities(href);
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let stem = href.split(".htm").next().unwrap_or(href);
    Some(format!("{stem}.htm"))
}

/// Visible text of an HTML fragment.
fn text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    html_escape::decode_html_entities(&stripped).trim().to_string()
}
