//! One document's record table and the rules for comparing two of them.
//!
//! A [`Table`] holds the data rows and, in parallel, the child reference each
//! row links to. The link column is structural, so [`equal`] only ever looks
//! at the [`Row`] values.

use crate::domain::DocumentReference;

/// Column headings of a record table, link column last.
pub const COLUMNS: [&str; 6] = ["S.No.", "Names", "Size", "Address", "Description", "Link"];

/// A fixed-arity data row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Row {
    sequence: String,
    name: String,
    size: String,
    address: String,
    description: String,
}

impl Row {
    /// Creates a row from its five data fields.
    pub fn new(
        sequence: impl Into<String>,
        name: impl Into<String>,
        size: impl Into<String>,
        address: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            sequence: sequence.into(),
            name: name.into(),
            size: size.into(),
            address: address.into(),
            description: description.into(),
        }
    }

    /// The sequence number column.
    #[must_use]
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// The name column.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The size column.
    #[must_use]
    pub fn size(&self) -> &str {
        &self.size
    }

    /// The address column.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The description column.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// All data fields in column order.
    #[must_use]
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.sequence,
            &self.name,
            &self.size,
            &self.address,
            &self.description,
        ]
    }
}

/// The record table extracted from one document.
///
/// Tables are built once by a parser and never mutated. `rows` and
/// `children` always have the same length.
#[derive(Debug, Clone)]
pub struct Table {
    reference: DocumentReference,
    rows: Vec<Row>,
    children: Vec<Option<DocumentReference>>,
}

impl Table {
    /// Builds a table from rows paired with their (optional) outgoing link.
    pub fn new(
        reference: DocumentReference,
        entries: impl IntoIterator<Item = (Row, Option<DocumentReference>)>,
    ) -> Self {
        let (rows, children) = entries.into_iter().unzip();
        Self {
            reference,
            rows,
            children,
        }
    }

    /// The document this table was extracted from.
    #[must_use]
    pub const fn reference(&self) -> &DocumentReference {
        &self.reference
    }

    /// Data rows in document order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// One entry per row: the child document the row links to, if any.
    #[must_use]
    pub fn children(&self) -> &[Option<DocumentReference>] {
        &self.children
    }

    /// Number of rows that carry a link.
    #[must_use]
    pub fn linked_children(&self) -> usize {
        self.children.iter().flatten().count()
    }

    /// Whether this table holds the same data as `other`.
    ///
    /// See [`equal`].
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        equal(self, other)
    }

    /// Cell-by-cell comparison against `other`, including the link column.
    ///
    /// Links are compared relative to their own document's directory, so
    /// golden and target trees living under different roots can still match.
    #[must_use]
    pub fn cell_grid(&self, other: &Self) -> CellGrid {
        let len = self.rows.len().max(other.rows.len());
        let rows = (0..len)
            .map(|i| {
                let mut cells = [false; 6];
                if let (Some(a), Some(b)) = (self.rows.get(i), other.rows.get(i)) {
                    for (cell, (x, y)) in cells.iter_mut().zip(a.fields().into_iter().zip(b.fields()))
                    {
                        *cell = x == y;
                    }
                    cells[5] = self.relative_link(i) == other.relative_link(i);
                }
                cells
            })
            .collect();
        CellGrid { rows }
    }

    fn relative_link(&self, index: usize) -> Option<&std::path::Path> {
        let child = self.children.get(index)?.as_ref()?;
        Some(
            child
                .path()
                .strip_prefix(self.reference.base_dir())
                .unwrap_or_else(|_| child.path()),
        )
    }
}

/// Two tables are equal iff they have the same number of rows and every row
/// matches positionally on all data fields. The link column never takes part.
#[must_use]
pub fn equal(a: &Table, b: &Table) -> bool {
    a.rows == b.rows
}

/// Per-cell equality of two tables, one entry per row of the longer table.
///
/// Rows present on only one side are entirely unequal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    rows: Vec<[bool; 6]>,
}

impl CellGrid {
    /// Per-row equality flags in [`COLUMNS`] order.
    #[must_use]
    pub fn rows(&self) -> &[[bool; 6]] {
        &self.rows
    }

    /// Whether every cell matched.
    #[must_use]
    pub fn all_equal(&self) -> bool {
        self.rows.iter().flatten().all(|&cell| cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(seq: &str, description: &str) -> Row {
        Row::new(seq, format!("reg{seq}"), "32", format!("0x{seq}0"), description)
    }

    fn table(name: &str, rows: &[(Row, Option<&str>)]) -> Table {
        Table::new(
            DocumentReference::from(name),
            rows.iter()
                .map(|(r, link)| (r.clone(), link.map(DocumentReference::from))),
        )
    }

    #[test]
    fn link_column_is_ignored() {
        let a = table("g.htm", &[(row("1", "ctrl"), Some("g/a.htm"))]);
        let b = table("t.htm", &[(row("1", "ctrl"), Some("t/elsewhere.htm"))]);
        assert!(equal(&a, &b));
    }

    #[test]
    fn missing_link_on_one_side_is_still_equal() {
        let a = table("g.htm", &[(row("1", "ctrl"), Some("a.htm"))]);
        let b = table("t.htm", &[(row("1", "ctrl"), None)]);
        assert!(equal(&a, &b));
    }

    #[test]
    fn equality_is_symmetric() {
        let a = table("g.htm", &[(row("1", "ctrl"), None), (row("2", "stat"), None)]);
        let b = table("t.htm", &[(row("1", "ctrl"), None), (row("2", "status"), None)]);
        assert_eq!(equal(&a, &b), equal(&b, &a));
        assert!(!equal(&a, &b));
    }

    #[test]
    fn different_row_counts_are_unequal() {
        let a = table("g.htm", &[(row("1", "ctrl"), None)]);
        let b = table("t.htm", &[(row("1", "ctrl"), None), (row("2", "stat"), None)]);
        assert!(!a.same_content(&b));
    }

    #[test]
    fn row_order_matters() {
        let a = table("g.htm", &[(row("1", "ctrl"), None), (row("2", "stat"), None)]);
        let b = table("t.htm", &[(row("2", "stat"), None), (row("1", "ctrl"), None)]);
        assert!(!equal(&a, &b));
    }

    #[test]
    fn empty_tables_are_equal() {
        let a = table("g.htm", &[]);
        let b = table("t.htm", &[]);
        assert!(equal(&a, &b));
        assert!(a.children().is_empty());
    }

    #[test]
    fn children_parallel_rows() {
        let a = table(
            "g.htm",
            &[(row("1", "ctrl"), Some("a.htm")), (row("2", "stat"), None)],
        );
        assert_eq!(a.rows().len(), a.children().len());
        assert_eq!(a.linked_children(), 1);
    }

    #[test]
    fn cell_grid_flags_mismatched_cells() {
        let a = table(
            "g.htm",
            &[(row("1", "ctrl"), Some("a.htm")), (row("2", "stat"), None)],
        );
        let b = table("EXP/t.htm", &[(row("1", "control"), Some("EXP/a.htm"))]);

        let grid = a.cell_grid(&b);

        assert_eq!(grid.rows().len(), 2);
        assert_eq!(grid.rows()[0], [true, true, true, true, false, true]);
        assert_eq!(grid.rows()[1], [false; 6]);
        assert!(!grid.all_equal());
    }
}
