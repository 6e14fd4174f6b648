//! End-to-end comparisons of document trees written to disk.

#![allow(missing_docs)]

use std::{fs, path::Path, time::Duration};

use dtdiff::{
    compare_bounded, traverse, DiffRecord, DocumentReference, ErrorKind, HtmlParser, Policy,
};
use tempfile::TempDir;

/// Writes a register-map style document. Rows are `(name, description, link)`.
fn write_doc(path: &Path, rows: &[(&str, &str, Option<&str>)]) {
    let mut html = String::from(
        "<html><head><title>map</title></head><body>\n\
         <table><tr><td>generated</td></tr></table>\n\
         <table>\n<tr><th>S.No.</th><th>Names</th><th>Size</th><th>Address</th><th>Description</th></tr>\n",
    );
    for (i, (name, description, link)) in rows.iter().enumerate() {
        let name_cell = link.map_or_else(
            || (*name).to_string(),
            |href| format!("<a href=\"{href}#top\">{name}</a>"),
        );
        html.push_str(&format!(
            "<tr><td>{}</td><td>{name_cell}</td><td>32</td><td>0x{:02X}</td><td>{description}</td></tr>\n",
            i + 1,
            i * 4
        ));
    }
    html.push_str("</table></body></html>\n");

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, html).unwrap();
}

/// Writes `side/cypress.htm` linking to blocks A, B and C.
fn write_tree(root: &Path, side: &str, b_description: &str, c_description: &str) {
    let dir = root.join(side);
    write_doc(
        &dir.join("cypress.htm"),
        &[
            ("A", "block a", Some("blocks/a.htm")),
            ("B", "block b", Some("blocks/b.htm")),
            ("C", "block c", Some("blocks/c.htm")),
        ],
    );
    write_doc(&dir.join("blocks/a.htm"), &[("CTRL", "control", None)]);
    write_doc(&dir.join("blocks/b.htm"), &[("STAT", b_description, None)]);
    write_doc(&dir.join("blocks/c.htm"), &[("DATA", c_description, None)]);
}

fn roots(tmp: &TempDir) -> (DocumentReference, DocumentReference) {
    (
        DocumentReference::new(tmp.path().join("GOLDEN/cypress.htm")),
        DocumentReference::new(tmp.path().join("EXP/cypress.htm")),
    )
}

fn block(tmp: &TempDir, side: &str, name: &str) -> DocumentReference {
    DocumentReference::new(tmp.path().join(side).join("blocks").join(name))
}

#[test]
fn identical_trees_match() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), "GOLDEN", "status", "data");
    write_tree(tmp.path(), "EXP", "status", "data");
    let (golden, target) = roots(&tmp);

    let result = compare_bounded(HtmlParser::new(), golden, target, Policy::Full, Duration::from_secs(30));

    assert!(result.same);
    assert!(result.error.is_none());
    assert!(!result.timed_out);
}

#[test]
fn nested_difference_is_found_by_descent() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), "GOLDEN", "status", "data");
    write_tree(tmp.path(), "EXP", "status register", "data");
    let (golden, target) = roots(&tmp);

    let result = traverse(HtmlParser::new(), &golden, &target, Policy::Fast);

    assert!(!result.same);
    assert_eq!(
        result.diffs,
        vec![DiffRecord::new(block(&tmp, "GOLDEN", "b.htm"), block(&tmp, "EXP", "b.htm"))]
    );
}

#[test]
fn full_mode_collects_every_difference_in_discovery_order() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), "GOLDEN", "status", "data");
    write_tree(tmp.path(), "EXP", "status register", "payload");
    let (golden, target) = roots(&tmp);

    let fast = traverse(HtmlParser::new(), &golden, &target, Policy::Fast);
    let full = traverse(HtmlParser::new(), &golden, &target, Policy::Full);

    assert_eq!(fast.diffs.len(), 1);
    assert_eq!(
        full.diffs,
        vec![
            DiffRecord::new(block(&tmp, "GOLDEN", "c.htm"), block(&tmp, "EXP", "c.htm")),
            DiffRecord::new(block(&tmp, "GOLDEN", "b.htm"), block(&tmp, "EXP", "b.htm")),
        ]
    );
    assert!(full.diffs.contains(&fast.diffs[0]));
}

#[test]
fn missing_document_is_an_error_not_a_difference() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), "GOLDEN", "status", "data");
    write_tree(tmp.path(), "EXP", "status", "data");
    fs::remove_file(tmp.path().join("EXP/blocks/a.htm")).unwrap();
    let (golden, target) = roots(&tmp);

    let result = traverse(HtmlParser::new(), &golden, &target, Policy::Full);

    assert!(!result.same);
    assert!(result.diffs.is_empty());
    assert_eq!(
        result.error,
        Some(ErrorKind::InputNotFound {
            reference: block(&tmp, "EXP", "a.htm")
        })
    );
}

#[test]
fn document_without_table_is_reported() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), "GOLDEN", "status", "data");
    write_tree(tmp.path(), "EXP", "status", "data");
    fs::write(tmp.path().join("EXP/blocks/c.htm"), "<html><p>oops</p></html>").unwrap();
    let (golden, target) = roots(&tmp);

    let result = traverse(HtmlParser::new(), &golden, &target, Policy::Fast);

    assert_eq!(
        result.error,
        Some(ErrorKind::NoTableFound {
            reference: block(&tmp, "EXP", "c.htm")
        })
    );
}

#[test]
fn back_links_do_not_loop() {
    let tmp = TempDir::new().unwrap();
    for side in ["GOLDEN", "EXP"] {
        let dir = tmp.path().join(side);
        write_doc(&dir.join("cypress.htm"), &[("TOP", "top", Some("sub/leaf.htm"))]);
        write_doc(&dir.join("sub/leaf.htm"), &[("UP", "parent", Some("../cypress.htm"))]);
    }
    let (golden, target) = roots(&tmp);

    let result = compare_bounded(HtmlParser::new(), golden, target, Policy::Full, Duration::from_secs(30));

    assert!(result.same);
    assert!(!result.timed_out);
}
