use std::process;

use anyhow::Context;
use dtdiff::DiffRecord;

/// Opens both documents of `diff` with the configured viewer command.
///
/// `viewer` may carry its own arguments (`"firefox --new-window"`); the two
/// document paths are appended after them.
pub fn open(viewer: &str, diff: &DiffRecord) -> anyhow::Result<()> {
    let mut words = viewer.split_whitespace();
    let program = words.next().context("no viewer command configured")?;

    let status = process::Command::new(program)
        .args(words)
        .arg(diff.golden.path())
        .arg(diff.target.path())
        .status()
        .with_context(|| format!("failed to launch '{program}'"))?;

    if !status.success() {
        anyhow::bail!("viewer exited with {status}");
    }

    Ok(())
}
