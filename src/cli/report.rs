use dtdiff::{domain::table::COLUMNS, DiffRecord, DocumentParser, ParseError, TraversalResult};

use super::terminal::{self, Colorize};

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Serialized result for scripts
    #[default]
    Json,
    /// Human-readable summary
    Pretty,
}

/// Writes the comparison result to stdout.
pub fn print(result: &TraversalResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Pretty => print_pretty(result),
    }
    Ok(())
}

fn print_pretty(result: &TraversalResult) {
    let narrow = terminal::is_narrow();

    if let Some(error) = &result.error {
        println!("{}", format!("✘ {error}").failure());
        return;
    }

    if result.same {
        println!("{}", "✔ golden and target trees are identical".success());
    } else {
        println!(
            "{}",
            format!("✘ {} differing document pair(s)", result.diffs.len()).warning()
        );
        for diff in &result.diffs {
            if narrow {
                println!("  {}", diff.golden);
                println!("  {}", diff.target);
            } else {
                println!("  golden: {}", diff.golden);
                println!("  target: {}", diff.target);
            }
            println!();
        }
    }

    if !result.notes.is_empty() {
        println!("{}", "Unpaired children".dim());
        for note in &result.notes {
            println!(
                "  {} ({}) | {} ({})",
                note.golden, note.golden_children, note.target, note.target_children
            );
        }
    }
}

/// Prints which cells of the differing pair match, row by row.
pub fn print_cell_grid(parser: &impl DocumentParser, diff: &DiffRecord) -> Result<(), ParseError> {
    let golden = parser.parse(&diff.golden)?;
    let target = parser.parse(&diff.target)?;
    let grid = golden.cell_grid(&target);

    let rule = "-".repeat(50);
    println!("{rule}");
    println!("\t \t DIFFERENCES");
    println!("{rule}");
    println!("{}", COLUMNS.join("  "));
    for row in grid.rows() {
        let cells: Vec<String> = row
            .iter()
            .zip(COLUMNS)
            .map(|(&matches, heading)| {
                let cell = format!("{:<width$}", if matches { "True" } else { "False" }, width = heading.len());
                if matches { cell } else { cell.warning() }
            })
            .collect();
        println!("{}", cells.join("  "));
    }
    println!("{rule}");

    Ok(())
}
