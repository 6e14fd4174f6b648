use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use anyhow::Context;
use clap::ArgAction;
use dtdiff::{compare_bounded, Config, DocumentReference, HtmlParser, Policy, TraversalResult};
use tracing::instrument;

mod report;
mod terminal;
mod viewer;

use report::OutputFormat;

/// Configuration file read from the working directory when `--config` is not
/// given.
const DEFAULT_CONFIG: &str = "dtdiff.toml";

#[derive(Debug, clap::Parser)]
#[command(
    version,
    about = "Compare tables in two trees of linked HTML documents and report differences"
)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Path to the "golden" reference document
    #[arg(long, default_value = "GOLDEN/cypress.htm")]
    golden: PathBuf,

    /// Path to the target document compared against the golden one
    #[arg(long, default_value = "EXP/cypress.htm")]
    target: PathBuf,

    /// Comparison mode (defaults to the configured mode, or 'fast')
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Maximum time allowed for the comparison, in seconds
    #[arg(long, value_name = "SECONDS", alias = "max_time")]
    max_time: Option<u64>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    output: OutputFormat,

    /// Print a cell-by-cell comparison of the first differing pair
    #[arg(long)]
    show_table: bool,

    /// Open the first differing pair in the configured viewer
    #[arg(long)]
    open: bool,

    /// Path to a configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Comparison mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Mode {
    /// Stop at the first difference
    #[value(alias = "f")]
    Fast,
    /// Continue and collect all differences
    #[value(alias = "F")]
    Full,
}

impl From<Mode> for Policy {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Fast => Self::Fast,
            Mode::Full => Self::Full,
        }
    }
}

/// How a run ended, mapped onto the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Both trees are identical.
    Same,
    /// At least one pair of documents differs.
    Different,
    /// No verdict: bad input, timeout or a broken worker.
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Same => ExitCode::SUCCESS,
            Self::Different => ExitCode::from(1),
            Self::Failed => ExitCode::from(2),
        }
    }
}

impl From<&TraversalResult> for Outcome {
    fn from(result: &TraversalResult) -> Self {
        if result.error.is_some() {
            Self::Failed
        } else if result.same {
            Self::Same
        } else {
            Self::Different
        }
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<Outcome> {
        Self::setup_logging(self.verbose);

        let config = self.load_config()?;
        let policy = self.mode.map_or(config.mode, Policy::from);
        let deadline = self
            .max_time
            .map_or_else(|| config.max_time(), Duration::from_secs);

        let result = self.compare(policy, deadline);
        report::print(&result, self.output)?;

        if let Some(first) = result.first_diff() {
            if self.show_table {
                if let Err(e) = report::print_cell_grid(&HtmlParser::new(), first) {
                    tracing::warn!("could not show table differences: {e}");
                }
            }
            if self.open {
                if let Err(e) = viewer::open(&config.viewer, first) {
                    tracing::warn!("issue opening viewer '{}': {e:#}", config.viewer);
                }
            }
        }

        Ok(Outcome::from(&result))
    }

    #[instrument(level = "debug", skip(self))]
    fn compare(&self, policy: Policy, deadline: Duration) -> TraversalResult {
        compare_bounded(
            HtmlParser::new(),
            DocumentReference::new(&self.golden),
            DocumentReference::new(&self.target),
            policy,
            deadline,
        )
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => Config::load_or_default(Path::new(DEFAULT_CONFIG))
                .with_context(|| format!("failed to load config from {DEFAULT_CONFIG}")),
        }
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(verbosity > 1)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}
