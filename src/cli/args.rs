//! Clap argument types and config overrides.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use vibecheck::config::Config;
use vibecheck::memory::WriteMode;
use vibecheck::models::{ComplianceReport, PreCheckReport};
use vibecheck::output::OutputRenderer;
use vibecheck::output::json::JsonRenderer;
use vibecheck::output::terminal::TerminalRenderer;

/// Scope-compliance checks for AI coding agents.
#[derive(Parser, Debug)]
#[command(
    name = "vibecheck",
    version = vibecheck::constants::VERSION,
    about = super::ABOUT,
)]
pub struct Cli {
    /// Scan deadline in milliseconds (overrides config and environment).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Maximum directory depth for the scan (overrides config and environment).
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Memory bank directory, relative to the project root.
    #[arg(long, global = true)]
    pub memory_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ms) = self.timeout_ms {
            config.scan.timeout_ms = ms;
        }
        if let Some(depth) = self.max_depth {
            config.scan.max_depth = depth;
        }
        if let Some(ref dir) = self.memory_dir {
            config.memory.dir = dir.clone();
        }
    }
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Check a plan before implementing it and emit a scope contract.
    PreCheck(PreCheckArgs),

    /// Review an implementation against a scope contract.
    DiffReview(DiffReviewArgs),

    /// Scan a project and print the snapshot as JSON.
    Scan(ScanArgs),

    /// Read and maintain the project memory bank.
    Memory {
        /// Project root (default: current directory).
        #[arg(long, default_value = ".", global = true)]
        path: PathBuf,

        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Print the JSON Schema of the scope contract.
    Schema,

    /// Print version and build information.
    Version,
}

/// Arguments for the `pre-check` subcommand.
#[derive(Parser, Debug)]
pub struct PreCheckArgs {
    /// The user's original request.
    #[arg(long)]
    pub request: String,

    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// A file the plan will touch (repeatable).
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<String>,

    /// Free-text description of the planned change.
    #[arg(long)]
    pub changes: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `diff-review` subcommand.
#[derive(Parser, Debug)]
pub struct DiffReviewArgs {
    /// Contract JSON file from a prior pre-check, or `-` for stdin.
    #[arg(long, value_name = "FILE|-")]
    pub contract: String,

    /// What was actually implemented.
    #[arg(long)]
    pub summary: String,

    /// A modified file (repeatable).
    #[arg(long = "changed", value_name = "PATH")]
    pub changed: Vec<String>,

    /// A newly created file (repeatable).
    #[arg(long = "added", value_name = "PATH")]
    pub added: Vec<String>,

    /// A deleted file (repeatable).
    #[arg(long = "deleted", value_name = "PATH")]
    pub deleted: Vec<String>,

    /// Project root. Enables the route cross-check and the memory write-back.
    #[arg(long)]
    pub path: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `scan` subcommand.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

/// Memory bank subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum MemoryAction {
    /// Create the memory bank from templates.
    Init {
        /// Project name for the brief.
        #[arg(long)]
        name: Option<String>,

        /// Tech stack summary.
        #[arg(long)]
        tech_stack: Option<String>,

        /// One-paragraph project description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Read a document, `features/<name>.md`, or `all`.
    Read {
        #[arg(default_value = "all")]
        file: String,
    },
    /// Replace or append to a document.
    Update {
        file: String,

        /// New content.
        #[arg(long)]
        content: String,

        #[arg(long, value_enum, default_value_t = WriteMode::Replace)]
        mode: WriteMode,
    },
    /// Create a new feature spec.
    Feature {
        /// Feature title, slugged into the file name.
        title: String,

        #[arg(long)]
        content: String,
    },
}

/// Shared rendering flags.
#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Exit non-zero when the plan did not pass or the review is not compliant.
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    fn renderer(&self) -> &'static dyn OutputRenderer {
        match self {
            OutputFormat::Terminal => &TerminalRenderer,
            OutputFormat::Json => &JsonRenderer,
        }
    }

    pub fn render_pre_check(&self, report: &PreCheckReport) -> String {
        self.renderer().render_pre_check(report)
    }

    pub fn render_review(&self, report: &ComplianceReport) -> String {
        self.renderer().render_review(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vibecheck").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn pre_check_with_repeated_files() {
        let cli = parse(&[
            "pre-check",
            "--request",
            "add a login page",
            "--file",
            "src/app/login/page.tsx",
            "--file",
            "src/app/layout.tsx",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::PreCheck(args) => {
                assert_eq!(args.request, "add a login page");
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.path, PathBuf::from("."));
                assert_eq!(args.output.format, OutputFormat::Json);
                assert!(!args.output.strict);
                assert!(args.changes.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn pre_check_requires_request() {
        assert!(Cli::try_parse_from(["vibecheck", "pre-check"]).is_err());
    }

    #[test]
    fn diff_review_from_stdin() {
        let cli = parse(&[
            "diff-review",
            "--contract",
            "-",
            "--summary",
            "added login",
            "--added",
            "src/app/login/page.tsx",
            "--strict",
        ]);
        match cli.command {
            Command::DiffReview(args) => {
                assert_eq!(args.contract, "-");
                assert_eq!(args.added, vec!["src/app/login/page.tsx"]);
                assert!(args.changed.is_empty());
                assert!(args.path.is_none());
                assert!(args.output.strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn memory_update_mode() {
        let cli = parse(&[
            "memory",
            "update",
            "progress.md",
            "--content",
            "row",
            "--mode",
            "append",
        ]);
        match cli.command {
            Command::Memory {
                action: MemoryAction::Update { file, mode, .. },
                ..
            } => {
                assert_eq!(file, "progress.md");
                assert_eq!(mode, WriteMode::Append);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn memory_read_defaults_to_all() {
        let cli = parse(&["memory", "read"]);
        assert!(matches!(
            cli.command,
            Command::Memory { action: MemoryAction::Read { ref file }, .. } if file == "all"
        ));
    }

    #[test]
    fn global_overrides_apply() {
        let cli = parse(&["--timeout-ms", "50", "scan", "--max-depth", "2"]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.scan.timeout_ms, 50);
        assert_eq!(config.scan.max_depth, 2);
        assert_eq!(config.memory.dir, "memory-bank");
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(
            Cli::try_parse_from(["vibecheck", "pre-check", "--request", "x", "--format", "github"])
                .is_err()
        );
    }
}
