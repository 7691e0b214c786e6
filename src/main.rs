//! vibecheck: scope-compliance checks for AI coding agents.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use vibecheck::config;
use vibecheck::constants;
use vibecheck::env;
use vibecheck::memory;
use vibecheck::models;
use vibecheck::precheck;
use vibecheck::review;
use vibecheck::scanner;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Command, DiffReviewArgs, MemoryAction, PreCheckArgs, ScanArgs};
use config::Config;
use env::Env;
use memory::{MemoryStore, TemplateOptions};
use precheck::PreCheckRequest;
use review::ReviewRequest;
use scanner::ProjectScanner;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

/// Log to stderr so stdout carries only the rendered report.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(constants::ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::PreCheck(args) => run_pre_check(&cli, args).await,
        Command::DiffReview(args) => run_diff_review(&cli, args).await,
        Command::Scan(args) => run_scan(&cli, args).await,
        Command::Memory { path, action } => run_memory(&cli, path, action).await,
        Command::Schema => print_json(&models::contract::contract_schema()),
        Command::Version => run_version(),
    }
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// Resolve a `--path` argument to an existing directory.
fn project_root(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path)
        .with_context(|| format!("--path directory not found: {}", path.display()))
}

/// Load layered config for a project, then apply command-line overrides.
fn load_config(cli: &Cli, root: Option<&Path>) -> Result<Config> {
    let mut config =
        Config::load(root, &Env::real()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config);
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

async fn run_pre_check(cli: &Cli, args: &PreCheckArgs) -> Result<()> {
    let root = project_root(&args.path)?;
    let config = load_config(cli, Some(&root))?;

    let request = PreCheckRequest {
        request: &args.request,
        project_root: &root,
        proposed_files: &args.files,
        proposed_changes: args.changes.as_deref(),
    };
    let report = precheck::pre_check(&request, &config).await;

    print!("{}", args.output.format.render_pre_check(&report));
    if args.output.strict && !report.passed {
        bail!("pre-check did not pass (score {}/100)", report.score);
    }
    Ok(())
}

async fn run_diff_review(cli: &Cli, args: &DiffReviewArgs) -> Result<()> {
    let contract = read_contract(&args.contract).await?;
    let root = args.path.as_deref().map(project_root).transpose()?;
    let config = load_config(cli, root.as_deref())?;

    let request = ReviewRequest {
        contract: &contract,
        changed_files: &args.changed,
        added_files: &args.added,
        deleted_files: &args.deleted,
        summary: &args.summary,
        project_root: root.as_deref(),
    };
    let outcome = review::diff_review(&request, &config).await;

    if let review::WriteBackStatus::PartialFailure { failed_step, ref error, .. } = outcome.write_back {
        use colored::Colorize;
        eprintln!(
            "  {} memory bank write-back stopped at {failed_step}: {error}",
            "⚠".yellow().bold()
        );
    }

    print!("{}", args.output.format.render_review(&outcome.report));
    if args.output.strict && !outcome.report.compliant {
        bail!("implementation is not compliant (score {}/100)", outcome.report.score);
    }
    Ok(())
}

/// Read the contract from a file, or from stdin when the argument is `-`.
async fn read_contract(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read contract from stdin")?;
        return Ok(buf);
    }
    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("failed to read contract file {source}"))
}

async fn run_scan(cli: &Cli, args: &ScanArgs) -> Result<()> {
    let root = project_root(&args.path)?;
    let config = load_config(cli, Some(&root))?;
    let snapshot = ProjectScanner::new(config.scan).scan(&root).await;
    print_json(&snapshot)
}

async fn run_memory(cli: &Cli, path: &Path, action: &MemoryAction) -> Result<()> {
    let root = project_root(path)?;
    let config = load_config(cli, Some(&root))?;
    let store = MemoryStore::new(&root, config.memory);

    match action {
        MemoryAction::Init {
            name,
            tech_stack,
            description,
        } => {
            let options = TemplateOptions {
                project_name: name.clone(),
                tech_stack: tech_stack.clone(),
                description: description.clone(),
            };
            let result = store
                .init(&options)
                .await
                .context("failed to initialize memory bank")?;
            print_json(&result)
        }
        MemoryAction::Read { file } => print_json(&store.read_target(file).await),
        MemoryAction::Update {
            file,
            content,
            mode,
        } => {
            let result = store
                .update_target(file, content, *mode)
                .await
                .with_context(|| format!("failed to update {file}"))?;
            print_json(&result)
        }
        MemoryAction::Feature { title, content } => {
            let file = store
                .create_feature_spec(title, content)
                .await
                .context("failed to create feature spec")?;
            print_json(&serde_json::json!({ "created": true, "file": file }))
        }
    }
}
