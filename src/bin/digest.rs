use anyhow::{Context, Result, bail};
use clap::Parser;
use rustydigest::config::Config;
use rustydigest::extraction::{PlainTextExtractor, collect_documents};
use rustydigest::logging::init_cli_tracing;
use rustydigest::processing::{DigestService, SummaryRequest, SummaryResult};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

/// Summarize local files into a budgeted extract and print the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "digest", version, about)]
struct Cli {
    /// Task description; used as the query when --query is not given.
    #[arg(long, default_value = "")]
    task: String,

    /// Task category echoed into the result.
    #[arg(long = "task-type", default_value = "general")]
    task_type: String,

    /// Explicit query that drives sentence selection.
    #[arg(long)]
    query: Option<String>,

    /// Override the token budget.
    #[arg(long = "max-tokens")]
    max_tokens: Option<usize>,

    /// Log pipeline decisions to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Files or directories to summarize; directories are walked recursively.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_cli_tracing(cli.verbose);
    match run(cli) {
        Ok(result) if result.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("digest: {error:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<SummaryResult> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("failed to load configuration")?;
    let mut settings = config.summarizer;
    if let Some(max_tokens) = cli.max_tokens {
        settings.max_tokens = max_tokens;
    }

    let files = expand_paths(&cli.paths)?;
    tracing::debug!(files = files.len(), "Collected input files");
    let extractor = PlainTextExtractor::new(config.max_file_size);
    let documents = collect_documents(&extractor, &files);

    let service = DigestService::new(settings);
    let result = service.process(SummaryRequest {
        documents,
        task: cli.task,
        task_type: cli.task_type,
        query: cli.query,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("failed to serialize result")?
    );
    Ok(result)
}

/// Expand directories into their files, sorted by name; plain files are kept in order.
fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            bail!("path does not exist: {}", path.display());
        }
        if path.is_dir() {
            files.extend(walk_dir(path)?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn walk_dir(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
