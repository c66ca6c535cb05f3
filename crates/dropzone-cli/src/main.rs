//! Dropzone CLI: a host for the intake pipeline that feeds files from disk.
//!
//! Limits come from DROPZONE_MAX_FILE_SIZE_MB, DROPZONE_MAX_FILE_COUNT and
//! DROPZONE_ALLOWED_EXTENSIONS (a `.env` file is honoured), or from a host
//! options record passed with `--options`. Flags override both.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dropzone_cli::{format_file_size, init_tracing};
use dropzone_core::{parse_allowed_extensions, CandidateFile, FileKind, IntakeConfig};
use dropzone_processing::{
    HostOptions, HostOutputs, HostSession, MetadataExtractor, ValidationPolicy,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "dropzone", about = "File intake pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add files to a list and print the resulting host outputs
    Add {
        /// Files to add, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Initial file list (JSON string, or @path to a JSON file)
        #[arg(long)]
        initial: Option<String>,
        /// Also emit the metadata list
        #[arg(long)]
        metadata: bool,
        /// Print a one-line summary per file instead of JSON
        #[arg(long)]
        summary: bool,
        /// Print every list change to stderr as it happens
        #[arg(long)]
        changes: bool,
        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Check files against the limits without reading them
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Number of files already in the list
        #[arg(long, default_value = "0")]
        existing: usize,
        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Print the metadata record of a single file
    Inspect {
        file: PathBuf,
    },
    /// Print the effective limits as shown to users
    Limits {
        #[command(flatten)]
        limits: LimitArgs,
    },
}

#[derive(Args)]
struct LimitArgs {
    /// Host options record as JSON (maxFileSizeMB, maxFileCount, allowedExtensions)
    #[arg(long)]
    options: Option<String>,
    /// Maximum size per file in MB
    #[arg(long)]
    max_size_mb: Option<f64>,
    /// Maximum number of files in the list
    #[arg(long)]
    max_count: Option<usize>,
    /// Comma-separated allowed extensions, e.g. "pdf,docx"
    #[arg(long)]
    allowed: Option<String>,
}

impl LimitArgs {
    fn resolve(&self) -> anyhow::Result<IntakeConfig> {
        let mut config = match &self.options {
            Some(raw) => HostOptions::from_json(raw)
                .context("Parse host options")?
                .to_config(),
            None => IntakeConfig::from_env().context("Load limits from environment")?,
        };

        if let Some(mb) = self.max_size_mb {
            config.max_file_size_mb = mb;
        }
        if let Some(count) = self.max_count {
            config.max_file_count = count;
        }
        if let Some(allowed) = &self.allowed {
            config.allowed_extensions = parse_allowed_extensions(allowed);
        }

        config.validate().context("Invalid limits")?;
        Ok(config)
    }
}

#[derive(Serialize)]
struct AddReport {
    files: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
    error: Option<String>,
}

impl AddReport {
    fn from_outputs(outputs: &HostOutputs) -> anyhow::Result<Self> {
        let metadata = outputs
            .metadata_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        Ok(Self {
            files: serde_json::from_str(&outputs.files_json)?,
            metadata,
            error: outputs.error.clone(),
        })
    }
}

#[derive(Serialize)]
struct ValidateReport {
    accepted: Vec<String>,
    rejected: Vec<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct LimitsReport {
    max_size: String,
    allowed_types: String,
    max_file_count: usize,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn load_candidates(paths: &[PathBuf]) -> anyhow::Result<Vec<CandidateFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = CandidateFile::from_path(path)
            .await
            .with_context(|| format!("Open {}", path.display()))?;
        files.push(file);
    }
    Ok(files)
}

fn read_initial(raw: &str) -> anyhow::Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Read initial file list from {}", path)),
        None => Ok(raw.to_string()),
    }
}

fn print_summary(outputs: &HostOutputs, session: &HostSession) {
    let state = session.orchestrator().snapshot();
    for (index, file) in state.files().iter().enumerate() {
        println!(
            "{:>3}  {:<40} {:>10}  {:?}",
            index,
            file.name,
            format_file_size(file.size),
            FileKind::from_name(&file.name)
        );
    }
    if let Some(error) = &outputs.error {
        println!("error: {}", error);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Add {
            files,
            initial,
            metadata,
            summary,
            changes,
            limits,
        } => {
            let config = limits.resolve()?;
            let initial = initial.as_deref().map(read_initial).transpose()?;
            let session = HostSession::with_config(config, initial.as_deref(), metadata)
                .context("Start intake session")?;
            let notifier = changes.then(|| {
                session.spawn_notifier(|outputs| match AddReport::from_outputs(&outputs) {
                    Ok(report) => match serde_json::to_string(&report) {
                        Ok(line) => eprintln!("{}", line),
                        Err(err) => tracing::warn!(error = %err, "Could not print list change"),
                    },
                    Err(err) => tracing::warn!(error = %err, "Could not print list change"),
                })
            });

            let candidates = load_candidates(&files).await?;
            let outcome = session
                .orchestrator()
                .add_files(candidates)
                .await
                .context("Process files")?;
            tracing::debug!(
                batch_id = %outcome.batch_id,
                accepted = outcome.accepted,
                rejected = outcome.rejected,
                "Batch finished"
            );

            let outputs = session.outputs()?;
            if summary {
                print_summary(&outputs, &session);
            } else {
                print_json(&AddReport::from_outputs(&outputs)?)?;
            }

            drop(session);
            if let Some(notifier) = notifier {
                notifier.await.context("Change notifier")?;
            }
        }
        Commands::Validate {
            files,
            existing,
            limits,
        } => {
            let policy = ValidationPolicy::new(&limits.resolve()?);
            let candidates = load_candidates(&files).await?;
            let outcome = policy.validate(candidates, existing);

            print_json(&ValidateReport {
                accepted: outcome.valid.iter().map(|f| f.name.clone()).collect(),
                rejected: outcome
                    .rejections
                    .iter()
                    .map(|(name, _)| name.clone())
                    .collect(),
                error: outcome.error_message(),
            })?;
        }
        Commands::Inspect { file } => {
            let candidate = CandidateFile::from_path(&file)
                .await
                .with_context(|| format!("Open {}", file.display()))?;
            let metadata = MetadataExtractor::new().extract(&candidate).await;
            print_json(&metadata)?;
        }
        Commands::Limits { limits } => {
            let config = limits.resolve()?;
            let policy = ValidationPolicy::new(&config);
            print_json(&LimitsReport {
                max_size: policy.max_size_label(),
                allowed_types: policy.allowed_types_label(),
                max_file_count: policy.max_file_count(),
            })?;
        }
    }

    Ok(())
}
