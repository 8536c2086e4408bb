use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::chunking::{PartitionParams, WindowBudget};

#[derive(Parser, Debug)]
#[command(
    name = "docchunk",
    version,
    about = "Deterministic chunking of break-annotated document text"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Chunk(ChunkArgs),
    Windows(WindowsArgs),
    Stitch(StitchArgs),
    Resequence(ResequenceArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PartitionArgs {
    #[arg(long, default_value_t = 650)]
    pub target_tokens: usize,

    #[arg(long, default_value_t = 200)]
    pub min_tokens: usize,

    #[arg(long, default_value_t = 1200)]
    pub max_tokens: usize,

    #[arg(long, default_value_t = 1.0)]
    pub alpha: f64,

    #[arg(long, default_value_t = 50.0)]
    pub beta: f64,
}

impl PartitionArgs {
    pub fn params(&self) -> Result<PartitionParams> {
        if self.min_tokens > self.max_tokens {
            bail!(
                "--min-tokens ({}) must not exceed --max-tokens ({})",
                self.min_tokens,
                self.max_tokens
            );
        }
        if !(self.alpha.is_finite() && self.beta.is_finite()) || self.alpha < 0.0 || self.beta < 0.0
        {
            bail!("--alpha and --beta must be finite and non-negative");
        }

        Ok(PartitionParams {
            target_tokens: self.target_tokens,
            min_tokens: self.min_tokens,
            max_tokens: self.max_tokens,
            alpha: self.alpha,
            beta: self.beta,
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct BudgetArgs {
    #[arg(long, default_value_t = 12_000)]
    pub window_max_tokens: usize,

    #[arg(long, default_value_t = 2_000)]
    pub window_overlap_tokens: usize,
}

impl BudgetArgs {
    pub fn budget(&self) -> WindowBudget {
        WindowBudget {
            max_tokens: self.window_max_tokens,
            overlap_tokens: self.window_overlap_tokens,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ChunkArgs {
    #[arg(long, default_value = ".cache/docchunk")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub doc_id: Option<String>,

    #[arg(long)]
    pub doc_name: Option<String>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub output_json: Option<PathBuf>,

    #[arg(long)]
    pub run_manifest_path: Option<PathBuf>,

    /// Program that reads one text window on stdin and writes it back with
    /// break markers inserted.
    #[arg(long)]
    pub annotator_cmd: Option<String>,

    #[arg(long = "annotator-arg", allow_hyphen_values = true)]
    pub annotator_args: Vec<String>,

    #[arg(long, default_value_t = 3)]
    pub annotator_attempts: u32,

    #[arg(long, default_value_t = 10)]
    pub annotator_backoff_secs: u64,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[command(flatten)]
    pub partition: PartitionArgs,

    #[command(flatten)]
    pub budget: BudgetArgs,
}

#[derive(Args, Debug, Clone)]
pub struct WindowsArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub budget: BudgetArgs,
}

#[derive(Args, Debug, Clone)]
pub struct StitchArgs {
    /// Directory holding `windows.json` from the `windows` command.
    #[arg(long)]
    pub windows_dir: PathBuf,

    /// Directory holding the annotated `window_NNNN.txt` files.
    #[arg(long)]
    pub annotated_dir: PathBuf,

    #[arg(long)]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ResequenceArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/docchunk")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
