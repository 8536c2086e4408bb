use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::{info, warn};

use crate::chunking::{
    BreakAnnotator, Chunk, ChunkType, DocumentChunker, PartitionParams, TextWindow, WindowBudget,
    annotate_in_windows, split_for_budget,
};
use crate::cli::ChunkArgs;
use crate::model::{ChunkRunCounts, ChunkRunManifest, ChunkRunPaths};
use crate::util::{
    ensure_directory, now_utc_string, read_text, sha256_hex, utc_compact_string,
    write_json_pretty,
};

const DB_SCHEMA_VERSION: &str = "0.1.0";
const DOC_ERROR_MESSAGE_LIMIT: usize = 1000;

mod annotator;
mod db_setup;
mod run;
#[cfg(test)]
mod tests;

pub use db_setup::count_rows;
pub use run::run;

use annotator::*;
use db_setup::*;

pub fn default_db_path(cache_root: &Path) -> PathBuf {
    cache_root.join("docchunk_index.sqlite")
}
