use serde::{Deserialize, Serialize};

use crate::chunking::{PartitionParams, WindowBudget};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowEntry {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub token_estimate: usize,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_path: String,
    pub source_sha256: String,
    pub budget: WindowBudget,
    pub window_count: usize,
    pub windows: Vec<WindowEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkRunCounts {
    pub input_bytes: usize,
    pub cleaned_bytes: usize,
    pub annotation_windows: usize,
    pub break_markers: usize,
    pub page_spans: usize,
    pub code_artifacts_removed: usize,
    pub text_chunks: usize,
    pub graphic_chunks: usize,
    pub graphic_payload_failures: usize,
    pub total_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRunPaths {
    pub input_path: String,
    pub db_path: Option<String>,
    pub output_json_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub doc_id: String,
    pub doc_name: String,
    pub source_sha256: String,
    pub paths: ChunkRunPaths,
    pub partition: PartitionParams,
    pub window_budget: WindowBudget,
    pub counts: ChunkRunCounts,
    pub warnings: Vec<String>,
}
