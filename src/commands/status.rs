use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::chunk::{count_rows, default_db_path};
use crate::model::ChunkRunManifest;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| default_db_path(&args.cache_root));

    info!(cache_root = %args.cache_root.display(), "status requested");

    match latest_run_manifest(&manifest_dir)? {
        Some(path) => {
            let raw =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let manifest: ChunkRunManifest = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            info!(
                path = %path.display(),
                run_id = %manifest.run_id,
                status = %manifest.status,
                doc_id = %manifest.doc_id,
                doc_name = %manifest.doc_name,
                updated_at = %manifest.updated_at,
                text_chunks = manifest.counts.text_chunks,
                graphic_chunks = manifest.counts.graphic_chunks,
                total_tokens = manifest.counts.total_tokens,
                warnings = manifest.warnings.len(),
                "loaded latest chunk run manifest"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no chunk run manifest found"),
    }

    if db_path.exists() {
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        let docs_count = count_rows(&conn, "SELECT COUNT(*) FROM docs").unwrap_or(0);
        let chunks_count = count_rows(&conn, "SELECT COUNT(*) FROM chunks").unwrap_or(0);

        info!(
            path = %db_path.display(),
            docs = docs_count,
            chunks = chunks_count,
            "database status"
        );

        for (status, docs) in docs_by_status(&conn).unwrap_or_default() {
            info!(status = %status, docs, "documents by status");
        }
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    Ok(())
}

fn latest_run_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let mut latest: Option<PathBuf> = None;
    for entry in fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to list {}", manifest_dir.display()))?
    {
        let path = entry?.path();
        let is_run_manifest = path
            .file_name()
            .and_then(|value| value.to_str())
            .is_some_and(|name| name.starts_with("chunk_run_") && name.ends_with(".json"));
        // Compact UTC stamps in the filename sort chronologically.
        if is_run_manifest && latest.as_ref().is_none_or(|current| path > *current) {
            latest = Some(path);
        }
    }

    Ok(latest)
}

fn docs_by_status(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut statement =
        conn.prepare("SELECT status, COUNT(*) FROM docs GROUP BY status ORDER BY status")?;
    let rows = statement
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<(String, i64)>>>()?;
    Ok(rows)
}
