use super::*;

struct ChunkOutcome {
    chunks: Vec<Chunk>,
    counts: ChunkRunCounts,
    warnings: Vec<String>,
}

pub fn run(args: ChunkArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let params = args.partition.params()?;
    let budget = args.budget.budget();

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let run_manifest_path = args.run_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!("chunk_run_{}.json", utc_compact_string(started_ts)))
    });
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| default_db_path(&cache_root));

    let source = read_text(&args.input)?;
    let source_sha256 = sha256_hex(source.as_bytes());
    let doc_id = args
        .doc_id
        .clone()
        .unwrap_or_else(|| doc_id_for(&source_sha256));
    let doc_name = args
        .doc_name
        .clone()
        .unwrap_or_else(|| doc_name_for(&args.input));

    info!(
        input = %args.input.display(),
        doc_id = %doc_id,
        run_id = %run_id,
        dry_run = args.dry_run,
        "starting chunk run"
    );

    let mut connection = if args.dry_run {
        None
    } else {
        let connection = open_store(&db_path)?;
        upsert_doc(&connection, &doc_id, &doc_name, &source_sha256)?;
        Some(connection)
    };

    let outcome = match chunk_source(&args, &source, params, budget) {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Some(connection) = &connection {
                record_doc_error(connection, &doc_id, &err);
            }
            return Err(err.context(format!("failed to chunk {}", args.input.display())));
        }
    };

    if let Some(connection) = connection.as_mut() {
        match persist_chunks(connection, &doc_id, &doc_name, &outcome.chunks) {
            Ok(stored) => {
                info!(path = %db_path.display(), doc_id = %doc_id, chunks = stored, "stored chunks")
            }
            Err(err) => {
                record_doc_error(connection, &doc_id, &err);
                return Err(err);
            }
        }
    }

    if let Some(path) = &args.output_json {
        write_json_pretty(path, &outcome.chunks)?;
        info!(path = %path.display(), chunks = outcome.chunks.len(), "wrote chunk json");
    }

    for warning in &outcome.warnings {
        warn!(doc_id = %doc_id, "{warning}");
    }

    let manifest = ChunkRunManifest {
        manifest_version: 1,
        run_id,
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_chunk_command(&args),
        doc_id: doc_id.clone(),
        doc_name,
        source_sha256,
        paths: ChunkRunPaths {
            input_path: args.input.display().to_string(),
            db_path: (!args.dry_run).then(|| db_path.display().to_string()),
            output_json_path: args
                .output_json
                .as_ref()
                .map(|path| path.display().to_string()),
        },
        partition: params,
        window_budget: budget,
        counts: outcome.counts,
        warnings: outcome.warnings,
    };

    write_json_pretty(&run_manifest_path, &manifest)?;

    info!(path = %run_manifest_path.display(), "wrote chunk run manifest");
    info!(
        doc_id = %doc_id,
        text_chunks = manifest.counts.text_chunks,
        graphic_chunks = manifest.counts.graphic_chunks,
        total_tokens = manifest.counts.total_tokens,
        "chunk run completed"
    );

    Ok(())
}

fn chunk_source(
    args: &ChunkArgs,
    source: &str,
    params: PartitionParams,
    budget: WindowBudget,
) -> Result<ChunkOutcome> {
    let chunker = DocumentChunker::new(params)?;
    let grammar = chunker.grammar();
    let mut counts = ChunkRunCounts {
        input_bytes: source.len(),
        ..ChunkRunCounts::default()
    };
    let mut warnings = Vec::new();

    let annotated = match CommandAnnotator::from_args(args) {
        Some(annotator) => {
            counts.annotation_windows = split_for_budget(source, budget).len();
            info!(
                windows = counts.annotation_windows,
                max_tokens = budget.max_tokens,
                "annotating break candidates"
            );
            annotate_in_windows(grammar, source, budget, &annotator)?
        }
        None => source.to_string(),
    };

    let cleaned = grammar.cleanup(&annotated);
    counts.cleaned_bytes = cleaned.text.len();
    counts.break_markers = grammar.break_markers(&cleaned.text).len();
    counts.page_spans = cleaned.pages.spans().len();
    counts.code_artifacts_removed = cleaned.artifacts_removed;

    if counts.break_markers == 0 {
        warnings.push("no break markers found; each prose run is a single chunk".to_string());
    }

    let chunks = chunker
        .chunk_cleaned(&cleaned)
        .context("chunk partitioning failed")?;

    for chunk in &chunks {
        counts.total_tokens += chunk.token_count;
        match chunk.chunk_type {
            ChunkType::Text => {
                counts.text_chunks += 1;
                if chunk.token_count > params.max_tokens {
                    warnings.push(format!(
                        "chunk {} has {} tokens, above max_tokens {}",
                        chunk.sequence_number, chunk.token_count, params.max_tokens
                    ));
                }
            }
            ChunkType::Graphic => {
                counts.graphic_chunks += 1;
                if chunk.graphic.is_none() {
                    counts.graphic_payload_failures += 1;
                    warnings.push(format!(
                        "graphic chunk {} has no parseable payload",
                        chunk.sequence_number
                    ));
                }
            }
        }
    }

    Ok(ChunkOutcome {
        chunks,
        counts,
        warnings,
    })
}

fn persist_chunks(
    connection: &mut Connection,
    doc_id: &str,
    doc_name: &str,
    chunks: &[Chunk],
) -> Result<usize> {
    let stored = replace_chunks(connection, doc_id, doc_name, chunks)?;
    sync_fts_index(connection)?;
    mark_doc_ready(connection, doc_id, stored)?;
    Ok(stored)
}

fn record_doc_error(connection: &Connection, doc_id: &str, err: &anyhow::Error) {
    if let Err(mark_err) = mark_doc_error(connection, doc_id, &format!("{err:#}")) {
        warn!(doc_id = %doc_id, error = %mark_err, "failed to record document error");
    }
}

fn doc_id_for(source_sha256: &str) -> String {
    let prefix = source_sha256.get(..12).unwrap_or(source_sha256);
    format!("doc-{prefix}")
}

fn doc_name_for(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|value| value.to_str())
        .filter(|value| !value.is_empty())
        .unwrap_or("document")
        .to_string()
}

fn render_chunk_command(args: &ChunkArgs) -> String {
    let mut command = vec![
        "docchunk".to_string(),
        "chunk".to_string(),
        "--cache-root".to_string(),
        args.cache_root.display().to_string(),
        "--input".to_string(),
        args.input.display().to_string(),
    ];

    if let Some(doc_id) = &args.doc_id {
        command.push("--doc-id".to_string());
        command.push(doc_id.clone());
    }
    if let Some(doc_name) = &args.doc_name {
        command.push("--doc-name".to_string());
        command.push(doc_name.clone());
    }
    if let Some(path) = &args.db_path {
        command.push("--db-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.output_json {
        command.push("--output-json".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.run_manifest_path {
        command.push("--run-manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(program) = &args.annotator_cmd {
        command.push("--annotator-cmd".to_string());
        command.push(program.clone());
        for arg in &args.annotator_args {
            command.push("--annotator-arg".to_string());
            command.push(arg.clone());
        }
    }
    if args.dry_run {
        command.push("--dry-run".to_string());
    }

    let partition = &args.partition;
    command.extend([
        "--target-tokens".to_string(),
        partition.target_tokens.to_string(),
        "--min-tokens".to_string(),
        partition.min_tokens.to_string(),
        "--max-tokens".to_string(),
        partition.max_tokens.to_string(),
    ]);

    command.join(" ")
}
