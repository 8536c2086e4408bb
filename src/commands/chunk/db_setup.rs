use super::*;

pub(super) fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub(super) fn open_store(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        ensure_directory(parent)?;
    }
    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

pub(super) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS docs (
          doc_id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          source_sha256 TEXT NOT NULL,
          status TEXT NOT NULL,
          error_message TEXT,
          total_chunks INTEGER NOT NULL DEFAULT 0,
          updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chunks (
          chunk_id TEXT PRIMARY KEY,
          doc_id TEXT NOT NULL,
          sequence_number INTEGER NOT NULL,
          chunk_type TEXT NOT NULL,
          content_raw TEXT NOT NULL,
          content_summary TEXT,
          heading_path TEXT,
          token_count INTEGER NOT NULL,
          source_pages TEXT,
          start_offset INTEGER NOT NULL,
          end_offset INTEGER NOT NULL,
          graphic_id TEXT,
          graphic_page INTEGER,
          FOREIGN KEY(doc_id) REFERENCES docs(doc_id)
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_doc_sequence ON chunks(doc_id, sequence_number);
        CREATE INDEX IF NOT EXISTS idx_docs_status ON docs(status);
        ",
    )?;

    connection
        .execute(
            "
            CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts
            USING fts5(chunk_id, doc_id, heading_path, content_raw, content_summary, content='chunks', content_rowid='rowid')
            ",
            [],
        )
        .context("failed to initialize FTS5 table chunks_fts")?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

pub(super) fn upsert_doc(
    connection: &Connection,
    doc_id: &str,
    name: &str,
    source_sha256: &str,
) -> Result<()> {
    connection
        .execute(
            "
            INSERT INTO docs(doc_id, name, source_sha256, status, error_message, updated_at)
            VALUES(?1, ?2, ?3, 'processing', NULL, ?4)
            ON CONFLICT(doc_id) DO UPDATE SET
              name=excluded.name,
              source_sha256=excluded.source_sha256,
              status=excluded.status,
              error_message=NULL,
              updated_at=excluded.updated_at
            ",
            params![doc_id, name, source_sha256, now_utc_string()],
        )
        .with_context(|| format!("failed to upsert doc {doc_id}"))?;
    Ok(())
}

pub(super) fn chunk_id_for(doc_id: &str, sequence_number: u32) -> String {
    format!("{doc_id}:chunk:{sequence_number:04}")
}

pub(super) fn stored_content(doc_name: &str, chunk: &Chunk) -> String {
    if chunk.sequence_number == 1 {
        format!("=== NEW DOCUMENT: {doc_name} ===\n\n{}", chunk.content_raw)
    } else {
        chunk.content_raw.clone()
    }
}

/// Replaces every stored chunk of `doc_id` in one transaction.
pub(super) fn replace_chunks(
    connection: &mut Connection,
    doc_id: &str,
    doc_name: &str,
    chunks: &[Chunk],
) -> Result<usize> {
    let tx = connection.transaction()?;
    tx.execute("DELETE FROM chunks WHERE doc_id = ?1", [doc_id])
        .with_context(|| format!("failed to delete previous chunks of {doc_id}"))?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO chunks(
              chunk_id, doc_id, sequence_number, chunk_type, content_raw, content_summary,
              heading_path, token_count, source_pages, start_offset, end_offset,
              graphic_id, graphic_page
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ",
        )?;

        for chunk in chunks {
            let graphic = chunk.graphic.as_ref();
            let summary = match chunk.chunk_type {
                ChunkType::Graphic => graphic.map(|payload| payload.routing_summary()),
                ChunkType::Text => None,
            };

            statement.execute(params![
                chunk_id_for(doc_id, chunk.sequence_number),
                doc_id,
                chunk.sequence_number,
                chunk.chunk_type.as_str(),
                stored_content(doc_name, chunk),
                summary,
                chunk.heading_path,
                chunk.token_count as i64,
                chunk.source_pages,
                chunk.start_offset as i64,
                chunk.end_offset as i64,
                graphic.and_then(|payload| payload.graphic_id.clone()),
                graphic.map(|payload| payload.page),
            ])?;
        }
    }

    tx.commit()?;
    Ok(chunks.len())
}

pub(super) fn mark_doc_ready(
    connection: &Connection,
    doc_id: &str,
    total_chunks: usize,
) -> Result<()> {
    connection.execute(
        "UPDATE docs SET status='ready', error_message=NULL, total_chunks=?2, updated_at=?3
         WHERE doc_id=?1",
        params![doc_id, total_chunks as i64, now_utc_string()],
    )?;
    Ok(())
}

pub(super) fn mark_doc_error(connection: &Connection, doc_id: &str, message: &str) -> Result<()> {
    let message = message
        .chars()
        .take(DOC_ERROR_MESSAGE_LIMIT)
        .collect::<String>();
    connection.execute(
        "UPDATE docs SET status='error', error_message=?2, updated_at=?3 WHERE doc_id=?1",
        params![doc_id, message, now_utc_string()],
    )?;
    Ok(())
}

pub(super) fn sync_fts_index(connection: &Connection) -> Result<()> {
    connection
        .execute("INSERT INTO chunks_fts(chunks_fts) VALUES('rebuild')", [])
        .context("failed to rebuild FTS index")?;
    Ok(())
}

pub fn count_rows(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
