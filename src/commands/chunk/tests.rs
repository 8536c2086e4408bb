use crate::chunking::GraphicPayload;

use super::*;

fn memory_store() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    ensure_schema(&connection).unwrap();
    connection
}

fn text_chunk(sequence_number: u32, content: &str) -> Chunk {
    Chunk {
        sequence_number,
        chunk_type: ChunkType::Text,
        content_raw: content.to_string(),
        token_count: 2,
        source_pages: "1".to_string(),
        heading_path: "Intro".to_string(),
        start_offset: 0,
        end_offset: content.len(),
        graphic: None,
    }
}

fn graphic_chunk(sequence_number: u32) -> Chunk {
    Chunk {
        sequence_number,
        chunk_type: ChunkType::Graphic,
        content_raw: "%%% GRAPHIC_INSERT %%%\n{}\n%%% END_GRAPHIC_INSERT %%%".to_string(),
        token_count: 6,
        source_pages: "2".to_string(),
        heading_path: String::new(),
        start_offset: 10,
        end_offset: 60,
        graphic: Some(GraphicPayload {
            page: 2,
            coordinates: None,
            graphic_id: Some("fig-1".to_string()),
            title: "Fig 1".to_string(),
            description: "Revenue by quarter".to_string(),
        }),
    }
}

fn doc_row(connection: &Connection, doc_id: &str) -> (String, Option<String>, i64) {
    connection
        .query_row(
            "SELECT status, error_message, total_chunks FROM docs WHERE doc_id = ?1",
            [doc_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap()
}

#[test]
fn ensure_schema_is_idempotent_and_records_version() {
    let connection = memory_store();
    ensure_schema(&connection).unwrap();

    let version: String = connection
        .query_row(
            "SELECT value FROM metadata WHERE key = 'db_schema_version'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(version, DB_SCHEMA_VERSION);
}

#[test]
fn replace_chunks_prefixes_first_chunk_and_summarizes_graphics() {
    let mut connection = memory_store();
    upsert_doc(&connection, "doc-1", "report", "abc").unwrap();

    let chunks = vec![
        text_chunk(1, "first words"),
        graphic_chunk(2),
        text_chunk(3, "last words"),
    ];
    let stored = replace_chunks(&mut connection, "doc-1", "report", &chunks).unwrap();
    sync_fts_index(&connection).unwrap();
    mark_doc_ready(&connection, "doc-1", stored).unwrap();

    assert_eq!(stored, 3);
    assert_eq!(
        count_rows(&connection, "SELECT COUNT(*) FROM chunks").unwrap(),
        3
    );

    let first: String = connection
        .query_row(
            "SELECT content_raw FROM chunks WHERE chunk_id = 'doc-1:chunk:0001'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(first, "=== NEW DOCUMENT: report ===\n\nfirst words");

    let (summary, graphic_id, graphic_page): (String, String, i64) = connection
        .query_row(
            "SELECT content_summary, graphic_id, graphic_page FROM chunks WHERE sequence_number = 2",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(summary, "[Fig 1] Revenue by quarter");
    assert_eq!(graphic_id, "fig-1");
    assert_eq!(graphic_page, 2);

    let text_summary: Option<String> = connection
        .query_row(
            "SELECT content_summary FROM chunks WHERE sequence_number = 3",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(text_summary, None);

    let matches = count_rows(
        &connection,
        "SELECT COUNT(*) FROM chunks_fts WHERE chunks_fts MATCH 'revenue'",
    )
    .unwrap();
    assert_eq!(matches, 1);

    assert_eq!(doc_row(&connection, "doc-1"), ("ready".to_string(), None, 3));
}

#[test]
fn replace_chunks_drops_previous_chunks_of_the_same_doc_only() {
    let mut connection = memory_store();
    upsert_doc(&connection, "doc-1", "one", "aaa").unwrap();
    upsert_doc(&connection, "doc-2", "two", "bbb").unwrap();

    replace_chunks(
        &mut connection,
        "doc-1",
        "one",
        &[text_chunk(1, "a"), text_chunk(2, "b"), text_chunk(3, "c")],
    )
    .unwrap();
    replace_chunks(&mut connection, "doc-2", "two", &[text_chunk(1, "z")]).unwrap();
    replace_chunks(&mut connection, "doc-1", "one", &[text_chunk(1, "only")]).unwrap();

    assert_eq!(
        count_rows(
            &connection,
            "SELECT COUNT(*) FROM chunks WHERE doc_id = 'doc-1'"
        )
        .unwrap(),
        1
    );
    assert_eq!(
        count_rows(
            &connection,
            "SELECT COUNT(*) FROM chunks WHERE doc_id = 'doc-2'"
        )
        .unwrap(),
        1
    );
}

#[test]
fn mark_doc_error_truncates_long_messages() {
    let connection = memory_store();
    upsert_doc(&connection, "doc-1", "report", "abc").unwrap();

    let message = "é".repeat(1500);
    mark_doc_error(&connection, "doc-1", &message).unwrap();

    let (status, error_message, _) = doc_row(&connection, "doc-1");
    assert_eq!(status, "error");
    assert_eq!(error_message.unwrap().chars().count(), 1000);

    upsert_doc(&connection, "doc-1", "report", "abc").unwrap();
    let (status, error_message, _) = doc_row(&connection, "doc-1");
    assert_eq!(status, "processing");
    assert_eq!(error_message, None);
}

#[test]
fn chunk_ids_are_zero_padded() {
    assert_eq!(chunk_id_for("doc-9", 7), "doc-9:chunk:0007");
    assert_eq!(chunk_id_for("doc-9", 12345), "doc-9:chunk:12345");
}

#[test]
fn chunker_output_is_stored_with_pages_and_headings() {
    let mut connection = memory_store();
    let chunker = DocumentChunker::new(PartitionParams::default()).unwrap();
    let cleaned = chunker
        .grammar()
        .cleanup("# Title\n[PAGE 1]\nhello world\n[PAGE 2]\nmore text");
    let chunks = chunker.chunk_cleaned(&cleaned).unwrap();

    upsert_doc(&connection, "doc-1", "notes", "abc").unwrap();
    replace_chunks(&mut connection, "doc-1", "notes", &chunks).unwrap();

    let (pages, heading): (String, String) = connection
        .query_row(
            "SELECT source_pages, heading_path FROM chunks WHERE sequence_number = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(pages, "1-2");
    assert_eq!(heading, "");
}

#[cfg(unix)]
fn window(text: &str) -> TextWindow {
    TextWindow {
        index: 0,
        start: 0,
        end: text.len(),
        text: text.to_string(),
    }
}

#[cfg(unix)]
#[test]
fn command_annotator_pipes_window_through_program() {
    let annotator = CommandAnnotator::new("cat", Vec::new(), 1, Duration::ZERO);
    let text = "alpha [BREAK id=1 score=80]\nbeta";
    assert_eq!(annotator.annotate(&window(text)).unwrap(), text);
}

#[cfg(unix)]
#[test]
fn command_annotator_gives_up_after_configured_attempts() {
    let annotator = CommandAnnotator::new("false", Vec::new(), 2, Duration::ZERO);
    let err = annotator.annotate(&window("alpha")).unwrap_err();
    assert!(format!("{err:#}").contains("gave up after 2 attempt(s)"));
}
