use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Text,
    Graphic,
}

impl ChunkType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChunkType::Text => "text",
            ChunkType::Graphic => "graphic",
        }
    }
}

/// One retrieval unit of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// 1-based and contiguous across the whole document.
    pub sequence_number: u32,
    pub chunk_type: ChunkType,
    /// Break markers stripped, surrounding whitespace trimmed. Graphic
    /// chunks keep the delimited block verbatim.
    pub content_raw: String,
    pub token_count: usize,
    pub source_pages: String,
    pub heading_path: String,
    pub start_offset: usize,
    pub end_offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphic: Option<GraphicPayload>,
}

/// Turns cleaned, break-annotated text into ordered chunks.
#[derive(Debug, Clone)]
pub struct DocumentChunker {
    grammar: MarkerGrammar,
    params: PartitionParams,
}

impl DocumentChunker {
    pub fn new(params: PartitionParams) -> Result<Self> {
        Ok(Self {
            grammar: MarkerGrammar::new()?,
            params,
        })
    }

    pub fn grammar(&self) -> &MarkerGrammar {
        &self.grammar
    }

    pub fn chunk_cleaned(&self, cleaned: &CleanedText) -> Result<Vec<Chunk>, ChunkingError> {
        self.chunk_document(&cleaned.text, &cleaned.pages)
    }

    /// Walks `text` left to right: every graphic block becomes one graphic
    /// chunk and every prose run around them is partitioned on its own.
    ///
    /// Graphic chunks take their heading path from the whole document; text
    /// chunks only see headings inside their own run.
    ///
    /// Fails only when nothing non-empty is left to emit.
    pub fn chunk_document(
        &self,
        text: &str,
        pages: &PageMapping,
    ) -> Result<Vec<Chunk>, ChunkingError> {
        let headings = self.grammar.heading_index(text);
        let partitioner = Partitioner::new(&self.grammar, self.params);
        let mut chunks = Vec::new();
        let mut cursor = 0usize;

        for graphic in self.grammar.graphic_spans(text) {
            if graphic.start > cursor {
                let run = cursor..graphic.start;
                self.push_prose_run(&mut chunks, &partitioner, text, run, pages);
            }

            chunks.push(Chunk {
                sequence_number: next_sequence(&chunks),
                chunk_type: ChunkType::Graphic,
                token_count: estimate_tokens(&graphic.raw),
                source_pages: pages.pages_for_range(graphic.start, graphic.end),
                heading_path: headings.path_at(graphic.start),
                start_offset: graphic.start,
                end_offset: graphic.end,
                graphic: graphic.payload(),
                content_raw: graphic.raw,
            });
            cursor = graphic.end;
        }

        if cursor < text.len() {
            let run = cursor..text.len();
            self.push_prose_run(&mut chunks, &partitioner, text, run, pages);
        }

        if chunks.is_empty() {
            return Err(ChunkingError::NoContent {
                input_bytes: text.len(),
            });
        }

        debug!(chunks = chunks.len(), "assembled document chunks");
        Ok(chunks)
    }

    fn push_prose_run(
        &self,
        chunks: &mut Vec<Chunk>,
        partitioner: &Partitioner<'_>,
        text: &str,
        run: Range<usize>,
        pages: &PageMapping,
    ) {
        let offset = run.start;
        let run_text = &text[run];
        let headings = self.grammar.heading_index(run_text);

        for range in partitioner.partition(run_text) {
            let content = self.grammar.strip_break_markers(&run_text[range.clone()]);
            let content = content.trim();
            if content.is_empty() {
                continue;
            }

            let start = offset + range.start;
            let end = offset + range.end;
            chunks.push(Chunk {
                sequence_number: next_sequence(chunks),
                chunk_type: ChunkType::Text,
                content_raw: content.to_string(),
                token_count: estimate_tokens(content),
                source_pages: pages.pages_for_range(start, end),
                heading_path: headings.path_at(range.start),
                start_offset: start,
                end_offset: end,
                graphic: None,
            });
        }
    }
}

fn next_sequence(chunks: &[Chunk]) -> u32 {
    chunks.len() as u32 + 1
}
