use super::*;

/// A delimited non-text block, kept whole and emitted as one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicSpan {
    pub start: usize,
    pub end: usize,
    /// The block exactly as it appears, delimiters included.
    pub raw: String,
    payload_range: Range<usize>,
}

/// JSON description of a graphic written by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicPayload {
    pub page: u32,
    #[serde(default)]
    pub coordinates: Option<[f64; 4]>,
    #[serde(default)]
    pub graphic_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl GraphicPayload {
    /// `"[title] description"`, or just the description when untitled.
    pub fn routing_summary(&self) -> String {
        if self.title.is_empty() {
            self.description.clone()
        } else {
            format!("[{}] {}", self.title, self.description)
        }
    }
}

impl GraphicSpan {
    pub fn payload_text(&self) -> &str {
        self.raw[self.payload_range.clone()].trim()
    }

    /// Parsed payload, or `None` when the block does not hold valid JSON.
    pub fn payload(&self) -> Option<GraphicPayload> {
        match serde_json::from_str::<GraphicPayload>(self.payload_text()) {
            Ok(payload) => Some(payload),
            Err(error) => {
                warn!(
                    start = self.start,
                    end = self.end,
                    error = %error,
                    "graphic block payload is not valid JSON"
                );
                None
            }
        }
    }
}

impl MarkerGrammar {
    /// Non-overlapping graphic blocks in document order.
    ///
    /// An opening delimiter that is followed by another opening delimiter
    /// before any closing one, or that is never closed, is left as prose.
    pub fn graphic_spans(&self, text: &str) -> Vec<GraphicSpan> {
        let mut spans = Vec::new();
        let mut cursor = 0usize;

        while let Some(open) = self.graphic_open.find_at(text, cursor) {
            let Some(close) = self.graphic_close.find_at(text, open.end()) else {
                debug!(offset = open.start(), "unterminated graphic block left as prose");
                break;
            };

            if let Some(next_open) = self.graphic_open.find_at(text, open.end()) {
                if next_open.start() < close.start() {
                    debug!(offset = open.start(), "unterminated graphic block left as prose");
                    cursor = next_open.start();
                    continue;
                }
            }

            spans.push(GraphicSpan {
                start: open.start(),
                end: close.end(),
                raw: text[open.start()..close.end()].to_string(),
                payload_range: (open.end() - open.start())..(close.start() - open.start()),
            });
            cursor = close.end();
        }

        spans
    }
}
