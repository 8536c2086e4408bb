use super::*;

pub const MAX_BREAK_SCORE: u8 = 100;

/// An inline `[BREAK id=n score=s]` annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakMarker {
    pub start: usize,
    pub end: usize,
    pub id: u64,
    pub score: u8,
}

impl MarkerGrammar {
    /// Break markers in document order. Scores above 100 are clamped.
    pub fn break_markers(&self, text: &str) -> Vec<BreakMarker> {
        self.break_marker
            .captures_iter(text)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let id = captures
                    .get(1)
                    .and_then(|value| value.as_str().parse::<u64>().ok())
                    .unwrap_or(u64::MAX);
                let score = captures
                    .get(2)
                    .and_then(|value| value.as_str().parse::<u32>().ok())
                    .map(|value| value.min(u32::from(MAX_BREAK_SCORE)) as u8)
                    .unwrap_or(MAX_BREAK_SCORE);

                Some(BreakMarker {
                    start: whole.start(),
                    end: whole.end(),
                    id,
                    score,
                })
            })
            .collect()
    }

    /// Removes every break marker together with one trailing newline.
    pub fn strip_break_markers(&self, text: &str) -> String {
        self.break_marker_line.replace_all(text, "").into_owned()
    }

    /// Renumbers break markers to `1..=K` in document order, keeping each
    /// score exactly as written.
    pub fn resequence_breaks(&self, text: &str) -> String {
        let (mut output, copied_to, _) = self.break_marker.captures_iter(text).fold(
            (String::with_capacity(text.len()), 0usize, 1u64),
            |(mut output, copied_to, next_id), captures| {
                let (Some(whole), Some(score)) = (captures.get(0), captures.get(2)) else {
                    return (output, copied_to, next_id);
                };
                output.push_str(&text[copied_to..whole.start()]);
                output.push_str(&format!("[BREAK id={} score={}]", next_id, score.as_str()));
                (output, whole.end(), next_id + 1)
            },
        );
        output.push_str(&text[copied_to..]);
        output
    }
}
