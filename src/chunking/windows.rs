use super::*;

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Token limits for one external annotation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBudget {
    pub max_tokens: usize,
    pub overlap_tokens: usize,
}

impl Default for WindowBudget {
    fn default() -> Self {
        Self {
            max_tokens: 12_000,
            overlap_tokens: 2_000,
        }
    }
}

/// A paragraph-aligned slice of the source text, `text == source[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextWindow {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TextWindow {
    fn from_source(source: &str, index: usize, start: usize, end: usize) -> Self {
        Self {
            index,
            start,
            end,
            text: source[start..end].to_string(),
        }
    }

    pub fn token_estimate(&self) -> usize {
        estimate_tokens(&self.text)
    }
}

#[derive(Debug, Clone, Copy)]
struct Paragraph {
    start: usize,
    end: usize,
    tokens: usize,
}

fn paragraphs(text: &str) -> Vec<Paragraph> {
    let mut out = Vec::new();
    let mut start = 0usize;
    for piece in text.split(PARAGRAPH_SEPARATOR) {
        out.push(Paragraph {
            start,
            end: start + piece.len(),
            tokens: estimate_tokens(piece),
        });
        start += piece.len() + PARAGRAPH_SEPARATOR.len();
    }
    out
}

/// Splits `text` into windows of at most `budget.max_tokens` estimated
/// tokens along blank-line paragraph boundaries.
///
/// Each window after the first starts with the trailing paragraphs of the
/// previous one, up to `budget.overlap_tokens`. A paragraph that alone
/// exceeds the budget still gets a window of its own.
pub fn split_for_budget(text: &str, budget: WindowBudget) -> Vec<TextWindow> {
    if estimate_tokens(text) <= budget.max_tokens {
        return vec![TextWindow::from_source(text, 0, 0, text.len())];
    }

    let mut windows = Vec::new();
    let mut current: Vec<Paragraph> = Vec::new();
    let mut current_tokens = 0usize;

    for paragraph in paragraphs(text) {
        if current_tokens + paragraph.tokens > budget.max_tokens && !current.is_empty() {
            windows.push(window_over(text, windows.len(), &current));

            let mut overlap: Vec<Paragraph> = Vec::new();
            let mut overlap_tokens = 0usize;
            for previous in current.iter().rev() {
                if overlap_tokens + previous.tokens > budget.overlap_tokens {
                    break;
                }
                overlap.push(*previous);
                overlap_tokens += previous.tokens;
            }
            overlap.reverse();

            current = overlap;
            current.push(paragraph);
            current_tokens = overlap_tokens + paragraph.tokens;
        } else {
            current.push(paragraph);
            current_tokens += paragraph.tokens;
        }
    }

    if !current.is_empty() {
        windows.push(window_over(text, windows.len(), &current));
    }

    debug!(
        windows = windows.len(),
        max_tokens = budget.max_tokens,
        overlap_tokens = budget.overlap_tokens,
        "split text for annotation budget"
    );
    windows
}

fn window_over(text: &str, index: usize, paragraphs: &[Paragraph]) -> TextWindow {
    let start = paragraphs.first().map(|paragraph| paragraph.start).unwrap_or(0);
    let end = paragraphs.last().map(|paragraph| paragraph.end).unwrap_or(start);
    TextWindow::from_source(text, index, start, end)
}

impl MarkerGrammar {
    /// Re-joins independently annotated windows and renumbers their break
    /// markers.
    ///
    /// Markers inside overlap regions appear once per window that covered
    /// them; they are kept as-is.
    pub fn stitch_windows<S: AsRef<str>>(&self, annotated: &[S]) -> String {
        let joined = annotated
            .iter()
            .map(|window| window.as_ref())
            .collect::<Vec<&str>>()
            .join(PARAGRAPH_SEPARATOR);
        self.resequence_breaks(&joined)
    }
}
