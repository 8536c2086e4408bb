use super::*;

/// External process that inserts `[BREAK id=n score=s]` markers into text.
pub trait BreakAnnotator {
    fn annotate(&self, window: &TextWindow) -> Result<String>;
}

/// Annotates `text` one budget-sized window at a time.
///
/// A single window is returned exactly as the annotator produced it; several
/// windows are stitched back together and their markers renumbered.
pub fn annotate_in_windows(
    grammar: &MarkerGrammar,
    text: &str,
    budget: WindowBudget,
    annotator: &dyn BreakAnnotator,
) -> Result<String> {
    let windows = split_for_budget(text, budget);

    let mut annotated = Vec::with_capacity(windows.len());
    for window in &windows {
        let output = annotator.annotate(window).with_context(|| {
            format!(
                "break annotation failed for window {} (bytes {}..{})",
                window.index + 1,
                window.start,
                window.end
            )
        })?;
        debug!(
            window = window.index + 1,
            input_tokens = window.token_estimate(),
            markers = grammar.break_markers(&output).len(),
            "annotated window"
        );
        annotated.push(output);
    }

    if annotated.len() == 1 {
        return Ok(annotated.remove(0));
    }
    Ok(grammar.stitch_windows(&annotated))
}
