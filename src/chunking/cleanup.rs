use super::*;

/// Annotated text ready for partitioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedText {
    /// Text with page markers removed and break ids renumbered.
    pub text: String,
    pub pages: PageMapping,
    pub artifacts_removed: usize,
}

impl MarkerGrammar {
    /// Removes code-block UI artifacts, renumbers break markers and finally
    /// strips page markers, so the page mapping matches `CleanedText::text`.
    pub fn cleanup(&self, text: &str) -> CleanedText {
        let (without_artifacts, artifacts_removed) = self.remove_code_artifacts(text);
        let resequenced = self.resequence_breaks(&without_artifacts);
        let (pages, text) = self.build_page_mapping(&resequenced);

        debug!(
            artifacts_removed,
            page_spans = pages.spans().len(),
            bytes = text.len(),
            "cleaned annotated text"
        );

        CleanedText {
            text,
            pages,
            artifacts_removed,
        }
    }

    fn remove_code_artifacts(&self, text: &str) -> (String, usize) {
        let mut result = text.to_string();
        let mut removed = 0usize;

        for (before_fence, after_fence) in &self.code_artifacts {
            for pattern in [before_fence, after_fence] {
                let count = pattern.find_iter(&result).count();
                if count > 0 {
                    result = pattern.replace_all(&result, "```").into_owned();
                    removed += count;
                }
            }
        }

        (result, removed)
    }
}
