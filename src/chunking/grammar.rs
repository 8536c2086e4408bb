use super::*;

/// UI strings left behind around fenced code blocks by the extractor.
const CODE_ARTIFACTS: [&str; 6] = [
    "content_copy",
    "expand_less",
    "expand_more",
    "code ",
    "Python\n",
    "JavaScript\n",
];

/// Compiled inline-annotation patterns, built once per run and shared by
/// every stage of the pipeline.
#[derive(Debug, Clone)]
pub struct MarkerGrammar {
    pub(super) page_marker: Regex,
    pub(super) break_marker: Regex,
    pub(super) break_marker_line: Regex,
    pub(super) graphic_open: Regex,
    pub(super) graphic_close: Regex,
    pub(super) heading: Regex,
    pub(super) code_artifacts: Vec<(Regex, Regex)>,
}

impl MarkerGrammar {
    pub fn new() -> Result<Self> {
        let mut code_artifacts = Vec::with_capacity(CODE_ARTIFACTS.len());
        for artifact in CODE_ARTIFACTS {
            let escaped = regex::escape(artifact);
            let before_fence = Regex::new(&format!(r"{escaped}\s*\n```"))
                .with_context(|| format!("failed to compile artifact regex for {artifact:?}"))?;
            let after_fence = Regex::new(&format!(r"```\n{escaped}"))
                .with_context(|| format!("failed to compile artifact regex for {artifact:?}"))?;
            code_artifacts.push((before_fence, after_fence));
        }

        Ok(Self {
            page_marker: Regex::new(r"\[PAGE (\d+)\]\n?")
                .context("failed to compile page marker regex")?,
            break_marker: Regex::new(r"\[BREAK id=(\d+) score=(\d+)\]")
                .context("failed to compile break marker regex")?,
            break_marker_line: Regex::new(r"\[BREAK id=\d+ score=\d+\]\n?")
                .context("failed to compile break marker strip regex")?,
            graphic_open: Regex::new(r"%%% GRAPHIC_INSERT %%%")
                .context("failed to compile graphic open regex")?,
            graphic_close: Regex::new(r"%%% END_GRAPHIC_INSERT %%%")
                .context("failed to compile graphic close regex")?,
            heading: Regex::new(r"(?m)^(#{1,6})[ \t]+(\S.*)$")
                .context("failed to compile heading regex")?,
            code_artifacts,
        })
    }
}
