use super::*;

/// Half-open byte range of the stripped text attributed to one source page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    pub start: usize,
    pub end: usize,
    pub page: u32,
}

/// Ordered, gapless page intervals over page-marker-free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMapping {
    spans: Vec<PageSpan>,
}

impl PageMapping {
    pub fn spans(&self) -> &[PageSpan] {
        &self.spans
    }

    #[cfg(test)]
    pub fn covered_len(&self) -> usize {
        self.spans.iter().map(|span| span.end - span.start).sum()
    }

    /// `""` when nothing overlaps, `"7"` for one page, `"7-9"` for several.
    pub fn pages_for_range(&self, start: usize, end: usize) -> String {
        let pages = self
            .spans
            .iter()
            .filter(|span| span.start < end && span.end > start)
            .map(|span| span.page)
            .collect::<BTreeSet<u32>>();

        match (pages.first(), pages.last()) {
            (Some(first), Some(last)) if first == last => first.to_string(),
            (Some(first), Some(last)) => format!("{first}-{last}"),
            _ => String::new(),
        }
    }

    fn push(&mut self, start: usize, end: usize, page: u32) {
        if end > start {
            self.spans.push(PageSpan { start, end, page });
        }
    }
}

impl MarkerGrammar {
    /// Builds the page mapping and returns it with the marker-free text.
    ///
    /// Intervals are recorded in stripped-text coordinates while the markers
    /// are removed, so they stay valid for the returned text. Text before the
    /// first marker belongs to page 1. A marker whose number does not fit a
    /// page number is kept as ordinary text.
    pub fn build_page_mapping(&self, text: &str) -> (PageMapping, String) {
        let mut mapping = PageMapping::default();
        let mut stripped = String::with_capacity(text.len());
        let mut current_page = 1u32;
        let mut span_start = 0usize;
        let mut copied_to = 0usize;

        for captures in self.page_marker.captures_iter(text) {
            let (Some(whole), Some(number)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let Ok(page) = number.as_str().parse::<u32>() else {
                continue;
            };

            stripped.push_str(&text[copied_to..whole.start()]);
            mapping.push(span_start, stripped.len(), current_page);
            span_start = stripped.len();
            current_page = page;
            copied_to = whole.end();
        }

        stripped.push_str(&text[copied_to..]);
        mapping.push(span_start, stripped.len(), current_page);

        (mapping, stripped)
    }
}
