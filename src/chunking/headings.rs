use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Heading {
    line_start: usize,
    level: usize,
    title: String,
}

/// Markdown headings of a document, ordered by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingIndex {
    headings: Vec<Heading>,
}

impl HeadingIndex {
    /// Heading path active at `offset`, built from every heading whose line
    /// starts before it. A heading replaces the one tracked at its level and
    /// clears all deeper levels.
    pub fn path_at(&self, offset: usize) -> String {
        let mut active: BTreeMap<usize, &str> = BTreeMap::new();
        for heading in self
            .headings
            .iter()
            .take_while(|heading| heading.line_start < offset)
        {
            active.retain(|level, _| *level < heading.level);
            active.insert(heading.level, &heading.title);
        }

        active.into_values().collect::<Vec<&str>>().join(" > ")
    }
}

impl MarkerGrammar {
    pub fn heading_index(&self, text: &str) -> HeadingIndex {
        let headings = self
            .heading
            .captures_iter(text)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let level = captures.get(1)?.as_str().len();
                let title = captures.get(2)?.as_str().trim().to_string();
                Some(Heading {
                    line_start: whole.start(),
                    level,
                    title,
                })
            })
            .collect();

        HeadingIndex { headings }
    }
}
