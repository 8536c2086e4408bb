/// Words-to-tokens factor shared by every budget check.
pub const TOKEN_ESTIMATE_FACTOR: f64 = 1.3;

/// Fast token estimate: whitespace-separated words times 1.3, rounded.
pub fn estimate_tokens(text: &str) -> usize {
    tokens_for_words(text.split_whitespace().count())
}

pub(crate) fn tokens_for_words(word_count: usize) -> usize {
    (word_count as f64 * TOKEN_ESTIMATE_FACTOR).round() as usize
}

/// Word count of a text fragment plus whether its first and last characters
/// belong to a word, so that counts can be combined across concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WordTally {
    pub words: usize,
    starts_in_word: bool,
    ends_in_word: bool,
    empty: bool,
}

impl WordTally {
    pub const EMPTY: WordTally = WordTally {
        words: 0,
        starts_in_word: false,
        ends_in_word: false,
        empty: true,
    };

    pub fn of(text: &str) -> Self {
        let in_word = |character: char| !character.is_whitespace();
        Self {
            words: text.split_whitespace().count(),
            starts_in_word: text.chars().next().map(in_word).unwrap_or(false),
            ends_in_word: text.chars().next_back().map(in_word).unwrap_or(false),
            empty: text.is_empty(),
        }
    }

    /// Tally of `self` followed directly by `next`; a word cut by the seam
    /// is counted once.
    pub fn join(self, next: WordTally) -> WordTally {
        if self.empty {
            return next;
        }
        if next.empty {
            return self;
        }

        let merged = usize::from(self.ends_in_word && next.starts_in_word);
        WordTally {
            words: self.words + next.words - merged,
            starts_in_word: self.starts_in_word,
            ends_in_word: next.ends_in_word,
            empty: false,
        }
    }

    pub fn tokens(self) -> usize {
        tokens_for_words(self.words)
    }
}
