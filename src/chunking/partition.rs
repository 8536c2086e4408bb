use super::markers::MAX_BREAK_SCORE;
use super::tokens::WordTally;
use super::*;

/// Size and break-quality trade-off for the chunk partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartitionParams {
    pub target_tokens: usize,
    pub min_tokens: usize,
    pub max_tokens: usize,
    /// Weight of the squared distance from `target_tokens`.
    pub alpha: f64,
    /// Weight of starting a chunk after a weak break.
    pub beta: f64,
}

impl Default for PartitionParams {
    fn default() -> Self {
        Self {
            target_tokens: 650,
            min_tokens: 200,
            max_tokens: 1200,
            alpha: 1.0,
            beta: 50.0,
        }
    }
}

impl PartitionParams {
    pub fn size_cost(&self, tokens: usize) -> f64 {
        let deviation = tokens as f64 - self.target_tokens as f64;
        self.alpha * deviation * deviation
    }

    pub fn break_cost(&self, entry_score: u8) -> f64 {
        self.beta * f64::from(MAX_BREAK_SCORE.saturating_sub(entry_score))
    }
}

/// Prose between consecutive break markers. Every segment but the first
/// begins with the marker that opens it.
#[derive(Debug, Clone, Copy)]
pub(super) struct Segment {
    pub start: usize,
    pub end: usize,
    pub entry_score: u8,
    tally: WordTally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Strict,
    /// Any single segment is a valid chunk regardless of size.
    AnySingleSegment,
}

pub struct Partitioner<'g> {
    grammar: &'g MarkerGrammar,
    params: PartitionParams,
}

impl<'g> Partitioner<'g> {
    pub fn new(grammar: &'g MarkerGrammar, params: PartitionParams) -> Self {
        Self { grammar, params }
    }

    /// Byte ranges of `run`, one per chunk, covering the run exactly.
    ///
    /// A run without break markers is a single range. Otherwise the ranges
    /// are the minimum-cost partition over break-marker boundaries.
    pub fn partition(&self, run: &str) -> Vec<Range<usize>> {
        if run.is_empty() {
            return Vec::new();
        }

        let markers = self.grammar.break_markers(run);
        if markers.is_empty() {
            return vec![0..run.len()];
        }

        let segments = self.segments(run, &markers);
        let ends = match self.solve(&segments, Admission::Strict) {
            Some(ends) => ends,
            None => {
                warn!(
                    segments = segments.len(),
                    max_tokens = self.params.max_tokens,
                    "no partition within token limits; admitting oversized segments"
                );
                self.solve(&segments, Admission::AnySingleSegment)
                    .unwrap_or_else(|| (1..=segments.len()).collect())
            }
        };

        debug!(
            segments = segments.len(),
            chunks = ends.len(),
            "partitioned prose run"
        );

        let mut ranges = Vec::with_capacity(ends.len());
        let mut first = 0usize;
        for end in ends {
            ranges.push(segments[first].start..segments[end - 1].end);
            first = end;
        }
        ranges
    }

    pub(super) fn segments(&self, run: &str, markers: &[BreakMarker]) -> Vec<Segment> {
        let mut bounds = Vec::with_capacity(markers.len() + 1);
        bounds.push((0usize, MAX_BREAK_SCORE));
        bounds.extend(markers.iter().map(|marker| (marker.start, marker.score)));

        let mut segments = Vec::with_capacity(bounds.len());
        for (index, &(start, score)) in bounds.iter().enumerate() {
            let end = bounds
                .get(index + 1)
                .map(|(next_start, _)| *next_start)
                .unwrap_or(run.len());
            if end <= start {
                continue;
            }

            // The run start acts as a perfect break even when a marker sits there.
            let entry_score = if segments.is_empty() {
                MAX_BREAK_SCORE
            } else {
                score
            };
            let content = self.grammar.strip_break_markers(&run[start..end]);
            segments.push(Segment {
                start,
                end,
                entry_score,
                tally: WordTally::of(&content),
            });
        }
        segments
    }

    /// Shortest path over segment boundaries `0..=n`. Returns the chunk end
    /// boundaries in order, or `None` when boundary `n` is unreachable.
    fn solve(&self, segments: &[Segment], admission: Admission) -> Option<Vec<usize>> {
        let n = segments.len();
        let mut best: Vec<Option<(f64, usize)>> = vec![None; n + 1];
        best[0] = Some((0.0, 0));

        for i in 0..n {
            let Some((reached_cost, _)) = best[i] else {
                continue;
            };
            let break_cost = self.params.break_cost(segments[i].entry_score);

            let mut tally = WordTally::EMPTY;
            for (j, segment) in segments.iter().enumerate().skip(i) {
                tally = tally.join(segment.tally);
                let tokens = tally.tokens();
                let lone_segment = j == i && admission == Admission::AnySingleSegment;

                if tokens > self.params.max_tokens && !lone_segment {
                    break;
                }
                if tokens < self.params.min_tokens && j + 1 < n && !lone_segment {
                    continue;
                }

                let total = reached_cost + self.params.size_cost(tokens) + break_cost;
                if best[j + 1].is_none_or(|(cost, _)| total < cost) {
                    best[j + 1] = Some((total, i));
                }
            }
        }

        best[n]?;
        let mut ends = Vec::new();
        let mut boundary = n;
        while boundary > 0 {
            ends.push(boundary);
            let (_, previous) = best[boundary]?;
            boundary = previous;
        }
        ends.reverse();
        Some(ends)
    }
}
