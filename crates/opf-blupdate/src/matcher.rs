//! Approximate context search.
//!
//! When a coordinate falls inside a changed region, it is re-located in the new text by
//! searching for its surrounding context near an estimated position. The search is a
//! semi-global edit-distance alignment of `left + right` against a window of the new text; the
//! alignment also records where the left context ends, which is the located coordinate.

/// Characters immediately before and after a coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Up to `context_len` characters ending at the coordinate.
    pub left: String,
    /// Up to `context_len` characters starting at the coordinate.
    pub right: String,
}

impl Context {
    /// Create a context.
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Returns `true` if both sides are empty.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// A located context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Coordinate between the matched left and right context.
    pub location: usize,
    /// Start of the matched text.
    pub start: usize,
    /// End (exclusive) of the matched text.
    pub end: usize,
    /// Combined error and proximity score; lower is better.
    pub score: f64,
    /// Similarity between the context and the matched text, in `[0, 1]`.
    pub quality: f64,
}

/// Finds a context near an expected coordinate.
pub trait ApproximateSearch {
    /// Best match of `context` in `text` around `expected`, or `None` if nothing is close
    /// enough.
    fn locate(&self, text: &[char], context: &Context, expected: usize) -> Option<Match>;
}

/// Edit-distance based [`ApproximateSearch`].
///
/// A candidate's score is `errors / pattern_len + |location - expected| / distance`; the best
/// candidate is accepted if its score is at most `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMatcher {
    threshold: f64,
    distance: usize,
}

impl Default for ContextMatcher {
    fn default() -> Self {
        Self::new(0.5, 1000)
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    cost: usize,
    start: usize,
    boundary: usize,
}

impl ContextMatcher {
    /// Create a matcher. `threshold` is clamped to `[0, 1]`.
    pub fn new(threshold: f64, distance: usize) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            distance,
        }
    }

    /// Maximum accepted score.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Distance (in characters) at which proximity alone costs a full score unit.
    pub fn distance(&self) -> usize {
        self.distance
    }

    fn proximity(&self, location: usize, expected: usize) -> f64 {
        let delta = location.abs_diff(expected);
        if delta == 0 {
            0.0
        } else if self.distance == 0 {
            1.0
        } else {
            delta as f64 / self.distance as f64
        }
    }

    fn radius(&self) -> usize {
        (self.threshold * self.distance as f64).ceil() as usize
    }
}

impl ApproximateSearch for ContextMatcher {
    fn locate(&self, text: &[char], context: &Context, expected: usize) -> Option<Match> {
        let left: Vec<char> = context.left.chars().collect();
        let pattern: Vec<char> = left.iter().copied().chain(context.right.chars()).collect();
        let m = pattern.len();
        let k = left.len();
        if m == 0 || text.is_empty() {
            return None;
        }

        let expected = expected.min(text.len());
        let max_errors = (self.threshold * m as f64).floor() as usize;
        let reach = self.radius().saturating_add(m + max_errors);
        let lo = expected.saturating_sub(reach);
        let hi = expected.saturating_add(reach).min(text.len());

        // Column at `lo`: nothing consumed; rows are pattern prefixes.
        let mut prev: Vec<Cell> = (0..=m)
            .map(|i| Cell {
                cost: i,
                start: lo,
                boundary: lo,
            })
            .collect();
        let mut cur = prev.clone();
        let mut best: Option<Cell> = None;
        let mut best_end = 0usize;
        let mut best_score = f64::INFINITY;

        for pos in lo + 1..=hi {
            let ch = text[pos - 1];
            cur[0] = Cell {
                cost: 0,
                start: pos,
                boundary: pos,
            };
            for i in 1..=m {
                let diag = prev[i - 1].cost + usize::from(pattern[i - 1] != ch);
                let up = cur[i - 1].cost + 1;
                let left_cost = prev[i].cost + 1;

                let (cell, from_prefix) = if diag <= up && diag <= left_cost {
                    (Cell { cost: diag, ..prev[i - 1] }, true)
                } else if up <= left_cost {
                    (Cell { cost: up, ..cur[i - 1] }, true)
                } else {
                    (
                        Cell {
                            cost: left_cost,
                            ..prev[i]
                        },
                        false,
                    )
                };
                // Completing the left context at this column puts the boundary here.
                cur[i] = if i == k && from_prefix {
                    Cell { boundary: pos, ..cell }
                } else {
                    cell
                };
            }

            let candidate = cur[m];
            if candidate.cost <= max_errors {
                let score = candidate.cost as f64 / m as f64
                    + self.proximity(candidate.boundary, expected);
                if score <= self.threshold && score < best_score {
                    best_score = score;
                    best = Some(candidate);
                    best_end = pos;
                }
            }
            std::mem::swap(&mut prev, &mut cur);
        }

        let best = best?;
        let matched: String = text[best.start..best_end].iter().collect();
        let needle: String = pattern.iter().collect();
        Some(Match {
            location: best.boundary,
            start: best.start,
            end: best_end,
            score: best_score,
            quality: strsim::normalized_levenshtein(&needle, &matched),
        })
    }
}
