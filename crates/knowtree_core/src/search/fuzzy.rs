//! Approximate substring scoring.
//!
//! # Responsibility
//! - Score how well a pattern occurs anywhere in a text, tolerating typos.
//!
//! # Invariants
//! - Score 0.0 means an exact occurrence at the start of the text.
//! - Score = edits / pattern_len + start_location / distance, minimized over
//!   every alignment of the whole pattern against any text substring.
//! - Only alignments with score <= threshold are reported.

/// Case-folded character buffer used by both sides of a comparison.
pub fn fold(value: &str) -> Vec<char> {
    value.chars().flat_map(char::to_lowercase).collect()
}

/// Scoring bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Highest accepted score, 0.0..=1.0.
    pub threshold: f64,
    /// Characters of start offset that cost one full score unit.
    pub distance: usize,
}

/// Best score of `pattern` inside `text`, or `None` above the threshold.
///
/// Semi-global edit distance (Sellers): the alignment may start and end
/// anywhere in `text`, must consume all of `pattern`, and pays
/// `start / distance` for where it starts. Only the window that can still
/// satisfy the threshold is scanned.
pub fn score(pattern: &[char], text: &[char], tolerance: Tolerance) -> Option<f64> {
    let m = pattern.len();
    if m == 0 {
        return None;
    }
    let edit = 1.0 / m as f64;
    let distance = tolerance.distance.max(1) as f64;
    let max_edits = (tolerance.threshold * m as f64).floor() as usize;
    let max_start = (tolerance.threshold * distance).floor() as usize;
    let window = text.len().min(max_start + m + max_edits + 1);
    let text = &text[..window];

    // row[j]: best cost of aligning pattern[..i] ending right before text[j].
    let mut row: Vec<f64> = (0..=text.len())
        .map(|j| start_cost(j, max_start, distance))
        .collect();
    let mut next = vec![0.0; text.len() + 1];
    for (i, p) in pattern.iter().enumerate() {
        next[0] = (i + 1) as f64 * edit;
        for (j, t) in text.iter().enumerate() {
            let substitute = row[j] + if p == t { 0.0 } else { edit };
            let skip_pattern = row[j + 1] + edit;
            let skip_text = next[j] + edit;
            next[j + 1] = substitute.min(skip_pattern).min(skip_text);
        }
        std::mem::swap(&mut row, &mut next);
    }

    let best = row.iter().copied().fold(f64::INFINITY, f64::min);
    (best <= tolerance.threshold + f64::EPSILON).then_some(best)
}

fn start_cost(start: usize, max_start: usize, distance: f64) -> f64 {
    if start > max_start {
        f64::INFINITY
    } else {
        start as f64 / distance
    }
}
