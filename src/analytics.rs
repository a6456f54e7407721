//! Per-question score curves derived from a finished session.
//!
//! Scores are in questions per minute (QPM). Every series has exactly one
//! entry per answered problem and every ratio falls back to 0 on a zero
//! denominator, so an empty or single-problem history is handled without
//! special cases at the call site.

use crate::classifier::ProblemRecord;
use crate::util::{mean, ratio_or_zero, std_dev};

pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Questions per minute for one question answered in `secs`
pub fn instantaneous_qpm(secs: f64) -> f64 {
    ratio_or_zero(60.0, secs)
}

/// Centered moving average, clipped at both ends.
///
/// The window for index `i` is `[i - w/2, i + ceil(w/2))`, intersected with the
/// sequence. A window of 0 behaves like 1.
pub fn centered_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let n = values.len();
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(window / 2);
            let end = (i + window.div_ceil(2)).min(n);
            mean(&values[start..end]).unwrap_or(0.0)
        })
        .collect()
}

/// Score over the questions up to and including each index
pub fn cumulative_scores(secs: &[f64]) -> Vec<f64> {
    let mut elapsed = 0.0_f64;
    secs.iter()
        .enumerate()
        .map(|(i, s)| {
            elapsed += *s;
            ratio_or_zero((i + 1) as f64, elapsed) * 60.0
        })
        .collect()
}

/// Bounds of the burst window centered on `index`: the question and its
/// immediate neighbours
pub fn burst_window(index: usize, len: usize) -> std::ops::Range<usize> {
    index.saturating_sub(1)..(index + 2).min(len)
}

/// Score over a three-question window centered on each index
pub fn burst_scores(secs: &[f64]) -> Vec<f64> {
    (0..secs.len())
        .map(|i| {
            let avg = mean(&secs[burst_window(i, secs.len())]).unwrap_or(0.0);
            ratio_or_zero(60.0, avg)
        })
        .collect()
}

/// Overall QPM of a session: `total / duration * 60`, one decimal
pub fn overall_qpm(total_problems: usize, duration_secs: f64) -> f64 {
    crate::util::round_to(
        ratio_or_zero(total_problems as f64, duration_secs) * 60.0,
        1,
    )
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedSeries {
    pub per_question_secs: Vec<f64>,
    pub instantaneous: Vec<f64>,
    pub smoothed: Vec<f64>,
    pub cumulative: Vec<f64>,
    pub burst: Vec<f64>,
    /// Question needed more than one attempt
    pub errors: Vec<bool>,
    /// Mean seconds per question, the chart's reference baseline
    pub average_secs: f64,
    /// Population standard deviation of seconds per question
    pub std_dev_secs: f64,
}

impl DerivedSeries {
    pub fn from_history(history: &[ProblemRecord]) -> Self {
        Self::with_window(history, DEFAULT_SMOOTHING_WINDOW)
    }

    pub fn with_window(history: &[ProblemRecord], window: usize) -> Self {
        let per_question_secs: Vec<f64> = history
            .iter()
            .map(|r| r.time_taken_ms as f64 / 1000.0)
            .collect();
        let instantaneous: Vec<f64> = per_question_secs
            .iter()
            .map(|s| instantaneous_qpm(*s))
            .collect();

        Self {
            smoothed: centered_moving_average(&instantaneous, window),
            cumulative: cumulative_scores(&per_question_secs),
            burst: burst_scores(&per_question_secs),
            errors: history.iter().map(|r| r.attempts > 1).collect(),
            average_secs: mean(&per_question_secs).unwrap_or(0.0),
            std_dev_secs: std_dev(&per_question_secs).unwrap_or(0.0),
            instantaneous,
            per_question_secs,
        }
    }

    pub fn len(&self) -> usize {
        self.per_question_secs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_question_secs.is_empty()
    }

    /// Highest value across the score series drawn on the chart
    pub fn peak_score(&self) -> f64 {
        self.cumulative
            .iter()
            .chain(self.burst.iter())
            .copied()
            .fold(0.0, f64::max)
    }
}
