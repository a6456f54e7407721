//! Classifies how an answer was reached from the edits made to the answer
//! field. There is no explicit "submit" or "retry": a problem is finalized the
//! moment the field holds the right number, and the editing history (growth,
//! shrinkage, wrong values of full width) stands in for the retry count.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::problem::{Operator, Problem};
use crate::util::{ratio_or_zero, time_diff_ms};

/// Backspace share of keystrokes above which a problem counts as three attempts
pub const HEAVY_CORRECTION_RATIO: f64 = 0.5;
/// Backspace count at or above which a problem counts as three attempts
pub const HEAVY_CORRECTION_BACKSPACES: u32 = 5;

/// One change to the answer field. Kept only while the problem is active.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub value: String,
    pub at: SystemTime,
    pub shortened: bool,
    pub matches_answer: bool,
}

/// Result of a single field edit
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Not an integer; the visible field keeps its previous value
    Rejected,
    /// Accepted into the field, not the answer yet
    Accepted,
    Solved(ProblemRecord),
}

/// The finished record of one answered problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub operator: Operator,
    pub display: String,
    pub answer: i64,
    pub user_answer: i64,
    pub correct: bool,
    pub first_try_correct: bool,
    pub attempts: u32,
    pub time_taken_ms: u64,
    pub keystrokes: u32,
    pub backspaces: u32,
    pub had_mistake: bool,
}

/// Estimate how many tries an answer took from its correction counts.
///
/// Thresholds are a proxy for a retry count nobody observes directly and are
/// kept as-is for comparability with existing history.
pub fn estimate_attempts(keystrokes: u32, backspaces: u32) -> u32 {
    if backspaces == 0 {
        return 1;
    }
    let ratio = ratio_or_zero(backspaces as f64, keystrokes.max(1) as f64);
    if ratio > HEAVY_CORRECTION_RATIO || backspaces >= HEAVY_CORRECTION_BACKSPACES {
        3
    } else {
        2
    }
}

/// `^-?\d+$`
fn is_integer_pattern(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Editing state for the problem currently on screen.
///
/// Owned by the session and replaced wholesale for every new problem.
#[derive(Debug, Clone, Default)]
pub struct AttemptAccumulator {
    field: String,
    keystrokes: u32,
    backspaces: u32,
    had_mistake: bool,
    events: Vec<InputEvent>,
}

impl AttemptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value currently visible in the answer field
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn keystrokes(&self) -> u32 {
        self.keystrokes
    }

    pub fn backspaces(&self) -> u32 {
        self.backspaces
    }

    pub fn had_mistake(&self) -> bool {
        self.had_mistake
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a new raw field value typed at `now` against `problem`.
    ///
    /// Counters move before the value is validated, so a rejected edit still
    /// counts as a keystroke or a backspace.
    pub fn on_answer_changed(
        &mut self,
        problem: &Problem,
        raw: &str,
        now: SystemTime,
    ) -> EditOutcome {
        let previous_len = self.field.chars().count();
        let new_len = raw.chars().count();
        let shortened = new_len < previous_len;

        if shortened {
            self.backspaces += 1;
            self.had_mistake = true;
        } else if new_len > previous_len {
            self.keystrokes += 1;
        }

        let well_formed = is_integer_pattern(raw);
        let parsed = if well_formed {
            raw.parse::<i64>().ok()
        } else {
            None
        };
        let matches_answer = parsed == Some(problem.answer);

        if well_formed && !matches_answer && new_len >= problem.answer_width() {
            self.had_mistake = true;
        }

        self.events.push(InputEvent {
            value: raw.to_string(),
            at: now,
            shortened,
            matches_answer,
        });

        if !raw.is_empty() && !well_formed {
            return EditOutcome::Rejected;
        }
        self.field = raw.to_string();

        match parsed {
            Some(value) if matches_answer => {
                let record = self.finalize(problem, value, now);
                self.reset();
                EditOutcome::Solved(record)
            }
            _ => EditOutcome::Accepted,
        }
    }

    fn finalize(&self, problem: &Problem, user_answer: i64, now: SystemTime) -> ProblemRecord {
        let first_try_correct = self.backspaces == 0 && !self.had_mistake;
        let record = ProblemRecord {
            operator: problem.operator,
            display: problem.display.clone(),
            answer: problem.answer,
            user_answer,
            correct: user_answer == problem.answer,
            first_try_correct,
            attempts: estimate_attempts(self.keystrokes, self.backspaces),
            time_taken_ms: time_diff_ms(problem.created_at, now),
            keystrokes: self.keystrokes,
            backspaces: self.backspaces,
            had_mistake: !first_try_correct,
        };
        tracing::debug!(
            display = %record.display,
            attempts = record.attempts,
            time_taken_ms = record.time_taken_ms,
            first_try = record.first_try_correct,
            "problem solved"
        );
        record
    }
}
