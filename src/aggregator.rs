use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::classifier::ProblemRecord;
use crate::config::{Difficulty, SessionConfig};
use crate::problem::Operator;
use crate::util::round_to;

/// Result of one finished session
///
/// Every record in the history was answered correctly (a problem only ends
/// on a correct value), so `eventually_correct == total_problems` always.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_problems: usize,
    pub first_try_correct: usize,
    pub eventually_correct: usize,
    /// First-try share in percent, one decimal
    pub accuracy: f64,
    pub duration_secs: u64,
    pub difficulty: Difficulty,
    pub operators: Vec<Operator>,
    pub timestamp: DateTime<Local>,
    pub problem_history: Vec<ProblemRecord>,
}

/// `first_try / total * 100` rounded to one decimal, 0 for an empty session
pub fn accuracy(first_try_correct: usize, total_problems: usize) -> f64 {
    if total_problems == 0 {
        return 0.0;
    }
    round_to(first_try_correct as f64 / total_problems as f64 * 100.0, 1)
}

/// Collects records during a session and produces its summary once
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    duration_secs: u64,
    difficulty: Difficulty,
    operators: Vec<Operator>,
    history: Vec<ProblemRecord>,
    first_try_correct: usize,
    ended: bool,
}

impl SessionAggregator {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            duration_secs: config.duration_secs,
            difficulty: config.difficulty,
            operators: config.operators.clone(),
            history: Vec::new(),
            first_try_correct: 0,
            ended: false,
        }
    }

    pub fn history(&self) -> &[ProblemRecord] {
        &self.history
    }

    pub fn total_problems(&self) -> usize {
        self.history.len()
    }

    pub fn first_try_correct(&self) -> usize {
        self.first_try_correct
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Add a finalized record. Ignored once the session has ended.
    pub fn append_record(&mut self, record: ProblemRecord) {
        if self.ended {
            tracing::debug!("dropping record for {} after session end", record.display);
            return;
        }
        if record.first_try_correct {
            self.first_try_correct += 1;
        }
        self.history.push(record);
    }

    pub fn finalize(&mut self) -> Option<SessionSummary> {
        self.finalize_at(Local::now())
    }

    /// Build the summary. Only the first call returns one.
    pub fn finalize_at(&mut self, timestamp: DateTime<Local>) -> Option<SessionSummary> {
        if self.ended {
            return None;
        }
        self.ended = true;

        let total_problems = self.history.len();
        let first_try_correct = self.history.iter().filter(|r| r.first_try_correct).count();
        let eventually_correct = self.history.iter().filter(|r| r.correct).count();

        Some(SessionSummary {
            total_problems,
            first_try_correct,
            eventually_correct,
            accuracy: accuracy(first_try_correct, total_problems),
            duration_secs: self.duration_secs,
            difficulty: self.difficulty,
            operators: self.operators.clone(),
            timestamp,
            problem_history: self.history.clone(),
        })
    }
}
