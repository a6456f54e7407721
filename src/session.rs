//! A running session: the one owner of clock, current problem, attempt
//! accumulator and aggregator.
//!
//! Ticks and field edits are fed in one at a time by the event loop, so there
//! is never more than one transition in flight. Every call returns the events
//! it produced, in order.

use rand::Rng;
use std::time::{Duration, SystemTime};

use crate::aggregator::{SessionAggregator, SessionSummary};
use crate::analytics::overall_qpm;
use crate::classifier::{AttemptAccumulator, EditOutcome, ProblemRecord};
use crate::clock::{ClockEvent, SessionClock};
use crate::config::SessionConfig;
use crate::error::ConfigError;
use crate::problem::{generate, Problem};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Tick { remaining_secs: u64 },
    ProblemPresented(Problem),
    Solved(ProblemRecord),
    Ended(SessionSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Ready,
    Running,
    Ended,
    Cancelled,
}

#[derive(Debug)]
pub struct Session<R: Rng> {
    config: SessionConfig,
    rng: R,
    clock: SessionClock,
    current: Option<Problem>,
    attempt: AttemptAccumulator,
    aggregator: SessionAggregator,
    phase: SessionPhase,
}

impl<R: Rng> Session<R> {
    /// Validate `config` and prepare a session. Nothing runs until `start`.
    pub fn new(config: SessionConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            clock: SessionClock::new(config.duration_secs),
            aggregator: SessionAggregator::new(&config),
            config,
            rng,
            current: None,
            attempt: AttemptAccumulator::new(),
            phase: SessionPhase::Ready,
        })
    }

    pub fn start(&mut self) -> Vec<SessionEvent> {
        self.start_at(SystemTime::now())
    }

    pub fn start_at(&mut self, now: SystemTime) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::Ready {
            return events;
        }
        self.phase = SessionPhase::Running;
        tracing::info!(
            duration_secs = self.config.duration_secs,
            difficulty = %self.config.difficulty,
            operators = ?self.config.operators,
            "session started"
        );

        if let Some(ClockEvent::Tick { remaining_secs }) = self.clock.start() {
            events.push(SessionEvent::Tick { remaining_secs });
        }
        self.present_next(now, &mut events);
        events
    }

    /// Feed wall time elapsed since the previous call
    pub fn advance(&mut self, elapsed: Duration) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for event in self.clock.advance(elapsed) {
            match event {
                ClockEvent::Tick { remaining_secs } => {
                    events.push(SessionEvent::Tick { remaining_secs })
                }
                ClockEvent::Expired => {
                    if let Some(summary) = self.end() {
                        events.push(SessionEvent::Ended(summary));
                    }
                }
            }
        }
        events
    }

    pub fn on_answer_changed(&mut self, raw: &str) -> Vec<SessionEvent> {
        self.on_answer_changed_at(raw, SystemTime::now())
    }

    /// Apply the new content of the answer field
    pub fn on_answer_changed_at(&mut self, raw: &str, now: SystemTime) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::Running {
            return events;
        }
        let Some(problem) = self.current.as_ref() else {
            return events;
        };

        if let EditOutcome::Solved(record) = self.attempt.on_answer_changed(problem, raw, now) {
            self.aggregator.append_record(record.clone());
            events.push(SessionEvent::Solved(record));
            self.present_next(now, &mut events);
        }
        events
    }

    /// End the session and produce its summary. Safe to call from a timer
    /// expiry and an external stop in the same turn: only the first call
    /// returns a summary.
    pub fn end(&mut self) -> Option<SessionSummary> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        self.phase = SessionPhase::Ended;
        self.clock.cancel();
        self.current = None;
        self.attempt.reset();

        let summary = self.aggregator.finalize()?;
        tracing::info!(
            total = summary.total_problems,
            first_try = summary.first_try_correct,
            accuracy = summary.accuracy,
            "session ended"
        );
        Some(summary)
    }

    /// Tear down without a summary. No tick or expiry fires afterwards.
    pub fn cancel(&mut self) {
        self.clock.cancel();
        self.current = None;
        self.attempt.reset();
        if self.phase != SessionPhase::Ended {
            self.phase = SessionPhase::Cancelled;
            tracing::debug!("session cancelled");
        }
    }

    fn present_next(&mut self, now: SystemTime, events: &mut Vec<SessionEvent>) {
        self.attempt.reset();
        self.current = generate(&self.config, &mut self.rng, now);
        match &self.current {
            Some(problem) => {
                tracing::debug!(display = %problem.display, "problem presented");
                events.push(SessionEvent::ProblemPresented(problem.clone()));
            }
            None => tracing::warn!("no operators enabled, nothing to present"),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_problem(&self) -> Option<&Problem> {
        self.current.as_ref()
    }

    /// What the answer field shows right now
    pub fn field(&self) -> &str {
        self.attempt.field()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.clock.remaining_secs()
    }

    pub fn total_problems(&self) -> usize {
        self.aggregator.total_problems()
    }

    pub fn first_try_correct(&self) -> usize {
        self.aggregator.first_try_correct()
    }

    pub fn history(&self) -> &[ProblemRecord] {
        self.aggregator.history()
    }

    /// Running QPM over the time elapsed so far
    pub fn live_score(&self) -> f64 {
        overall_qpm(self.total_problems(), self.clock.elapsed_secs())
    }
}
