use std::time::{Duration, SystemTime, UNIX_EPOCH};

use assert_matches::assert_matches;
use mathrush::aggregator::SessionAggregator;
use mathrush::analytics::{overall_qpm, DerivedSeries};
use mathrush::chart::{paint_chart, ChartProjector, Ink, PixelExtents, PixelPoint, Surface};
use mathrush::classifier::{AttemptAccumulator, EditOutcome};
use mathrush::config::{Difficulty, OperandRange, Ranges, SessionConfig};
use mathrush::problem::{build_problem, Operator};
use mathrush::session::{Session, SessionEvent};
use mathrush::store::{persist_summary, SessionHistory, SqliteSummaryStore};
use rand::{rngs::StdRng, SeedableRng};

fn at(ms: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(ms)
}

fn small_addition() -> SessionConfig {
    SessionConfig::new(60, Difficulty::Easy, vec![Operator::Add]).with_ranges(Ranges {
        addition: OperandRange::new(2, 10, 2, 10),
        multiplication: OperandRange::new(2, 10, 2, 10),
    })
}

#[test]
fn five_clean_answers_in_a_minute() {
    let mut session = Session::new(small_addition(), StdRng::seed_from_u64(2024)).unwrap();
    session.start_at(at(0));

    let mut now = 0;
    for ms in [2000, 3000, 2500, 4000, 3000] {
        now += ms;
        let problem = session.current_problem().unwrap().clone();
        assert!((2..=10).contains(&problem.lhs));
        assert!((2..=10).contains(&problem.rhs));
        let events = session.on_answer_changed_at(&problem.answer.to_string(), at(now));
        assert_matches!(events[0], SessionEvent::Solved(_));
    }

    let events = session.advance(Duration::from_secs(60));
    let summary = assert_matches!(events.last(), Some(SessionEvent::Ended(s)) => s.clone());
    assert_eq!(summary.total_problems, 5);
    assert_eq!(summary.first_try_correct, 5);
    assert_eq!(summary.eventually_correct, 5);
    assert_eq!(summary.accuracy, 100.0);
    assert_eq!(
        overall_qpm(summary.total_problems, summary.duration_secs as f64),
        5.0
    );

    let series = DerivedSeries::from_history(&summary.problem_history);
    assert_eq!(series.per_question_secs, vec![2.0, 3.0, 2.5, 4.0, 3.0]);
    assert_eq!(series.errors, vec![false; 5]);
    assert!((series.cumulative[4] - 5.0 / 14.5 * 60.0).abs() < 1e-9);

    let mut store = SqliteSummaryStore::open_in_memory().unwrap();
    assert!(persist_summary(&mut store, &summary));
    assert_eq!(store.recent(1).unwrap()[0].problem_history, summary.problem_history);
}

/// 6 × 7 = 42, created at t=0
fn forty_two() -> mathrush::problem::Problem {
    build_problem(Operator::Mul, 6, 7, at(0))
}

fn apply(acc: &mut AttemptAccumulator, values: &[&str]) -> EditOutcome {
    let problem = forty_two();
    let mut last = EditOutcome::Accepted;
    for (i, v) in values.iter().enumerate() {
        last = acc.on_answer_changed(&problem, v, at(100 * (i as u64 + 1)));
    }
    last
}

#[test]
fn heavy_correction_counts_three_attempts() {
    let mut acc = AttemptAccumulator::new();
    let outcome = apply(
        &mut acc,
        &[
            "1", "12", "123", "12", "1", "", "5", "55", "555", "55", "5", "", "4", "42",
        ],
    );
    let record = assert_matches!(outcome, EditOutcome::Solved(r) => r);
    assert_eq!(record.keystrokes, 8);
    assert_eq!(record.backspaces, 6);
    assert_eq!(record.attempts, 3);
    assert!(!record.first_try_correct);
    assert!(record.correct);
}

#[test]
fn light_correction_counts_two_attempts() {
    let mut acc = AttemptAccumulator::new();
    let outcome = apply(
        &mut acc,
        &[
            "1",
            "11",
            "111",
            "1111",
            "11111",
            "111111",
            "1111111",
            "11111111",
            "111111111",
            "4",
            "42",
        ],
    );
    let record = assert_matches!(outcome, EditOutcome::Solved(r) => r);
    assert_eq!(record.keystrokes, 10);
    assert_eq!(record.backspaces, 1);
    assert_eq!(record.attempts, 2);
    assert!(!record.first_try_correct);
}

#[test]
fn division_is_built_from_its_quotient() {
    let p = build_problem(Operator::Div, 7, 9, at(0));
    assert_eq!(p.display, "63 ÷ 9");
    assert_eq!(p.lhs, 63);
    assert_eq!(p.rhs, 9);
    assert_eq!(p.answer, 7);
}

#[derive(Default)]
struct CountingSurface {
    shapes: usize,
}

impl Surface for CountingSurface {
    fn size(&self) -> (f64, f64) {
        (400.0, 300.0)
    }
    fn line(&mut self, _from: PixelPoint, _to: PixelPoint, ink: Ink) {
        if ink != Ink::Grid {
            self.shapes += 1;
        }
    }
    fn rect(&mut self, _origin: PixelPoint, _width: f64, _height: f64, _ink: Ink) {
        self.shapes += 1;
    }
    fn arc(&mut self, _center: PixelPoint, _radius: f64, _ink: Ink) {
        self.shapes += 1;
    }
    fn text(&mut self, _at: PixelPoint, _text: &str, _ink: Ink) {}
}

#[test]
fn empty_session_summarizes_without_error() {
    let mut session = Session::new(small_addition(), StdRng::seed_from_u64(1)).unwrap();
    session.start_at(at(0));
    let summary = session.end().unwrap();

    assert_eq!(summary.total_problems, 0);
    assert_eq!(summary.first_try_correct, 0);
    assert_eq!(summary.accuracy, 0.0);
    assert!(summary.problem_history.is_empty());

    let series = DerivedSeries::from_history(&summary.problem_history);
    assert!(series.is_empty());
    assert!(series.cumulative.is_empty());
    assert!(series.burst.is_empty());
    assert!(series.smoothed.is_empty());

    let chart = ChartProjector::new(&series, PixelExtents::new(400.0, 300.0));
    let mut surface = CountingSurface::default();
    paint_chart(&mut surface, &chart, None);
    assert_eq!(surface.shapes, 0);
}

#[test]
fn aggregator_and_session_agree() {
    let config = small_addition();
    let mut session = Session::new(config.clone(), StdRng::seed_from_u64(8)).unwrap();
    let mut mirror = SessionAggregator::new(&config);
    session.start_at(at(0));

    for i in 1..=4u64 {
        let answer = session.current_problem().unwrap().answer.to_string();
        for event in session.on_answer_changed_at(&answer, at(i * 1000)) {
            if let SessionEvent::Solved(record) = event {
                mirror.append_record(record);
            }
        }
    }

    let from_session = session.end().unwrap();
    let from_mirror = mirror.finalize().unwrap();
    assert_eq!(from_session.problem_history, from_mirror.problem_history);
    assert_eq!(from_session.accuracy, from_mirror.accuracy);
}
