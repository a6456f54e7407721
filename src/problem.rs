use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::config::{OperandRange, SessionConfig};

/// One of the four arithmetic operators a session can draw from
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '−',
            Operator::Mul => '×',
            Operator::Div => '÷',
        }
    }

    /// Which operand range this operator draws from
    pub fn family(&self) -> OperatorFamily {
        match self {
            Operator::Add | Operator::Sub => OperatorFamily::Additive,
            Operator::Mul | Operator::Div => OperatorFamily::Multiplicative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OperatorFamily {
    Additive,
    Multiplicative,
}

/// A problem shown to the user. Replaced as soon as it is answered.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub operator: Operator,
    /// Left operand as displayed (the dividend for division)
    pub lhs: i64,
    /// Right operand as displayed (the divisor for division)
    pub rhs: i64,
    pub display: String,
    pub answer: i64,
    pub created_at: SystemTime,
}

impl Problem {
    /// Number of characters the answer occupies when typed
    pub fn answer_width(&self) -> usize {
        self.answer.to_string().chars().count()
    }
}

/// Build a problem from already drawn operands.
///
/// Subtraction always swaps so the larger operand comes first and the answer
/// is the post-swap difference. Division shows `a * b ÷ b` and expects `a`.
pub fn build_problem(operator: Operator, a: i64, b: i64, created_at: SystemTime) -> Problem {
    let (lhs, rhs, answer) = match operator {
        Operator::Add => (a, b, a + b),
        Operator::Sub => {
            let (hi, lo) = if a < b { (b, a) } else { (a, b) };
            (hi, lo, hi - lo)
        }
        Operator::Mul => (a, b, a * b),
        Operator::Div => (a * b, b, a),
    };

    Problem {
        operator,
        lhs,
        rhs,
        display: format!("{} {} {}", lhs, operator.symbol(), rhs),
        answer,
        created_at,
    }
}

/// Draw a fresh problem for the given configuration.
///
/// Returns `None` only when the configuration has no operators enabled.
pub fn generate<R: Rng + ?Sized>(
    config: &SessionConfig,
    rng: &mut R,
    created_at: SystemTime,
) -> Option<Problem> {
    let operator = *config.operators.choose(rng)?;
    let range = config.ranges.for_family(operator.family());
    let (a, b) = draw_operands(&range, rng);

    Some(build_problem(operator, a, b, created_at))
}

fn draw_operands<R: Rng + ?Sized>(range: &OperandRange, rng: &mut R) -> (i64, i64) {
    (
        draw_inclusive(rng, range.min_a, range.max_a),
        draw_inclusive(rng, range.min_b, range.max_b),
    )
}

fn draw_inclusive<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    if min >= max {
        min
    } else {
        rng.gen_range(min..=max)
    }
}
