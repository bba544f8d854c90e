//! Number series: spot the rule and give the next term.

use super::drill::{Answer, Question, QuestionSource};
use crate::error::GenError;
use crate::module::{Category, Difficulty, GameInfo};
use crate::rng::Mulberry32;

static INFO: GameInfo = GameInfo {
    id: "number-series",
    title: "Number Series",
    category: Category::Arithmetic,
    difficulty_labels: ["Steps", "Growth", "Patterns"],
};

const SHOWN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Arithmetic { start: i64, step: i64 },
    Geometric { start: i64, ratio: i64 },
    Alternating { start: i64, up: i64, down: i64 },
    Squares { offset: i64 },
    Fibonacci { a: i64, b: i64 },
    GrowingStep { start: i64, step: i64 },
}

impl Rule {
    /// First `n` terms.
    pub fn terms(self, n: usize) -> Vec<i64> {
        let mut out = Vec::with_capacity(n);
        match self {
            Rule::Arithmetic { start, step } => out.extend((0..n as i64).map(|i| start + i * step)),
            Rule::Geometric { start, ratio } => {
                let mut t = start;
                for _ in 0..n {
                    out.push(t);
                    t *= ratio;
                }
            }
            Rule::Alternating { start, up, down } => {
                let mut t = start;
                for i in 0..n {
                    out.push(t);
                    t += if i % 2 == 0 { up } else { -down };
                }
            }
            Rule::Squares { offset } => out.extend((1..=n as i64).map(|i| i * i + offset)),
            Rule::Fibonacci { a, b } => {
                let (mut x, mut y) = (a, b);
                for _ in 0..n {
                    out.push(x);
                    (x, y) = (y, x + y);
                }
            }
            Rule::GrowingStep { start, step } => {
                let mut t = start;
                for i in 0..n as i64 {
                    out.push(t);
                    t += step + i;
                }
            }
        }
        out
    }
}

fn random_rule(rng: &mut Mulberry32, difficulty: Difficulty) -> Rule {
    let kinds = difficulty.select([2, 4, 6]);
    match rng.index(kinds) {
        0 => Rule::Arithmetic {
            start: rng.rand_int(1, 30),
            step: rng.rand_int(2, 12),
        },
        1 => Rule::Arithmetic {
            start: rng.rand_int(60, 120),
            step: -rng.rand_int(2, 9),
        },
        2 => Rule::Geometric {
            start: rng.rand_int(1, 5),
            ratio: rng.rand_int(2, 3),
        },
        3 => Rule::Alternating {
            start: rng.rand_int(5, 30),
            up: rng.rand_int(3, 9),
            down: rng.rand_int(1, 4),
        },
        4 => Rule::Squares {
            offset: rng.rand_int(-1, 3),
        },
        _ => {
            if rng.chance(0.5) {
                Rule::Fibonacci {
                    a: rng.rand_int(1, 5),
                    b: rng.rand_int(2, 8),
                }
            } else {
                Rule::GrowingStep {
                    start: rng.rand_int(1, 10),
                    step: rng.rand_int(1, 4),
                }
            }
        }
    }
}

pub struct NumberSeries;

impl QuestionSource for NumberSeries {
    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn question(&self, rng: &mut Mulberry32, difficulty: Difficulty) -> Result<Question, GenError> {
        let rule = random_rule(rng, difficulty);
        let terms = rule.terms(SHOWN + 1);
        let (shown, next) = terms.split_at(SHOWN);
        if shown.windows(2).all(|w| w[0] == w[1]) {
            return Err(GenError::Unsatisfied("constant series"));
        }
        let text = shown.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");
        Ok(Question::open(format!("{}, ?", text), Answer::number(next[0] as f64)))
    }

    fn fallback(&self, _difficulty: Difficulty) -> Question {
        Question::open("2, 4, 8, 16, 32, ?", Answer::number(64.0))
    }
}
