//! Estimation: ballpark answers to arithmetic that is too slow to do exactly.

use super::drill::{Answer, Question, QuestionSource};
use crate::error::GenError;
use crate::module::{Category, Difficulty, GameInfo};
use crate::rng::Mulberry32;

static INFO: GameInfo = GameInfo {
    id: "estimation",
    title: "Estimation",
    category: Category::Arithmetic,
    difficulty_labels: ["Within 10%", "Within 7%", "Within 5%"],
};

pub struct Estimation;

/// Allowed relative error for a difficulty.
pub fn tolerance(difficulty: Difficulty) -> f64 {
    difficulty.select([0.10, 0.07, 0.05])
}

impl QuestionSource for Estimation {
    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn question(&self, rng: &mut Mulberry32, difficulty: Difficulty) -> Result<Question, GenError> {
        let (prompt, exact) = match rng.index(4) {
            0 => {
                let (a, b) = (rng.rand_int(110, 990), rng.rand_int(11, 99));
                (format!("{} × {}", a, b), (a * b) as f64)
            }
            1 => {
                let d = rng.rand_int(7, 49);
                let n = d * rng.rand_int(20, 400) + rng.rand_int(1, d - 1);
                (format!("{} ÷ {}", n, d), n as f64 / d as f64)
            }
            2 => {
                let pct = rng.rand_int(3, 97);
                let base = rng.rand_int(200, 9_000);
                (format!("{}% of {}", pct, base), base as f64 * pct as f64 / 100.0)
            }
            _ => {
                let terms: Vec<i64> = (0..difficulty.select([3, 4, 5]))
                    .map(|_| rng.rand_int(1_000, 9_999))
                    .collect();
                let text = terms.iter().map(i64::to_string).collect::<Vec<_>>().join(" + ");
                (text, terms.iter().sum::<i64>() as f64)
            }
        };
        if exact <= 0.0 {
            return Err(GenError::Unsatisfied("non-positive estimate"));
        }
        let rounded = (exact * 100.0).round() / 100.0;
        let slack = (rounded * tolerance(difficulty) * 100.0).round() / 100.0;
        Ok(Question::open(
            format!("Estimate {} (within {}%)", prompt, (tolerance(difficulty) * 100.0).round()),
            Answer::Numeric {
                value: rounded,
                tolerance: slack,
            },
        ))
    }

    fn fallback(&self, difficulty: Difficulty) -> Question {
        Question::open(
            "Estimate 498 × 21",
            Answer::Numeric {
                value: 10458.0,
                tolerance: (10458.0 * tolerance(difficulty)).round(),
            },
        )
    }
}
