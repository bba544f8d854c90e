//! Mental math: quick-fire exact arithmetic.

use super::drill::{Answer, Question, QuestionSource};
use crate::error::GenError;
use crate::module::{Category, Difficulty, GameInfo};
use crate::rng::Mulberry32;

static INFO: GameInfo = GameInfo {
    id: "mental-math",
    title: "Mental Math",
    category: Category::Arithmetic,
    difficulty_labels: ["Warm-up", "Tables", "Mixed"],
};

pub struct MentalMath;

impl QuestionSource for MentalMath {
    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn question(&self, rng: &mut Mulberry32, difficulty: Difficulty) -> Result<Question, GenError> {
        let kinds: &[char] = match difficulty.level() {
            1 => &['+', '-'],
            2 => &['+', '-', '*'],
            _ => &['+', '-', '*', '/', '%'],
        };
        let (prompt, answer) = match *rng.pick(kinds)? {
            '+' => {
                let hi = difficulty.select([50, 500, 999]);
                let (a, b) = (rng.rand_int(2, hi), rng.rand_int(2, hi));
                (format!("{} + {}", a, b), a + b)
            }
            '-' => {
                let hi = difficulty.select([50, 500, 999]);
                let (a, b) = (rng.rand_int(2, hi), rng.rand_int(2, hi));
                let (a, b) = (a.max(b), a.min(b));
                (format!("{} - {}", a, b), a - b)
            }
            '*' => {
                let (a, b) = (rng.rand_int(2, 12), rng.rand_int(2, difficulty.select([12, 12, 25])));
                (format!("{} × {}", a, b), a * b)
            }
            '/' => {
                let (q, d) = (rng.rand_int(2, 20), rng.rand_int(2, 12));
                (format!("{} ÷ {}", q * d, d), q)
            }
            _ => {
                let pct = *rng.pick(&[5, 10, 15, 20, 25, 50, 75])?;
                let base = rng.rand_int(1, 40) * 20;
                if base * pct % 100 != 0 {
                    return Err(GenError::Unsatisfied("percentage is not whole"));
                }
                (format!("{}% of {}", pct, base), base * pct / 100)
            }
        };
        Ok(Question::open(format!("{} = ?", prompt), Answer::number(answer as f64)))
    }

    fn fallback(&self, _difficulty: Difficulty) -> Question {
        Question::open("7 × 8 = ?", Answer::number(56.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::drill::Drill;
    use crate::module::GameModule;

    #[test]
    fn test_easy_is_addition_and_subtraction() {
        let puzzle = Drill(MentalMath).create_puzzle(11, Difficulty::EASY);
        assert!(puzzle
            .questions
            .iter()
            .all(|q| q.prompt.contains('+') || q.prompt.contains('-')));
    }

    #[test]
    fn test_answers_are_whole_and_non_negative() {
        let mut rng = Mulberry32::new(5);
        for _ in 0..200 {
            if let Ok(q) = MentalMath.question(&mut rng, Difficulty::HARD) {
                match q.answer {
                    Answer::Numeric { value, .. } => assert!(value >= 0.0 && value.fract() == 0.0),
                    other => panic!("unexpected answer {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_division_is_exact() {
        let mut rng = Mulberry32::new(8);
        let division = (0..500)
            .filter_map(|_| MentalMath.question(&mut rng, Difficulty::HARD).ok())
            .find(|q| q.prompt.contains('÷'))
            .unwrap();
        let parts: Vec<i64> = division
            .prompt
            .split(|c: char| !c.is_ascii_digit())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(parts[0] % parts[1], 0);
        assert!(division.answer.accepts(&(parts[0] / parts[1]).to_string()));
    }
}
