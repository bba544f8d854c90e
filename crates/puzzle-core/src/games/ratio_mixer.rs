//! Ratio mixer: blend two strengths into a target strength by alligation.

use super::drill::{Answer, Question, QuestionSource};
use crate::error::GenError;
use crate::module::{Category, Difficulty, GameInfo};
use crate::rng::Mulberry32;

static INFO: GameInfo = GameInfo {
    id: "ratio-mixer",
    title: "Ratio Mixer",
    category: Category::Arithmetic,
    difficulty_labels: ["Round", "Mixed", "Tight"],
};

const PRODUCTS: [(&str, &str); 4] = [
    ("saline solution", "% salt"),
    ("coffee blend", " rupees per kg"),
    ("alloy", "% copper"),
    ("juice", "% sugar"),
];

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

/// Parts of `low` to parts of `high` that blend to `target`, in lowest terms.
///
/// Alligation: `A:B = (B - T):(T - A)`. `None` unless `low < target < high`.
pub fn alligation(low: i64, high: i64, target: i64) -> Option<(i64, i64)> {
    if !(low < target && target < high) {
        return None;
    }
    let (a, b) = (high - target, target - low);
    let g = gcd(a, b);
    Some((a / g, b / g))
}

pub struct RatioMixer;

impl QuestionSource for RatioMixer {
    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn question(&self, rng: &mut Mulberry32, difficulty: Difficulty) -> Result<Question, GenError> {
        let step = difficulty.select([10, 5, 1]);
        let low = rng.rand_int(1, 40 / step) * step;
        let high = low + rng.rand_int(2, 60 / step) * step;
        let target = rng.rand_int(low + 1, high - 1);
        if difficulty == Difficulty::EASY && target % 5 != 0 {
            return Err(GenError::Unsatisfied("easy targets are multiples of five"));
        }
        let (a, b) = alligation(low, high, target).ok_or(GenError::Unsatisfied("target outside the blend"))?;
        let (product, unit) = *rng.pick(&PRODUCTS)?;
        Ok(Question::open(
            format!(
                "Mix {product} A ({low}{unit}) with {product} B ({high}{unit}) to get {target}{unit}. Ratio A:B?"
            ),
            Answer::exact(format!("{}:{}", a, b)),
        ))
    }

    fn fallback(&self, _difficulty: Difficulty) -> Question {
        Question::open(
            "Mix alloy A (10% copper) with alloy B (40% copper) to get 20% copper. Ratio A:B?",
            Answer::exact("2:1"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alligation_rule() {
        assert_eq!(alligation(10, 40, 20), Some((2, 1)));
        assert_eq!(alligation(20, 30, 25), Some((1, 1)));
        assert_eq!(alligation(5, 50, 5), None);
        assert_eq!(alligation(5, 50, 60), None);
    }

    #[test]
    fn test_ratio_actually_blends_to_target() {
        let mut rng = Mulberry32::new(2);
        for _ in 0..50 {
            let low = rng.rand_int(1, 40);
            let high = low + rng.rand_int(2, 60);
            let target = rng.rand_int(low + 1, high - 1);
            let (a, b) = alligation(low, high, target).unwrap();
            assert_eq!(a * low + b * high, (a + b) * target);
        }
    }

    #[test]
    fn test_questions_expect_reduced_ratio() {
        let mut rng = Mulberry32::new(6);
        let q = (0..100)
            .find_map(|_| RatioMixer.question(&mut rng, Difficulty::HARD).ok())
            .unwrap();
        let Answer::Exact { value } = &q.answer else {
            panic!("ratio answers are text");
        };
        let parts: Vec<i64> = value.split(':').map(|p| p.parse().unwrap()).collect();
        assert_eq!(gcd(parts[0], parts[1]), 1);
    }
}
