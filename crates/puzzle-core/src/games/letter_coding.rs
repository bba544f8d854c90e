//! Letter coding: work out the cipher from one example and apply it.

use super::drill::{Answer, Question, QuestionSource};
use crate::error::GenError;
use crate::module::{Category, Difficulty, GameInfo};
use crate::rng::Mulberry32;

static INFO: GameInfo = GameInfo {
    id: "letter-coding",
    title: "Letter Coding",
    category: Category::Verbal,
    difficulty_labels: ["Shift", "Shift back", "Reverse and shift"],
};

const WORDS: [&str; 16] = [
    "CAT", "DOG", "LAMP", "RIVER", "STONE", "CLOUD", "PLANT", "BRICK", "TRAIN", "MOUSE", "GLASS", "FROST",
    "BREAD", "HONEY", "SPARK", "NORTH",
];

/// A cipher applied letter by letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub shift: i32,
    pub reverse: bool,
}

impl Code {
    pub fn apply(self, word: &str) -> String {
        let shifted = word.chars().map(|c| {
            if c.is_ascii_uppercase() {
                let offset = (c as i32 - 'A' as i32 + self.shift).rem_euclid(26);
                char::from(b'A' + offset as u8)
            } else {
                c
            }
        });
        if self.reverse {
            shifted.rev().collect()
        } else {
            shifted.collect()
        }
    }
}

pub struct LetterCoding;

impl QuestionSource for LetterCoding {
    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn question(&self, rng: &mut Mulberry32, difficulty: Difficulty) -> Result<Question, GenError> {
        let magnitude = rng.rand_int(1, difficulty.select([3, 6, 9])) as i32;
        let code = Code {
            shift: if difficulty.level() >= 2 && rng.chance(0.5) { -magnitude } else { magnitude },
            reverse: difficulty == Difficulty::HARD,
        };
        let pair = rng.sample_unique(&WORDS, 2);
        let [example, target] = pair[..] else {
            return Err(GenError::Unsatisfied("need two words"));
        };
        Ok(Question::open(
            format!(
                "If {} is coded as {}, how is {} coded?",
                example,
                code.apply(example),
                target
            ),
            Answer::exact(code.apply(target)),
        ))
    }

    fn fallback(&self, _difficulty: Difficulty) -> Question {
        Question::open("If CAT is coded as DBU, how is DOG coded?", Answer::exact("EPH"))
    }
}
