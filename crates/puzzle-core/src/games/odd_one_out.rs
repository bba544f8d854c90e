//! Odd one out: three words share a category, one does not.

use super::drill::{Question, QuestionSource};
use crate::error::GenError;
use crate::module::{Category, Difficulty, GameInfo};
use crate::rng::Mulberry32;

static INFO: GameInfo = GameInfo {
    id: "odd-one-out",
    title: "Odd One Out",
    category: Category::Verbal,
    difficulty_labels: ["Distant", "Related", "Close"],
};

/// Category groups. Neighbouring entries are deliberately close, and harder
/// levels draw the odd word from an adjacent group.
const GROUPS: &[&[&str]] = &[
    &["apple", "banana", "cherry", "mango", "plum", "pear"],
    &["carrot", "potato", "onion", "leek", "turnip", "radish"],
    &["oak", "pine", "birch", "maple", "willow", "cedar"],
    &["rose", "tulip", "daisy", "lily", "orchid", "violet"],
    &["violin", "cello", "harp", "guitar", "banjo", "viola"],
    &["trumpet", "flute", "oboe", "clarinet", "tuba", "bassoon"],
    &["copper", "iron", "zinc", "silver", "nickel", "tin"],
    &["ruby", "emerald", "sapphire", "topaz", "garnet", "opal"],
    &["Mars", "Venus", "Saturn", "Jupiter", "Mercury", "Neptune"],
    &["Nile", "Amazon", "Danube", "Thames", "Ganges", "Volga"],
];

pub struct OddOneOut;

impl QuestionSource for OddOneOut {
    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn question(&self, rng: &mut Mulberry32, difficulty: Difficulty) -> Result<Question, GenError> {
        let home = rng.index(GROUPS.len());
        let away = match difficulty.level() {
            1 => (home + GROUPS.len() / 2) % GROUPS.len(),
            2 => (home + 2) % GROUPS.len(),
            // Groups are laid out in close pairs: 0/1, 2/3, ...
            _ => home ^ 1,
        };
        if away == home || away >= GROUPS.len() {
            return Err(GenError::Unsatisfied("odd word needs another group"));
        }
        let shared = difficulty.select([3, 3, 4]);
        let odd = *rng.pick(GROUPS[away])?;
        let mut choices: Vec<String> = rng
            .sample_unique(GROUPS[home], shared)
            .into_iter()
            .map(String::from)
            .collect();
        choices.push(odd.to_string());
        rng.shuffle(&mut choices);
        Ok(Question::choice(
            format!("Which word does not belong? {}", choices.join(", ")),
            choices,
            odd,
        ))
    }

    fn fallback(&self, _difficulty: Difficulty) -> Question {
        let choices: Vec<String> = ["oak", "pine", "tulip", "birch"].map(String::from).to_vec();
        Question::choice("Which word does not belong? oak, pine, tulip, birch", choices, "tulip")
    }
}
