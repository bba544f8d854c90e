//! Analogies: `a : b :: c : ?`.

use super::drill::{Question, QuestionSource};
use crate::error::GenError;
use crate::module::{Category, Difficulty, GameInfo};
use crate::rng::Mulberry32;

static INFO: GameInfo = GameInfo {
    id: "analogies",
    title: "Analogies",
    category: Category::Verbal,
    difficulty_labels: ["3 choices", "4 choices", "5 choices"],
};

/// Word pairs grouped by the relation that links them.
const RELATIONS: &[(&str, &[(&str, &str)])] = &[
    ("opposite", &[("hot", "cold"), ("tall", "short"), ("early", "late"), ("full", "empty"), ("ancient", "modern")]),
    ("young", &[("dog", "puppy"), ("cat", "kitten"), ("cow", "calf"), ("frog", "tadpole"), ("swan", "cygnet")]),
    ("worker-tool", &[("painter", "brush"), ("surgeon", "scalpel"), ("carpenter", "saw"), ("writer", "pen"), ("chef", "knife")]),
    ("part-whole", &[("page", "book"), ("petal", "flower"), ("key", "keyboard"), ("wheel", "car"), ("brick", "wall")]),
    ("home", &[("bee", "hive"), ("bird", "nest"), ("horse", "stable"), ("spider", "web"), ("rabbit", "burrow")]),
    ("degree", &[("warm", "scorching"), ("cool", "freezing"), ("happy", "ecstatic"), ("tired", "exhausted"), ("big", "enormous")]),
];

pub struct Analogies;

impl QuestionSource for Analogies {
    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn question(&self, rng: &mut Mulberry32, difficulty: Difficulty) -> Result<Question, GenError> {
        let relation = rng.index(RELATIONS.len());
        let (_, pairs) = RELATIONS[relation];
        let chosen = rng.sample_unique(pairs, 2);
        let [(a, b), (c, d)] = chosen[..] else {
            return Err(GenError::Unsatisfied("relation needs two pairs"));
        };

        // Distractors come from other relations, plus the pair's own first word
        // on harder levels.
        let mut pool: Vec<&str> = RELATIONS
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != relation)
            .flat_map(|(_, (_, pairs))| pairs.iter().map(|&(_, right)| right))
            .collect();
        if difficulty.level() > 1 {
            pool.push(c);
        }
        let wrong = difficulty.select([2, 3, 4]);
        let mut choices: Vec<String> = rng
            .sample_unique(&pool, wrong)
            .into_iter()
            .filter(|w| *w != d)
            .map(String::from)
            .collect();
        choices.push(d.to_string());
        rng.shuffle(&mut choices);
        Ok(Question::choice(format!("{} : {} :: {} : ?", a, b, c), choices, d))
    }

    fn fallback(&self, _difficulty: Difficulty) -> Question {
        Question::choice(
            "bee : hive :: bird : ?",
            vec!["nest".into(), "feather".into(), "sky".into()],
            "nest",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::drill::Answer;

    #[test]
    fn test_answer_is_among_choices() {
        let mut rng = Mulberry32::new(17);
        for level in 1..=3 {
            let q = Analogies.question(&mut rng, Difficulty::new(level)).unwrap();
            let Answer::Exact { value } = &q.answer else {
                panic!("analogy answers are words");
            };
            assert!(q.choices.contains(value));
            assert!(q.choices.len() >= 2);
        }
    }

    #[test]
    fn test_answer_shares_relation() {
        let mut rng = Mulberry32::new(3);
        let q = Analogies.question(&mut rng, Difficulty::EASY).unwrap();
        let third = q.prompt.split(" :: ").nth(1).unwrap().split(" : ").next().unwrap();
        let Answer::Exact { value } = &q.answer else {
            unreachable!()
        };
        let linked = RELATIONS
            .iter()
            .flat_map(|(_, pairs)| pairs.iter())
            .any(|&(left, right)| left == third && right == value);
        assert!(linked);
    }
}
