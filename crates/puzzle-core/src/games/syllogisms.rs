//! Syllogisms: does the conclusion follow from the two premises?

use super::drill::{Question, QuestionSource};
use crate::error::GenError;
use crate::module::{Category, Difficulty, GameInfo};
use crate::rng::Mulberry32;

static INFO: GameInfo = GameInfo {
    id: "syllogisms",
    title: "Syllogisms",
    category: Category::Verbal,
    difficulty_labels: ["Classic", "Mixed", "Tricky"],
};

pub const VALID: &str = "Follows";
pub const INVALID: &str = "Does not follow";

const TERMS: [&str; 12] = [
    "painters", "runners", "doctors", "poets", "chess players", "engineers", "gardeners", "pilots",
    "singers", "teachers", "sailors", "bakers",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quant {
    All,
    No,
    Some,
    SomeNot,
}

/// A categorical statement `quant subject are predicate`.
#[derive(Debug, Clone, Copy)]
struct Statement {
    quant: Quant,
    subject: usize,
    predicate: usize,
}

impl Statement {
    fn text(&self, terms: &[&str]) -> String {
        let (s, p) = (terms[self.subject], terms[self.predicate]);
        match self.quant {
            Quant::All => format!("All {} are {}", s, p),
            Quant::No => format!("No {} are {}", s, p),
            Quant::Some => format!("Some {} are {}", s, p),
            Quant::SomeNot => format!("Some {} are not {}", s, p),
        }
    }
}

/// Two premises and a conclusion over terms 0 (subject), 1 (middle) and 2
/// (predicate), with whether the argument is valid.
struct Form {
    major: (Quant, usize, usize),
    minor: (Quant, usize, usize),
    conclusion: (Quant, usize, usize),
    valid: bool,
    level: u8,
}

const FORMS: &[Form] = &[
    // Barbara
    Form { major: (Quant::All, 1, 2), minor: (Quant::All, 0, 1), conclusion: (Quant::All, 0, 2), valid: true, level: 1 },
    // Celarent
    Form { major: (Quant::No, 1, 2), minor: (Quant::All, 0, 1), conclusion: (Quant::No, 0, 2), valid: true, level: 1 },
    // Undistributed middle
    Form { major: (Quant::All, 2, 1), minor: (Quant::All, 0, 1), conclusion: (Quant::All, 0, 2), valid: false, level: 1 },
    // Converse of Barbara
    Form { major: (Quant::All, 1, 2), minor: (Quant::All, 0, 1), conclusion: (Quant::All, 2, 0), valid: false, level: 1 },
    // Darii
    Form { major: (Quant::All, 1, 2), minor: (Quant::Some, 0, 1), conclusion: (Quant::Some, 0, 2), valid: true, level: 2 },
    // Ferio
    Form { major: (Quant::No, 1, 2), minor: (Quant::Some, 0, 1), conclusion: (Quant::SomeNot, 0, 2), valid: true, level: 2 },
    // Some-some
    Form { major: (Quant::Some, 1, 2), minor: (Quant::Some, 0, 1), conclusion: (Quant::Some, 0, 2), valid: false, level: 2 },
    // Two negatives
    Form { major: (Quant::No, 1, 2), minor: (Quant::No, 0, 1), conclusion: (Quant::No, 0, 2), valid: false, level: 2 },
    // Camestres
    Form { major: (Quant::All, 2, 1), minor: (Quant::No, 0, 1), conclusion: (Quant::No, 0, 2), valid: true, level: 3 },
    // Baroco
    Form { major: (Quant::All, 2, 1), minor: (Quant::SomeNot, 0, 1), conclusion: (Quant::SomeNot, 0, 2), valid: true, level: 3 },
    // Illicit major
    Form { major: (Quant::All, 1, 2), minor: (Quant::No, 0, 1), conclusion: (Quant::No, 0, 2), valid: false, level: 3 },
    // Illicit minor
    Form { major: (Quant::All, 1, 2), minor: (Quant::All, 1, 0), conclusion: (Quant::All, 0, 2), valid: false, level: 3 },
];

pub struct Syllogisms;

impl QuestionSource for Syllogisms {
    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn question(&self, rng: &mut Mulberry32, difficulty: Difficulty) -> Result<Question, GenError> {
        let forms: Vec<&Form> = FORMS.iter().filter(|f| f.level <= difficulty.level()).collect();
        let form = *rng.pick(&forms)?;
        let terms = rng.sample_unique(&TERMS, 3);
        let statement = |(quant, subject, predicate): (Quant, usize, usize)| Statement {
            quant,
            subject,
            predicate,
        };
        let mut premises = [statement(form.major), statement(form.minor)];
        if rng.chance(0.5) {
            premises.swap(0, 1);
        }
        let prompt = format!(
            "{}. {}. Therefore: {}?",
            premises[0].text(&terms),
            premises[1].text(&terms),
            statement(form.conclusion).text(&terms)
        );
        let answer = if form.valid { VALID } else { INVALID };
        Ok(Question::choice(prompt, vec![VALID.to_string(), INVALID.to_string()], answer))
    }

    fn fallback(&self, _difficulty: Difficulty) -> Question {
        Question::choice(
            "All poets are dreamers. All dreamers are night owls. Therefore: All poets are night owls?",
            vec![VALID.to_string(), INVALID.to_string()],
            VALID,
        )
    }
}
