//! Shared engine for question-list drills.
//!
//! A drill family only knows how to write one question; [`Drill`] turns that
//! into a full [`GameModule`] with answer tracking and pass/fail scoring.

use crate::error::GenError;
use crate::module::{Difficulty, Evaluation, GameInfo, GameModule, Violation};
use crate::rng::Mulberry32;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Percentage of correct answers needed to pass.
pub const PASS_PERCENT: usize = 60;
pub const POINTS_PER_CORRECT: i32 = 10;
const MAX_ATTEMPTS: usize = 50;

/// What counts as a right answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Answer {
    /// Text match, ignoring case and whitespace.
    Exact { value: String },
    /// Any number within `tolerance` of `value`.
    Numeric { value: f64, tolerance: f64 },
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl Answer {
    pub fn exact(value: impl ToString) -> Self {
        Answer::Exact {
            value: value.to_string(),
        }
    }

    pub fn number(value: f64) -> Self {
        Answer::Numeric { value, tolerance: 0.0 }
    }

    pub fn accepts(&self, given: &str) -> bool {
        match self {
            Answer::Exact { value } => normalize(value) == normalize(given),
            Answer::Numeric { value, tolerance } => given
                .trim()
                .replace(',', "")
                .parse::<f64>()
                .is_ok_and(|n| (n - value).abs() <= tolerance + 1e-9),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Answer::Exact { value } => value.clone(),
            Answer::Numeric { value, tolerance } if *tolerance > 0.0 => format!("{} (±{})", value, tolerance),
            Answer::Numeric { value, .. } => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    pub answer: Answer,
}

impl Question {
    pub fn open(prompt: impl Into<String>, answer: Answer) -> Self {
        Self {
            prompt: prompt.into(),
            choices: Vec::new(),
            answer,
        }
    }

    /// Multiple choice; `correct` must be one of `choices`.
    pub fn choice(prompt: impl Into<String>, choices: Vec<String>, correct: &str) -> Self {
        Self {
            prompt: prompt.into(),
            choices,
            answer: Answer::exact(correct),
        }
    }
}

/// Writes individual questions for one drill family.
pub trait QuestionSource: Send + Sync {
    fn info(&self) -> &GameInfo;

    fn question(&self, rng: &mut Mulberry32, difficulty: Difficulty) -> Result<Question, GenError>;

    /// Used when `question` keeps failing.
    fn fallback(&self, difficulty: Difficulty) -> Question;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillPuzzle {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillState {
    pub answers: Vec<Option<String>>,
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrillAction {
    Answer { index: usize, value: String },
    Goto { index: usize },
}

pub fn question_count(difficulty: Difficulty) -> usize {
    difficulty.select([5, 8, 10])
}

/// A drill family as a [`GameModule`].
pub struct Drill<Q>(pub Q);

impl<Q: QuestionSource> GameModule for Drill<Q> {
    type Puzzle = DrillPuzzle;
    type State = DrillState;
    type Action = DrillAction;

    fn info(&self) -> &GameInfo {
        self.0.info()
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> DrillPuzzle {
        let mut rng = Mulberry32::new(seed);
        let count = question_count(difficulty);
        let mut questions: Vec<Question> = Vec::with_capacity(count);
        let mut attempts = 0;
        while questions.len() < count && attempts < MAX_ATTEMPTS * count {
            attempts += 1;
            match self.0.question(&mut rng, difficulty) {
                Ok(q) if !questions.iter().any(|seen| seen.prompt == q.prompt) => questions.push(q),
                Ok(_) => {}
                Err(err) => tracing::debug!(game = self.0.info().id, seed, %err, "drill question retry"),
            }
        }
        if questions.len() < count {
            tracing::debug!(game = self.0.info().id, seed, "drill padded with fallback questions");
            questions.resize_with(count, || self.0.fallback(difficulty));
        }
        DrillPuzzle {
            seed,
            difficulty,
            questions,
        }
    }

    fn initial_state(&self, puzzle: &DrillPuzzle) -> DrillState {
        DrillState {
            answers: vec![None; puzzle.questions.len()],
            current: 0,
            total: puzzle.questions.len(),
        }
    }

    fn reduce(&self, state: &DrillState, action: &DrillAction) -> DrillState {
        let mut next = state.clone();
        match action {
            DrillAction::Answer { index, value } => {
                let Some(slot) = next.answers.get_mut(*index) else {
                    return next;
                };
                if slot.is_some() || value.trim().is_empty() {
                    return next;
                }
                *slot = Some(value.trim().to_string());
                let n = next.answers.len();
                if let Some(open) = (1..=n).map(|k| (index + k) % n).find(|&i| next.answers[i].is_none()) {
                    next.current = open;
                }
            }
            DrillAction::Goto { index } => {
                if *index < next.total {
                    next.current = *index;
                }
            }
        }
        next
    }

    fn evaluate(&self, puzzle: &DrillPuzzle, state: &DrillState) -> Evaluation {
        let mut errors = Vec::new();
        let mut correct = 0;
        let mut answered = 0;
        for (index, question) in puzzle.questions.iter().enumerate() {
            let Some(given) = state.answers.get(index).and_then(Option::as_deref) else {
                continue;
            };
            answered += 1;
            if question.answer.accepts(given) {
                correct += 1;
            } else {
                errors.push(
                    Violation::new(
                        "wrong-answer",
                        format!("Question {}: {} is wrong, expected {}", index + 1, given, question.answer.display()),
                    )
                    .with_meta(json!({ "index": index })),
                );
            }
        }
        let total = puzzle.questions.len();
        if answered < total {
            return Evaluation::in_progress(errors);
        }
        let score = POINTS_PER_CORRECT * correct as i32;
        if correct * 100 >= total * PASS_PERCENT {
            Evaluation {
                errors,
                ..Evaluation::solved(score)
            }
        } else {
            Evaluation::failed(errors, score)
        }
    }
}
