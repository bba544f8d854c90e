//! Target number: combine the given numbers with `+ - * /` to hit the target.
//!
//! Expressions are evaluated over exact fractions so `8 / (3 - 8 / 3)` is 24,
//! not 23.999.

use crate::error::GenError;
use crate::module::{Category, Difficulty, Evaluation, GameInfo, GameModule, Hint, Violation};
use crate::rng::Mulberry32;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

static INFO: GameInfo = GameInfo {
    id: "target-number",
    title: "Target Number",
    category: Category::Arithmetic,
    difficulty_labels: ["Make 24", "Four numbers", "Five numbers"],
};

pub const MAX_WRONG: usize = 3;
const MAX_ATTEMPTS: usize = 40;

/// An exact rational, always in lowest terms with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    num: i64,
    den: i64,
}

fn gcd(a: i64, b: i64) -> u64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Fraction {
    /// `None` for a zero denominator or a value that does not fit in `i64`.
    pub fn new(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let g = gcd(num, den).max(1);
        // Only gcd(i64::MIN, i64::MIN) is out of range.
        let g = i64::try_from(g).ok()?;
        let (num, den) = (num / g, den / g);
        if den < 0 {
            Some(Self {
                num: num.checked_neg()?,
                den: den.checked_neg()?,
            })
        } else {
            Some(Self { num, den })
        }
    }

    pub fn whole(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    pub fn as_integer(self) -> Option<i64> {
        (self.den == 1).then_some(self.num)
    }

    fn combine(self, op: Op, rhs: Self) -> Option<Self> {
        let (a, b, c, d) = (self.num, self.den, rhs.num, rhs.den);
        match op {
            Op::Add => Fraction::new(a.checked_mul(d)?.checked_add(c.checked_mul(b)?)?, b.checked_mul(d)?),
            Op::Sub => Fraction::new(a.checked_mul(d)?.checked_sub(c.checked_mul(b)?)?, b.checked_mul(d)?),
            Op::Mul => Fraction::new(a.checked_mul(c)?, b.checked_mul(d)?),
            Op::Div => Fraction::new(a.checked_mul(d)?, b.checked_mul(c)?),
        }
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    const ALL: [Op; 4] = [Op::Add, Op::Sub, Op::Mul, Op::Div];

    fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("unexpected `{0}` at position {1}")]
    Unexpected(char, usize),
    #[error("expression ends early")]
    UnexpectedEnd,
    #[error("division by zero")]
    DivideByZero,
    #[error("number too large")]
    Overflow,
}

/// A parsed expression's value and the literals it used.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub value: Fraction,
    pub numbers: Vec<i64>,
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    numbers: Vec<i64>,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.peek().map(|&(_, c)| c)
    }

    fn apply(lhs: Fraction, op: Op, rhs: Fraction) -> Result<Fraction, ExprError> {
        if op == Op::Div && rhs.num == 0 {
            return Err(ExprError::DivideByZero);
        }
        lhs.combine(op, rhs).ok_or(ExprError::Overflow)
    }

    fn expr(&mut self) -> Result<Fraction, ExprError> {
        let mut value = self.term()?;
        loop {
            let op = match self.peek() {
                Some('+') => Op::Add,
                Some('-') => Op::Sub,
                _ => return Ok(value),
            };
            self.chars.next();
            let rhs = self.term()?;
            value = Self::apply(value, op, rhs)?;
        }
    }

    fn term(&mut self) -> Result<Fraction, ExprError> {
        let mut value = self.factor()?;
        loop {
            let op = match self.peek() {
                Some('*' | 'x' | '×') => Op::Mul,
                Some('/' | '÷') => Op::Div,
                _ => return Ok(value),
            };
            self.chars.next();
            let rhs = self.factor()?;
            value = Self::apply(value, op, rhs)?;
        }
    }

    fn factor(&mut self) -> Result<Fraction, ExprError> {
        self.skip_ws();
        match self.chars.next() {
            Some((_, '(')) => {
                let value = self.expr()?;
                match self.peek() {
                    Some(')') => {
                        self.chars.next();
                        Ok(value)
                    }
                    Some(c) => Err(self.unexpected(c)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some((_, c)) if c.is_ascii_digit() => {
                let mut n = i64::from(c as u8 - b'0');
                while let Some((_, d)) = self.chars.next_if(|(_, d)| d.is_ascii_digit()) {
                    n = n
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(i64::from(d as u8 - b'0')))
                        .ok_or(ExprError::Overflow)?;
                }
                self.numbers.push(n);
                Ok(Fraction::whole(n))
            }
            Some((at, c)) => Err(ExprError::Unexpected(c, at)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn unexpected(&mut self, c: char) -> ExprError {
        let at = self.chars.peek().map_or(0, |&(at, _)| at);
        ExprError::Unexpected(c, at)
    }
}

/// Parse and evaluate an arithmetic expression over non-negative integers.
pub fn parse(input: &str) -> Result<Parsed, ExprError> {
    let mut parser = Parser {
        chars: input.char_indices().peekable(),
        numbers: Vec::new(),
    };
    let value = parser.expr()?;
    if let Some(c) = parser.peek() {
        return Err(parser.unexpected(c));
    }
    Ok(Parsed {
        value,
        numbers: parser.numbers,
    })
}

/// Every value reachable from `numbers` using each exactly once, with one
/// expression per value.
pub fn reachable(numbers: &[i64]) -> BTreeMap<(i64, i64), String> {
    fn go(items: Vec<(Fraction, String)>, out: &mut BTreeMap<(i64, i64), String>) {
        if items.len() == 1 {
            let (value, text) = &items[0];
            out.entry((value.num, value.den)).or_insert_with(|| text.clone());
            return;
        }
        for i in 0..items.len() {
            for j in 0..items.len() {
                if i == j {
                    continue;
                }
                let (a, ta) = &items[i];
                let (b, tb) = &items[j];
                for op in Op::ALL {
                    // + and * commute; only try one order.
                    if matches!(op, Op::Add | Op::Mul) && i > j {
                        continue;
                    }
                    if op == Op::Div && b.num == 0 {
                        continue;
                    }
                    let Some(value) = a.combine(op, *b) else { continue };
                    let mut rest: Vec<(Fraction, String)> = items
                        .iter()
                        .enumerate()
                        .filter(|&(k, _)| k != i && k != j)
                        .map(|(_, item)| item.clone())
                        .collect();
                    rest.push((value, format!("({} {} {})", ta, op.symbol(), tb)));
                    go(rest, out);
                }
            }
        }
    }
    let mut out = BTreeMap::new();
    let items = numbers.iter().map(|&n| (Fraction::whole(n), n.to_string())).collect();
    go(items, &mut out);
    out
}

/// One expression that makes `target`, if any.
pub fn solve(numbers: &[i64], target: i64) -> Option<String> {
    reachable(numbers).remove(&(target, 1)).map(|text| strip_outer(&text))
}

fn strip_outer(text: &str) -> String {
    text.strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text)
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetNumberPuzzle {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub numbers: Vec<i64>,
    pub target: i64,
    pub solution: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetNumberState {
    pub draft: String,
    pub submissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TargetNumberAction {
    Edit { text: String },
    Submit,
}

/// Why a submission missed.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Correct,
    Invalid(ExprError),
    WrongNumbers,
    WrongValue(Fraction),
}

pub fn judge(puzzle: &TargetNumberPuzzle, expression: &str) -> Verdict {
    let parsed = match parse(expression) {
        Ok(parsed) => parsed,
        Err(err) => return Verdict::Invalid(err),
    };
    let mut used = parsed.numbers;
    let mut given = puzzle.numbers.clone();
    used.sort_unstable();
    given.sort_unstable();
    if used != given {
        Verdict::WrongNumbers
    } else if parsed.value != Fraction::whole(puzzle.target) {
        Verdict::WrongValue(parsed.value)
    } else {
        Verdict::Correct
    }
}

pub struct TargetNumber;

fn try_puzzle(rng: &mut Mulberry32, difficulty: Difficulty) -> Result<(Vec<i64>, i64, String), GenError> {
    let count = difficulty.select([4, 4, 5]);
    let max = difficulty.select([9, 13, 13]);
    let numbers: Vec<i64> = (0..count).map(|_| rng.rand_int(1, max)).collect();
    if difficulty == Difficulty::EASY {
        let solution = solve(&numbers, 24).ok_or(GenError::Unsatisfied("24 unreachable"))?;
        return Ok((numbers, 24, solution));
    }
    let (lo, hi) = difficulty.select([(24, 24), (10, 60), (40, 150)]);
    let targets: Vec<(i64, String)> = reachable(&numbers)
        .into_iter()
        .filter(|&((num, den), _)| den == 1 && (lo..=hi).contains(&num))
        .map(|((num, _), text)| (num, strip_outer(&text)))
        .collect();
    let (target, solution) = rng.pick(&targets)?.clone();
    Ok((numbers, target, solution))
}

impl GameModule for TargetNumber {
    type Puzzle = TargetNumberPuzzle;
    type State = TargetNumberState;
    type Action = TargetNumberAction;

    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> TargetNumberPuzzle {
        let mut rng = Mulberry32::new(seed);
        for attempt in 0..MAX_ATTEMPTS {
            match try_puzzle(&mut rng, difficulty) {
                Ok((numbers, target, solution)) => {
                    return TargetNumberPuzzle {
                        seed,
                        difficulty,
                        numbers,
                        target,
                        solution,
                    }
                }
                Err(err) => tracing::debug!(seed, attempt, %err, "target number retry"),
            }
        }
        tracing::debug!(seed, "target number falling back to 1 2 3 4");
        TargetNumberPuzzle {
            seed,
            difficulty,
            numbers: vec![1, 2, 3, 4],
            target: 24,
            solution: "1 * 2 * 3 * 4".to_string(),
        }
    }

    fn initial_state(&self, _puzzle: &TargetNumberPuzzle) -> TargetNumberState {
        TargetNumberState::default()
    }

    fn reduce(&self, state: &TargetNumberState, action: &TargetNumberAction) -> TargetNumberState {
        let mut next = state.clone();
        match action {
            TargetNumberAction::Edit { text } => next.draft = text.clone(),
            TargetNumberAction::Submit => {
                let draft = next.draft.trim().to_string();
                if !draft.is_empty() {
                    next.submissions.push(draft);
                    next.draft.clear();
                }
            }
        }
        next
    }

    fn evaluate(&self, puzzle: &TargetNumberPuzzle, state: &TargetNumberState) -> Evaluation {
        let mut errors = Vec::new();
        for (index, expression) in state.submissions.iter().enumerate() {
            let error = match judge(puzzle, expression) {
                Verdict::Correct => {
                    let penalty = 5 * errors.len() as i32;
                    return Evaluation::solved((30 * puzzle.difficulty.level() as i32 - penalty).max(5));
                }
                Verdict::Invalid(err) => Violation::new("parse", format!("Could not read `{}`: {}", expression, err)),
                Verdict::WrongNumbers => Violation::new(
                    "numbers",
                    format!("`{}` must use each of the given numbers exactly once", expression),
                ),
                Verdict::WrongValue(value) => Violation::new(
                    "wrong-value",
                    format!("`{}` makes {}, not {}", expression, value, puzzle.target),
                ),
            };
            errors.push(error.with_meta(json!({ "submission": index })));
            if errors.len() >= MAX_WRONG {
                return Evaluation::failed(errors, 0);
            }
        }
        Evaluation::in_progress(errors)
    }

    fn hint(&self, puzzle: &TargetNumberPuzzle, _state: &TargetNumberState) -> Option<Hint> {
        Some(Hint::new(format!("One way: {} = {}", puzzle.solution, puzzle.target)).with_meta(json!({
            "expression": puzzle.solution,
        })))
    }
}
