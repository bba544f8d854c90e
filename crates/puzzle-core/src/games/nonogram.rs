//! Nonogram: paint the grid from run-length clues.

use crate::module::{Category, Difficulty, Evaluation, GameInfo, GameModule, Hint, Violation};
use crate::rng::Mulberry32;
use serde::{Deserialize, Serialize};
use serde_json::json;

static INFO: GameInfo = GameInfo {
    id: "nonogram",
    title: "Nonogram",
    category: Category::Grid,
    difficulty_labels: ["5x5", "7x7", "10x10"],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonogramPuzzle {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub size: usize,
    pub solution: Vec<Vec<bool>>,
    pub row_clues: Vec<Vec<usize>>,
    pub col_clues: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mark {
    #[default]
    Empty,
    Filled,
    Crossed,
}

impl Mark {
    fn cycle(self) -> Self {
        match self {
            Mark::Empty => Mark::Filled,
            Mark::Filled => Mark::Crossed,
            Mark::Crossed => Mark::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonogramState {
    pub marks: Vec<Vec<Mark>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NonogramAction {
    Cycle { row: usize, col: usize },
    SetMark { row: usize, col: usize, mark: Mark },
    Clear,
}

pub struct Nonogram;

/// Lengths of consecutive `true` runs. An empty line is `[0]`.
pub fn line_clue(line: impl IntoIterator<Item = bool>) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut current = 0;
    for filled in line {
        if filled {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    if runs.is_empty() {
        runs.push(0);
    }
    runs
}

impl GameModule for Nonogram {
    type Puzzle = NonogramPuzzle;
    type State = NonogramState;
    type Action = NonogramAction;

    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> NonogramPuzzle {
        let mut rng = Mulberry32::new(seed);
        let size = difficulty.select([5, 7, 10]);
        let mut solution: Vec<Vec<bool>> = (0..size)
            .map(|_| (0..size).map(|_| rng.chance(0.55)).collect())
            .collect();
        if solution.iter().flatten().all(|&on| !on) {
            let (r, c) = (rng.index(size), rng.index(size));
            solution[r][c] = true;
        }
        let row_clues = solution.iter().map(|row| line_clue(row.iter().copied())).collect();
        let col_clues = (0..size)
            .map(|c| line_clue(solution.iter().map(|row| row[c])))
            .collect();
        NonogramPuzzle {
            seed,
            difficulty,
            size,
            solution,
            row_clues,
            col_clues,
        }
    }

    fn initial_state(&self, puzzle: &NonogramPuzzle) -> NonogramState {
        NonogramState {
            marks: vec![vec![Mark::Empty; puzzle.size]; puzzle.size],
        }
    }

    fn reduce(&self, state: &NonogramState, action: &NonogramAction) -> NonogramState {
        let mut next = state.clone();
        match *action {
            NonogramAction::Cycle { row, col } => {
                if let Some(cell) = next.marks.get_mut(row).and_then(|r| r.get_mut(col)) {
                    *cell = cell.cycle();
                }
            }
            NonogramAction::SetMark { row, col, mark } => {
                if let Some(cell) = next.marks.get_mut(row).and_then(|r| r.get_mut(col)) {
                    *cell = mark;
                }
            }
            NonogramAction::Clear => {
                for cell in next.marks.iter_mut().flatten() {
                    *cell = Mark::Empty;
                }
            }
        }
        next
    }

    fn evaluate(&self, puzzle: &NonogramPuzzle, state: &NonogramState) -> Evaluation {
        let filled = |r: usize, c: usize| {
            state.marks.get(r).and_then(|row| row.get(c)).copied() == Some(Mark::Filled)
        };
        let n = puzzle.size;
        let mut errors = Vec::new();

        // A line that already paints more cells than its clue allows is wrong.
        for r in 0..n {
            let painted = (0..n).filter(|&c| filled(r, c)).count();
            if painted > puzzle.row_clues[r].iter().sum() {
                errors.push(
                    Violation::new("row", format!("Row {} has too many filled cells", r + 1))
                        .with_meta(json!({ "row": r })),
                );
            }
        }
        for c in 0..n {
            let painted = (0..n).filter(|&r| filled(r, c)).count();
            if painted > puzzle.col_clues[c].iter().sum() {
                errors.push(
                    Violation::new("column", format!("Column {} has too many filled cells", c + 1))
                        .with_meta(json!({ "col": c })),
                );
            }
        }

        let mismatches = (0..n)
            .flat_map(|r| (0..n).map(move |c| (r, c)))
            .filter(|&(r, c)| filled(r, c) != puzzle.solution[r][c])
            .count();
        if mismatches == 0 {
            Evaluation::solved(40 * puzzle.difficulty.level() as i32)
        } else {
            Evaluation::in_progress(errors)
        }
    }

    fn hint(&self, puzzle: &NonogramPuzzle, state: &NonogramState) -> Option<Hint> {
        for (r, row) in puzzle.solution.iter().enumerate() {
            for (c, &want) in row.iter().enumerate() {
                let mark = state.marks.get(r).and_then(|m| m.get(c)).copied().unwrap_or_default();
                let wrong = match mark {
                    Mark::Filled => !want,
                    Mark::Crossed => want,
                    Mark::Empty => want,
                };
                if wrong {
                    let text = if want { "filled" } else { "empty" };
                    return Some(
                        Hint::new(format!("Row {}, column {} should be {}", r + 1, c + 1, text))
                            .with_meta(json!({ "row": r, "col": c, "filled": want })),
                    );
                }
            }
        }
        None
    }
}
