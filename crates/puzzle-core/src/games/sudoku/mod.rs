//! Classic 9x9 Sudoku.
//!
//! The generator fills a grid by randomized backtracking and then digs digits
//! out one at a time, keeping a removal only while the board still has a
//! single completion. Difficulty only changes how many digits are dug.

mod generator;
pub mod solver;

pub use generator::{fallback_solution, Generator, GeneratorConfig};
pub use solver::Board;

use crate::games::grid::{duplicates, Pos};
use crate::module::{Category, Difficulty, Evaluation, GameInfo, GameModule, Hint, Violation};
use serde::{Deserialize, Serialize};
use serde_json::json;

static INFO: GameInfo = GameInfo {
    id: "sudoku",
    title: "Sudoku",
    category: Category::Grid,
    difficulty_labels: ["Easy", "Medium", "Hard"],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SudokuPuzzle {
    pub seed: u32,
    pub difficulty: Difficulty,
    /// Clues, `0` where the player fills in.
    pub givens: Board,
    pub solution: Board,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudokuCell {
    pub value: u8,
    pub fixed: bool,
    /// Pencil marks, bit `d` for digit `d`.
    pub notes: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SudokuState {
    pub cells: [[SudokuCell; 9]; 9],
    pub selected: Option<Pos>,
}

impl SudokuState {
    pub fn values(&self) -> Board {
        let mut board = [[0u8; 9]; 9];
        for (row, line) in self.cells.iter().enumerate() {
            for (col, cell) in line.iter().enumerate() {
                board[row][col] = cell.value;
            }
        }
        board
    }

    pub fn fixed_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.fixed).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SudokuAction {
    Select { row: usize, col: usize },
    SetValue { row: usize, col: usize, value: u8 },
    Clear { row: usize, col: usize },
    ToggleNote { row: usize, col: usize, value: u8 },
}

pub struct Sudoku;

impl GameModule for Sudoku {
    type Puzzle = SudokuPuzzle;
    type State = SudokuState;
    type Action = SudokuAction;

    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> SudokuPuzzle {
        let (givens, solution) = Generator::with_seed(seed, difficulty).generate();
        SudokuPuzzle {
            seed,
            difficulty,
            givens,
            solution,
        }
    }

    fn initial_state(&self, puzzle: &SudokuPuzzle) -> SudokuState {
        let mut cells = [[SudokuCell::default(); 9]; 9];
        for (row, line) in puzzle.givens.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                cells[row][col] = SudokuCell {
                    value,
                    fixed: value != 0,
                    notes: 0,
                };
            }
        }
        SudokuState {
            cells,
            selected: None,
        }
    }

    fn reduce(&self, state: &SudokuState, action: &SudokuAction) -> SudokuState {
        let mut next = state.clone();
        match *action {
            SudokuAction::Select { row, col } => {
                if row < 9 && col < 9 {
                    next.selected = Some(Pos::new(row, col));
                }
            }
            SudokuAction::SetValue { row, col, value } => {
                if row >= 9 || col >= 9 || !(1..=9).contains(&value) {
                    return next;
                }
                let cell = &mut next.cells[row][col];
                if !cell.fixed {
                    cell.value = value;
                    cell.notes = 0;
                }
            }
            SudokuAction::Clear { row, col } => {
                if row < 9 && col < 9 && !next.cells[row][col].fixed {
                    next.cells[row][col].value = 0;
                    next.cells[row][col].notes = 0;
                }
            }
            SudokuAction::ToggleNote { row, col, value } => {
                if row >= 9 || col >= 9 || !(1..=9).contains(&value) {
                    return next;
                }
                let cell = &mut next.cells[row][col];
                if !cell.fixed && cell.value == 0 {
                    cell.notes ^= 1 << value;
                }
            }
        }
        next
    }

    fn evaluate(&self, puzzle: &SudokuPuzzle, state: &SudokuState) -> Evaluation {
        let board = state.values();
        let errors = conflicts(&board);
        let full = board.iter().flatten().all(|&v| v != 0);
        if full && errors.is_empty() {
            Evaluation::solved(100 * puzzle.difficulty.level() as i32)
        } else {
            Evaluation::in_progress(errors)
        }
    }

    fn hint(&self, puzzle: &SudokuPuzzle, state: &SudokuState) -> Option<Hint> {
        for row in 0..9 {
            for col in 0..9 {
                let want = puzzle.solution[row][col];
                if state.cells[row][col].value != want {
                    return Some(
                        Hint::new(format!("Row {}, column {} is {}", row + 1, col + 1, want))
                            .with_meta(json!({ "row": row, "col": col, "value": want })),
                    );
                }
            }
        }
        None
    }
}

/// Row, column and box duplicates on the current board.
pub fn conflicts(board: &Board) -> Vec<Violation> {
    let mut errors = Vec::new();
    for row in 0..9 {
        for value in duplicates(board[row]) {
            errors.push(
                Violation::new("row", format!("Row {} repeats {}", row + 1, value))
                    .with_meta(json!({ "row": row, "value": value })),
            );
        }
    }
    for col in 0..9 {
        for value in duplicates((0..9).map(|row| board[row][col])) {
            errors.push(
                Violation::new("column", format!("Column {} repeats {}", col + 1, value))
                    .with_meta(json!({ "col": col, "value": value })),
            );
        }
    }
    for block in 0..9 {
        let (br, bc) = (block / 3 * 3, block % 3 * 3);
        let cells = (0..9).map(|i| board[br + i / 3][bc + i % 3]);
        for value in duplicates(cells) {
            errors.push(
                Violation::new("box", format!("Box {} repeats {}", block + 1, value))
                    .with_meta(json!({ "box": block, "value": value })),
            );
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Action, Status};

    fn solve_state(puzzle: &SudokuPuzzle, mut state: SudokuState) -> SudokuState {
        for row in 0..9 {
            for col in 0..9 {
                let value = puzzle.solution[row][col];
                state = Sudoku.reduce(&state, &SudokuAction::SetValue { row, col, value });
            }
        }
        state
    }

    #[test]
    fn test_seed_one_easy_scenario() {
        let puzzle = Sudoku.create_puzzle(1, Difficulty::EASY);
        let state = Sudoku.initial_state(&puzzle);
        assert_eq!(state.fixed_count(), 81 - GeneratorConfig::easy().removals);
        assert!(solver::has_unique_solution(&puzzle.givens));
    }

    #[test]
    fn test_fixed_cells_are_read_only() {
        let puzzle = Sudoku.create_puzzle(3, Difficulty::EASY);
        let state = Sudoku.initial_state(&puzzle);
        let pos = crate::games::grid::all_positions(9, 9)
            .find(|p| puzzle.givens[p.row][p.col] != 0)
            .unwrap();
        let other = puzzle.givens[pos.row][pos.col] % 9 + 1;
        let next = Sudoku.reduce(
            &state,
            &SudokuAction::SetValue { row: pos.row, col: pos.col, value: other },
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_out_of_range_value_is_noop() {
        let puzzle = Sudoku.create_puzzle(3, Difficulty::EASY);
        let state = Sudoku.initial_state(&puzzle);
        let next = Sudoku.reduce(&state, &SudokuAction::SetValue { row: 0, col: 0, value: 10 });
        assert_eq!(next, state);
        let next = Sudoku.reduce(&state, &SudokuAction::Select { row: 9, col: 0 });
        assert_eq!(next, state);
    }

    #[test]
    fn test_duplicate_flags_row_column_box() {
        let puzzle = Sudoku.create_puzzle(8, Difficulty::EASY);
        let state = Sudoku.initial_state(&puzzle);
        // Find an empty cell and copy a given from its row into it.
        let (row, col) = (0..9)
            .flat_map(|r| (0..9).map(move |c| (r, c)))
            .find(|&(r, c)| {
                puzzle.givens[r][c] == 0 && puzzle.givens[r].iter().any(|&v| v != 0)
            })
            .unwrap();
        let value = *puzzle.givens[row].iter().find(|&&v| v != 0).unwrap();
        let next = Sudoku.reduce(&state, &SudokuAction::SetValue { row, col, value });
        let eval = Sudoku.evaluate(&puzzle, &next);
        assert_eq!(eval.status, Status::InProgress);
        assert!(eval.errors.iter().any(|e| e.kind == "row"));
    }

    #[test]
    fn test_filling_solution_solves() {
        let puzzle = Sudoku.create_puzzle(11, Difficulty::EASY);
        let state = solve_state(&puzzle, Sudoku.initial_state(&puzzle));
        let eval = Sudoku.evaluate(&puzzle, &state);
        assert_eq!(eval.status, Status::Solved);
        assert_eq!(eval.score_delta, 100);
        assert!(Sudoku.hint(&puzzle, &state).is_none());
    }

    #[test]
    fn test_notes_toggle_and_clear_on_set() {
        let puzzle = Sudoku.create_puzzle(4, Difficulty::EASY);
        let state = Sudoku.initial_state(&puzzle);
        let pos = crate::games::grid::all_positions(9, 9)
            .find(|p| puzzle.givens[p.row][p.col] == 0)
            .unwrap();
        let (row, col) = (pos.row, pos.col);
        let s1 = Sudoku.reduce(&state, &SudokuAction::ToggleNote { row, col, value: 3 });
        assert_eq!(s1.cells[row][col].notes, 1 << 3);
        let s2 = Sudoku.reduce(&s1, &SudokuAction::SetValue { row, col, value: 4 });
        assert_eq!(s2.cells[row][col].notes, 0);
        assert_eq!(s2.cells[row][col].value, 4);
        let s3 = Sudoku.reduce(&s2, &SudokuAction::Clear { row, col });
        assert_eq!(s3.cells[row][col].value, 0);
    }

    #[test]
    fn test_reset_replaces_state() {
        let puzzle = Sudoku.create_puzzle(4, Difficulty::EASY);
        let fresh = Sudoku.initial_state(&puzzle);
        let played = solve_state(&puzzle, fresh.clone());
        assert_eq!(Sudoku.dispatch(&played, Action::Reset(fresh.clone())), fresh);
    }

    #[test]
    fn test_hint_points_at_solution() {
        let puzzle = Sudoku.create_puzzle(5, Difficulty::EASY);
        let state = Sudoku.initial_state(&puzzle);
        let hint = Sudoku.hint(&puzzle, &state).unwrap();
        let meta = hint.meta.unwrap();
        let (row, col) = (meta["row"].as_u64().unwrap() as usize, meta["col"].as_u64().unwrap() as usize);
        assert_eq!(meta["value"].as_u64().unwrap() as u8, puzzle.solution[row][col]);
    }
}
