//! Minesweeper with a deferred board.
//!
//! The puzzle only records dimensions, mine count and seed. Mines are laid on
//! the first reveal, away from the clicked cell and its eight neighbours, so
//! the opening move can never lose.

use crate::games::grid::{all_positions, neighbors8, Pos};
use crate::module::{Category, Difficulty, Evaluation, GameInfo, GameModule, Hint, Violation};
use crate::rng::Mulberry32;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::VecDeque;

static INFO: GameInfo = GameInfo {
    id: "minesweeper",
    title: "Minesweeper",
    category: Category::Grid,
    difficulty_labels: ["8x8", "10x10", "12x12"],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinesweeperPuzzle {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
}

/// Mine layout and derived adjacency counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub mines: Vec<Vec<bool>>,
    pub adjacent: Vec<Vec<u8>>,
}

impl Board {
    /// Lay mines from `seed`, never on `safe` or its neighbours.
    pub fn generate(seed: u32, rows: usize, cols: usize, mines: usize, safe: Pos) -> Self {
        let mut rng = Mulberry32::new(seed);
        let mut excluded = neighbors8(safe, rows, cols);
        excluded.push(safe);
        let mut candidates: Vec<Pos> = all_positions(rows, cols)
            .filter(|p| !excluded.contains(p))
            .collect();
        rng.shuffle(&mut candidates);

        let mut grid = vec![vec![false; cols]; rows];
        for p in candidates.into_iter().take(mines) {
            grid[p.row][p.col] = true;
        }
        let adjacent = (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| {
                        neighbors8(Pos::new(row, col), rows, cols)
                            .into_iter()
                            .filter(|n| grid[n.row][n.col])
                            .count() as u8
                    })
                    .collect()
            })
            .collect();
        Self {
            mines: grid,
            adjacent,
        }
    }

    pub fn is_mine(&self, p: Pos) -> bool {
        self.mines[p.row][p.col]
    }

    pub fn mine_count(&self) -> usize {
        self.mines.iter().flatten().filter(|&&m| m).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinesweeperState {
    pub seed: u32,
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
    pub board: Option<Board>,
    pub revealed: Vec<Vec<bool>>,
    pub flagged: Vec<Vec<bool>>,
    pub exploded: Option<Pos>,
}

impl MinesweeperState {
    fn in_bounds(&self, p: Pos) -> bool {
        p.row < self.rows && p.col < self.cols
    }

    pub fn revealed_safe(&self) -> usize {
        let Some(board) = &self.board else {
            return 0;
        };
        all_positions(self.rows, self.cols)
            .filter(|p| self.revealed[p.row][p.col] && !board.is_mine(*p))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MinesweeperAction {
    Reveal { row: usize, col: usize },
    ToggleFlag { row: usize, col: usize },
}

pub struct Minesweeper;

/// Breadth-first reveal from `start` across zero-adjacency cells.
fn flood_reveal(state: &mut MinesweeperState, board: &Board, start: Pos) {
    let mut queue = VecDeque::from([start]);
    while let Some(p) = queue.pop_front() {
        if state.revealed[p.row][p.col] || state.flagged[p.row][p.col] {
            continue;
        }
        state.revealed[p.row][p.col] = true;
        if board.adjacent[p.row][p.col] != 0 {
            continue;
        }
        for n in neighbors8(p, state.rows, state.cols) {
            if !state.revealed[n.row][n.col] && !board.is_mine(n) {
                queue.push_back(n);
            }
        }
    }
}

impl GameModule for Minesweeper {
    type Puzzle = MinesweeperPuzzle;
    type State = MinesweeperState;
    type Action = MinesweeperAction;

    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> MinesweeperPuzzle {
        let side = difficulty.select([8, 10, 12]);
        let mines = difficulty.select([10, 18, 30]);
        MinesweeperPuzzle {
            seed,
            difficulty,
            rows: side,
            cols: side,
            mines,
        }
    }

    fn initial_state(&self, puzzle: &MinesweeperPuzzle) -> MinesweeperState {
        MinesweeperState {
            seed: puzzle.seed,
            rows: puzzle.rows,
            cols: puzzle.cols,
            mines: puzzle.mines,
            board: None,
            revealed: vec![vec![false; puzzle.cols]; puzzle.rows],
            flagged: vec![vec![false; puzzle.cols]; puzzle.rows],
            exploded: None,
        }
    }

    fn reduce(&self, state: &MinesweeperState, action: &MinesweeperAction) -> MinesweeperState {
        if state.exploded.is_some() {
            return state.clone();
        }
        let mut next = state.clone();
        match *action {
            MinesweeperAction::Reveal { row, col } => {
                let p = Pos::new(row, col);
                if !state.in_bounds(p) || state.revealed[row][col] || state.flagged[row][col] {
                    return next;
                }
                let board = match &state.board {
                    Some(board) => board.clone(),
                    None => Board::generate(state.seed, state.rows, state.cols, state.mines, p),
                };
                if board.is_mine(p) {
                    next.exploded = Some(p);
                    for q in all_positions(state.rows, state.cols) {
                        if board.is_mine(q) {
                            next.revealed[q.row][q.col] = true;
                        }
                    }
                } else {
                    flood_reveal(&mut next, &board, p);
                }
                next.board = Some(board);
            }
            MinesweeperAction::ToggleFlag { row, col } => {
                let p = Pos::new(row, col);
                if state.in_bounds(p) && !state.revealed[row][col] {
                    next.flagged[row][col] = !next.flagged[row][col];
                }
            }
        }
        next
    }

    fn evaluate(&self, puzzle: &MinesweeperPuzzle, state: &MinesweeperState) -> Evaluation {
        if let Some(p) = state.exploded {
            return Evaluation::failed(
                vec![Violation::new("mine", format!("Mine hit at row {}, column {}", p.row + 1, p.col + 1))
                    .with_meta(json!({ "row": p.row, "col": p.col }))],
                0,
            );
        }
        let Some(board) = &state.board else {
            return Evaluation::in_progress(Vec::new());
        };
        let safe_cells = puzzle.rows * puzzle.cols - board.mine_count();
        if state.revealed_safe() == safe_cells {
            Evaluation::solved(50 * puzzle.difficulty.level() as i32)
        } else {
            Evaluation::in_progress(Vec::new())
        }
    }

    fn hint(&self, _puzzle: &MinesweeperPuzzle, state: &MinesweeperState) -> Option<Hint> {
        let board = state.board.as_ref()?;
        if state.exploded.is_some() {
            return None;
        }
        all_positions(state.rows, state.cols)
            .find(|&p| !state.revealed[p.row][p.col] && !state.flagged[p.row][p.col] && !board.is_mine(p))
            .map(|p| {
                Hint::new(format!("Row {}, column {} is safe", p.row + 1, p.col + 1))
                    .with_meta(json!({ "row": p.row, "col": p.col }))
            })
    }
}
