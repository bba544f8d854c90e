//! Backtracking over a 9x9 board.
//!
//! Cells hold `0` for empty or a digit `1..=9`. Candidate sets are `u16`
//! bitmasks with bit `d` set when digit `d` is still allowed.

use crate::error::GenError;
use crate::rng::Mulberry32;

pub type Board = [[u8; 9]; 9];

const ALL_DIGITS: u16 = 0b11_1111_1110;

/// Digits allowed at `(row, col)` given the rest of the board.
pub fn candidates(board: &Board, row: usize, col: usize) -> u16 {
    let mut used = 0u16;
    for i in 0..9 {
        used |= 1 << board[row][i];
        used |= 1 << board[i][col];
    }
    let (br, bc) = (row / 3 * 3, col / 3 * 3);
    for r in br..br + 3 {
        for c in bc..bc + 3 {
            used |= 1 << board[r][c];
        }
    }
    ALL_DIGITS & !used
}

/// Whether the filled cells break no row, column or box rule.
pub fn is_consistent(board: &Board) -> bool {
    let mut work = *board;
    for row in 0..9 {
        for col in 0..9 {
            let v = work[row][col];
            if v == 0 {
                continue;
            }
            work[row][col] = 0;
            let ok = candidates(&work, row, col) & (1 << v) != 0;
            work[row][col] = v;
            if !ok {
                return false;
            }
        }
    }
    true
}

/// Count completions, stopping as soon as `limit` is reached.
pub fn count_solutions(board: &Board, limit: usize) -> usize {
    if !is_consistent(board) {
        return 0;
    }
    let mut work = *board;
    let mut count = 0;
    count_recursive(&mut work, &mut count, limit);
    count
}

/// Whether exactly one completion exists.
pub fn has_unique_solution(board: &Board) -> bool {
    count_solutions(board, 2) == 1
}

/// First completion found, if any.
pub fn solve(board: &Board) -> Option<Board> {
    if !is_consistent(board) {
        return None;
    }
    let mut work = *board;
    if solve_recursive(&mut work) {
        Some(work)
    } else {
        None
    }
}

/// Fill an empty board by randomized backtracking: each cell tries the
/// digits in a freshly shuffled order. Gives up after `budget` placements.
pub fn fill_random(rng: &mut Mulberry32, budget: usize) -> Result<Board, GenError> {
    let mut board = [[0u8; 9]; 9];
    let mut steps = 0;
    if fill_recursive(&mut board, 0, rng, &mut steps, budget) {
        Ok(board)
    } else {
        Err(GenError::Exhausted)
    }
}

/// Most constrained empty cell, or `None` when the board is full.
/// A cell with no candidates is returned with an empty mask.
fn most_constrained(board: &Board) -> Option<(usize, usize, u16)> {
    let mut best: Option<(usize, usize, u16)> = None;
    for row in 0..9 {
        for col in 0..9 {
            if board[row][col] != 0 {
                continue;
            }
            let mask = candidates(board, row, col);
            let n = mask.count_ones();
            if n == 0 {
                return Some((row, col, 0));
            }
            if best.is_none_or(|(_, _, m)| n < m.count_ones()) {
                best = Some((row, col, mask));
            }
        }
    }
    best
}

fn count_recursive(board: &mut Board, count: &mut usize, limit: usize) {
    if *count >= limit {
        return;
    }
    let Some((row, col, mask)) = most_constrained(board) else {
        *count += 1;
        return;
    };
    for digit in 1..=9u8 {
        if mask & (1 << digit) == 0 {
            continue;
        }
        board[row][col] = digit;
        count_recursive(board, count, limit);
        board[row][col] = 0;
        if *count >= limit {
            return;
        }
    }
}

fn solve_recursive(board: &mut Board) -> bool {
    let Some((row, col, mask)) = most_constrained(board) else {
        return true;
    };
    for digit in 1..=9u8 {
        if mask & (1 << digit) == 0 {
            continue;
        }
        board[row][col] = digit;
        if solve_recursive(board) {
            return true;
        }
        board[row][col] = 0;
    }
    false
}

fn fill_recursive(
    board: &mut Board,
    index: usize,
    rng: &mut Mulberry32,
    steps: &mut usize,
    budget: usize,
) -> bool {
    if index == 81 {
        return true;
    }
    let (row, col) = (index / 9, index % 9);
    let mut digits: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];
    rng.shuffle(&mut digits);
    let allowed = candidates(board, row, col);
    for digit in digits {
        *steps += 1;
        if *steps > budget {
            return false;
        }
        if allowed & (1 << digit) == 0 {
            continue;
        }
        board[row][col] = digit;
        if fill_recursive(board, index + 1, rng, steps, budget) {
            return true;
        }
        board[row][col] = 0;
    }
    false
}
