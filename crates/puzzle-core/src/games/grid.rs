//! Shared grid helpers.

use serde::{Deserialize, Serialize};

/// A `(row, col)` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// All positions of a `rows x cols` grid in row-major order.
pub fn all_positions(rows: usize, cols: usize) -> impl Iterator<Item = Pos> {
    (0..rows).flat_map(move |row| (0..cols).map(move |col| Pos::new(row, col)))
}

/// Orthogonal neighbours inside the grid.
pub fn neighbors4(pos: Pos, rows: usize, cols: usize) -> Vec<Pos> {
    let mut out = Vec::with_capacity(4);
    if pos.row > 0 {
        out.push(Pos::new(pos.row - 1, pos.col));
    }
    if pos.row + 1 < rows {
        out.push(Pos::new(pos.row + 1, pos.col));
    }
    if pos.col > 0 {
        out.push(Pos::new(pos.row, pos.col - 1));
    }
    if pos.col + 1 < cols {
        out.push(Pos::new(pos.row, pos.col + 1));
    }
    out
}

/// The up-to-eight surrounding cells inside the grid.
pub fn neighbors8(pos: Pos, rows: usize, cols: usize) -> Vec<Pos> {
    let mut out = Vec::with_capacity(8);
    for dr in -1i64..=1 {
        for dc in -1i64..=1 {
            if dr == 0 && dc == 0 {
                continue;
            }
            let r = pos.row as i64 + dr;
            let c = pos.col as i64 + dc;
            if r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols {
                out.push(Pos::new(r as usize, c as usize));
            }
        }
    }
    out
}

/// Duplicate non-zero values among `values`, each reported once.
pub fn duplicates(values: impl IntoIterator<Item = u8>) -> Vec<u8> {
    let mut seen = [0u32; 256];
    let mut dups = Vec::new();
    for v in values {
        if v == 0 {
            continue;
        }
        seen[v as usize] += 1;
        if seen[v as usize] == 2 {
            dups.push(v);
        }
    }
    dups
}

/// Every permutation of `0..n`, in lexicographic order.
pub fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn go(prefix: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
        if prefix.len() == used.len() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..used.len() {
            if !used[i] {
                used[i] = true;
                prefix.push(i);
                go(prefix, used, out);
                prefix.pop();
                used[i] = false;
            }
        }
    }
    let mut out = Vec::new();
    go(&mut Vec::new(), &mut vec![false; n], &mut out);
    out
}
