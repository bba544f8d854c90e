//! KenKen: a Latin square partitioned into arithmetic cages.

use crate::games::grid::{all_positions, duplicates, neighbors4, Pos};
use crate::module::{Category, Difficulty, Evaluation, GameInfo, GameModule, Hint, Violation};
use crate::rng::Mulberry32;
use serde::{Deserialize, Serialize};
use serde_json::json;

static INFO: GameInfo = GameInfo {
    id: "kenken",
    title: "KenKen",
    category: Category::Grid,
    difficulty_labels: ["4x4", "5x5", "6x6"],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CageOp {
    #[serde(rename = "=")]
    Given,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl CageOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CageOp::Given => "",
            CageOp::Add => "+",
            CageOp::Sub => "-",
            CageOp::Mul => "x",
            CageOp::Div => "/",
        }
    }

    /// Whether `values` meet `target` under this operator.
    pub fn holds(self, target: i64, values: &[i64]) -> bool {
        match (self, values) {
            (CageOp::Given, [v]) => *v == target,
            (CageOp::Add, _) => values.iter().sum::<i64>() == target,
            (CageOp::Mul, _) => values.iter().product::<i64>() == target,
            (CageOp::Sub, [a, b]) => (a - b).abs() == target,
            (CageOp::Div, [a, b]) => {
                let (hi, lo) = if a >= b { (*a, *b) } else { (*b, *a) };
                lo != 0 && hi % lo == 0 && hi / lo == target
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cage {
    pub id: String,
    pub cells: Vec<Pos>,
    pub op: CageOp,
    pub target: i64,
}

impl Cage {
    pub fn label(&self) -> String {
        format!("{}{}", self.target, self.op.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KenKenPuzzle {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub size: usize,
    pub cages: Vec<Cage>,
    pub solution: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KenKenState {
    pub size: usize,
    pub cells: Vec<Vec<u8>>,
    pub notes: Vec<Vec<u16>>,
    /// Printed single-cell cages; read-only.
    #[serde(default)]
    pub fixed: Vec<Vec<bool>>,
    pub selected: Option<Pos>,
}

impl KenKenState {
    pub fn is_fixed(&self, row: usize, col: usize) -> bool {
        self.fixed.get(row).and_then(|r| r.get(col)).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum KenKenAction {
    Select { row: usize, col: usize },
    SetValue { row: usize, col: usize, value: u8 },
    Clear { row: usize, col: usize },
    ToggleNote { row: usize, col: usize, value: u8 },
}

pub struct KenKen;

/// Cyclic Latin square with rows, columns and symbols shuffled.
pub fn latin_square(rng: &mut Mulberry32, n: usize) -> Vec<Vec<u8>> {
    let mut rows: Vec<usize> = (0..n).collect();
    let mut cols: Vec<usize> = (0..n).collect();
    let mut symbols: Vec<u8> = (1..=n as u8).collect();
    rng.shuffle(&mut rows);
    rng.shuffle(&mut cols);
    rng.shuffle(&mut symbols);
    (0..n)
        .map(|r| {
            (0..n)
                .map(|c| symbols[(rows[r] + cols[c]) % n])
                .collect()
        })
        .collect()
}

/// Partition an `n x n` grid into connected regions of at most `max_size` cells.
pub fn grow_regions(rng: &mut Mulberry32, n: usize, max_size: usize) -> Vec<Vec<Pos>> {
    let mut assigned = vec![vec![false; n]; n];
    let mut order: Vec<Pos> = all_positions(n, n).collect();
    rng.shuffle(&mut order);

    let mut regions = Vec::new();
    for start in order {
        if assigned[start.row][start.col] {
            continue;
        }
        let target = rng.rand_int(1, max_size as i64) as usize;
        let mut region = vec![start];
        assigned[start.row][start.col] = true;
        while region.len() < target {
            let mut frontier: Vec<Pos> = region
                .iter()
                .flat_map(|&p| neighbors4(p, n, n))
                .filter(|p| !assigned[p.row][p.col])
                .collect();
            frontier.sort_unstable();
            frontier.dedup();
            let Ok(&next) = rng.pick(&frontier) else {
                break;
            };
            assigned[next.row][next.col] = true;
            region.push(next);
        }
        region.sort_unstable();
        regions.push(region);
    }
    regions
}

fn choose_op(rng: &mut Mulberry32, values: &[i64]) -> (CageOp, i64) {
    match values {
        [v] => (CageOp::Given, *v),
        [a, b] => {
            let op = rng.pick(&[CageOp::Add, CageOp::Sub, CageOp::Mul, CageOp::Div]).copied().unwrap_or(CageOp::Add);
            let (hi, lo) = if a >= b { (*a, *b) } else { (*b, *a) };
            match op {
                CageOp::Add => (op, a + b),
                CageOp::Mul => (op, a * b),
                CageOp::Div if hi % lo == 0 => (op, hi / lo),
                _ => (CageOp::Sub, hi - lo),
            }
        }
        _ => {
            if rng.chance(0.5) {
                (CageOp::Add, values.iter().sum())
            } else {
                (CageOp::Mul, values.iter().product())
            }
        }
    }
}

impl GameModule for KenKen {
    type Puzzle = KenKenPuzzle;
    type State = KenKenState;
    type Action = KenKenAction;

    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> KenKenPuzzle {
        let mut rng = Mulberry32::new(seed);
        let size = difficulty.select([4, 5, 6]);
        let max_cage = difficulty.select([3, 3, 4]);
        let solution = latin_square(&mut rng, size);
        let cages = grow_regions(&mut rng, size, max_cage)
            .into_iter()
            .map(|cells| {
                let values: Vec<i64> = cells
                    .iter()
                    .map(|p| solution[p.row][p.col] as i64)
                    .collect();
                let (op, target) = choose_op(&mut rng, &values);
                Cage {
                    id: rng.make_id("cage"),
                    cells,
                    op,
                    target,
                }
            })
            .collect();
        KenKenPuzzle {
            seed,
            difficulty,
            size,
            cages,
            solution,
        }
    }

    fn initial_state(&self, puzzle: &KenKenPuzzle) -> KenKenState {
        let n = puzzle.size;
        let mut cells = vec![vec![0u8; n]; n];
        let mut fixed = vec![vec![false; n]; n];
        // Single-cell cages are printed as their value.
        for cage in &puzzle.cages {
            if let (CageOp::Given, [p]) = (cage.op, cage.cells.as_slice()) {
                cells[p.row][p.col] = cage.target as u8;
                fixed[p.row][p.col] = true;
            }
        }
        KenKenState {
            size: n,
            cells,
            notes: vec![vec![0u16; n]; n],
            fixed,
            selected: None,
        }
    }

    fn reduce(&self, state: &KenKenState, action: &KenKenAction) -> KenKenState {
        let n = state.size;
        let rows = state.cells.len().min(state.notes.len());
        let in_bounds = |row: usize, col: usize| row < n && col < n && row < rows;
        let editable = |row: usize, col: usize| in_bounds(row, col) && !state.is_fixed(row, col);
        let mut next = state.clone();
        match *action {
            KenKenAction::Select { row, col } => {
                if in_bounds(row, col) {
                    next.selected = Some(Pos::new(row, col));
                }
            }
            KenKenAction::SetValue { row, col, value } => {
                if editable(row, col) && value >= 1 && value as usize <= n {
                    next.cells[row][col] = value;
                    next.notes[row][col] = 0;
                }
            }
            KenKenAction::Clear { row, col } => {
                if editable(row, col) {
                    next.cells[row][col] = 0;
                    next.notes[row][col] = 0;
                }
            }
            KenKenAction::ToggleNote { row, col, value } => {
                if in_bounds(row, col) && value >= 1 && value as usize <= n && next.cells[row][col] == 0 {
                    next.notes[row][col] ^= 1 << value;
                }
            }
        }
        next
    }

    fn evaluate(&self, puzzle: &KenKenPuzzle, state: &KenKenState) -> Evaluation {
        let n = puzzle.size;
        let value_at = |p: Pos| state.cells.get(p.row).and_then(|r| r.get(p.col)).copied().unwrap_or(0);
        let mut errors = Vec::new();

        for row in 0..n {
            for value in duplicates((0..n).map(|col| value_at(Pos::new(row, col)))) {
                errors.push(
                    Violation::new("row", format!("Row {} repeats {}", row + 1, value))
                        .with_meta(json!({ "row": row, "value": value })),
                );
            }
        }
        for col in 0..n {
            for value in duplicates((0..n).map(|row| value_at(Pos::new(row, col)))) {
                errors.push(
                    Violation::new("column", format!("Column {} repeats {}", col + 1, value))
                        .with_meta(json!({ "col": col, "value": value })),
                );
            }
        }
        for cage in &puzzle.cages {
            let values: Vec<i64> = cage.cells.iter().map(|&p| value_at(p) as i64).collect();
            if values.contains(&0) {
                continue;
            }
            if !cage.op.holds(cage.target, &values) {
                errors.push(
                    Violation::new("cage", format!("Cage {} is not satisfied", cage.label()))
                        .with_meta(json!({ "cage": cage.id })),
                );
            }
        }

        let full = all_positions(n, n).all(|p| value_at(p) != 0);
        if full && errors.is_empty() {
            Evaluation::solved(80 * puzzle.difficulty.level() as i32)
        } else {
            Evaluation::in_progress(errors)
        }
    }

    fn hint(&self, puzzle: &KenKenPuzzle, state: &KenKenState) -> Option<Hint> {
        all_positions(puzzle.size, puzzle.size)
            .find(|p| state.cells.get(p.row).and_then(|r| r.get(p.col)) != Some(&puzzle.solution[p.row][p.col]))
            .map(|p| {
                let value = puzzle.solution[p.row][p.col];
                Hint::new(format!("Row {}, column {} is {}", p.row + 1, p.col + 1, value))
                    .with_meta(json!({ "row": p.row, "col": p.col, "value": value }))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Status;

    fn is_latin(grid: &[Vec<u8>]) -> bool {
        let n = grid.len();
        (0..n).all(|i| {
            duplicates(grid[i].iter().copied()).is_empty()
                && duplicates((0..n).map(|r| grid[r][i])).is_empty()
        })
    }

    #[test]
    fn test_latin_square_is_valid() {
        let mut rng = Mulberry32::new(9);
        for n in 3..=7 {
            assert!(is_latin(&latin_square(&mut rng, n)));
        }
    }

    #[test]
    fn test_cages_cover_grid_exactly_once() {
        let puzzle = KenKen.create_puzzle(21, Difficulty::HARD);
        let mut seen = vec![vec![0; puzzle.size]; puzzle.size];
        for cage in &puzzle.cages {
            assert!(!cage.cells.is_empty() && cage.cells.len() <= 4);
            for p in &cage.cells {
                seen[p.row][p.col] += 1;
            }
        }
        assert!(seen.iter().flatten().all(|&c| c == 1));
    }

    #[test]
    fn test_cage_targets_match_solution() {
        for seed in 0..20 {
            let puzzle = KenKen.create_puzzle(seed, Difficulty::MEDIUM);
            for cage in &puzzle.cages {
                let values: Vec<i64> = cage
                    .cells
                    .iter()
                    .map(|p| puzzle.solution[p.row][p.col] as i64)
                    .collect();
                assert!(cage.op.holds(cage.target, &values), "{cage:?}");
                if cage.cells.len() >= 3 {
                    assert!(matches!(cage.op, CageOp::Add | CageOp::Mul));
                }
            }
        }
    }

    #[test]
    fn test_division_falls_back_to_subtraction() {
        let mut rng = Mulberry32::new(0);
        for _ in 0..200 {
            let (op, target) = choose_op(&mut rng, &[3, 2]);
            assert_ne!(op, CageOp::Div);
            assert!(op.holds(target, &[3, 2]));
        }
    }

    #[test]
    fn test_solution_solves_and_wrong_cage_flags() {
        let puzzle = KenKen.create_puzzle(5, Difficulty::EASY);
        let mut state = KenKen.initial_state(&puzzle);
        for p in all_positions(puzzle.size, puzzle.size) {
            let value = puzzle.solution[p.row][p.col];
            state = KenKen.reduce(&state, &KenKenAction::SetValue { row: p.row, col: p.col, value });
        }
        assert_eq!(KenKen.evaluate(&puzzle, &state).status, Status::Solved);

        // Swap two values in a row: the row stays Latin but some check must fail.
        let mut broken = state.clone();
        broken.cells[0].swap(0, 1);
        let eval = KenKen.evaluate(&puzzle, &broken);
        assert_eq!(eval.status, Status::InProgress);
        assert!(!eval.errors.is_empty());
    }

    #[test]
    fn test_value_out_of_range_is_noop() {
        let puzzle = KenKen.create_puzzle(5, Difficulty::EASY);
        let state = KenKen.initial_state(&puzzle);
        let next = KenKen.reduce(&state, &KenKenAction::SetValue { row: 0, col: 0, value: 5 });
        assert_eq!(next, state);
    }

    #[test]
    fn test_given_cells_are_read_only() {
        let puzzle = KenKen.create_puzzle(0, Difficulty::EASY);
        let state = KenKen.initial_state(&puzzle);
        let givens: Vec<Pos> = puzzle
            .cages
            .iter()
            .filter(|c| c.op == CageOp::Given)
            .flat_map(|c| c.cells.iter().copied())
            .collect();
        assert!(!givens.is_empty());
        for p in givens {
            assert!(state.is_fixed(p.row, p.col));
            assert_eq!(state.cells[p.row][p.col], puzzle.solution[p.row][p.col]);
            let cleared = KenKen.reduce(&state, &KenKenAction::Clear { row: p.row, col: p.col });
            assert_eq!(cleared, state);
            let other = puzzle.solution[p.row][p.col] % puzzle.size as u8 + 1;
            let overwritten = KenKen.reduce(&state, &KenKenAction::SetValue { row: p.row, col: p.col, value: other });
            assert_eq!(overwritten, state);
        }
    }
}
