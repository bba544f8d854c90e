//! Logic grid: match each row item to one column item from textual clues.

use super::grid::permutations;
use crate::error::GenError;
use crate::module::{Category, Difficulty, Evaluation, GameInfo, GameModule, Hint, Violation};
use crate::rng::Mulberry32;
use serde::{Deserialize, Serialize};
use serde_json::json;

static INFO: GameInfo = GameInfo {
    id: "logic-grid",
    title: "Logic Grid",
    category: Category::Grid,
    difficulty_labels: ["3 pairs", "4 pairs", "5 pairs"],
};

const POOLS: &[(&str, &[&str])] = &[
    ("student", &["Asha", "Ben", "Chloe", "Dev", "Ema", "Farid"]),
    ("subject", &["Physics", "Chemistry", "Biology", "History", "Economics", "Literature"]),
    ("colour", &["red", "blue", "green", "yellow", "purple", "orange"]),
    ("city", &["Pune", "Leeds", "Osaka", "Quito", "Lagos", "Perth"]),
    ("day", &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]),
];

const MAX_CLUE_ATTEMPTS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClueKind {
    /// Row `row` pairs with column `col`.
    Is { row: usize, col: usize },
    /// Row `row` pairs with none of `cols`.
    IsNot { row: usize, cols: Vec<usize> },
    /// Column `col` does not belong to row `row`.
    ColumnNot { col: usize, row: usize },
    /// Row `first`'s partner is listed before row `second`'s.
    Before { first: usize, second: usize },
}

impl ClueKind {
    /// Whether a full assignment `perm` (row -> column) satisfies this clue.
    pub fn holds(&self, perm: &[usize]) -> bool {
        match self {
            ClueKind::Is { row, col } => perm[*row] == *col,
            ClueKind::IsNot { row, cols } => !cols.contains(&perm[*row]),
            ClueKind::ColumnNot { col, row } => perm[*row] != *col,
            ClueKind::Before { first, second } => perm[*first] < perm[*second],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    #[serde(flatten)]
    pub kind: ClueKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicGridPuzzle {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub row_category: String,
    pub col_category: String,
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub clues: Vec<Clue>,
    /// Row index -> column index.
    pub solution: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mark {
    #[default]
    Unknown,
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicGridState {
    pub marks: Vec<Vec<Mark>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LogicGridAction {
    SetMark { row: usize, col: usize, mark: Mark },
    Cycle { row: usize, col: usize },
    Clear,
}

pub struct LogicGrid;

/// Number of assignments consistent with every clue.
pub fn count_consistent(clues: &[Clue], n: usize) -> usize {
    permutations(n)
        .iter()
        .filter(|perm| clues.iter().all(|c| c.kind.holds(perm)))
        .count()
}

struct ClueWriter<'a> {
    col_cat: &'a str,
    rows: &'a [String],
    cols: &'a [String],
}

impl ClueWriter<'_> {
    fn text(&self, kind: &ClueKind) -> String {
        match kind {
            ClueKind::Is { row, col } => {
                format!("{}'s {} is {}.", self.rows[*row], self.col_cat, self.cols[*col])
            }
            ClueKind::IsNot { row, cols } => {
                let names: Vec<&str> = cols.iter().map(|&c| self.cols[c].as_str()).collect();
                format!("{}'s {} is not {}.", self.rows[*row], self.col_cat, names.join(" or "))
            }
            ClueKind::ColumnNot { col, row } => {
                format!("The {} {} does not belong to {}.", self.col_cat, self.cols[*col], self.rows[*row])
            }
            ClueKind::Before { first, second } => format!(
                "{}'s {} comes earlier in the list than {}'s.",
                self.rows[*first], self.col_cat, self.rows[*second]
            ),
        }
    }

    fn clue(&self, kind: ClueKind) -> Clue {
        let text = self.text(&kind);
        Clue { kind, text }
    }
}

fn random_clue(rng: &mut Mulberry32, solution: &[usize]) -> Result<ClueKind, GenError> {
    let n = solution.len();
    let rows: Vec<usize> = (0..n).collect();
    match rng.index(3) {
        0 => {
            let row = *rng.pick(&rows)?;
            let wrong: Vec<usize> = (0..n).filter(|&c| c != solution[row]).collect();
            let take = rng.rand_int(1, 2) as usize;
            let mut cols = rng.sample_unique(&wrong, take);
            cols.sort_unstable();
            Ok(ClueKind::IsNot { row, cols })
        }
        1 => {
            let row = *rng.pick(&rows)?;
            let wrong: Vec<usize> = (0..n).filter(|&c| c != solution[row]).collect();
            let col = *rng.pick(&wrong)?;
            Ok(ClueKind::ColumnNot { col, row })
        }
        _ => {
            let pair = rng.sample_unique(&rows, 2);
            let (a, b) = match pair.as_slice() {
                [a, b] => (*a, *b),
                _ => return Err(GenError::Unsatisfied("need two rows for a comparison")),
            };
            let (first, second) = if solution[a] < solution[b] { (a, b) } else { (b, a) };
            Ok(ClueKind::Before { first, second })
        }
    }
}

impl GameModule for LogicGrid {
    type Puzzle = LogicGridPuzzle;
    type State = LogicGridState;
    type Action = LogicGridAction;

    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> LogicGridPuzzle {
        let mut rng = Mulberry32::new(seed);
        let n = difficulty.select([3, 4, 5]);
        let target = n + difficulty.select([2, 3, 4]);

        let pools = rng.sample_unique(POOLS, 2);
        let (row_cat, row_pool) = pools[0];
        let (col_cat, col_pool) = pools[1];
        let rows: Vec<String> = rng.sample_unique(row_pool, n).into_iter().map(String::from).collect();
        let cols: Vec<String> = col_pool[..n].iter().map(|s| s.to_string()).collect();
        let solution: Vec<usize> = rng.shuffled(&(0..n).collect::<Vec<_>>());

        let writer = ClueWriter {
            col_cat,
            rows: &rows,
            cols: &cols,
        };
        let first = rng.index(n);
        let mut clues = vec![writer.clue(ClueKind::Is {
            row: first,
            col: solution[first],
        })];

        for _ in 0..MAX_CLUE_ATTEMPTS {
            if clues.len() >= target && count_consistent(&clues, n) == 1 {
                break;
            }
            let Ok(kind) = random_clue(&mut rng, &solution) else {
                continue;
            };
            let clue = writer.clue(kind);
            if !clues.iter().any(|c| c.text == clue.text) {
                clues.push(clue);
            }
        }
        // Pin rows directly until the answer is forced.
        for row in 0..n {
            if count_consistent(&clues, n) == 1 {
                break;
            }
            let clue = writer.clue(ClueKind::Is {
                row,
                col: solution[row],
            });
            if !clues.iter().any(|c| c.text == clue.text) {
                tracing::debug!(seed, row, "logic grid needed an extra direct clue");
                clues.push(clue);
            }
        }

        LogicGridPuzzle {
            seed,
            difficulty,
            row_category: row_cat.to_string(),
            col_category: col_cat.to_string(),
            rows,
            cols,
            clues,
            solution,
        }
    }

    fn initial_state(&self, puzzle: &LogicGridPuzzle) -> LogicGridState {
        LogicGridState {
            marks: vec![vec![Mark::Unknown; puzzle.cols.len()]; puzzle.rows.len()],
        }
    }

    fn reduce(&self, state: &LogicGridState, action: &LogicGridAction) -> LogicGridState {
        let rows = state.marks.len();
        let cols = state.marks.first().map_or(0, Vec::len);
        let mut next = state.clone();
        let (row, col, mark) = match *action {
            LogicGridAction::Clear => {
                for cell in next.marks.iter_mut().flatten() {
                    *cell = Mark::Unknown;
                }
                return next;
            }
            LogicGridAction::SetMark { row, col, mark } => (row, col, mark),
            LogicGridAction::Cycle { row, col } => {
                let Some(current) = state.marks.get(row).and_then(|r| r.get(col)) else {
                    return next;
                };
                let mark = match current {
                    Mark::Unknown => Mark::Yes,
                    Mark::Yes => Mark::No,
                    Mark::No => Mark::Unknown,
                };
                (row, col, mark)
            }
        };
        if row >= rows || col >= cols {
            return next;
        }
        next.marks[row][col] = mark;
        if mark == Mark::Yes {
            for c in (0..cols).filter(|&c| c != col) {
                next.marks[row][c] = Mark::No;
            }
            for r in (0..rows).filter(|&r| r != row) {
                next.marks[r][col] = Mark::No;
            }
        }
        next
    }

    fn evaluate(&self, puzzle: &LogicGridPuzzle, state: &LogicGridState) -> Evaluation {
        let n = puzzle.rows.len();
        let m = puzzle.cols.len();
        let mark = |r: usize, c: usize| state.marks.get(r).and_then(|row| row.get(c)).copied().unwrap_or_default();
        let mut errors = Vec::new();

        for r in 0..n {
            let yes = (0..m).filter(|&c| mark(r, c) == Mark::Yes).count();
            if yes > 1 {
                errors.push(Violation::new("row-multiple", format!("{} has more than one match", puzzle.rows[r])).with_meta(json!({ "row": r })));
            }
            if (0..m).all(|c| mark(r, c) == Mark::No) {
                errors.push(Violation::new("row-contradiction", format!("Every option for {} is ruled out", puzzle.rows[r])).with_meta(json!({ "row": r })));
            }
        }
        for c in 0..m {
            let yes = (0..n).filter(|&r| mark(r, c) == Mark::Yes).count();
            if yes > 1 {
                errors.push(Violation::new("column-multiple", format!("{} is matched more than once", puzzle.cols[c])).with_meta(json!({ "col": c })));
            }
            if (0..n).all(|r| mark(r, c) == Mark::No) {
                errors.push(Violation::new("column-contradiction", format!("Nobody can have {}", puzzle.cols[c])).with_meta(json!({ "col": c })));
            }
        }
        for r in 0..n {
            for c in 0..m {
                if mark(r, c) == Mark::Yes && puzzle.solution[r] != c {
                    errors.push(
                        Violation::new("incorrect", format!("{} does not go with {}", puzzle.rows[r], puzzle.cols[c]))
                            .with_meta(json!({ "row": r, "col": c })),
                    );
                }
            }
        }

        let solved = (0..n).all(|r| {
            let yes: Vec<usize> = (0..m).filter(|&c| mark(r, c) == Mark::Yes).collect();
            yes == [puzzle.solution[r]]
        });
        if solved && errors.is_empty() {
            Evaluation::solved(60 * puzzle.difficulty.level() as i32)
        } else {
            Evaluation::in_progress(errors)
        }
    }

    fn hint(&self, puzzle: &LogicGridPuzzle, state: &LogicGridState) -> Option<Hint> {
        puzzle.solution.iter().enumerate().find_map(|(r, &c)| {
            let current = state.marks.get(r).and_then(|row| row.get(c)).copied();
            (current != Some(Mark::Yes)).then(|| {
                Hint::new(format!("{} goes with {}", puzzle.rows[r], puzzle.cols[c]))
                    .with_meta(json!({ "row": r, "col": c }))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Status;

    #[test]
    fn test_yes_clears_row_and_column() {
        let puzzle = LogicGrid.create_puzzle(6, Difficulty::MEDIUM);
        let state = LogicGrid.initial_state(&puzzle);
        let next = LogicGrid.reduce(&state, &LogicGridAction::SetMark { row: 1, col: 2, mark: Mark::Yes });
        for c in 0..puzzle.cols.len() {
            let want = if c == 2 { Mark::Yes } else { Mark::No };
            assert_eq!(next.marks[1][c], want);
        }
        for r in 0..puzzle.rows.len() {
            if r != 1 {
                assert_eq!(next.marks[r][2], Mark::No);
            }
        }
    }

    #[test]
    fn test_clues_hold_and_force_unique_answer() {
        for seed in 0..15 {
            let puzzle = LogicGrid.create_puzzle(seed, Difficulty::HARD);
            assert!(puzzle.clues.iter().all(|c| c.kind.holds(&puzzle.solution)));
            assert!(matches!(puzzle.clues[0].kind, ClueKind::Is { .. }));
            assert_eq!(count_consistent(&puzzle.clues, puzzle.rows.len()), 1);
            let mut texts: Vec<&str> = puzzle.clues.iter().map(|c| c.text.as_str()).collect();
            texts.sort_unstable();
            texts.dedup();
            assert_eq!(texts.len(), puzzle.clues.len());
        }
    }

    #[test]
    fn test_solution_marks_solve() {
        let puzzle = LogicGrid.create_puzzle(3, Difficulty::EASY);
        let mut state = LogicGrid.initial_state(&puzzle);
        for (row, &col) in puzzle.solution.iter().enumerate() {
            state = LogicGrid.reduce(&state, &LogicGridAction::SetMark { row, col, mark: Mark::Yes });
        }
        assert_eq!(LogicGrid.evaluate(&puzzle, &state).status, Status::Solved);
    }

    #[test]
    fn test_wrong_yes_and_contradiction_flagged() {
        let puzzle = LogicGrid.create_puzzle(3, Difficulty::EASY);
        let state = LogicGrid.initial_state(&puzzle);
        let wrong = (puzzle.solution[0] + 1) % puzzle.cols.len();
        let next = LogicGrid.reduce(&state, &LogicGridAction::SetMark { row: 0, col: wrong, mark: Mark::Yes });
        let eval = LogicGrid.evaluate(&puzzle, &next);
        assert!(eval.errors.iter().any(|e| e.kind == "incorrect"));

        let mut all_no = state.clone();
        for c in 0..puzzle.cols.len() {
            all_no = LogicGrid.reduce(&all_no, &LogicGridAction::SetMark { row: 0, col: c, mark: Mark::No });
        }
        let eval = LogicGrid.evaluate(&puzzle, &all_no);
        assert!(eval.errors.iter().any(|e| e.kind == "row-contradiction"));
    }

    #[test]
    fn test_cycle_walks_marks() {
        let puzzle = LogicGrid.create_puzzle(3, Difficulty::EASY);
        let s0 = LogicGrid.initial_state(&puzzle);
        let s1 = LogicGrid.reduce(&s0, &LogicGridAction::Cycle { row: 0, col: 0 });
        assert_eq!(s1.marks[0][0], Mark::Yes);
        let s2 = LogicGrid.reduce(&s1, &LogicGridAction::Cycle { row: 0, col: 0 });
        assert_eq!(s2.marks[0][0], Mark::No);
        assert_eq!(LogicGrid.reduce(&s2, &LogicGridAction::Cycle { row: 9, col: 9 }), s2);
    }
}
