use proptest::prelude::*;
use puzzle_core::games::grid::{neighbors8, Pos};
use puzzle_core::games::kenken::{KenKen, KenKenPuzzle};
use puzzle_core::games::minesweeper::{Minesweeper, MinesweeperAction};
use puzzle_core::games::sudoku::{solver, Sudoku};
use puzzle_core::{Difficulty, DynAction, DynGame, GameModule, Registry};
use serde_json::{json, Value};

fn difficulty_strategy() -> impl Strategy<Value = Difficulty> {
    (1u8..=3).prop_map(Difficulty::new)
}

/// Grid-shaped actions, some deliberately out of bounds.
fn grid_action_strategy() -> impl Strategy<Value = Value> {
    (
        prop::sample::select(vec!["select", "setValue", "clear", "toggleNote", "reveal", "toggleFlag", "cycle", "bogus"]),
        0usize..14,
        0usize..14,
        0u8..12,
    )
        .prop_map(|(kind, row, col, value)| json!({ "type": kind, "row": row, "col": col, "value": value }))
}

/// Actions for the non-grid families: marks, route visits, match results and
/// slot assignments, with indices past the end and node ids that do not exist.
fn board_action_strategy() -> impl Strategy<Value = Value> {
    (
        prop::sample::select(vec![
            "setMark", "cycle", "clear", "visit", "undo", "setOutcome", "clearOutcome", "assign", "unassign", "bogus",
        ]),
        0usize..12,
        0usize..12,
        prop::sample::select(vec!["unknown", "yes", "no", "home", "draw", "away", "maybe"]),
        prop::sample::select(vec!["S", "E", "L1N0", "L2N1", "L9N9", ""]),
    )
        .prop_map(|(kind, a, b, tag, node)| {
            json!({
                "type": kind,
                "row": a,
                "col": b,
                "mark": tag,
                "node": node,
                "index": a,
                "outcome": tag,
                "item": a,
                "slot": b,
            })
        })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 24, .. ProptestConfig::default() })]

    #[test]
    fn every_family_is_deterministic(seed in any::<u32>(), difficulty in difficulty_strategy()) {
        let registry = Registry::builtin();
        for id in registry.ids() {
            let game = registry.require(id).unwrap_or_else(|e| panic!("{e}"));
            let a = game.create_puzzle(seed, difficulty).unwrap_or_else(|e| panic!("{id}: {e}"));
            let b = game.create_puzzle(seed, difficulty).unwrap_or_else(|e| panic!("{id}: {e}"));
            prop_assert_eq!(&a, &b, "{} differs for seed {}", id, seed);

            let state = game.initial_state(&a).unwrap_or_else(|e| panic!("{id}: {e}"));
            prop_assert_eq!(&state, &game.initial_state(&b).unwrap_or_else(|e| panic!("{id}: {e}")));
        }
    }

    #[test]
    fn fresh_puzzles_evaluate_in_progress(seed in any::<u32>(), difficulty in difficulty_strategy()) {
        let registry = Registry::builtin();
        for id in registry.ids() {
            let game = registry.require(id).unwrap_or_else(|e| panic!("{e}"));
            let puzzle = game.create_puzzle(seed, difficulty).unwrap_or_else(|e| panic!("{id}: {e}"));
            let state = game.initial_state(&puzzle).unwrap_or_else(|e| panic!("{id}: {e}"));
            let first = game.evaluate(&puzzle, &state).unwrap_or_else(|e| panic!("{id}: {e}"));
            let second = game.evaluate(&puzzle, &state).unwrap_or_else(|e| panic!("{id}: {e}"));
            prop_assert_eq!(&first, &second);
            prop_assert!(!first.status.is_terminal(), "{} starts terminal for seed {}", id, seed);
        }
    }

    #[test]
    fn reset_replaces_state_verbatim(seed in any::<u32>(), other in any::<u32>()) {
        let registry = Registry::builtin();
        for id in registry.ids() {
            let game = registry.require(id).unwrap_or_else(|e| panic!("{e}"));
            let current = game
                .create_puzzle(seed, Difficulty::EASY)
                .and_then(|p| game.initial_state(&p))
                .unwrap_or_else(|e| panic!("{id}: {e}"));
            let replacement = game
                .create_puzzle(other, Difficulty::MEDIUM)
                .and_then(|p| game.initial_state(&p))
                .unwrap_or_else(|e| panic!("{id}: {e}"));
            let next = game
                .dispatch(&current, DynAction::Reset(replacement.clone()))
                .unwrap_or_else(|e| panic!("{id}: {e}"));
            prop_assert_eq!(next, replacement);
        }
    }

    #[test]
    fn grid_reducers_are_total(
        seed in any::<u32>(),
        actions in prop::collection::vec(grid_action_strategy(), 1..40),
    ) {
        let registry = Registry::builtin();
        for id in ["sudoku", "kenken", "minesweeper", "nonogram"] {
            let game = registry.require(id).unwrap_or_else(|e| panic!("{e}"));
            let puzzle = game.create_puzzle(seed, Difficulty::EASY).unwrap_or_else(|e| panic!("{id}: {e}"));
            let mut state = game.initial_state(&puzzle).unwrap_or_else(|e| panic!("{id}: {e}"));
            for action in &actions {
                state = game
                    .dispatch(&state, DynAction::Play(action.clone()))
                    .unwrap_or_else(|e| panic!("{id}: {e}"));
                prop_assert!(game.evaluate(&puzzle, &state).is_ok());
            }
        }
    }

    #[test]
    fn board_reducers_are_total(
        seed in any::<u32>(),
        difficulty in difficulty_strategy(),
        actions in prop::collection::vec(board_action_strategy(), 1..40),
    ) {
        let registry = Registry::builtin();
        for id in ["logic-grid", "routes", "points-table", "scheduling"] {
            let game = registry.require(id).unwrap_or_else(|e| panic!("{e}"));
            let puzzle = game.create_puzzle(seed, difficulty).unwrap_or_else(|e| panic!("{id}: {e}"));
            let mut state = game.initial_state(&puzzle).unwrap_or_else(|e| panic!("{id}: {e}"));
            for action in &actions {
                state = game
                    .dispatch(&state, DynAction::Play(action.clone()))
                    .unwrap_or_else(|e| panic!("{id}: {e}"));
                let first = game.evaluate(&puzzle, &state).unwrap_or_else(|e| panic!("{id}: {e}"));
                let second = game.evaluate(&puzzle, &state).unwrap_or_else(|e| panic!("{id}: {e}"));
                prop_assert_eq!(first, second);
                prop_assert!(game.hint(&puzzle, &state).is_ok());
            }
        }
    }

    #[test]
    fn first_reveal_never_hits_a_mine(
        seed in any::<u32>(),
        difficulty in difficulty_strategy(),
        row in 0usize..12,
        col in 0usize..12,
    ) {
        let puzzle = GameModule::create_puzzle(&Minesweeper, seed, difficulty);
        let (row, col) = (row % puzzle.rows, col % puzzle.cols);
        let state = Minesweeper.reduce(
            &GameModule::initial_state(&Minesweeper, &puzzle),
            &MinesweeperAction::Reveal { row, col },
        );
        let board = state.board.as_ref().unwrap_or_else(|| panic!("board not laid"));
        prop_assert!(state.exploded.is_none());
        prop_assert_eq!(board.mine_count(), puzzle.mines);
        let clicked = Pos::new(row, col);
        prop_assert!(!board.is_mine(clicked));
        for p in neighbors8(clicked, puzzle.rows, puzzle.cols) {
            prop_assert!(!board.is_mine(p), "mine at {:?} next to first click {:?}", p, clicked);
        }
        prop_assert!(state.revealed[row][col]);
    }

    #[test]
    fn kenken_cages_hold_for_the_solution(seed in any::<u32>(), difficulty in difficulty_strategy()) {
        let puzzle: KenKenPuzzle = GameModule::create_puzzle(&KenKen, seed, difficulty);
        let n = puzzle.size;
        for line in &puzzle.solution {
            let mut seen = line.clone();
            seen.sort_unstable();
            prop_assert_eq!(seen, (1..=n as u8).collect::<Vec<_>>());
        }
        let mut covered = 0;
        for cage in &puzzle.cages {
            let values: Vec<i64> = cage
                .cells
                .iter()
                .map(|p| i64::from(puzzle.solution[p.row][p.col]))
                .collect();
            prop_assert!(cage.op.holds(cage.target, &values), "cage {} fails", cage.label());
            covered += cage.cells.len();
        }
        prop_assert_eq!(covered, n * n);
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 6, .. ProptestConfig::default() })]

    #[test]
    fn sudoku_givens_have_one_solution(seed in any::<u32>(), difficulty in difficulty_strategy()) {
        let puzzle = GameModule::create_puzzle(&Sudoku, seed, difficulty);
        prop_assert!(solver::has_unique_solution(&puzzle.givens));
        prop_assert_eq!(solver::solve(&puzzle.givens), Some(puzzle.solution.clone()));
        for (row, line) in puzzle.givens.iter().enumerate() {
            for (col, &v) in line.iter().enumerate() {
                prop_assert!(v == 0 || v == puzzle.solution[row][col]);
            }
        }
    }
}
