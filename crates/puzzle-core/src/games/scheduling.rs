//! Scheduling: place every item in its own slot so that all constraints hold.

use super::grid::permutations;
use crate::error::GenError;
use crate::module::{Category, Difficulty, Evaluation, GameInfo, GameModule, Hint, Violation};
use crate::rng::Mulberry32;
use serde::{Deserialize, Serialize};
use serde_json::json;

static INFO: GameInfo = GameInfo {
    id: "scheduling",
    title: "Scheduling",
    category: Category::Graph,
    difficulty_labels: ["4 slots", "5 slots", "6 slots"],
};

const ITEMS: [&str; 8] = [
    "Standup", "Design review", "Lab", "Lecture", "Tutorial", "Lunch", "Gym", "Revision",
];
const SLOTS: [&str; 6] = ["08:00", "09:00", "10:00", "11:00", "12:00", "13:00"];
const MAX_ATTEMPTS: usize = 20;
const MAX_DRAWS: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Constraint {
    NotInSlot { item: usize, slot: usize },
    InSlot { item: usize, slot: usize },
    Before { first: usize, second: usize },
    After { first: usize, second: usize },
    Adjacent { first: usize, second: usize },
    NotAdjacent { first: usize, second: usize },
}

impl Constraint {
    fn items(&self) -> (usize, Option<usize>) {
        match *self {
            Constraint::NotInSlot { item, .. } | Constraint::InSlot { item, .. } => (item, None),
            Constraint::Before { first, second }
            | Constraint::After { first, second }
            | Constraint::Adjacent { first, second }
            | Constraint::NotAdjacent { first, second } => (first, Some(second)),
        }
    }

    /// `None` until every item the constraint mentions is placed.
    pub fn check(&self, assignment: &[Option<usize>]) -> Option<bool> {
        let slot_of = |item: usize| assignment.get(item).copied().flatten();
        let (a, b) = self.items();
        let a = slot_of(a)?;
        let b = match b {
            Some(b) => Some(slot_of(b)?),
            None => None,
        };
        Some(match (*self, b) {
            (Constraint::NotInSlot { slot, .. }, _) => a != slot,
            (Constraint::InSlot { slot, .. }, _) => a == slot,
            (Constraint::Before { .. }, Some(b)) => a < b,
            (Constraint::After { .. }, Some(b)) => a > b,
            (Constraint::Adjacent { .. }, Some(b)) => a.abs_diff(b) == 1,
            (Constraint::NotAdjacent { .. }, Some(b)) => a.abs_diff(b) != 1,
            _ => true,
        })
    }

    fn holds_for(&self, slots: &[usize]) -> bool {
        let full: Vec<Option<usize>> = slots.iter().copied().map(Some).collect();
        self.check(&full).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingPuzzle {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub items: Vec<String>,
    pub slots: Vec<String>,
    pub constraints: Vec<Constraint>,
    /// Slot for each item.
    pub solution: Vec<usize>,
}

impl SchedulingPuzzle {
    pub fn describe(&self, constraint: &Constraint) -> String {
        let item = |i: usize| self.items.get(i).map(String::as_str).unwrap_or("?");
        let slot = |s: usize| self.slots.get(s).map(String::as_str).unwrap_or("?");
        match *constraint {
            Constraint::NotInSlot { item: i, slot: s } => format!("{} is not at {}", item(i), slot(s)),
            Constraint::InSlot { item: i, slot: s } => format!("{} is at {}", item(i), slot(s)),
            Constraint::Before { first, second } => format!("{} comes before {}", item(first), item(second)),
            Constraint::After { first, second } => format!("{} comes after {}", item(first), item(second)),
            Constraint::Adjacent { first, second } => {
                format!("{} is right next to {}", item(first), item(second))
            }
            Constraint::NotAdjacent { first, second } => {
                format!("{} is not next to {}", item(first), item(second))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
    pub assignment: Vec<Option<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SchedulingAction {
    Assign { item: usize, slot: usize },
    Unassign { item: usize },
    Clear,
}

pub struct Scheduling;

fn random_constraint(rng: &mut Mulberry32, n: usize) -> Constraint {
    let first = rng.index(n);
    let mut second = rng.index(n - 1);
    if second >= first {
        second += 1;
    }
    let slot = rng.index(n);
    match rng.index(6) {
        0 => Constraint::NotInSlot { item: first, slot },
        1 => Constraint::InSlot { item: first, slot },
        2 => Constraint::Before { first, second },
        3 => Constraint::After { first, second },
        4 => Constraint::Adjacent { first, second },
        _ => Constraint::NotAdjacent { first, second },
    }
}

fn consistent_count(constraints: &[Constraint], orders: &[Vec<usize>]) -> usize {
    orders
        .iter()
        .filter(|slots| constraints.iter().all(|c| c.holds_for(slots)))
        .count()
}

/// Draw constraints true of `solution` until exactly one schedule remains.
fn try_constraints(
    rng: &mut Mulberry32,
    solution: &[usize],
    max_constraints: usize,
) -> Result<Vec<Constraint>, GenError> {
    let orders = permutations(solution.len());
    let mut constraints: Vec<Constraint> = Vec::new();
    for _ in 0..MAX_DRAWS {
        if constraints.len() >= max_constraints {
            break;
        }
        let candidate = random_constraint(rng, solution.len());
        if constraints.contains(&candidate) || !candidate.holds_for(solution) {
            continue;
        }
        // Pinning items outright makes the puzzle trivial; allow at most one.
        let pins = constraints.iter().filter(|c| matches!(c, Constraint::InSlot { .. })).count();
        if matches!(candidate, Constraint::InSlot { .. }) && pins > 0 {
            continue;
        }
        let before = consistent_count(&constraints, &orders);
        constraints.push(candidate);
        let after = consistent_count(&constraints, &orders);
        if after == before {
            constraints.pop();
            continue;
        }
        if after == 1 {
            return Ok(constraints);
        }
    }
    Err(GenError::Exhausted)
}

/// Chain of `before` constraints that spells out the solution order.
fn fallback_constraints(solution: &[usize]) -> Vec<Constraint> {
    let mut by_slot: Vec<usize> = (0..solution.len()).collect();
    by_slot.sort_by_key(|&item| solution[item]);
    by_slot
        .windows(2)
        .map(|pair| Constraint::Before {
            first: pair[0],
            second: pair[1],
        })
        .collect()
}

impl GameModule for Scheduling {
    type Puzzle = SchedulingPuzzle;
    type State = SchedulingState;
    type Action = SchedulingAction;

    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> SchedulingPuzzle {
        let mut rng = Mulberry32::new(seed);
        let n = difficulty.select([4, 5, 6]);
        let max_constraints = difficulty.select([8, 10, 12]);
        let items: Vec<String> = rng.sample_unique(&ITEMS, n).into_iter().map(String::from).collect();
        let slots: Vec<String> = SLOTS[..n].iter().map(|s| s.to_string()).collect();

        let mut solution: Vec<usize> = (0..n).collect();
        rng.shuffle(&mut solution);

        let mut constraints = None;
        for attempt in 0..MAX_ATTEMPTS {
            match try_constraints(&mut rng, &solution, max_constraints) {
                Ok(found) => {
                    constraints = Some(found);
                    break;
                }
                Err(err) => tracing::debug!(seed, attempt, %err, "scheduling constraints retry"),
            }
        }
        let constraints = constraints.unwrap_or_else(|| {
            tracing::debug!(seed, "scheduling falling back to ordered chain");
            fallback_constraints(&solution)
        });

        SchedulingPuzzle {
            seed,
            difficulty,
            items,
            slots,
            constraints,
            solution,
        }
    }

    fn initial_state(&self, puzzle: &SchedulingPuzzle) -> SchedulingState {
        SchedulingState {
            assignment: vec![None; puzzle.items.len()],
        }
    }

    fn reduce(&self, state: &SchedulingState, action: &SchedulingAction) -> SchedulingState {
        let n = state.assignment.len();
        let mut next = state.clone();
        match *action {
            SchedulingAction::Assign { item, slot } if item < n && slot < n => {
                next.assignment[item] = Some(slot);
            }
            SchedulingAction::Unassign { item } if item < n => next.assignment[item] = None,
            SchedulingAction::Clear => next.assignment.iter_mut().for_each(|s| *s = None),
            _ => {}
        }
        next
    }

    fn evaluate(&self, puzzle: &SchedulingPuzzle, state: &SchedulingState) -> Evaluation {
        let assignment = &state.assignment;
        let mut errors = Vec::new();

        for slot in 0..puzzle.slots.len() {
            let holders: Vec<usize> = (0..assignment.len())
                .filter(|&item| assignment[item] == Some(slot))
                .collect();
            if holders.len() > 1 {
                errors.push(
                    Violation::new("clash", format!("{} is double-booked", puzzle.slots[slot]))
                        .with_meta(json!({ "slot": slot, "items": holders })),
                );
            }
        }
        for (index, constraint) in puzzle.constraints.iter().enumerate() {
            if constraint.check(assignment) == Some(false) {
                errors.push(
                    Violation::new("constraint", puzzle.describe(constraint)).with_meta(json!({ "index": index })),
                );
            }
        }

        let placed = assignment.len() == puzzle.items.len() && assignment.iter().all(Option::is_some);
        if placed && errors.is_empty() {
            Evaluation::solved(40 * puzzle.difficulty.level() as i32)
        } else {
            Evaluation::in_progress(errors)
        }
    }

    fn hint(&self, puzzle: &SchedulingPuzzle, state: &SchedulingState) -> Option<Hint> {
        let item = (0..puzzle.items.len())
            .find(|&i| state.assignment.get(i).copied().flatten() != Some(puzzle.solution[i]))?;
        let slot = puzzle.solution[item];
        Some(
            Hint::new(format!("{} belongs at {}", puzzle.items[item], puzzle.slots[slot]))
                .with_meta(json!({ "item": item, "slot": slot })),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Status;

    fn place(puzzle: &SchedulingPuzzle, slots: &[usize]) -> SchedulingState {
        slots.iter().enumerate().fold(Scheduling.initial_state(puzzle), |state, (item, &slot)| {
            Scheduling.reduce(&state, &SchedulingAction::Assign { item, slot })
        })
    }

    #[test]
    fn test_constraints_hold_for_solution_and_pin_it() {
        for seed in 0..8 {
            let puzzle = Scheduling.create_puzzle(seed, Difficulty::MEDIUM);
            assert!(puzzle.constraints.iter().all(|c| c.holds_for(&puzzle.solution)));
            let orders = permutations(puzzle.items.len());
            assert_eq!(consistent_count(&puzzle.constraints, &orders), 1, "seed {}", seed);
        }
    }

    #[test]
    fn test_partial_assignment_is_not_flagged() {
        let c = Constraint::Before { first: 0, second: 1 };
        assert_eq!(c.check(&[Some(3), None]), None);
        assert_eq!(c.check(&[Some(3), Some(1)]), Some(false));
        assert_eq!(c.check(&[Some(0), Some(1)]), Some(true));
    }

    #[test]
    fn test_solution_solves() {
        let puzzle = Scheduling.create_puzzle(21, Difficulty::HARD);
        let state = place(&puzzle, &puzzle.solution);
        assert_eq!(Scheduling.evaluate(&puzzle, &state).status, Status::Solved);
    }

    #[test]
    fn test_clash_reported() {
        let puzzle = Scheduling.create_puzzle(21, Difficulty::EASY);
        let state = place(&puzzle, &vec![0; puzzle.items.len()]);
        let eval = Scheduling.evaluate(&puzzle, &state);
        assert_eq!(eval.status, Status::InProgress);
        assert!(eval.errors.iter().any(|e| e.kind == "clash"));
    }

    #[test]
    fn test_out_of_range_assign_is_ignored() {
        let puzzle = Scheduling.create_puzzle(3, Difficulty::EASY);
        let state = Scheduling.initial_state(&puzzle);
        let next = Scheduling.reduce(&state, &SchedulingAction::Assign { item: 0, slot: 99 });
        assert_eq!(next, state);
    }

    #[test]
    fn test_fallback_chain_is_unique() {
        let solution = vec![2, 0, 3, 1];
        let chain = fallback_constraints(&solution);
        assert_eq!(consistent_count(&chain, &permutations(4)), 1);
    }

    #[test]
    fn test_hint_places_a_wrong_item() {
        let puzzle = Scheduling.create_puzzle(4, Difficulty::EASY);
        let hint = Scheduling.hint(&puzzle, &Scheduling.initial_state(&puzzle)).unwrap();
        let meta = hint.meta.unwrap();
        let item = meta["item"].as_u64().unwrap() as usize;
        assert_eq!(meta["slot"].as_u64().unwrap() as usize, puzzle.solution[item]);
    }
}
