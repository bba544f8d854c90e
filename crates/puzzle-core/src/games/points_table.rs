//! Points table: reconstruct a round-robin from a few locked results and facts
//! about the final standings.

use crate::module::{Category, Difficulty, Evaluation, GameInfo, GameModule, Hint, Violation};
use crate::rng::Mulberry32;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cmp::Reverse;

static INFO: GameInfo = GameInfo {
    id: "points-table",
    title: "Points Table",
    category: Category::Graph,
    difficulty_labels: ["4 teams", "5 teams", "6 teams"],
};

const TEAM_NAMES: [&str; 6] = ["Falcons", "Harriers", "Kestrels", "Ospreys", "Merlins", "Buzzards"];

pub const WIN_POINTS: u32 = 3;
pub const DRAW_POINTS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    fn points(self) -> (u32, u32) {
        match self {
            Outcome::Home => (WIN_POINTS, 0),
            Outcome::Draw => (DRAW_POINTS, DRAW_POINTS),
            Outcome::Away => (0, WIN_POINTS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: usize,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub home: usize,
    pub away: usize,
}

/// A fact about the finished table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Constraint {
    TotalDraws { count: usize },
    TeamPoints { team: usize, points: u32 },
    MatchResult { index: usize, outcome: Outcome },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsTablePuzzle {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
    pub locked: Vec<usize>,
    pub constraints: Vec<Constraint>,
    pub solution: Vec<Outcome>,
}

impl PointsTablePuzzle {
    pub fn describe(&self, constraint: &Constraint) -> String {
        let name = |id: usize| self.teams.get(id).map(|t| t.name.as_str()).unwrap_or("?");
        match *constraint {
            Constraint::TotalDraws { count } => format!("Exactly {} matches end in a draw", count),
            Constraint::TeamPoints { team, points } => format!("{} finish on {} points", name(team), points),
            Constraint::MatchResult { index, outcome } => {
                let Some(m) = self.matches.get(index) else {
                    return String::new();
                };
                match outcome {
                    Outcome::Home => format!("{} beat {}", name(m.home), name(m.away)),
                    Outcome::Away => format!("{} beat {}", name(m.away), name(m.home)),
                    Outcome::Draw => format!("{} and {} drew", name(m.home), name(m.away)),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsTableState {
    pub outcomes: Vec<Option<Outcome>>,
    pub locked: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointsTableAction {
    SetOutcome { index: usize, outcome: Outcome },
    ClearOutcome { index: usize },
}

/// One row of the league table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub team: usize,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
}

/// League table from whatever results are filled in, best first.
pub fn standings(team_count: usize, matches: &[Match], outcomes: &[Option<Outcome>]) -> Vec<Standing> {
    let mut table: Vec<Standing> = (0..team_count)
        .map(|team| Standing {
            team,
            ..Standing::default()
        })
        .collect();
    for (m, outcome) in matches.iter().zip(outcomes) {
        let Some(outcome) = *outcome else { continue };
        if m.home >= team_count || m.away >= team_count {
            continue;
        }
        let (home_pts, away_pts) = outcome.points();
        for (team, pts) in [(m.home, home_pts), (m.away, away_pts)] {
            let row = &mut table[team];
            row.played += 1;
            row.points += pts;
            match pts {
                WIN_POINTS => row.wins += 1,
                DRAW_POINTS => row.draws += 1,
                _ => row.losses += 1,
            }
        }
    }
    table.sort_by_key(|s| (Reverse(s.points), Reverse(s.wins), s.team));
    table
}

pub fn round_robin(team_count: usize) -> Vec<Match> {
    (0..team_count)
        .flat_map(|home| (home + 1..team_count).map(move |away| Match { home, away }))
        .collect()
}

pub struct PointsTable;

impl GameModule for PointsTable {
    type Puzzle = PointsTablePuzzle;
    type State = PointsTableState;
    type Action = PointsTableAction;

    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> PointsTablePuzzle {
        let mut rng = Mulberry32::new(seed);
        let team_count = difficulty.select([4, 5, 6]);
        let draw_chance = difficulty.select([0.2, 0.25, 0.3]);
        let locked_share = difficulty.select([0.5, 0.35, 0.25]);
        let point_facts = difficulty.select([2, 2, 3]);
        let result_facts = difficulty.select([1, 1, 0]);

        let teams = rng
            .shuffled(&TEAM_NAMES)
            .into_iter()
            .take(team_count)
            .enumerate()
            .map(|(id, name)| Team { id, name: name.to_string() })
            .collect();
        let matches = round_robin(team_count);
        let solution: Vec<Outcome> = matches
            .iter()
            .map(|_| {
                if rng.chance(draw_chance) {
                    Outcome::Draw
                } else if rng.chance(0.5) {
                    Outcome::Home
                } else {
                    Outcome::Away
                }
            })
            .collect();

        let mut order: Vec<usize> = (0..matches.len()).collect();
        rng.shuffle(&mut order);
        let locked_count = ((matches.len() as f64) * locked_share).round() as usize;
        let mut locked: Vec<usize> = order[..locked_count].to_vec();
        locked.sort_unstable();

        let mut constraints = vec![Constraint::TotalDraws {
            count: solution.iter().filter(|&&o| o == Outcome::Draw).count(),
        }];
        let final_table = standings(
            team_count,
            &matches,
            &solution.iter().copied().map(Some).collect::<Vec<_>>(),
        );
        let mut team_order: Vec<usize> = (0..team_count).collect();
        rng.shuffle(&mut team_order);
        for &team in team_order.iter().take(point_facts) {
            if let Some(row) = final_table.iter().find(|s| s.team == team) {
                constraints.push(Constraint::TeamPoints { team, points: row.points });
            }
        }
        for &index in order[locked_count..].iter().take(result_facts) {
            constraints.push(Constraint::MatchResult {
                index,
                outcome: solution[index],
            });
        }

        PointsTablePuzzle {
            seed,
            difficulty,
            teams,
            matches,
            locked,
            constraints,
            solution,
        }
    }

    fn initial_state(&self, puzzle: &PointsTablePuzzle) -> PointsTableState {
        let mut outcomes = vec![None; puzzle.matches.len()];
        for &index in &puzzle.locked {
            if let Some(slot) = outcomes.get_mut(index) {
                *slot = puzzle.solution.get(index).copied();
            }
        }
        PointsTableState {
            outcomes,
            locked: puzzle.locked.clone(),
        }
    }

    fn reduce(&self, state: &PointsTableState, action: &PointsTableAction) -> PointsTableState {
        let (index, value) = match *action {
            PointsTableAction::SetOutcome { index, outcome } => (index, Some(outcome)),
            PointsTableAction::ClearOutcome { index } => (index, None),
        };
        if state.locked.contains(&index) || index >= state.outcomes.len() {
            return state.clone();
        }
        let mut next = state.clone();
        next.outcomes[index] = value;
        next
    }

    fn evaluate(&self, puzzle: &PointsTablePuzzle, state: &PointsTableState) -> Evaluation {
        let outcomes = &state.outcomes;
        let open = outcomes.iter().filter(|o| o.is_none()).count();
        let table = standings(puzzle.teams.len(), &puzzle.matches, outcomes);
        let mut errors = Vec::new();

        for constraint in &puzzle.constraints {
            let broken = match *constraint {
                Constraint::TotalDraws { count } => {
                    let draws = outcomes.iter().filter(|&&o| o == Some(Outcome::Draw)).count();
                    draws > count || draws + open < count
                }
                Constraint::TeamPoints { team, points } => {
                    let current = table.iter().find(|s| s.team == team).map_or(0, |s| s.points);
                    let remaining = puzzle
                        .matches
                        .iter()
                        .zip(outcomes)
                        .filter(|(m, o)| o.is_none() && (m.home == team || m.away == team))
                        .count() as u32;
                    current > points || current + remaining * WIN_POINTS < points
                }
                Constraint::MatchResult { index, outcome } => {
                    matches!(outcomes.get(index), Some(Some(actual)) if *actual != outcome)
                }
            };
            if broken {
                errors.push(
                    Violation::new("constraint", puzzle.describe(constraint))
                        .with_meta(serde_json::to_value(constraint).unwrap_or_default()),
                );
            }
        }

        if open > 0 || !errors.is_empty() {
            return Evaluation::in_progress(errors);
        }
        let wrong: Vec<usize> = outcomes
            .iter()
            .zip(&puzzle.solution)
            .enumerate()
            .filter(|(_, (got, want))| **got != Some(**want))
            .map(|(i, _)| i)
            .collect();
        if wrong.is_empty() {
            Evaluation::solved(40 * puzzle.difficulty.level() as i32)
        } else {
            Evaluation::in_progress(vec![Violation::new(
                "mismatch",
                format!("{} results differ from the real season", wrong.len()),
            )
            .with_meta(json!({ "matches": wrong }))])
        }
    }

    fn hint(&self, puzzle: &PointsTablePuzzle, state: &PointsTableState) -> Option<Hint> {
        let index = (0..puzzle.matches.len())
            .find(|&i| state.outcomes.get(i).copied().flatten() != Some(puzzle.solution[i]))?;
        let text = puzzle.describe(&Constraint::MatchResult {
            index,
            outcome: puzzle.solution[index],
        });
        Some(Hint::new(text).with_meta(json!({ "index": index, "outcome": puzzle.solution[index] })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Status;

    fn fill_solution(puzzle: &PointsTablePuzzle) -> PointsTableState {
        let mut state = PointsTable.initial_state(puzzle);
        for (index, &outcome) in puzzle.solution.iter().enumerate() {
            state = PointsTable.reduce(&state, &PointsTableAction::SetOutcome { index, outcome });
        }
        state
    }

    #[test]
    fn test_round_robin_pairs_every_team_once() {
        let matches = round_robin(5);
        assert_eq!(matches.len(), 10);
        assert!(matches.iter().all(|m| m.home < m.away));
    }

    #[test]
    fn test_standings_order() {
        let matches = round_robin(3);
        // 0 beats 1, 0 draws 2, 1 beats 2
        let outcomes = [Some(Outcome::Home), Some(Outcome::Draw), Some(Outcome::Home)];
        let table = standings(3, &matches, &outcomes);
        assert_eq!(table[0].team, 0);
        assert_eq!(table[0].points, 4);
        assert_eq!(table[1].team, 1);
        assert_eq!(table[1].points, 3);
        assert_eq!(table[2].points, 1);
    }

    #[test]
    fn test_standings_tie_breaks_on_wins_then_id() {
        let matches = round_robin(2);
        let table = standings(2, &matches, &[Some(Outcome::Draw)]);
        assert_eq!(table[0].team, 0);
        assert_eq!(table[1].team, 1);
    }

    #[test]
    fn test_locked_matches_are_prefilled_and_fixed() {
        let puzzle = PointsTable.create_puzzle(5, Difficulty::EASY);
        let state = PointsTable.initial_state(&puzzle);
        for &index in &puzzle.locked {
            assert_eq!(state.outcomes[index], Some(puzzle.solution[index]));
            let next = PointsTable.reduce(&state, &PointsTableAction::ClearOutcome { index });
            assert_eq!(next, state);
        }
    }

    #[test]
    fn test_solution_solves_and_satisfies_constraints() {
        for seed in 0..10 {
            let puzzle = PointsTable.create_puzzle(seed, Difficulty::HARD);
            let eval = PointsTable.evaluate(&puzzle, &fill_solution(&puzzle));
            assert_eq!(eval.status, Status::Solved, "seed {}", seed);
        }
    }

    #[test]
    fn test_wrong_result_is_not_solved() {
        let puzzle = PointsTable.create_puzzle(5, Difficulty::EASY);
        let state = fill_solution(&puzzle);
        let index = (0..puzzle.matches.len()).find(|i| !puzzle.locked.contains(i)).unwrap();
        let flipped = match puzzle.solution[index] {
            Outcome::Home => Outcome::Away,
            _ => Outcome::Home,
        };
        let state = PointsTable.reduce(&state, &PointsTableAction::SetOutcome { index, outcome: flipped });
        assert_eq!(PointsTable.evaluate(&puzzle, &state).status, Status::InProgress);
    }

    #[test]
    fn test_hint_names_an_unfilled_match() {
        let puzzle = PointsTable.create_puzzle(8, Difficulty::MEDIUM);
        let state = PointsTable.initial_state(&puzzle);
        let hint = PointsTable.hint(&puzzle, &state).unwrap();
        let index = hint.meta.unwrap()["index"].as_u64().unwrap() as usize;
        assert!(!puzzle.locked.contains(&index));
        assert!(PointsTable.hint(&puzzle, &fill_solution(&puzzle)).is_none());
    }
}
