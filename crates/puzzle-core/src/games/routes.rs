//! Routes: find a path through a layered network whose cost hits a target.

use crate::module::{Category, Difficulty, Evaluation, GameInfo, GameModule, Hint, Violation};
use crate::rng::Mulberry32;
use serde::{Deserialize, Serialize};
use serde_json::json;

static INFO: GameInfo = GameInfo {
    id: "routes",
    title: "Routes",
    category: Category::Graph,
    difficulty_labels: ["Short", "Medium", "Long"],
};

pub const START: &str = "S";
pub const END: &str = "E";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub layer: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesPuzzle {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub start: String,
    pub end: String,
    pub target_cost: u32,
    pub solution_path: Vec<String>,
}

impl RoutesPuzzle {
    /// Cost of the edge between `a` and `b`, in either direction.
    pub fn edge_cost(&self, a: &str, b: &str) -> Option<u32> {
        self.edges
            .iter()
            .find(|e| (e.from == a && e.to == b) || (e.from == b && e.to == a))
            .map(|e| e.cost)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutesState {
    pub path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RoutesAction {
    Visit { node: String },
    Undo,
    Clear,
}

/// Outcome of walking a path over the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Walk {
    pub cost: u32,
    pub errors: Vec<Violation>,
}

pub struct Routes;

fn node_id(layer: usize, index: usize) -> String {
    format!("L{}N{}", layer, index)
}

/// Sum edge costs along `path`, flagging hops with no edge and repeated nodes.
pub fn walk(puzzle: &RoutesPuzzle, path: &[String]) -> Walk {
    let mut cost = 0;
    let mut errors = Vec::new();
    for (i, pair) in path.windows(2).enumerate() {
        match puzzle.edge_cost(&pair[0], &pair[1]) {
            Some(c) => cost += c,
            None => errors.push(
                Violation::new("no-edge", format!("No road from {} to {}", pair[0], pair[1]))
                    .with_meta(json!({ "step": i + 1 })),
            ),
        }
    }
    for (i, node) in path.iter().enumerate() {
        if path[..i].contains(node) {
            errors.push(
                Violation::new("revisit", format!("{} is visited twice", node)).with_meta(json!({ "step": i })),
            );
        }
    }
    Walk { cost, errors }
}

impl GameModule for Routes {
    type Puzzle = RoutesPuzzle;
    type State = RoutesState;
    type Action = RoutesAction;

    fn info(&self) -> &GameInfo {
        &INFO
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> RoutesPuzzle {
        let mut rng = Mulberry32::new(seed);
        let layers = difficulty.select([3, 4, 5]);
        let width = difficulty.select([2, 3, 3]);
        let extra_chance = difficulty.select([0.5, 0.55, 0.6]);

        // Layer 0 is the start, layer `layers + 1` the end.
        let mut by_layer: Vec<Vec<String>> = vec![vec![START.to_string()]];
        for layer in 1..=layers {
            by_layer.push((0..width).map(|i| node_id(layer, i)).collect());
        }
        by_layer.push(vec![END.to_string()]);

        let nodes = by_layer
            .iter()
            .enumerate()
            .flat_map(|(layer, ids)| ids.iter().map(move |id| Node { id: id.clone(), layer }))
            .collect();

        let solution_path: Vec<String> = by_layer
            .iter()
            .map(|ids| ids[rng.index(ids.len())].clone())
            .collect();

        let mut edges: Vec<Edge> = Vec::new();
        let mut target_cost = 0;
        for pair in solution_path.windows(2) {
            let cost = rng.rand_int(1, 9) as u32;
            target_cost += cost;
            edges.push(Edge {
                from: pair[0].clone(),
                to: pair[1].clone(),
                cost,
            });
        }

        for window in by_layer.windows(2) {
            for from in &window[0] {
                for to in &window[1] {
                    let exists = edges.iter().any(|e| &e.from == from && &e.to == to);
                    if !exists && rng.chance(extra_chance) {
                        edges.push(Edge {
                            from: from.clone(),
                            to: to.clone(),
                            cost: rng.rand_int(1, 9) as u32,
                        });
                    }
                }
            }
        }

        RoutesPuzzle {
            seed,
            difficulty,
            nodes,
            edges,
            start: START.to_string(),
            end: END.to_string(),
            target_cost,
            solution_path,
        }
    }

    fn initial_state(&self, _puzzle: &RoutesPuzzle) -> RoutesState {
        RoutesState::default()
    }

    fn reduce(&self, state: &RoutesState, action: &RoutesAction) -> RoutesState {
        let mut next = state.clone();
        match action {
            RoutesAction::Visit { node } => {
                if next.path.last() != Some(node) {
                    next.path.push(node.clone());
                }
            }
            RoutesAction::Undo => {
                next.path.pop();
            }
            RoutesAction::Clear => next.path.clear(),
        }
        next
    }

    fn evaluate(&self, puzzle: &RoutesPuzzle, state: &RoutesState) -> Evaluation {
        let path = &state.path;
        if path.is_empty() {
            return Evaluation::in_progress(Vec::new());
        }
        let Walk { cost, mut errors } = walk(puzzle, path);
        if path[0] != puzzle.start {
            errors.push(Violation::new("start", format!("Routes must begin at {}", puzzle.start)));
        }
        if cost > puzzle.target_cost {
            errors.push(
                Violation::new("over-budget", format!("Cost {} is over the target {}", cost, puzzle.target_cost))
                    .with_meta(json!({ "cost": cost, "target": puzzle.target_cost })),
            );
        }
        let finished = path.last() == Some(&puzzle.end);
        if finished && errors.is_empty() && cost == puzzle.target_cost {
            return Evaluation::solved(30 * puzzle.difficulty.level() as i32);
        }
        if finished && errors.is_empty() {
            errors.push(
                Violation::new("under-budget", format!("Cost {} is under the target {}", cost, puzzle.target_cost))
                    .with_meta(json!({ "cost": cost, "target": puzzle.target_cost })),
            );
        }
        Evaluation::in_progress(errors)
    }

    fn hint(&self, puzzle: &RoutesPuzzle, state: &RoutesState) -> Option<Hint> {
        let on_track = state.path.len() < puzzle.solution_path.len()
            && puzzle.solution_path.starts_with(&state.path);
        if !on_track {
            return Some(Hint::new(format!("Start again from {}", puzzle.start)));
        }
        let next = &puzzle.solution_path[state.path.len()];
        Some(Hint::new(format!("Go to {}", next)).with_meta(json!({ "node": next })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Status;

    fn follow(path: &[String]) -> RoutesState {
        path.iter().fold(RoutesState::default(), |state, node| {
            Routes.reduce(&state, &RoutesAction::Visit { node: node.clone() })
        })
    }

    #[test]
    fn test_seed_42_solution_path_solves() {
        let puzzle = Routes.create_puzzle(42, Difficulty::EASY);
        let walked = walk(&puzzle, &puzzle.solution_path);
        assert!(walked.errors.is_empty());
        assert_eq!(walked.cost, puzzle.target_cost);
        let state = follow(&puzzle.solution_path);
        assert_eq!(Routes.evaluate(&puzzle, &state).status, Status::Solved);
    }

    #[test]
    fn test_backbone_spans_start_to_end() {
        let puzzle = Routes.create_puzzle(9, Difficulty::HARD);
        assert_eq!(puzzle.solution_path.first().map(String::as_str), Some(START));
        assert_eq!(puzzle.solution_path.last().map(String::as_str), Some(END));
        assert_eq!(puzzle.solution_path.len(), 5 + 2);
    }

    #[test]
    fn test_missing_edge_is_rejected() {
        let puzzle = Routes.create_puzzle(42, Difficulty::EASY);
        let state = follow(&[START.to_string(), END.to_string()]);
        let eval = Routes.evaluate(&puzzle, &state);
        assert_eq!(eval.status, Status::InProgress);
        assert!(eval.errors.iter().any(|e| e.kind == "no-edge"));
    }

    #[test]
    fn test_undo_and_repeat_visit() {
        let s1 = follow(&[START.to_string()]);
        let s2 = Routes.reduce(&s1, &RoutesAction::Visit { node: START.to_string() });
        assert_eq!(s2, s1);
        let s3 = Routes.reduce(&s1, &RoutesAction::Undo);
        assert!(s3.path.is_empty());
        assert_eq!(Routes.reduce(&s3, &RoutesAction::Undo), s3);
    }

    #[test]
    fn test_hint_follows_backbone() {
        let puzzle = Routes.create_puzzle(42, Difficulty::EASY);
        let state = follow(&puzzle.solution_path[..2]);
        let hint = Routes.hint(&puzzle, &state).unwrap();
        assert_eq!(hint.meta.unwrap()["node"], puzzle.solution_path[2].as_str());
    }
}
