//! Command handling on top of the session controller.

use anyhow::{anyhow, Context, Result};
use puzzle_core::{format_time, Clock, Difficulty, GameStore, Registry, SessionController};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

const TICK_RATE: Duration = Duration::from_secs(1);

pub struct App {
    registry: Registry,
    store: Arc<dyn GameStore>,
    clock: Arc<dyn Clock>,
}

impl App {
    pub fn new(store: Arc<dyn GameStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: Registry::builtin(),
            store,
            clock,
        }
    }

    pub fn list(&self) -> Value {
        Value::Array(
            self.registry
                .infos()
                .map(|info| serde_json::to_value(info).unwrap_or(Value::Null))
                .collect(),
        )
    }

    /// Build a puzzle without touching stats or sessions.
    pub fn generate(&self, game: &str, seed: Option<u32>, difficulty: Difficulty) -> Result<Value> {
        let module = self.registry.require(game)?;
        let seed = seed.unwrap_or_else(|| self.clock.seed());
        let puzzle = module.create_puzzle(seed, difficulty)?;
        Ok(json!({
            "game": game,
            "seed": seed,
            "difficulty": difficulty,
            "puzzle": puzzle,
        }))
    }

    pub fn new_puzzle(&self, game: &str, difficulty: Difficulty, seed: Option<u32>) -> Result<Value> {
        let seed = seed.unwrap_or_else(|| self.clock.seed());
        let session =
            SessionController::open_fresh(&self.registry, game, self.store.clone(), self.clock.clone(), seed, difficulty)?;
        Ok(self.finish(&session))
    }

    pub fn show(&self, game: &str, difficulty: Difficulty) -> Result<Value> {
        let session = self.open(game, difficulty)?;
        Ok(self.finish(&session))
    }

    pub fn act(&self, game: &str, action: &str) -> Result<Value> {
        let action = parse_action(action)?;
        let mut session = self.resume(game)?;
        session.dispatch(action)?;
        Ok(self.finish(&session))
    }

    pub fn reset(&self, game: &str) -> Result<Value> {
        let mut session = self.resume(game)?;
        session.reset_puzzle()?;
        Ok(self.finish(&session))
    }

    pub fn hint(&self, game: &str) -> Result<Value> {
        let session = self.resume(game)?;
        let hint = session.hint()?;
        session.close();
        Ok(json!({ "game": game, "hint": hint }))
    }

    /// Stats for one game, or every registered game.
    pub fn stats(&self, game: Option<&str>) -> Result<Value> {
        let ids: Vec<&str> = match game {
            Some(id) => vec![self.registry.require(id)?.info().id],
            None => self.registry.ids().to_vec(),
        };
        let mut out = serde_json::Map::new();
        for id in ids {
            let stats = self.store.read_stats(id).with_context(|| format!("reading stats for {id}"))?;
            let mut entry = serde_json::to_value(&stats)?;
            if let Value::Object(fields) = &mut entry {
                fields.insert("solveRate".into(), json!(stats.solve_rate()));
                fields.insert("bestTime".into(), json!(stats.best_time()));
            }
            out.insert(id.to_string(), entry);
        }
        self.store.flush(true);
        Ok(Value::Object(out))
    }

    /// Interactive loop: one action JSON (or `hint`, `reset`, `new`, `quit`)
    /// per input line, one view JSON per output line. The timer ticks with
    /// wall time between lines.
    pub fn play<R: BufRead, W: Write>(&self, game: &str, difficulty: Difficulty, input: R, mut output: W) -> Result<()> {
        let mut session = self.open(game, difficulty)?;
        writeln!(output, "{}", view(&session))?;
        let mut last_tick = Instant::now();

        for line in input.lines() {
            let line = line?;
            let due = (last_tick.elapsed().as_secs_f64() / TICK_RATE.as_secs_f64()) as u32;
            for _ in 0..due {
                session.tick();
            }
            last_tick += TICK_RATE * due;

            let reply = match line.trim() {
                "" => continue,
                "quit" | "exit" => break,
                text => respond(&mut session, text),
            };
            match reply {
                Ok(value) => writeln!(output, "{value}")?,
                Err(err) => writeln!(output, "{}", json!({ "error": format!("{err:#}") }))?,
            }
            output.flush()?;
        }

        session.close();
        Ok(())
    }

    fn open(&self, game: &str, difficulty: Difficulty) -> Result<SessionController> {
        SessionController::open(&self.registry, game, self.store.clone(), self.clock.clone(), difficulty)
            .with_context(|| format!("opening {game}"))
    }

    /// The saved session for `game`. Never starts (or counts) a new attempt.
    fn resume(&self, game: &str) -> Result<SessionController> {
        SessionController::resume(&self.registry, game, self.store.clone(), self.clock.clone())
            .with_context(|| format!("opening {game}"))?
            .ok_or_else(|| anyhow!("no active puzzle for {game}; start one with `puzzles new {game}`"))
    }

    fn finish(&self, session: &SessionController) -> Value {
        session.close();
        view(session)
    }
}

/// Handle one line of `play` input.
fn respond(session: &mut SessionController, text: &str) -> Result<Value> {
    match text {
        "hint" => return Ok(json!({ "hint": session.hint()? })),
        "reset" => {
            session.reset_puzzle()?;
        }
        "new" => {
            session.start_new_puzzle(None)?;
        }
        _ => {
            session.dispatch(parse_action(text)?)?;
        }
    }
    Ok(view(session))
}

fn parse_action(text: &str) -> Result<Value> {
    let action: Value = serde_json::from_str(text).context("action must be JSON")?;
    anyhow::ensure!(action.is_object(), "action must be a JSON object");
    Ok(action)
}

/// Everything a front end needs to draw the current puzzle.
fn view(session: &SessionController) -> Value {
    let evaluation = session.evaluation();
    json!({
        "game": session.info().id,
        "title": session.info().title,
        "difficulty": session.difficulty(),
        "seed": session.seed(),
        "status": evaluation.status,
        "errors": evaluation.errors,
        "scoreDelta": evaluation.score_delta,
        "elapsed": format_time(session.elapsed_seconds()),
        "puzzle": session.puzzle(),
        "state": session.state(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use puzzle_core::{ManualClock, MemoryStore};

    fn app() -> (App, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()));
        (App::new(store.clone(), clock), store)
    }

    #[test]
    fn test_list_has_every_family() {
        let (app, _) = app();
        let list = app.list();
        assert_eq!(list.as_array().unwrap().len(), 17);
        assert_eq!(list[0]["id"], "sudoku");
    }

    #[test]
    fn test_generate_is_pure() {
        let (app, store) = app();
        let a = app.generate("routes", Some(42), Difficulty::EASY).unwrap();
        let b = app.generate("routes", Some(42), Difficulty::EASY).unwrap();
        assert_eq!(a, b);
        assert_eq!(a["seed"], 42);
        assert_eq!(store.read_stats("routes").unwrap().attempts, 0);
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_unknown_game_errors() {
        let (app, _) = app();
        assert!(app.generate("chess", None, Difficulty::EASY).is_err());
        assert!(app.stats(Some("chess")).is_err());
    }

    #[test]
    fn test_new_then_act_then_solve() {
        let (app, store) = app();
        let view = app.new_puzzle("routes", Difficulty::EASY, Some(42)).unwrap();
        assert_eq!(view["status"], "inProgress");
        assert_eq!(store.read_stats("routes").unwrap().attempts, 1);

        let path = view["puzzle"]["solutionPath"].as_array().unwrap().clone();
        let mut last = Value::Null;
        for node in path {
            let action = json!({ "type": "visit", "node": node }).to_string();
            last = app.act("routes", &action).unwrap();
        }
        assert_eq!(last["status"], "solved");

        let stats = app.stats(Some("routes")).unwrap();
        assert_eq!(stats["routes"]["attempts"], 1);
        assert_eq!(stats["routes"]["solves"], 1);
        assert_eq!(stats["routes"]["streakDays"], 1);
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_act_rejects_bad_json() {
        let (app, _) = app();
        assert!(app.act("routes", "visit S").is_err());
        assert!(app.act("routes", "[1]").is_err());
    }

    #[test]
    fn test_commands_without_a_session_do_not_start_one() {
        let (app, store) = app();
        let err = app.act("routes", r#"{"type":"visit","node":"S"}"#).unwrap_err();
        assert!(err.to_string().contains("no active puzzle"));
        assert!(app.reset("routes").is_err());
        assert!(app.hint("routes").is_err());
        assert_eq!(store.read_stats("routes").unwrap().attempts, 0);
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_reset_and_hint() {
        let (app, _) = app();
        app.new_puzzle("routes", Difficulty::EASY, Some(42)).unwrap();
        app.act("routes", r#"{"type":"visit","node":"S"}"#).unwrap();
        let view = app.reset("routes").unwrap();
        assert_eq!(view["state"]["path"], json!([]));
        let hint = app.hint("routes").unwrap();
        assert!(hint["hint"]["message"].is_string());
    }

    #[test]
    fn test_play_reads_lines() {
        let (app, _) = app();
        let input = b"{\"type\":\"visit\",\"node\":\"S\"}\nnot json\n\nhint\nquit\n{\"type\":\"undo\"}\n";
        let mut output = Vec::new();
        app.play("routes", Difficulty::EASY, &input[..], &mut output).unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1]["state"]["path"], json!(["S"]));
        assert!(lines[2]["error"].is_string());
        assert!(lines[3]["hint"].is_object());
    }

    #[test]
    fn test_stats_for_all_games() {
        let (app, _) = app();
        let stats = app.stats(None).unwrap();
        assert_eq!(stats.as_object().unwrap().len(), 17);
        assert_eq!(stats["sudoku"]["solveRate"], 0.0);
        assert!(stats["sudoku"]["bestTime"].is_null());
    }
}
