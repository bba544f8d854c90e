//! Per-game rolling statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Rolling summary for one `(player, game)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub attempts: u32,
    pub solves: u32,
    pub streak_days: u32,
    pub best_time_seconds: Option<u64>,
    pub last_played_at: Option<DateTime<Utc>>,
    pub last_solved_date: Option<NaiveDate>,
}

impl GameStats {
    /// A fresh puzzle was started.
    pub fn record_attempt(&mut self, now: DateTime<Utc>) {
        self.attempts += 1;
        self.last_played_at = Some(now);
    }

    /// The current puzzle was solved on `today` after `elapsed` seconds.
    pub fn record_solve(&mut self, today: NaiveDate, elapsed: u64, now: DateTime<Utc>) {
        self.solves += 1;
        self.last_played_at = Some(now);
        self.streak_days = match self.last_solved_date {
            Some(last) if last == today => self.streak_days.max(1),
            Some(last) if today.pred_opt() == Some(last) => self.streak_days + 1,
            _ => 1,
        };
        self.last_solved_date = Some(today);
        if self.best_time_seconds.map_or(true, |best| elapsed < best) {
            self.best_time_seconds = Some(elapsed);
        }
    }

    /// The current puzzle ended in failure.
    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        self.last_played_at = Some(now);
    }

    /// Percentage of attempts that were solved.
    pub fn solve_rate(&self) -> f32 {
        if self.attempts > 0 {
            self.solves as f32 / self.attempts as f32 * 100.0
        } else {
            0.0
        }
    }

    pub fn best_time(&self) -> Option<String> {
        self.best_time_seconds.map(format_time)
    }
}

/// Format seconds as `MM:SS`, or `H:MM:SS` past an hour.
pub fn format_time(secs: u64) -> String {
    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        let secs = secs % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{:02}:{:02}", mins, secs)
    }
}
