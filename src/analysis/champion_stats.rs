use crate::data::models::ParticipantRecord;
use std::collections::HashMap;

/// Games and wins for one champion played with one core rune.
#[derive(Debug, Clone, PartialEq)]
pub struct RuneStats {
    pub champion: String,
    pub core_rune: String,
    pub games: usize,
    pub wins: usize,
}

impl RuneStats {
    pub fn new(champion: String, core_rune: String) -> Self {
        RuneStats {
            champion,
            core_rune,
            games: 0,
            wins: 0,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            (self.wins as f64 / self.games as f64) * 100.0
        }
    }
}

pub struct RuneStatsTracker {
    stats: HashMap<(String, String), RuneStats>,
}

impl RuneStatsTracker {
    pub fn new() -> Self {
        RuneStatsTracker {
            stats: HashMap::new(),
        }
    }

    pub fn from_participants(rows: &[ParticipantRecord]) -> Self {
        let mut tracker = RuneStatsTracker::new();
        for row in rows {
            tracker.add_participant(row);
        }
        tracker
    }

    /// Rows without a rune or a known result are not counted.
    pub fn add_participant(&mut self, row: &ParticipantRecord) {
        let (Some(rune), Some(won)) = (row.core_rune.as_deref(), row.win) else {
            return;
        };
        let rune = rune.trim();
        if rune.is_empty() {
            return;
        }

        let key = (row.champion.clone(), rune.to_string());
        let entry = self
            .stats
            .entry(key)
            .or_insert_with(|| RuneStats::new(row.champion.clone(), rune.to_string()));

        entry.games += 1;
        if won {
            entry.wins += 1;
        }
    }

    /// Summary rows sorted by champion, then by games played (descending).
    pub fn summary(&self, champion: Option<&str>, min_games: usize) -> Vec<RuneStats> {
        let mut rows: Vec<RuneStats> = self
            .stats
            .values()
            .filter(|s| champion.map_or(true, |c| s.champion == c))
            .filter(|s| s.games >= min_games)
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            a.champion
                .cmp(&b.champion)
                .then(b.games.cmp(&a.games))
                .then(a.core_rune.cmp(&b.core_rune))
        });
        rows
    }

    #[allow(dead_code)]
    pub fn get(&self, champion: &str, core_rune: &str) -> Option<&RuneStats> {
        self.stats.get(&(champion.to_string(), core_rune.to_string()))
    }
}
