use crate::analysis::champion_stats::{RuneStats, RuneStatsTracker};
use crate::analysis::rankings::{RankedEntry, Ranker};
use crate::analysis::timeline::{minute_histogram, MinuteBucket};
use crate::cache::{CacheStats, TableCache};
use crate::data::files::{DataFile, TableKind};
use crate::data::models::{
    ChampionRecord, ItemRecord, ParticipantRecord, SpellComboRecord, TimelineEvent, CORE_RUNE_COLUMNS,
};
use crate::data::probe::FileProbe;
use crate::data::resolver::{load_optional, resolve_master, ResolvedMaster, WinRatePolicy};
use crate::error::{AppError, MissingColumnWarning};
use crate::table::Table;
use std::collections::HashMap;
use std::fmt;

/// Choices made during a session; cleared by `reset`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub champion: Option<String>,
    pub min_games: Option<f64>,
}

/// Why an optional section cannot be shown. Never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Unavailable {
    NotLoaded(&'static str),
    MissingColumn(MissingColumnWarning),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::NotLoaded(file) => write!(f, "{} not present", file),
            Unavailable::MissingColumn(warning) => write!(f, "{}", warning),
        }
    }
}

pub enum RankingKind {
    Spell,
    Item,
}

/// Everything loaded for one dashboard session, held in memory until
/// `refresh` or `reset`.
pub struct Session<P: FileProbe> {
    cache: TableCache<P>,
    policy: WinRatePolicy,
    master: ResolvedMaster,
    champions: Vec<ChampionRecord>,
    optional: HashMap<DataFile, Table>,
    selection: Selection,
}

impl<P: FileProbe> Session<P> {
    /// Resolves the master table. Fails when no master source exists, in
    /// which case nothing else should be rendered.
    pub fn open(probe: P, policy: WinRatePolicy) -> Result<Self, AppError> {
        let mut cache = TableCache::new(probe);
        let master = resolve_master(&mut cache, policy)?;
        let champions = master.table.records();

        Ok(Session {
            cache,
            policy,
            master,
            champions,
            optional: HashMap::new(),
            selection: Selection::default(),
        })
    }

    /// Loads every optional table, calling `on_loaded` after each one.
    pub fn load_optional_tables<F>(&mut self, mut on_loaded: F)
    where
        F: FnMut(DataFile, &Table),
    {
        for file in DataFile::OPTIONAL {
            let table = load_optional(&mut self.cache, file);
            on_loaded(file, &table);
            self.optional.insert(file, table);
        }
    }

    /// Drops every memoized table and reads the files again. The selected
    /// champion survives if it still exists.
    pub fn refresh(&mut self) -> Result<(), AppError> {
        self.cache.reset();
        self.master = resolve_master(&mut self.cache, self.policy)?;
        self.champions = self.master.table.records();

        let loaded: Vec<DataFile> = self.optional.keys().copied().collect();
        for file in loaded {
            let table = load_optional(&mut self.cache, file);
            self.optional.insert(file, table);
        }

        if let Some(name) = self.selection.champion.take() {
            if self.champion(&name).is_some() {
                self.selection.champion = Some(name);
            }
        }
        Ok(())
    }

    /// Like `refresh`, but also clears all selections.
    pub fn reset(&mut self) -> Result<(), AppError> {
        self.selection = Selection::default();
        self.refresh()
    }

    pub fn master(&self) -> &ResolvedMaster {
        &self.master
    }

    pub fn champions(&self) -> &[ChampionRecord] {
        &self.champions
    }

    pub fn champion_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.champions.iter().map(|c| c.champion.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Exact match first, then a case-insensitive one. With duplicate keys
    /// the first row wins.
    pub fn champion(&self, name: &str) -> Option<&ChampionRecord> {
        let name = name.trim();
        self.champions
            .iter()
            .find(|c| c.champion == name)
            .or_else(|| {
                let lowered = name.to_lowercase();
                self.champions
                    .iter()
                    .find(|c| c.champion.to_lowercase() == lowered)
            })
    }

    pub fn select_champion(&mut self, name: &str) -> Result<&ChampionRecord, AppError> {
        let key = self
            .champion(name)
            .map(|c| c.champion.clone())
            .ok_or_else(|| AppError::UnknownChampion(name.trim().to_string()))?;
        self.selection.champion = Some(key);
        self.selected_champion()
            .ok_or_else(|| AppError::UnknownChampion(name.trim().to_string()))
    }

    pub fn selected_champion(&self) -> Option<&ChampionRecord> {
        self.selection
            .champion
            .as_deref()
            .and_then(|name| self.champion(name))
    }

    pub fn set_min_games(&mut self, min_games: Option<f64>) {
        self.selection.min_games = min_games.filter(|m| *m > 0.0);
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The table of `kind` if it was loaded and has rows.
    pub fn table(&self, kind: TableKind) -> Option<&Table> {
        match kind {
            TableKind::Master => Some(&self.master.table),
            TableKind::Optional(file) => self.optional.get(&file).filter(|t| !t.is_empty()),
        }
    }

    /// Every table with at least one row, master first.
    pub fn exportable_tables(&self) -> Vec<TableKind> {
        TableKind::all()
            .filter(|kind| self.table(*kind).map_or(false, |t| !t.is_empty()))
            .collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn last_loaded(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.cache.last_loaded()
    }

    fn require(&self, file: DataFile, column: &str) -> Result<&Table, Unavailable> {
        let table = self
            .table(TableKind::Optional(file))
            .ok_or(Unavailable::NotLoaded(file.file_name()))?;
        if !table.has_column(column) {
            let warning = MissingColumnWarning::new(file.file_name(), column).log();
            return Err(Unavailable::MissingColumn(warning));
        }
        Ok(table)
    }

    /// Champion x core rune win rates from the participant rows.
    pub fn rune_summary(&self, champion: Option<&str>) -> Result<Vec<RuneStats>, Unavailable> {
        let table = self.require(DataFile::Participants, "champion")?;
        if !CORE_RUNE_COLUMNS.iter().any(|name| table.has_column(name)) {
            let warning = MissingColumnWarning::new(DataFile::Participants.file_name(), "core_rune").log();
            return Err(Unavailable::MissingColumn(warning));
        }
        let participants = ParticipantRecord::from_table(table);

        let champion = champion
            .map(|name| {
                self.champion(name)
                    .map(|c| c.champion.clone())
                    .unwrap_or_else(|| name.trim().to_string())
            })
            .or_else(|| self.selection.champion.clone());
        let min_games = self.selection.min_games.map(|m| m.ceil() as usize).unwrap_or(0);

        Ok(RuneStatsTracker::from_participants(&participants).summary(champion.as_deref(), min_games))
    }

    pub fn rankings(&self, kind: RankingKind, top_n: usize) -> Result<Vec<RankedEntry>, Unavailable> {
        let min_games = self.selection.min_games;
        match kind {
            RankingKind::Spell => {
                let rows: Vec<SpellComboRecord> = self.require(DataFile::Spell, "games")?.records();
                Ok(Ranker::rank(&rows, min_games, top_n))
            }
            RankingKind::Item => {
                let rows: Vec<ItemRecord> = self.require(DataFile::Item, "games")?.records();
                Ok(Ranker::rank(&rows, min_games, top_n))
            }
        }
    }

    pub fn timeline(&self, file: DataFile) -> Result<Vec<MinuteBucket>, Unavailable> {
        let events: Vec<TimelineEvent> = self.require(file, "minute")?.records();
        Ok(minute_histogram(&events))
    }
}
