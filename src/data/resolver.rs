use super::files::DataFile;
use super::probe::FileProbe;
use crate::cache::TableCache;
use crate::error::{AppError, MissingColumnWarning};
use crate::table::{format_cell, Table};
use std::collections::HashMap;

pub const CHAMPION_KEY: &str = "champion";

/// Which of the three source combinations produced the master table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterSource {
    MasterPlus,
    Master,
    Merged,
}

impl MasterSource {
    pub fn label(&self) -> &'static str {
        match self {
            MasterSource::MasterPlus => DataFile::MasterPlus.file_name(),
            MasterSource::Master => DataFile::Master.file_name(),
            MasterSource::Merged => "summary+base(merged)",
        }
    }
}

/// What to do with a `winrate` column the source already supplies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WinRatePolicy {
    /// Leave supplied values untouched; non-numeric cells read as absent.
    #[default]
    Keep,
    /// Replace the column with wins / games whenever both are present.
    Recompute,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMaster {
    pub table: Table,
    pub source: MasterSource,
    pub warnings: Vec<MissingColumnWarning>,
}

/// Picks the master table (first match wins) and fills in derived columns
/// the chosen source does not supply.
pub fn resolve_master<P: FileProbe>(
    cache: &mut TableCache<P>,
    policy: WinRatePolicy,
) -> Result<ResolvedMaster, AppError> {
    let (mut table, source) = select_master(cache)?;

    if !table.has_column(CHAMPION_KEY) {
        return Err(AppError::InvalidMaster {
            file: source.label().to_string(),
            reason: format!("missing '{}' column", CHAMPION_KEY),
        });
    }

    let key = table.column_index(CHAMPION_KEY).unwrap_or_default();
    let before = table.len();
    table.retain_rows(|row| !row[key].trim().is_empty());
    if table.len() < before {
        tracing::warn!(
            dropped = before - table.len(),
            source = source.label(),
            "dropped rows without a champion key"
        );
    }

    let warnings = normalize(&mut table, policy)
        .into_iter()
        .map(MissingColumnWarning::log)
        .collect();

    tracing::info!(
        source = source.label(),
        rows = table.len(),
        columns = table.width(),
        "master table resolved"
    );

    Ok(ResolvedMaster {
        table,
        source,
        warnings,
    })
}

fn select_master<P: FileProbe>(cache: &mut TableCache<P>) -> Result<(Table, MasterSource), AppError> {
    if cache.exists(DataFile::MasterPlus.file_name()) {
        let table = load_master(cache, DataFile::MasterPlus)?;
        return Ok((table, MasterSource::MasterPlus));
    }

    if cache.exists(DataFile::Master.file_name()) {
        let table = load_master(cache, DataFile::Master)?;
        return Ok((table, MasterSource::Master));
    }

    if cache.exists(DataFile::Summary.file_name()) && cache.exists(DataFile::BaseStats.file_name()) {
        let summary = load_master(cache, DataFile::Summary)?;
        let base = load_master(cache, DataFile::BaseStats)?;
        let merged = left_join(&summary, &base, CHAMPION_KEY).map_err(|reason| {
            AppError::InvalidMaster {
                file: MasterSource::Merged.label().to_string(),
                reason,
            }
        })?;
        return Ok((merged, MasterSource::Merged));
    }

    Err(AppError::MissingData {
        required: vec![
            format!("- {}", DataFile::MasterPlus.file_name()),
            format!("- {}", DataFile::Master.file_name()),
            format!(
                "- ({} + {})",
                DataFile::Summary.file_name(),
                DataFile::BaseStats.file_name()
            ),
        ],
    })
}

fn load_master<P: FileProbe>(cache: &mut TableCache<P>, file: DataFile) -> Result<Table, AppError> {
    cache.load(file.file_name()).map_err(|e| AppError::InvalidMaster {
        file: file.file_name().to_string(),
        reason: e.to_string(),
    })
}

/// Loads an auxiliary table; absent or unparsable files yield an empty table.
pub fn load_optional<P: FileProbe>(cache: &mut TableCache<P>, file: DataFile) -> Table {
    let name = file.file_name();
    if !cache.exists(name) {
        tracing::debug!(file = name, "optional table not present");
        return Table::empty();
    }

    match cache.load(name) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!(file = name, error = %e, "optional table unreadable, treating as absent");
            Table::empty()
        }
    }
}

/// Left join on `key`: every left row is kept in order, the first matching
/// right row supplies the extra columns, unmatched rows get blanks.
/// Clashing non-key columns are suffixed `_x` (left) and `_y` (right).
pub fn left_join(left: &Table, right: &Table, key: &str) -> Result<Table, String> {
    let left_key = left
        .column_index(key)
        .ok_or_else(|| format!("left table has no '{}' column", key))?;
    let right_key = right
        .column_index(key)
        .ok_or_else(|| format!("right table has no '{}' column", key))?;

    let clashes: Vec<&str> = right
        .headers()
        .iter()
        .filter(|h| h.as_str() != key && left.has_column(h))
        .map(String::as_str)
        .collect();
    let suffixed = |name: &str, suffix: &str| {
        if clashes.contains(&name) {
            format!("{}{}", name, suffix)
        } else {
            name.to_string()
        }
    };

    let right_cols: Vec<usize> = (0..right.width()).filter(|&i| i != right_key).collect();

    let mut headers: Vec<String> = left
        .headers()
        .iter()
        .map(|h| if h == key { h.clone() } else { suffixed(h, "_x") })
        .collect();
    headers.extend(right_cols.iter().map(|&i| suffixed(&right.headers()[i], "_y")));

    let mut lookup: HashMap<&str, &Vec<String>> = HashMap::new();
    for row in right.rows() {
        lookup.entry(row[right_key].as_str()).or_insert(row);
    }

    let rows = left
        .rows()
        .iter()
        .map(|row| {
            let mut joined = row.clone();
            match lookup.get(row[left_key].as_str()) {
                Some(matched) => joined.extend(right_cols.iter().map(|&i| matched[i].clone())),
                None => joined.extend(right_cols.iter().map(|_| String::new())),
            }
            joined
        })
        .collect();

    Ok(Table::new(headers, rows))
}

/// Adds `pickrate`, `kda` and `winrate` when absent. Returns a warning for
/// each derived column that could not be produced.
pub fn normalize(table: &mut Table, policy: WinRatePolicy) -> Vec<MissingColumnWarning> {
    let mut warnings = Vec::new();

    if !table.has_column("pickrate") {
        if let Some(warning) = derive_pick_rate(table) {
            warnings.push(warning);
        }
    }

    if !table.has_column("kda") {
        if let Some(warning) = derive_kda(table) {
            warnings.push(warning);
        }
    }

    let recompute = policy == WinRatePolicy::Recompute;
    if !table.has_column("winrate") || recompute {
        if let Some(warning) = derive_win_rate(table) {
            warnings.push(warning);
        }
    }

    warnings
}

fn derive_pick_rate(table: &mut Table) -> Option<MissingColumnWarning> {
    let Some(games) = table.numeric_column("games") else {
        return Some(MissingColumnWarning::new("master", "games"));
    };

    let total: f64 = games.iter().flatten().sum();
    if total <= 0.0 {
        tracing::debug!("total games is zero, pick rate left absent");
        return None;
    }

    let values = games
        .into_iter()
        .map(|g| format_cell(g.map(|g| g / total * 100.0)))
        .collect();
    table.set_column("pickrate", values);
    None
}

fn derive_kda(table: &mut Table) -> Option<MissingColumnWarning> {
    let (Some(kills), Some(deaths), Some(assists)) = (
        table.numeric_column("avg_kills"),
        table.numeric_column("avg_deaths"),
        table.numeric_column("avg_assists"),
    ) else {
        let missing = ["avg_kills", "avg_deaths", "avg_assists"]
            .into_iter()
            .find(|c| !table.has_column(c))
            .unwrap_or("avg_kills");
        return Some(MissingColumnWarning::new("master", missing));
    };

    let values = kills
        .into_iter()
        .zip(deaths)
        .zip(assists)
        .map(|((k, d), a)| match (k, d, a) {
            (Some(k), Some(d), Some(a)) => format_cell(Some((k + a) / d.max(1.0))),
            _ => String::new(),
        })
        .collect();
    table.set_column("kda", values);
    None
}

fn derive_win_rate(table: &mut Table) -> Option<MissingColumnWarning> {
    let (Some(wins), Some(games)) = (table.numeric_column("wins"), table.numeric_column("games")) else {
        if table.has_column("winrate") {
            return None;
        }
        let missing = if table.has_column("wins") { "games" } else { "wins" };
        return Some(MissingColumnWarning::new("master", missing));
    };

    let values = wins
        .into_iter()
        .zip(games)
        .map(|(w, g)| match (w, g) {
            (Some(w), Some(g)) if g > 0.0 => format_cell(Some(w / g * 100.0)),
            _ => String::new(),
        })
        .collect();
    table.set_column("winrate", values);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::probe::memory::MemoryProbe;

    const SUMMARY: &str = "champion,games,wins,avg_kills,avg_deaths,avg_assists\n\
                           Ahri,10,5,5,0,5\n\
                           Lux,30,12,4,5,16\n\
                           Zed,60,36,9,6,3\n";
    const BASE: &str = "champion,hp,armor\nAhri,590,21\nLux,580,19\n";

    fn resolve(probe: MemoryProbe) -> Result<ResolvedMaster, AppError> {
        resolve_master(&mut TableCache::new(probe), WinRatePolicy::Keep)
    }

    #[test]
    fn master_plus_wins_over_everything() {
        let probe = MemoryProbe::new()
            .with("champion_summary.csv", SUMMARY)
            .with("champion_base_stats.csv", BASE)
            .with("champion_master.csv", "champion,winrate\nLux,50\n")
            .with("champion_master_plus.csv", "champion,winrate\nAhri,55\n");

        let resolved = resolve(probe).unwrap();
        assert_eq!(resolved.source, MasterSource::MasterPlus);
        assert_eq!(resolved.table.column("champion").unwrap(), vec!["Ahri"]);
    }

    #[test]
    fn plain_master_is_preferred_to_merged_pair() {
        let probe = MemoryProbe::new()
            .with("champion_summary.csv", SUMMARY)
            .with("champion_base_stats.csv", BASE)
            .with("champion_master.csv", "champion,winrate\nLux,50\n");

        let resolved = resolve(probe).unwrap();
        assert_eq!(resolved.source, MasterSource::Master);
        assert_eq!(resolved.source.label(), "champion_master.csv");
    }

    #[test]
    fn merged_pair_keeps_every_summary_row() {
        let probe = MemoryProbe::new()
            .with("champion_summary.csv", SUMMARY)
            .with("champion_base_stats.csv", BASE);

        let resolved = resolve(probe).unwrap();
        assert_eq!(resolved.source, MasterSource::Merged);
        assert_eq!(resolved.source.label(), "summary+base(merged)");

        let table = &resolved.table;
        assert_eq!(table.column("champion").unwrap(), vec!["Ahri", "Lux", "Zed"]);
        assert_eq!(table.column("hp").unwrap(), vec!["590", "580", ""]);
    }

    #[test]
    fn derived_pick_rate_uses_population_total() {
        let probe = MemoryProbe::new()
            .with("champion_summary.csv", SUMMARY)
            .with("champion_base_stats.csv", BASE);

        let table = resolve(probe).unwrap().table;
        assert_eq!(
            table.numeric_column("pickrate").unwrap(),
            vec![Some(10.0), Some(30.0), Some(60.0)]
        );
    }

    #[test]
    fn derived_kda_floors_deaths_at_one() {
        let probe = MemoryProbe::new()
            .with("champion_summary.csv", SUMMARY)
            .with("champion_base_stats.csv", BASE);

        let table = resolve(probe).unwrap().table;
        let kda = table.numeric_column("kda").unwrap();
        assert_eq!(kda[0], Some(10.0));
        assert_eq!(kda[1], Some(4.0));
        assert_eq!(kda[2], Some(2.0));
    }

    #[test]
    fn derived_win_rate_rounds_to_two_places() {
        let mut table = Table::from_csv_bytes(b"champion,games,wins\nAhri,3,1\nLux,0,0\n", "t").unwrap();
        normalize(&mut table, WinRatePolicy::Keep);
        assert_eq!(table.column("winrate").unwrap(), vec!["33.33", ""]);
    }

    #[test]
    fn supplied_columns_are_left_alone() {
        let csv = b"champion,games,wins,winrate,pickrate\nAhri,10,5,n/a,7\n";
        let mut table = Table::from_csv_bytes(csv, "t").unwrap();
        normalize(&mut table, WinRatePolicy::Keep);
        assert_eq!(table.column("winrate").unwrap(), vec!["n/a"]);
        assert_eq!(table.column("pickrate").unwrap(), vec!["7"]);
    }

    #[test]
    fn recompute_policy_overwrites_supplied_win_rate() {
        let csv = b"champion,games,wins,winrate\nAhri,10,5,n/a\n";
        let mut table = Table::from_csv_bytes(csv, "t").unwrap();
        normalize(&mut table, WinRatePolicy::Recompute);
        assert_eq!(table.column("winrate").unwrap(), vec!["50"]);
    }

    #[test]
    fn zero_total_games_leaves_pick_rate_absent() {
        let mut table = Table::from_csv_bytes(b"champion,games\nAhri,0\nLux,\n", "t").unwrap();
        let warnings = normalize(&mut table, WinRatePolicy::Keep);
        assert!(!table.has_column("pickrate"));
        assert!(warnings.iter().any(|w| w.column == "wins"));
    }

    #[test]
    fn missing_inputs_are_reported_not_fatal() {
        let mut table = Table::from_csv_bytes(b"champion\nAhri\n", "t").unwrap();
        let warnings = normalize(&mut table, WinRatePolicy::Keep);
        let columns: Vec<&str> = warnings.iter().map(|w| w.column.as_str()).collect();
        assert_eq!(columns, vec!["games", "avg_kills", "wins"]);
        assert_eq!(table.headers(), ["champion"]);
    }

    #[test]
    fn nothing_resolvable_is_missing_data() {
        let probe = MemoryProbe::new()
            .with("champion_summary.csv", SUMMARY)
            .with("spell_summary.csv", "spell_combo\nFlash+Mark\n");

        match resolve(probe) {
            Err(AppError::MissingData { required }) => assert_eq!(required.len(), 3),
            other => panic!("expected MissingData, got {:?}", other),
        }
    }

    #[test]
    fn unparsable_master_is_fatal() {
        let probe = MemoryProbe::new()
            .with("champion_master.csv", "")
            .with("champion_summary.csv", SUMMARY)
            .with("champion_base_stats.csv", BASE);

        assert!(matches!(resolve(probe), Err(AppError::InvalidMaster { .. })));
    }

    #[test]
    fn master_without_key_column_is_rejected() {
        let probe = MemoryProbe::new().with("champion_master.csv", "name,games\nAhri,1\n");
        assert!(matches!(resolve(probe), Err(AppError::InvalidMaster { .. })));
    }

    #[test]
    fn blank_champion_rows_are_dropped() {
        let probe = MemoryProbe::new().with("champion_master.csv", "champion,games\nAhri,1\n,4\n");
        let table = resolve(probe).unwrap().table;
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn resolving_twice_yields_identical_tables() {
        let probe = MemoryProbe::new()
            .with("champion_summary.csv", SUMMARY)
            .with("champion_base_stats.csv", BASE);
        let mut cache = TableCache::new(probe);

        let first = resolve_master(&mut cache, WinRatePolicy::Keep).unwrap();
        let second = resolve_master(&mut cache, WinRatePolicy::Keep).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn left_join_suffixes_clashing_columns() {
        let left = Table::from_csv_bytes(b"champion,games\nAhri,10\n", "l").unwrap();
        let right = Table::from_csv_bytes(b"champion,games,hp\nAhri,99,590\nAhri,1,1\n", "r").unwrap();

        let joined = left_join(&left, &right, "champion").unwrap();
        assert_eq!(joined.headers(), ["champion", "games_x", "games_y", "hp"]);
        assert_eq!(joined.rows()[0], vec!["Ahri", "10", "99", "590"]);
    }

    #[test]
    fn optional_tables_degrade_to_empty() {
        let probe = MemoryProbe::new()
            .with("item_summary.csv", "item,games\nBoots,3\n")
            .with("spell_summary.csv", "a,b\n1,2,3\n");
        let mut cache = TableCache::new(probe);

        assert_eq!(load_optional(&mut cache, DataFile::Item).len(), 1);
        assert!(load_optional(&mut cache, DataFile::Spell).is_empty());
        assert!(load_optional(&mut cache, DataFile::TimelineKills).is_empty());
    }
}
