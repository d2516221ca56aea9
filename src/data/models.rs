use crate::table::{parse_number, Table};
use csv::StringRecord;
use serde::{Deserialize, Deserializer, Serialize};

// Master table row. Every column except the key may be absent.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ChampionRecord {
    pub champion: String,
    #[serde(default, deserialize_with = "finite_option")]
    pub games: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub wins: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub winrate: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub pickrate: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub kda: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub avg_kills: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub avg_deaths: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub avg_assists: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub avg_dpm: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub avg_gpm: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub dpm_early: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub dpm_mid: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub dpm_late: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub delta_winrate: Option<f64>,

    // Recommended build
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub best_rune: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub best_spell_combo: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub best_start: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub best_boots: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub best_core3: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub synergy_top1: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub enemy_hard_top1: Option<String>,

    // Base stats
    #[serde(default, deserialize_with = "finite_option")]
    pub hp: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub hpperlevel: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub mp: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub mpperlevel: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub armor: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub armorperlevel: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub spellblock: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub spellblockperlevel: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub attackdamage: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub attackdamageperlevel: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub attackspeed: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub attackspeedperlevel: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub movespeed: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub attackrange: Option<f64>,
}

impl ChampionRecord {
    /// Recommended build fields that carry a non-blank value.
    pub fn build_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("Rune", &self.best_rune),
            ("Spells", &self.best_spell_combo),
            ("Starting items", &self.best_start),
            ("Boots", &self.best_boots),
            ("Core 3", &self.best_core3),
            ("Best ally", &self.synergy_top1),
            ("Hardest enemy", &self.enemy_hard_top1),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }

    pub fn base_stats(&self) -> Vec<(&'static str, f64)> {
        [
            ("Health", self.hp),
            ("Health / lvl", self.hpperlevel),
            ("Mana", self.mp),
            ("Mana / lvl", self.mpperlevel),
            ("Armor", self.armor),
            ("Armor / lvl", self.armorperlevel),
            ("Magic resist", self.spellblock),
            ("Magic resist / lvl", self.spellblockperlevel),
            ("Attack damage", self.attackdamage),
            ("Attack damage / lvl", self.attackdamageperlevel),
            ("Attack speed", self.attackspeed),
            ("Attack speed / lvl", self.attackspeedperlevel),
            ("Move speed", self.movespeed),
            ("Attack range", self.attackrange),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }

    /// Early/mid/late damage per minute, or `None` when no phase is known.
    pub fn phase_dpm(&self) -> Option<[(&'static str, Option<f64>); 3]> {
        let phases = [
            ("0-8 min", self.dpm_early),
            ("8-16 min", self.dpm_mid),
            ("16+ min", self.dpm_late),
        ];
        phases.iter().any(|(_, v)| v.is_some()).then_some(phases)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SpellComboRecord {
    #[serde(alias = "spells", alias = "combo", alias = "spell_pair")]
    pub spell_combo: String,
    #[serde(default, deserialize_with = "finite_option")]
    pub games: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub wins: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub winrate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ItemRecord {
    #[serde(alias = "item_name", alias = "item_id")]
    pub item: String,
    #[serde(default, deserialize_with = "finite_option")]
    pub games: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub wins: Option<f64>,
    #[serde(default, deserialize_with = "finite_option")]
    pub winrate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TimelineEvent {
    #[serde(default, deserialize_with = "finite_option")]
    pub minute: Option<f64>,
    #[serde(default, alias = "golddiff", deserialize_with = "finite_option")]
    pub gold_diff: Option<f64>,
}

/// Header spellings for the core rune, in order of preference.
pub const CORE_RUNE_COLUMNS: [&str; 4] = ["core_rune", "rune_core", "keystone", "rune_keystone"];

// One champion played in one match.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ParticipantRecord {
    #[serde(rename = "matchId", alias = "match_id")]
    pub match_id: String,
    pub champion: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub win: Option<bool>,
    #[serde(skip)]
    pub core_rune: Option<String>,
}

impl ParticipantRecord {
    /// Reads every participant row. The core rune comes from the first
    /// header in `CORE_RUNE_COLUMNS` the table carries; the others are ignored.
    pub fn from_table(table: &Table) -> Vec<ParticipantRecord> {
        let rune_idx = CORE_RUNE_COLUMNS.iter().find_map(|name| table.column_index(name));
        let headers = StringRecord::from(table.headers().to_vec());

        table
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| {
                let record = StringRecord::from(row.clone());
                let mut participant: ParticipantRecord = match record.deserialize(Some(&headers)) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::debug!(row = idx + 1, error = %e, "skipping participant row");
                        return None;
                    }
                };
                participant.core_rune = rune_idx
                    .map(|i| row[i].trim())
                    .filter(|rune| !rune.is_empty())
                    .map(str::to_string);
                Some(participant)
            })
            .collect()
    }
}

/// Numeric cell as a finite number; blank, junk, `nan` and `inf` are `None`.
fn finite_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_number))
}

/// Accepts the spellings a dataframe export produces for booleans.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "win" => Some(true),
        "false" | "0" | "0.0" | "lose" | "loss" => Some(false),
        _ => None,
    }))
}

/// Win rate in percent: the supplied column when present, else wins/games.
pub fn effective_win_rate(winrate: Option<f64>, wins: Option<f64>, games: Option<f64>) -> Option<f64> {
    winrate.or_else(|| match (wins, games) {
        (Some(w), Some(g)) if g > 0.0 => Some(w / g * 100.0),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Table {
        Table::from_csv_bytes(csv.as_bytes(), "test.csv").unwrap()
    }

    #[test]
    fn champion_record_tolerates_missing_and_junk_columns() {
        let t = table("champion,games,winrate,best_rune,unknown\nAhri,12,n/a,Electrocute,x\nLux,,51.5,,\n");
        let records: Vec<ChampionRecord> = t.records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].games, Some(12.0));
        assert_eq!(records[0].winrate, None);
        assert_eq!(records[0].best_rune.as_deref(), Some("Electrocute"));
        assert_eq!(records[0].kda, None);
        assert_eq!(records[1].games, None);
        assert_eq!(records[1].winrate, Some(51.5));
        assert_eq!(records[1].best_rune, None);
    }

    #[test]
    fn build_fields_skip_blank_values() {
        let t = table("champion,best_rune,best_boots,synergy_top1\nAhri,Electrocute,  ,Lux\n");
        let record: ChampionRecord = t.records().remove(0);
        assert_eq!(
            record.build_fields(),
            vec![("Rune", "Electrocute"), ("Best ally", "Lux")]
        );
    }

    #[test]
    fn phase_dpm_requires_at_least_one_phase() {
        let t = table("champion,dpm_mid\nAhri,900\nLux,\n");
        let records: Vec<ChampionRecord> = t.records();
        let phases = records[0].phase_dpm().unwrap();
        assert_eq!(phases[1], ("8-16 min", Some(900.0)));
        assert!(records[1].phase_dpm().is_none());
    }

    #[test]
    fn non_finite_numbers_read_as_missing() {
        let t = table("champion,games,winrate,kda\nAhri,10,nan,inf\nLux,-inf,NaN,3.5\n");
        let records: Vec<ChampionRecord> = t.records();

        assert_eq!(records[0].games, Some(10.0));
        assert_eq!(records[0].winrate, None);
        assert_eq!(records[0].kda, None);
        assert_eq!(records[1].games, None);
        assert_eq!(records[1].winrate, None);
        assert_eq!(records[1].kda, Some(3.5));
    }

    #[test]
    fn participant_win_accepts_dataframe_spellings() {
        let t = table("matchId,champion,win,keystone\nKR_1,Ahri,True,Electrocute\nKR_1,Lux,0,Arcane Comet\nKR_2,Zed,maybe,\n");
        let rows = ParticipantRecord::from_table(&t);
        assert_eq!(rows[0].win, Some(true));
        assert_eq!(rows[0].core_rune.as_deref(), Some("Electrocute"));
        assert_eq!(rows[1].win, Some(false));
        assert_eq!(rows[2].win, None);
        assert_eq!(rows[2].core_rune, None);
    }

    #[test]
    fn several_rune_columns_keep_every_row() {
        let t = table("matchId,champion,win,keystone,rune_keystone\nKR_1,Ahri,1,Electrocute,8112\n");
        let rows = ParticipantRecord::from_table(&t);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].core_rune.as_deref(), Some("Electrocute"));

        let t = table("matchId,champion,win,rune_keystone,core_rune\nKR_1,Ahri,1,8112,Dark Harvest\n");
        let rows = ParticipantRecord::from_table(&t);
        assert_eq!(rows[0].core_rune.as_deref(), Some("Dark Harvest"));
    }

    #[test]
    fn effective_win_rate_prefers_supplied_value() {
        assert_eq!(effective_win_rate(Some(40.0), Some(1.0), Some(2.0)), Some(40.0));
        assert_eq!(effective_win_rate(None, Some(1.0), Some(4.0)), Some(25.0));
        assert_eq!(effective_win_rate(None, Some(1.0), Some(0.0)), None);
    }
}
