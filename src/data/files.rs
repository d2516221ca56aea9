/// The well-known CSV files a data directory may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataFile {
    MasterPlus,
    Master,
    Summary,
    BaseStats,
    Spell,
    Item,
    TimelineKills,
    TimelineFirstDeaths,
    TimelineFirstTowers,
    TimelineGameEnd,
    TimelineItemPurchases,
    TimelineGoldDiff,
    Participants,
}

impl DataFile {
    /// Tables loaded opportunistically next to the master, in display order.
    pub const OPTIONAL: [DataFile; 9] = [
        DataFile::Spell,
        DataFile::Item,
        DataFile::TimelineKills,
        DataFile::TimelineFirstDeaths,
        DataFile::TimelineFirstTowers,
        DataFile::TimelineGameEnd,
        DataFile::TimelineItemPurchases,
        DataFile::TimelineGoldDiff,
        DataFile::Participants,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            DataFile::MasterPlus => "champion_master_plus.csv",
            DataFile::Master => "champion_master.csv",
            DataFile::Summary => "champion_summary.csv",
            DataFile::BaseStats => "champion_base_stats.csv",
            DataFile::Spell => "spell_summary.csv",
            DataFile::Item => "item_summary.csv",
            DataFile::TimelineKills => "timeline_kills.csv",
            DataFile::TimelineFirstDeaths => "timeline_first_deaths.csv",
            DataFile::TimelineFirstTowers => "timeline_first_towers.csv",
            DataFile::TimelineGameEnd => "timeline_game_end.csv",
            DataFile::TimelineItemPurchases => "timeline_item_purchases.csv",
            DataFile::TimelineGoldDiff => "timeline_gold_diff.csv",
            DataFile::Participants => "aram_participants_with_full_runes_merged.csv",
        }
    }

    /// Short name used on the command line and for export file names.
    pub fn key(&self) -> &'static str {
        self.file_name().trim_end_matches(".csv")
    }

    pub fn from_key(key: &str) -> Option<DataFile> {
        let key = key.trim().trim_end_matches(".csv");
        DataFile::OPTIONAL.into_iter().find(|file| file.key() == key)
    }

    pub fn is_timeline(&self) -> bool {
        matches!(
            self,
            DataFile::TimelineKills
                | DataFile::TimelineFirstDeaths
                | DataFile::TimelineFirstTowers
                | DataFile::TimelineGameEnd
                | DataFile::TimelineItemPurchases
                | DataFile::TimelineGoldDiff
        )
    }
}

/// A table the session can show or export: the resolved master or one of
/// the optional files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Master,
    Optional(DataFile),
}

impl TableKind {
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Master => "champion_master",
            TableKind::Optional(file) => file.key(),
        }
    }

    pub fn parse(name: &str) -> Option<TableKind> {
        match name.trim() {
            "master" | "champion_master" => Some(TableKind::Master),
            other => DataFile::from_key(other).map(TableKind::Optional),
        }
    }

    pub fn all() -> impl Iterator<Item = TableKind> {
        std::iter::once(TableKind::Master).chain(DataFile::OPTIONAL.into_iter().map(TableKind::Optional))
    }

    /// Fixed download file name for this kind of table.
    pub fn export_file_name(&self) -> String {
        format!("{}_export.csv", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_for_optional_tables() {
        for file in DataFile::OPTIONAL {
            assert_eq!(DataFile::from_key(file.key()), Some(file));
        }
        assert_eq!(DataFile::from_key("timeline_kills.csv"), Some(DataFile::TimelineKills));
        assert_eq!(DataFile::from_key("champion_master"), None);
    }

    #[test]
    fn table_kinds_parse_and_name_exports() {
        assert_eq!(TableKind::parse("master"), Some(TableKind::Master));
        assert_eq!(
            TableKind::parse("timeline_gold_diff"),
            Some(TableKind::Optional(DataFile::TimelineGoldDiff))
        );
        assert_eq!(TableKind::parse("champion_summary"), None);
        assert_eq!(TableKind::Master.export_file_name(), "champion_master_export.csv");
        assert_eq!(TableKind::all().count(), 10);
    }
}
