use crate::data::models::{effective_win_rate, ItemRecord, SpellComboRecord};

/// A summary row that can be ranked by win rate.
pub trait Rankable {
    fn label(&self) -> &str;
    fn games(&self) -> Option<f64>;
    fn win_rate(&self) -> Option<f64>;
}

impl Rankable for SpellComboRecord {
    fn label(&self) -> &str {
        &self.spell_combo
    }

    fn games(&self) -> Option<f64> {
        self.games
    }

    fn win_rate(&self) -> Option<f64> {
        effective_win_rate(self.winrate, self.wins, self.games)
    }
}

impl Rankable for ItemRecord {
    fn label(&self) -> &str {
        &self.item
    }

    fn games(&self) -> Option<f64> {
        self.games
    }

    fn win_rate(&self) -> Option<f64> {
        effective_win_rate(self.winrate, self.wins, self.games)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub name: String,
    pub games: Option<f64>,
    pub win_rate: f64,
}

pub struct Ranker;

impl Ranker {
    /// Ranks rows by win rate (highest first). With a `min_games` filter,
    /// rows whose game count is unknown or below it are left out.
    pub fn rank<T: Rankable>(rows: &[T], min_games: Option<f64>, top_n: usize) -> Vec<RankedEntry> {
        let mut ranked: Vec<RankedEntry> = rows
            .iter()
            .filter(|r| match min_games {
                Some(min) => r.games().map_or(false, |g| g >= min),
                None => true,
            })
            .filter_map(|r| {
                r.win_rate().map(|win_rate| RankedEntry {
                    name: r.label().to_string(),
                    games: r.games(),
                    win_rate,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.win_rate
                .partial_cmp(&a.win_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(top_n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    #[test]
    fn spells_rank_by_supplied_or_derived_win_rate() {
        let table = Table::from_csv_bytes(
            b"spell_combo,games,wins,winrate\nFlash+Mark,100,50,\nFlash+Heal,40,,62.5\nGhost+Mark,3,3,\n",
            "spell_summary.csv",
        )
        .unwrap();
        let spells: Vec<SpellComboRecord> = table.records();

        let all = Ranker::rank(&spells, None, 10);
        let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ghost+Mark", "Flash+Heal", "Flash+Mark"]);

        let filtered = Ranker::rank(&spells, Some(10.0), 1);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Flash+Heal");
        assert_eq!(filtered[0].win_rate, 62.5);
    }

    #[test]
    fn items_without_any_rate_are_dropped() {
        let table = Table::from_csv_bytes(b"item_name,games\nBoots,10\n", "item_summary.csv").unwrap();
        let items: Vec<ItemRecord> = table.records();
        assert_eq!(items[0].item, "Boots");
        assert!(Ranker::rank(&items, None, 5).is_empty());
    }
}
