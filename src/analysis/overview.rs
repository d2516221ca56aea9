use crate::data::models::ChampionRecord;
use std::collections::HashSet;

pub const DEFAULT_TOP_N: usize = 10;

/// Headline numbers for the overview screen. A `None` field means the
/// column it comes from is absent and the metric is not shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub champion_count: usize,
    pub total_games: Option<u64>,
    pub avg_win_rate: Option<f64>,
    pub avg_pick_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    WinRate,
    PickRate,
}

impl Metric {
    pub fn column(&self) -> &'static str {
        match self {
            Metric::WinRate => "winrate",
            Metric::PickRate => "pickrate",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::WinRate => "Win rate",
            Metric::PickRate => "Pick rate",
        }
    }

    fn value(&self, record: &ChampionRecord) -> Option<f64> {
        match self {
            Metric::WinRate => record.winrate,
            Metric::PickRate => record.pickrate,
        }
    }
}

impl Overview {
    pub fn compute(records: &[ChampionRecord]) -> Self {
        let champion_count = records
            .iter()
            .map(|r| r.champion.as_str())
            .collect::<HashSet<_>>()
            .len();

        let games: Vec<f64> = records.iter().filter_map(|r| r.games).collect();
        let total_games = (!games.is_empty()).then(|| games.iter().sum::<f64>() as u64);

        Overview {
            champion_count,
            total_games,
            avg_win_rate: mean(records.iter().filter_map(|r| r.winrate)),
            avg_pick_rate: mean(records.iter().filter_map(|r| r.pickrate)),
        }
    }
}

/// Highest `n` champions by `metric`. Missing values are dropped and ties
/// keep table order.
pub fn top_by(records: &[ChampionRecord], metric: Metric, n: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = records
        .iter()
        .filter_map(|r| metric.value(r).map(|v| (r.champion.clone(), v)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);
    ranked
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    fn records(csv: &str) -> Vec<ChampionRecord> {
        Table::from_csv_bytes(csv.as_bytes(), "t").unwrap().records()
    }

    #[test]
    fn overview_skips_absent_columns() {
        let rows = records("champion,games\nAhri,10\nLux,30\nAhri,5\n");
        let overview = Overview::compute(&rows);

        assert_eq!(overview.champion_count, 2);
        assert_eq!(overview.total_games, Some(45));
        assert_eq!(overview.avg_win_rate, None);
        assert_eq!(overview.avg_pick_rate, None);
    }

    #[test]
    fn averages_ignore_blank_cells() {
        let rows = records("champion,winrate\nAhri,50\nLux,\nZed,60\n");
        assert_eq!(Overview::compute(&rows).avg_win_rate, Some(55.0));
    }

    #[test]
    fn averages_and_rankings_ignore_nan_and_inf() {
        let rows = records("champion,winrate\nAhri,50\nLux,nan\nZed,inf\n");
        assert_eq!(Overview::compute(&rows).avg_win_rate, Some(50.0));

        let top = top_by(&rows, Metric::WinRate, 10);
        assert_eq!(top, vec![("Ahri".to_string(), 50.0)]);
    }

    #[test]
    fn top_by_sorts_descending_and_keeps_tie_order() {
        let rows = records("champion,winrate\nAhri,50\nLux,\nZed,60\nSona,50\n");
        let top = top_by(&rows, Metric::WinRate, 10);
        let names: Vec<&str> = top.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Ahri", "Sona"]);

        assert_eq!(top_by(&rows, Metric::WinRate, 1).len(), 1);
        assert!(top_by(&rows, Metric::PickRate, 10).is_empty());
    }
}
