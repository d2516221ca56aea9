use crate::analysis::champion_stats::RuneStats;
use crate::analysis::overview::Overview;
use crate::analysis::rankings::RankedEntry;
use crate::analysis::timeline::MinuteBucket;
use crate::cache::CacheStats;
use crate::data::models::ChampionRecord;
use crate::session::Selection;
use crate::table::Table;
use chrono::{DateTime, Local, Utc};
use colored::*;
use tabled::{builder::Builder, settings::Style, Table as TextTable, Tabled};

const BAR_WIDTH: usize = 40;

#[derive(Tabled)]
struct RankRow {
    rank: String,
    name: String,
    games: String,
    win_rate: String,
}

#[derive(Tabled)]
struct RuneRow {
    champion: String,
    core_rune: String,
    games: String,
    wins: String,
    win_rate: String,
}

#[derive(Tabled)]
struct StatRow {
    stat: String,
    value: String,
}

#[derive(Tabled)]
struct TableInfoRow {
    table: String,
    rows: String,
    columns: String,
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message.yellow());
}

fn heading(title: &str, width: usize) {
    println!("\n{}", title.bold().cyan());
    println!("{}\n", "=".repeat(width).cyan());
}

pub fn display_source(label: &str, rows: usize, columns: usize) {
    println!(
        "{} {} ({} champions, {} columns)",
        "📁 Data source:".bold(),
        label.green(),
        rows,
        columns
    );
}

pub fn display_overview(overview: &Overview, top_win: &[(String, f64)], top_pick: &[(String, f64)]) {
    heading("📊 OVERVIEW", 60);

    println!("{} {}", "Champions:".bold(), overview.champion_count);
    if let Some(total) = overview.total_games.filter(|t| *t > 0) {
        println!("{} {}", "Total games (sample):".bold(), total);
    }
    if let Some(avg) = overview.avg_win_rate {
        println!("{} {:.2}%", "Average win rate:".bold(), avg);
    }
    if let Some(avg) = overview.avg_pick_rate {
        println!("{} {:.2}%", "Average pick rate:".bold(), avg);
    }

    if overview.avg_win_rate.is_some() {
        if top_win.is_empty() {
            println!("\n{}", "Not enough win rate data".yellow());
        } else {
            display_bar_chart(&format!("Win rate TOP {}", top_win.len()), top_win, "%");
        }
    }
    if !top_pick.is_empty() {
        display_bar_chart(&format!("Pick rate TOP {}", top_pick.len()), top_pick, "%");
    }
    println!();
}

/// Horizontal bars scaled to the largest value.
pub fn display_bar_chart(title: &str, entries: &[(String, f64)], unit: &str) {
    println!("\n{}", title.bold().yellow());

    let max = entries.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    for (label, value) in entries {
        let len = if max > 0.0 {
            ((value.max(0.0) / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let padding = " ".repeat(label_width - label.chars().count());
        println!(
            "  {}{} {} {:.2}{}",
            label,
            padding,
            "█".repeat(len).cyan(),
            value,
            unit
        );
    }
}

pub fn display_champion(record: &ChampionRecord) {
    heading(&format!("🧩 {}", record.champion), 60);

    let mut kpis = vec![];
    if let Some(v) = record.winrate {
        kpis.push(format!("Win rate {:.2}%", v));
    }
    if let Some(v) = record.pickrate {
        kpis.push(format!("Pick rate {:.2}%", v));
    }
    if let Some(v) = record.games {
        kpis.push(format!("Games {}", v as u64));
    }
    if let Some(v) = record.kda {
        kpis.push(format!("KDA {:.2}", v));
    }
    if let Some(v) = record.avg_dpm {
        kpis.push(format!("DPM {:.0}", v));
    }
    if let Some(v) = record.avg_gpm {
        kpis.push(format!("GPM {:.0}", v));
    }
    if !kpis.is_empty() {
        println!("{}", kpis.join("  |  ").bold());
    }

    if let Some(delta) = record.delta_winrate {
        let text = format!("📈 Recent win rate change: {:+.2}%p", delta);
        if delta >= 0.0 {
            println!("{}", text.green());
        } else {
            println!("{}", text.red());
        }
    }

    let build = record.build_fields();
    if !build.is_empty() {
        println!("\n{}", "Recommended build".bold().yellow());
        for (label, value) in build {
            println!("  • {}: {}", label.bold(), value);
        }
    }

    let stats = record.base_stats();
    if !stats.is_empty() {
        println!("\n{}", "Base stats".bold().yellow());
        let rows: Vec<StatRow> = stats
            .into_iter()
            .map(|(stat, value)| StatRow {
                stat: stat.to_string(),
                value: format!("{:.2}", value),
            })
            .collect();
        let mut table = TextTable::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }

    match record.phase_dpm() {
        Some(phases) => {
            let entries: Vec<(String, f64)> = phases
                .iter()
                .filter_map(|(phase, v)| v.map(|v| (phase.to_string(), v)))
                .collect();
            display_bar_chart("DPM by game phase", &entries, "");
        }
        None => println!("\n{}", "No phase DPM columns".dimmed()),
    }
    println!();
}

pub fn display_table_list(tables: &[(&str, Option<&Table>)]) {
    heading("📄 TABLES", 60);

    let rows: Vec<TableInfoRow> = tables
        .iter()
        .map(|(name, table)| match table {
            Some(t) => TableInfoRow {
                table: name.to_string(),
                rows: t.len().to_string(),
                columns: t.width().to_string(),
            },
            None => TableInfoRow {
                table: name.to_string(),
                rows: "not present".yellow().to_string(),
                columns: "-".to_string(),
            },
        })
        .collect();

    let mut table = TextTable::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

pub fn display_table_preview(name: &str, table: &Table, max_rows: usize) {
    heading(&format!("#### {}", name), 60);

    let mut builder = Builder::default();
    builder.push_record(table.headers().iter().cloned());
    for row in table.rows().iter().take(max_rows) {
        builder.push_record(row.iter().cloned());
    }
    let mut text = builder.build();
    text.with(Style::rounded());
    println!("{}", text);

    if table.len() > max_rows {
        println!("{}", format!("… {} more rows", table.len() - max_rows).dimmed());
    }
    println!();
}

pub fn display_rune_summary(rows: &[RuneStats]) {
    heading("🔮 CHAMPION × CORE RUNE", 70);

    if rows.is_empty() {
        println!("{}", "No rune data for this selection".yellow());
        return;
    }

    let rows: Vec<RuneRow> = rows
        .iter()
        .map(|s| RuneRow {
            champion: s.champion.clone(),
            core_rune: s.core_rune.clone(),
            games: s.games.to_string(),
            wins: s.wins.to_string(),
            win_rate: format!("{:.1}%", s.win_rate()),
        })
        .collect();

    let mut table = TextTable::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

pub fn display_rankings(title: &str, entries: &[RankedEntry], min_games: Option<f64>) {
    heading(title, 60);

    if let Some(min) = min_games {
        println!("{}\n", format!("Minimum games: {}", min).dimmed());
    }
    if entries.is_empty() {
        println!("{}", "No rows match the current filter".yellow());
        return;
    }

    let rows: Vec<RankRow> = entries
        .iter()
        .enumerate()
        .map(|(idx, e)| RankRow {
            rank: format!("#{}", idx + 1),
            name: e.name.clone(),
            games: e.games.map(|g| format!("{}", g as u64)).unwrap_or_else(|| "-".to_string()),
            win_rate: format!("{:.2}%", e.win_rate),
        })
        .collect();

    let mut table = TextTable::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

pub fn display_histogram(title: &str, buckets: &[MinuteBucket]) {
    heading(&format!("⏱️ {}", title), 60);

    if buckets.is_empty() {
        println!("{}", "No events with a minute value".yellow());
        return;
    }

    let counts: Vec<(String, f64)> = buckets
        .iter()
        .map(|b| (format!("{:>3} min", b.minute), b.count as f64))
        .collect();
    display_bar_chart("Events per minute", &counts, "");

    let gold: Vec<(String, f64)> = buckets
        .iter()
        .filter_map(|b| b.mean_gold_diff.map(|g| (format!("{:>3} min", b.minute), g)))
        .collect();
    if !gold.is_empty() {
        println!("\n{}", "Mean gold difference".bold().yellow());
        for (minute, diff) in gold {
            let text = format!("{:+.0}", diff);
            let text = if diff >= 0.0 { text.green() } else { text.red() };
            println!("  {} {}", minute, text);
        }
    }
    println!();
}

pub fn display_session_status(
    source: &str,
    selection: &Selection,
    stats: CacheStats,
    last_loaded: Option<DateTime<Utc>>,
) {
    println!("\n📊 Session (source: {})", source);
    println!(
        "   Selected champion: {}",
        selection.champion.as_deref().unwrap_or("-")
    );
    match selection.min_games {
        Some(min) => println!("   Minimum games: {}", min),
        None => println!("   Minimum games: -"),
    }
    println!(
        "   Cache: {} tables, {} hits, {} reads",
        stats.entries, stats.hits, stats.misses
    );
    if let Some(at) = last_loaded {
        println!(
            "   Last loaded: {}\n",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
    }
}
