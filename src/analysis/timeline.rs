use crate::data::models::TimelineEvent;
use std::collections::BTreeMap;

/// Events that fell inside one whole minute of game time.
#[derive(Debug, Clone, PartialEq)]
pub struct MinuteBucket {
    pub minute: u32,
    pub count: usize,
    pub mean_gold_diff: Option<f64>,
}

/// Buckets events by whole minute, in minute order. Events without a usable
/// minute are skipped.
pub fn minute_histogram(events: &[TimelineEvent]) -> Vec<MinuteBucket> {
    let mut buckets: BTreeMap<u32, (usize, f64, usize)> = BTreeMap::new();

    for event in events {
        let Some(minute) = event.minute.filter(|m| *m >= 0.0) else {
            continue;
        };
        let entry = buckets.entry(minute.floor() as u32).or_insert((0, 0.0, 0));
        entry.0 += 1;
        if let Some(diff) = event.gold_diff {
            entry.1 += diff;
            entry.2 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(minute, (count, gold_sum, gold_count))| MinuteBucket {
            minute,
            count,
            mean_gold_diff: (gold_count > 0).then(|| gold_sum / gold_count as f64),
        })
        .collect()
}
