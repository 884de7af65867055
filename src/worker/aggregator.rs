// src/worker/aggregator.rs — Batch → Signal reduction

use chrono::Duration;

use crate::core::types::{Item, Signal};
use crate::infra::config::BaselineConfig;

/// Lower bound on the baseline standard deviation.
pub const MIN_BASELINE_STD: f64 = 1e-3;

/// Items whose timestamp lies within `window` of the newest item. `None`, a
/// non-positive window, or a window reaching past the clock's range keeps
/// everything.
pub fn select_window(items: &[Item], window: Option<Duration>) -> Vec<&Item> {
    let Some(window) = window.filter(|w| *w > Duration::zero()) else {
        return items.iter().collect();
    };
    let Some(newest) = items.iter().map(|i| i.timestamp).max() else {
        return Vec::new();
    };
    match newest.checked_sub_signed(window) {
        Some(cutoff) => items.iter().filter(|i| i.timestamp >= cutoff).collect(),
        None => items.iter().collect(),
    }
}

/// Count, negative fraction, mean score and z-score against the baseline.
/// Unscored items count toward the sample with a score of zero.
pub fn compute_signal<'a>(
    items: impl IntoIterator<Item = &'a Item>,
    baseline: &BaselineConfig,
) -> Signal {
    let mut n = 0u64;
    let mut negatives = 0u64;
    let mut total = 0.0f64;
    for item in items {
        n += 1;
        if item.is_negative() {
            negatives += 1;
        }
        total += item.sentiment.map(|s| s.score).unwrap_or(0.0);
    }

    let denom = n.max(1) as f64;
    let mean_score = total / denom;
    let std = if baseline.std_dev.is_finite() {
        baseline.std_dev.max(MIN_BASELINE_STD)
    } else {
        MIN_BASELINE_STD
    };

    Signal {
        sample_count: n,
        negative_fraction: negatives as f64 / denom,
        mean_score,
        z_score: (mean_score - baseline.mean) / std,
    }
}

pub fn aggregate(items: &[Item], baseline: &BaselineConfig, window: Option<Duration>) -> Signal {
    compute_signal(select_window(items, window), baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Sentiment, SentimentLabel};
    use chrono::{TimeZone, Utc};

    fn scored(id: &str, label: SentimentLabel, score: f64, minute: u32) -> Item {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 12, minute, 0).unwrap();
        let mut item = Item::new(id, "t", "u", ts);
        item.sentiment = Some(Sentiment::new(label, score, 0.9));
        item
    }

    #[test]
    fn test_empty_batch() {
        let s = aggregate(&[], &BaselineConfig::default(), None);
        assert_eq!(s.sample_count, 0);
        assert_eq!(s.negative_fraction, 0.0);
        assert_eq!(s.mean_score, 0.0);
        assert!((s.z_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_signal_math() {
        let items = vec![
            scored("1", SentimentLabel::Negative, -0.8, 0),
            scored("2", SentimentLabel::Negative, -0.8, 1),
            scored("3", SentimentLabel::Positive, 0.8, 2),
            scored("4", SentimentLabel::Neutral, 0.0, 3),
        ];
        let s = aggregate(&items, &BaselineConfig::default(), None);
        assert_eq!(s.sample_count, 4);
        assert!((s.negative_fraction - 0.5).abs() < 1e-9);
        assert!((s.mean_score - -0.2).abs() < 1e-9);
        // (-0.2 - -0.1) / 0.2
        assert!((s.z_score - -0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_std_is_floored() {
        let baseline = BaselineConfig {
            mean: 0.0,
            std_dev: 0.0,
        };
        let items = vec![scored("1", SentimentLabel::Positive, 0.5, 0)];
        let s = aggregate(&items, &baseline, None);
        assert!(s.z_score.is_finite());
        assert!((s.z_score - 0.5 / MIN_BASELINE_STD).abs() < 1e-6);
    }

    #[test]
    fn test_unscored_items_count_as_zero() {
        let mut items = vec![scored("1", SentimentLabel::Negative, -1.0, 0)];
        items.push(Item::new("2", "t", "u", Utc::now()));
        let s = compute_signal(&items, &BaselineConfig::default());
        assert_eq!(s.sample_count, 2);
        assert!((s.mean_score - -0.5).abs() < 1e-9);
        assert!((s.negative_fraction - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_window_keeps_recent_items_only() {
        let items = vec![
            scored("old", SentimentLabel::Positive, 0.8, 0),
            scored("mid", SentimentLabel::Negative, -0.8, 8),
            scored("new", SentimentLabel::Negative, -0.8, 10),
        ];
        let selected = select_window(&items, Some(Duration::minutes(5)));
        let ids: Vec<_> = selected.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["mid", "new"]);

        let s = aggregate(&items, &BaselineConfig::default(), Some(Duration::minutes(5)));
        assert_eq!(s.sample_count, 2);
        assert_eq!(s.negative_fraction, 1.0);
    }

    #[test]
    fn test_window_past_clock_range_keeps_everything() {
        let items = vec![
            scored("old", SentimentLabel::Positive, 0.8, 0),
            scored("new", SentimentLabel::Negative, -0.8, 10),
        ];
        assert_eq!(select_window(&items, Some(Duration::MAX)).len(), 2);
        let huge = Duration::try_seconds(1_000_000_000_000).unwrap();
        assert_eq!(aggregate(&items, &BaselineConfig::default(), Some(huge)).sample_count, 2);
        assert_eq!(select_window(&items, Some(Duration::zero())).len(), 2);
    }
}
