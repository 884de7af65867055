// src/evaluator/mod.rs — Anomaly decision engine

pub mod diversity;

use crate::core::types::*;
use crate::infra::config::EvaluatorConfig;
use diversity::diversity_check;

const INSUFFICIENT_SAMPLE_CONFIDENCE: f64 = 0.2;
const LOW_DIVERSITY_CONFIDENCE: f64 = 0.3;
const NOT_SIGNIFICANT_CONFIDENCE: f64 = 0.4;
const MAX_CONFIDENCE: f64 = 0.99;

const SUMMARY_DELIMITER: &str = "\n---\n";

/// Turns a cycle's signal and evidence into a confirm/reject decision.
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluatorConfig::default())
    }
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Rules, first match wins:
    /// 1. too few samples → reject (0.2)
    /// 2. high z and mostly negative → confirm if the evidence is diverse,
    ///    otherwise reject (0.3)
    /// 3. anything else → reject (0.4)
    ///
    /// Low-confidence decisions ask the planner for a larger sample.
    pub fn evaluate_candidate(&self, signal: &Signal, evidence: &[Item]) -> Decision {
        let cfg = &self.config;

        let (verdict, confidence, reason) = if signal.sample_count < cfg.min_sample_count {
            (
                Verdict::Reject,
                INSUFFICIENT_SAMPLE_CONFIDENCE,
                ReasonCode::InsufficientSample,
            )
        } else if signal.z_score > cfg.z_threshold
            && signal.negative_fraction > cfg.negative_fraction_threshold
        {
            if diversity_check(evidence, cfg.min_distinct_authors) {
                let confidence = (0.5 + signal.z_score / 10.0 + signal.negative_fraction / 2.0)
                    .clamp(0.0, MAX_CONFIDENCE);
                (Verdict::Confirm, confidence, ReasonCode::HighZAndNeg)
            } else {
                (
                    Verdict::Reject,
                    LOW_DIVERSITY_CONFIDENCE,
                    ReasonCode::LowDiversity,
                )
            }
        } else {
            (
                Verdict::Reject,
                NOT_SIGNIFICANT_CONFIDENCE,
                ReasonCode::NotSignificant,
            )
        };

        let suggested_adjustment = (confidence < cfg.adjust_below_confidence)
            .then(|| PolicyAdjustment::sample_size(cfg.sample_size_bump));

        Decision {
            verdict,
            confidence,
            reason_codes: vec![reason],
            suggested_adjustment,
        }
    }

    /// First few items' text joined for human review. No effect on decisions.
    pub fn summarize_evidence(&self, items: &[Item]) -> String {
        items
            .iter()
            .take(self.config.summary_items)
            .map(Item::text)
            .collect::<Vec<_>>()
            .join(SUMMARY_DELIMITER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn signal(n: u64, z: f64, neg: f64) -> Signal {
        Signal {
            sample_count: n,
            negative_fraction: neg,
            mean_score: -0.5,
            z_score: z,
        }
    }

    fn evidence(authors: &[&str]) -> Vec<Item> {
        authors
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let mut item = Item::new(i.to_string(), format!("raw {i}"), *a, Utc::now());
                item.cleaned_text = Some(format!("post {i}"));
                item
            })
            .collect()
    }

    #[test]
    fn test_insufficient_sample_short_circuits() {
        let e = Evaluator::default();
        for (z, neg) in [(0.0, 0.0), (10.0, 1.0), (-5.0, 0.9)] {
            let d = e.evaluate_candidate(&signal(9, z, neg), &evidence(&["a", "b", "c"]));
            assert_eq!(d.verdict, Verdict::Reject);
            assert_eq!(d.confidence, 0.2);
            assert_eq!(d.reason_codes, vec![ReasonCode::InsufficientSample]);
        }
    }

    #[test]
    fn test_confirm_clamps_confidence() {
        let d = Evaluator::default()
            .evaluate_candidate(&signal(50, 3.0, 0.6), &evidence(&["a", "b", "c"]));
        assert_eq!(d.verdict, Verdict::Confirm);
        assert_eq!(d.confidence, 0.99);
        assert_eq!(d.reason(), "high_z_and_neg");
        assert!(d.suggested_adjustment.is_none());
    }

    #[test]
    fn test_confirm_unclamped_confidence() {
        // 0.5 + 1.0/10 + 0.6/2
        let cfg = EvaluatorConfig {
            z_threshold: 0.5,
            ..Default::default()
        };
        let d = Evaluator::new(cfg)
            .evaluate_candidate(&signal(50, 1.0, 0.6), &evidence(&["a", "b", "c"]));
        assert_eq!(d.verdict, Verdict::Confirm);
        assert!((d.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_single_author_is_low_diversity() {
        let d = Evaluator::default()
            .evaluate_candidate(&signal(50, 3.0, 0.6), &evidence(&["a", "a", "a", "a"]));
        assert_eq!(d.verdict, Verdict::Reject);
        assert_eq!(d.confidence, 0.3);
        assert!(d.has_reason(ReasonCode::LowDiversity));
        assert_eq!(d.suggested_adjustment, Some(PolicyAdjustment::sample_size(50)));
    }

    #[test]
    fn test_below_threshold_is_not_significant() {
        let d = Evaluator::default()
            .evaluate_candidate(&signal(50, 1.0, 0.9), &evidence(&["a", "b", "c"]));
        assert_eq!(d.verdict, Verdict::Reject);
        assert_eq!(d.confidence, 0.4);
        assert!(d.has_reason(ReasonCode::NotSignificant));
    }

    #[test]
    fn test_high_z_but_mostly_positive_is_not_significant() {
        let d = Evaluator::default()
            .evaluate_candidate(&signal(50, 4.0, 0.5), &evidence(&["a", "b", "c"]));
        assert!(d.has_reason(ReasonCode::NotSignificant));
    }

    #[test]
    fn test_adjustment_iff_low_confidence() {
        let e = Evaluator::default();
        let cases = [
            signal(5, 0.0, 0.0),
            signal(50, 1.0, 0.1),
            signal(50, 3.0, 0.6),
        ];
        for s in cases {
            for authors in [&["a"][..], &["a", "b", "c"][..]] {
                let d = e.evaluate_candidate(&s, &evidence(authors));
                if d.confidence < 0.5 {
                    assert_eq!(
                        d.suggested_adjustment.and_then(|a| a.sample_size_delta),
                        Some(50)
                    );
                } else {
                    assert!(d.suggested_adjustment.is_none());
                }
            }
        }
    }

    #[test]
    fn test_summarize_first_five_cleaned() {
        let items = evidence(&["a", "b", "c", "d", "e", "f", "g"]);
        let summary = Evaluator::default().summarize_evidence(&items);
        assert_eq!(summary, "post 0\n---\npost 1\n---\npost 2\n---\npost 3\n---\npost 4");
    }

    #[test]
    fn test_summarize_falls_back_to_raw_text() {
        let items = vec![Item::new("1", "raw only", "a", Utc::now())];
        assert_eq!(Evaluator::default().summarize_evidence(&items), "raw only");
        assert_eq!(Evaluator::default().summarize_evidence(&[]), "");
    }
}
