use tracing::info;

use crate::classify::{classify, classify_for_progress};
use crate::config::TierThresholds;
use crate::models::{
    AssignmentRecord, EntryOutcome, GradeSummary, HighlightTier, NormalizedScore, Rollup,
};
use crate::score;

/// Tier for a counted score. A possible value of zero or less keeps the baseline.
pub fn highlight_for(score: &NormalizedScore, thresholds: &TierThresholds) -> HighlightTier {
    let Ok(ratio) = score.ratio() else {
        return HighlightTier::Counted;
    };

    if (ratio - 1.0).abs() < thresholds.perfect_tolerance {
        HighlightTier::Counted
    } else if ratio > thresholds.near_perfect_ratio {
        HighlightTier::NearPerfect
    } else {
        HighlightTier::NeedsAttention
    }
}

/// Single pass over a snapshot. Entries come back in input order.
pub fn aggregate(records: &[AssignmentRecord], thresholds: &TierThresholds) -> Rollup {
    let rollup = records
        .iter()
        .fold(Rollup::default(), |mut rollup, record| {
            let classification = classify(record);
            let highlight = match classification.score {
                Some(score) => {
                    rollup.summary.total_earned += score.earned;
                    rollup.summary.total_possible += score.possible;
                    highlight_for(&score, thresholds)
                }
                None => HighlightTier::Uncounted,
            };

            let counts_toward_progress = match classify_for_progress(record) {
                Ok(score) => {
                    rollup.summary.total_possible_graded_to_date += score.possible;
                    true
                }
                Err(_) => false,
            };

            rollup.entries.push(EntryOutcome {
                title: record.title.clone(),
                mode: score::detect_mode(record),
                inclusion: classification.tier,
                highlight,
                colour: highlight.colour(),
                score: classification.score,
                counts_toward_progress,
            });
            rollup
        });

    log_totals(&rollup.summary, rollup.entries.len());
    rollup
}

fn log_totals(summary: &GradeSummary, entries: usize) {
    info!(
        entries,
        earned = summary.total_earned,
        possible = summary.total_possible,
        graded_to_date = summary.total_possible_graded_to_date,
        "grade pass complete"
    );
}
