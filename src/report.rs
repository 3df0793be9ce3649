use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::models::{EntryOutcome, HighlightTier, Rollup, ScoreMode, TierCount};

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(percent) => format!("{percent:.2}%"),
        None => "N/A".to_string(),
    }
}

pub fn count_by_tier(entries: &[EntryOutcome]) -> Vec<TierCount> {
    let mut map: std::collections::HashMap<HighlightTier, (usize, f64, f64)> =
        std::collections::HashMap::new();

    for entry in entries {
        let slot = map.entry(entry.highlight).or_insert((0, 0.0, 0.0));
        slot.0 += 1;
        if let Some(score) = entry.score {
            slot.1 += score.earned;
            slot.2 += score.possible;
        }
    }

    let mut counts: Vec<TierCount> = map
        .into_iter()
        .map(|(highlight, (count, earned, possible))| TierCount {
            highlight,
            count,
            earned,
            possible,
        })
        .collect();

    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.highlight.label().cmp(b.highlight.label()))
    });
    counts
}

fn score_cell(entry: &EntryOutcome) -> String {
    match (entry.score, entry.mode) {
        (Some(score), ScoreMode::Percentage) => format!("{:.2}%", score.earned),
        (Some(score), ScoreMode::Points) => format!("{:.2} / {:.2}", score.earned, score.possible),
        (None, _) => "-".to_string(),
    }
}

/// Plain-text panel printed by `summarize`.
pub fn render_summary(rollup: &Rollup, with_entries: bool) -> String {
    let summary = &rollup.summary;
    let mut output = String::new();

    let _ = writeln!(output, "Grade Summary");
    let _ = writeln!(output, "  Total Grade:    {:.2}", summary.total_earned);
    let _ = writeln!(output, "  Total Possible: {:.2}", summary.total_possible);
    let _ = writeln!(
        output,
        "  Percentage:     {}",
        format_percent(summary.current_grade_percent())
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "Progress");
    let _ = writeln!(
        output,
        "  Total Graded To Date (excluding final): {:.2}",
        summary.total_possible_graded_to_date
    );
    let _ = writeln!(
        output,
        "  Work Handed In:                         {}",
        format_percent(summary.work_handed_in_percent())
    );

    if with_entries {
        let _ = writeln!(output);
        let _ = writeln!(output, "Entries");
        if rollup.entries.is_empty() {
            let _ = writeln!(output, "  No assignments found.");
        }
        for entry in &rollup.entries {
            let _ = writeln!(
                output,
                "  - {} [{}] {} ({})",
                entry.title,
                entry.inclusion.label(),
                score_cell(entry),
                entry.highlight.label()
            );
        }
    }

    output
}

pub fn build_report(source: &str, generated_at: DateTime<Local>, rollup: &Rollup) -> String {
    let summary = &rollup.summary;
    let counts = count_by_tier(&rollup.entries);
    let mut output = String::new();

    let _ = writeln!(output, "# Grade Rollup Report");
    let _ = writeln!(
        output,
        "Generated from {} on {}",
        source,
        generated_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Current Grade");
    let _ = writeln!(
        output,
        "- Earned {:.2} of {:.2} possible ({})",
        summary.total_earned,
        summary.total_possible,
        format_percent(summary.current_grade_percent())
    );
    let _ = writeln!(
        output,
        "- Work handed in: {:.2} of {:.2} graded to date ({})",
        summary.total_possible,
        summary.total_possible_graded_to_date,
        format_percent(summary.work_handed_in_percent())
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Tier Mix");

    if counts.is_empty() {
        let _ = writeln!(output, "No assignments found in this snapshot.");
    } else {
        for tier in counts.iter() {
            if tier.highlight == HighlightTier::Uncounted {
                let _ = writeln!(output, "- {}: {} entries", tier.highlight.label(), tier.count);
            } else {
                let _ = writeln!(
                    output,
                    "- {}: {} entries ({:.2} / {:.2})",
                    tier.highlight.label(),
                    tier.count,
                    tier.earned,
                    tier.possible
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Entries");

    if rollup.entries.is_empty() {
        let _ = writeln!(output, "No assignments found in this snapshot.");
    } else {
        let _ = writeln!(output, "| Assignment | Status | Score | Tier | Progress |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for entry in rollup.entries.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                entry.title.replace('|', "\\|"),
                entry.inclusion.label(),
                score_cell(entry),
                entry.highlight.label(),
                if entry.counts_toward_progress { "yes" } else { "no" }
            );
        }
    }

    output
}
