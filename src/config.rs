use tracing::warn;

use crate::models::AssignmentRecord;

/// Text rules an extractor uses to derive record flags from a grades page.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleRules {
    pub proctored_final_prefix: String,
    /// Mislabeled placeholder entry that never counts.
    pub special_shell_title: String,
    pub excluded_note: String,
    pub ungraded_marker: String,
}

impl Default for TitleRules {
    fn default() -> Self {
        Self {
            proctored_final_prefix: "Proctored Final Exam".to_string(),
            special_shell_title: "Final Exam Shell".to_string(),
            excluded_note: "This assignment does not count toward the final grade.".to_string(),
            ungraded_marker: "Ungraded".to_string(),
        }
    }
}

impl TitleRules {
    pub fn is_proctored_final(&self, title: &str) -> bool {
        !self.proctored_final_prefix.is_empty() && title.starts_with(&self.proctored_final_prefix)
    }

    pub fn is_special_shell(&self, title: &str) -> bool {
        title == self.special_shell_title
    }

    /// Sets the flags that depend only on the title.
    pub fn tag(&self, record: &mut AssignmentRecord) {
        record.is_proctored_final_exam = self.is_proctored_final(&record.title);
        record.is_special_excluded_shell = self.is_special_shell(&record.title);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierThresholds {
    /// Ratios above this (but not perfect) are "room for improvement".
    pub near_perfect_ratio: f64,
    pub perfect_tolerance: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            near_perfect_ratio: 0.9,
            perfect_tolerance: 1e-6,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub title_rules: TitleRules,
    pub thresholds: TierThresholds,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let rules = default.title_rules;
        Self {
            title_rules: TitleRules {
                proctored_final_prefix: lookup("GRADE_ROLLUP_PROCTORED_PREFIX")
                    .unwrap_or(rules.proctored_final_prefix),
                special_shell_title: lookup("GRADE_ROLLUP_SHELL_TITLE")
                    .unwrap_or(rules.special_shell_title),
                excluded_note: lookup("GRADE_ROLLUP_EXCLUDED_NOTE").unwrap_or(rules.excluded_note),
                ungraded_marker: lookup("GRADE_ROLLUP_UNGRADED_MARKER")
                    .unwrap_or(rules.ungraded_marker),
            },
            thresholds: TierThresholds {
                near_perfect_ratio: ratio_var(
                    &lookup,
                    "GRADE_ROLLUP_NEAR_PERFECT",
                    default.thresholds.near_perfect_ratio,
                ),
                perfect_tolerance: ratio_var(
                    &lookup,
                    "GRADE_ROLLUP_PERFECT_TOLERANCE",
                    default.thresholds.perfect_tolerance,
                ),
            },
        }
    }
}

fn ratio_var(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: f64) -> f64 {
    let Some(raw) = lookup(key) else {
        return fallback;
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && (0.0..=1.0).contains(&value) => value,
        _ => {
            warn!("{key}={raw:?} is not a ratio between 0 and 1, using {fallback}");
            fallback
        }
    }
}
