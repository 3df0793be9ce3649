use serde::{Deserialize, Serialize};

/// One rendered assignment row as handed over by an extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub title: String,
    pub has_missing_submission_marker: bool,
    pub is_ungraded: bool,
    pub is_excluded_from_final: bool,
    pub is_proctored_final_exam: bool,
    pub is_special_excluded_shell: bool,
    pub score_text: Option<String>,
    pub possible_text: Option<String>,
    /// Alternate "original points" text, used when `score_text` is not numeric.
    pub original_score_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionTier {
    Counted,
    SkippedMissing,
    SkippedUngraded,
    SkippedExcludedFromFinal,
    SkippedSpecialException,
    SkippedNoScore,
}

impl InclusionTier {
    pub fn label(self) -> &'static str {
        match self {
            InclusionTier::Counted => "counted",
            InclusionTier::SkippedMissing => "missing submission",
            InclusionTier::SkippedUngraded => "ungraded",
            InclusionTier::SkippedExcludedFromFinal => "excluded from final grade",
            InclusionTier::SkippedSpecialException => "placeholder shell",
            InclusionTier::SkippedNoScore => "no score",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    Points,
    Percentage,
}

/// Earned and possible values in points. Percentage entries are out of 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedScore {
    pub earned: f64,
    pub possible: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightTier {
    Counted,
    NearPerfect,
    NeedsAttention,
    Uncounted,
}

impl HighlightTier {
    pub fn label(self) -> &'static str {
        match self {
            HighlightTier::Counted => "on track",
            HighlightTier::NearPerfect => "room for improvement",
            HighlightTier::NeedsAttention => "needs attention",
            HighlightTier::Uncounted => "not counted",
        }
    }

    /// Row background a renderer applies; `None` leaves the row untouched.
    pub fn colour(self) -> Option<&'static str> {
        match self {
            HighlightTier::Counted => Some("#d4edda"),
            HighlightTier::NearPerfect => Some("#fff3cd"),
            HighlightTier::NeedsAttention => Some("#f8d7da"),
            HighlightTier::Uncounted => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    pub total_earned: f64,
    pub total_possible: f64,
    /// Possible points of every counted entry except the proctored final.
    pub total_possible_graded_to_date: f64,
}

impl GradeSummary {
    pub fn current_grade_percent(&self) -> Option<f64> {
        if self.total_possible > 0.0 {
            Some(self.total_earned / self.total_possible * 100.0)
        } else {
            None
        }
    }

    pub fn work_handed_in_percent(&self) -> Option<f64> {
        if self.total_possible_graded_to_date > 0.0 {
            Some(self.total_possible / self.total_possible_graded_to_date * 100.0)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryOutcome {
    pub title: String,
    pub mode: ScoreMode,
    pub inclusion: InclusionTier,
    pub highlight: HighlightTier,
    pub colour: Option<&'static str>,
    pub score: Option<NormalizedScore>,
    pub counts_toward_progress: bool,
}

/// Result of one pass over a snapshot: the totals plus one outcome per record, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rollup {
    pub summary: GradeSummary,
    pub entries: Vec<EntryOutcome>,
}

#[derive(Debug, Clone)]
pub struct TierCount {
    pub highlight: HighlightTier,
    pub count: usize,
    pub earned: f64,
    pub possible: f64,
}
