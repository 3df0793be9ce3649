use tracing::debug;

use crate::models::{AssignmentRecord, InclusionTier, NormalizedScore};
use crate::score;

/// A skip rule: the first rule in a chain whose predicate holds decides the outcome.
struct Rule<T> {
    outcome: T,
    applies: fn(&AssignmentRecord) -> bool,
}

fn missing_submission(record: &AssignmentRecord) -> bool {
    record.has_missing_submission_marker
}

fn special_shell(record: &AssignmentRecord) -> bool {
    record.is_special_excluded_shell
}

fn ungraded(record: &AssignmentRecord) -> bool {
    record.is_ungraded
}

fn excluded_from_final(record: &AssignmentRecord) -> bool {
    record.is_excluded_from_final
}

fn proctored_final(record: &AssignmentRecord) -> bool {
    record.is_proctored_final_exam
}

// The shell entry can carry a valid-looking score, so it sits ahead of the
// ungraded and score checks.
const GRADE_RULES: [Rule<InclusionTier>; 4] = [
    Rule {
        outcome: InclusionTier::SkippedMissing,
        applies: missing_submission,
    },
    Rule {
        outcome: InclusionTier::SkippedSpecialException,
        applies: special_shell,
    },
    Rule {
        outcome: InclusionTier::SkippedUngraded,
        applies: ungraded,
    },
    Rule {
        outcome: InclusionTier::SkippedExcludedFromFinal,
        applies: excluded_from_final,
    },
];

/// Why a record stays out of the graded-to-date denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSkip {
    Missing,
    SpecialException,
    Ungraded,
    ExcludedFromFinal,
    ProctoredFinal,
    NoScore,
}

// Same exclusions as the grade chain, plus the proctored final.
const PROGRESS_RULES: [Rule<ProgressSkip>; 5] = [
    Rule {
        outcome: ProgressSkip::Missing,
        applies: missing_submission,
    },
    Rule {
        outcome: ProgressSkip::SpecialException,
        applies: special_shell,
    },
    Rule {
        outcome: ProgressSkip::Ungraded,
        applies: ungraded,
    },
    Rule {
        outcome: ProgressSkip::ExcludedFromFinal,
        applies: excluded_from_final,
    },
    Rule {
        outcome: ProgressSkip::ProctoredFinal,
        applies: proctored_final,
    },
];

fn first_match<T: Copy>(rules: &[Rule<T>], record: &AssignmentRecord) -> Option<T> {
    rules
        .iter()
        .find(|rule| (rule.applies)(record))
        .map(|rule| rule.outcome)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub tier: InclusionTier,
    /// Present only for `Counted` records.
    pub score: Option<NormalizedScore>,
}

/// Decides whether a record counts toward the current grade.
pub fn classify(record: &AssignmentRecord) -> Classification {
    if let Some(tier) = first_match(&GRADE_RULES, record) {
        debug!(title = %record.title, reason = tier.label(), "skipping entry");
        return Classification { tier, score: None };
    }

    match score::normalize(record) {
        Ok(score) => Classification {
            tier: InclusionTier::Counted,
            score: Some(score),
        },
        Err(err) => {
            debug!(title = %record.title, error = %err, "skipping entry without usable score");
            Classification {
                tier: InclusionTier::SkippedNoScore,
                score: None,
            }
        }
    }
}

/// Narrower chain for the graded-to-date denominator. Returns the score whose
/// possible value is added to the denominator.
pub fn classify_for_progress(record: &AssignmentRecord) -> Result<NormalizedScore, ProgressSkip> {
    if let Some(skip) = first_match(&PROGRESS_RULES, record) {
        debug!(title = %record.title, reason = ?skip, "leaving entry out of progress");
        return Err(skip);
    }

    score::normalize(record).map_err(|err| {
        debug!(title = %record.title, error = %err, "leaving unscored entry out of progress");
        ProgressSkip::NoScore
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(title: &str, score: &str, possible: &str) -> AssignmentRecord {
        AssignmentRecord {
            title: title.to_string(),
            score_text: Some(score.to_string()),
            possible_text: Some(possible.to_string()),
            ..AssignmentRecord::default()
        }
    }

    #[test]
    fn plain_scored_entry_is_counted() {
        let result = classify(&scored("Essay 1", "42", "/ 50"));
        assert_eq!(result.tier, InclusionTier::Counted);
        assert_eq!(
            result.score,
            Some(NormalizedScore {
                earned: 42.0,
                possible: 50.0
            })
        );
    }

    #[test]
    fn missing_marker_wins_over_everything() {
        let mut record = scored("Lab 3", "10", "/ 10");
        record.has_missing_submission_marker = true;
        record.is_special_excluded_shell = true;
        record.is_ungraded = true;
        assert_eq!(classify(&record).tier, InclusionTier::SkippedMissing);
    }

    #[test]
    fn special_shell_checked_before_ungraded() {
        let mut record = scored("Final Exam Shell", "0", "/ 50");
        record.is_special_excluded_shell = true;
        record.is_ungraded = true;
        let result = classify(&record);
        assert_eq!(result.tier, InclusionTier::SkippedSpecialException);
        assert!(result.score.is_none());
    }

    #[test]
    fn ungraded_checked_before_final_exclusion() {
        let mut record = scored("Practice", "5", "/ 5");
        record.is_ungraded = true;
        record.is_excluded_from_final = true;
        assert_eq!(classify(&record).tier, InclusionTier::SkippedUngraded);

        record.is_ungraded = false;
        assert_eq!(classify(&record).tier, InclusionTier::SkippedExcludedFromFinal);
    }

    #[test]
    fn unusable_score_is_no_score() {
        assert_eq!(
            classify(&scored("Quiz", "-", "/ 10")).tier,
            InclusionTier::SkippedNoScore
        );
        assert_eq!(
            classify(&AssignmentRecord::default()).tier,
            InclusionTier::SkippedNoScore
        );
    }

    #[test]
    fn proctored_final_counts_for_grade_but_not_progress() {
        let mut record = scored("Proctored Final Exam (Unit 1-8)", "80", "/ 100");
        record.is_proctored_final_exam = true;
        assert_eq!(classify(&record).tier, InclusionTier::Counted);
        assert_eq!(classify_for_progress(&record), Err(ProgressSkip::ProctoredFinal));
    }

    #[test]
    fn missing_submission_is_left_out_of_progress() {
        let mut record = scored("Lab 4", "0", "/ 20");
        record.has_missing_submission_marker = true;
        assert_eq!(classify(&record).tier, InclusionTier::SkippedMissing);
        assert_eq!(classify_for_progress(&record), Err(ProgressSkip::Missing));
    }

    #[test]
    fn counted_entry_counts_for_progress() {
        assert_eq!(
            classify_for_progress(&scored("Lab 5", "18", "/ 20")),
            Ok(NormalizedScore {
                earned: 18.0,
                possible: 20.0
            })
        );
    }

    #[test]
    fn progress_chain_reuses_exclusion_rules() {
        let mut shell = scored("Final Exam Shell", "0", "/ 50");
        shell.is_special_excluded_shell = true;
        assert_eq!(classify_for_progress(&shell), Err(ProgressSkip::SpecialException));

        let mut ungraded = scored("Survey", "1", "/ 1");
        ungraded.is_ungraded = true;
        assert_eq!(classify_for_progress(&ungraded), Err(ProgressSkip::Ungraded));

        let mut excluded = scored("Bonus", "3", "/ 3");
        excluded.is_excluded_from_final = true;
        assert_eq!(classify_for_progress(&excluded), Err(ProgressSkip::ExcludedFromFinal));

        assert_eq!(
            classify_for_progress(&scored("Quiz", "", "/ 10")),
            Err(ProgressSkip::NoScore)
        );
    }
}
