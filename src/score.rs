use crate::error::{ScoreError, ScoreResult};
use crate::models::{AssignmentRecord, NormalizedScore, ScoreMode};

pub const FRACTION_DELIMITER: char = '/';
pub const PERCENTAGE_POSSIBLE: f64 = 100.0;

/// Points mode when the possible field reads like "/ 100", percentage otherwise.
pub fn detect_mode(record: &AssignmentRecord) -> ScoreMode {
    match record.possible_text.as_deref() {
        Some(text) if text.contains(FRACTION_DELIMITER) => ScoreMode::Points,
        _ => ScoreMode::Percentage,
    }
}

/// Normalizes a record's raw score fields into points. Both halves parse or the
/// whole score is rejected.
pub fn normalize(record: &AssignmentRecord) -> ScoreResult<NormalizedScore> {
    match detect_mode(record) {
        ScoreMode::Points => {
            let earned = earned_points(record)?;
            let possible_text = record
                .possible_text
                .as_deref()
                .ok_or(ScoreError::MissingField { field: "possible" })?;
            let possible = leading_number(&possible_text.replace(FRACTION_DELIMITER, ""))?;
            Ok(NormalizedScore { earned, possible })
        }
        ScoreMode::Percentage => {
            let score_text = record
                .score_text
                .as_deref()
                .ok_or(ScoreError::MissingField { field: "score" })?;
            let earned = trailing_number(score_text)?;
            Ok(NormalizedScore {
                earned,
                possible: PERCENTAGE_POSSIBLE,
            })
        }
    }
}

fn earned_points(record: &AssignmentRecord) -> ScoreResult<f64> {
    let primary = match record.score_text.as_deref() {
        Some(text) => trailing_number(text),
        None => Err(ScoreError::MissingField { field: "score" }),
    };

    match (primary, record.original_score_text.as_deref()) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(original)) => trailing_number(original),
        (Err(err), None) => Err(err),
    }
}

/// Parses the last whitespace-separated token holding a digit, e.g.
/// "Score: 85", "92%" or "92 %".
pub fn trailing_number(text: &str) -> ScoreResult<f64> {
    let token = text
        .split_whitespace()
        .rev()
        .find(|token| token.bytes().any(|b| b.is_ascii_digit()))
        .unwrap_or(text);
    leading_number(token)
}

/// Locale-invariant parse of the numeric prefix of the trimmed text.
/// "85.5 pts" -> 85.5, "-2" -> -2, "pts" -> error.
pub fn leading_number(text: &str) -> ScoreResult<f64> {
    let trimmed = text.trim();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    let mut digits = 0;
    let mut seen_dot = false;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if digits == 0 {
        return Err(ScoreError::UnparseableNumber {
            text: trimmed.to_string(),
        });
    }

    trimmed[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .map_err(|_| ScoreError::UnparseableNumber {
            text: trimmed.to_string(),
        })
}

impl NormalizedScore {
    pub fn ratio(&self) -> ScoreResult<f64> {
        if self.possible <= 0.0 {
            return Err(ScoreError::ZeroDenominator);
        }
        Ok(self.earned / self.possible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: Option<&str>, possible: Option<&str>) -> AssignmentRecord {
        AssignmentRecord {
            title: "Unit 1 Quiz".to_string(),
            score_text: score.map(str::to_string),
            possible_text: possible.map(str::to_string),
            ..AssignmentRecord::default()
        }
    }

    #[test]
    fn delimiter_selects_points_mode() {
        assert_eq!(detect_mode(&record(Some("85"), Some("/ 100"))), ScoreMode::Points);
        assert_eq!(detect_mode(&record(Some("92%"), None)), ScoreMode::Percentage);
        assert_eq!(detect_mode(&record(Some("92%"), Some("100"))), ScoreMode::Percentage);
    }

    #[test]
    fn points_mode_strips_delimiter() {
        let score = normalize(&record(Some("Score: 85"), Some("/ 100"))).unwrap();
        assert_eq!(score, NormalizedScore { earned: 85.0, possible: 100.0 });
    }

    #[test]
    fn percentage_mode_is_out_of_one_hundred() {
        let score = normalize(&record(Some("92%"), None)).unwrap();
        assert_eq!(score, NormalizedScore { earned: 92.0, possible: 100.0 });
    }

    #[test]
    fn percentage_sign_may_be_separated() {
        let score = normalize(&record(Some("92 %"), None)).unwrap();
        assert_eq!(score, NormalizedScore { earned: 92.0, possible: 100.0 });
        assert_eq!(trailing_number("Score: 85 pts").unwrap(), 85.0);
        assert!(trailing_number("Score: -").is_err());
    }

    #[test]
    fn falls_back_to_original_points() {
        let mut entry = record(Some("A-"), Some("/ 20"));
        entry.original_score_text = Some("18.5".to_string());
        let score = normalize(&entry).unwrap();
        assert_eq!(score, NormalizedScore { earned: 18.5, possible: 20.0 });
    }

    #[test]
    fn rejects_when_either_half_fails() {
        assert!(matches!(
            normalize(&record(Some("-"), Some("/ 10"))),
            Err(ScoreError::UnparseableNumber { .. })
        ));
        assert!(matches!(
            normalize(&record(Some("7"), Some("/ pts"))),
            Err(ScoreError::UnparseableNumber { .. })
        ));
        assert_eq!(
            normalize(&record(None, None)),
            Err(ScoreError::MissingField { field: "score" })
        );
    }

    #[test]
    fn leading_number_reads_prefix_only() {
        assert_eq!(leading_number(" 85.5 pts").unwrap(), 85.5);
        assert_eq!(leading_number("-2").unwrap(), -2.0);
        assert_eq!(leading_number("7.").unwrap(), 7.0);
        assert_eq!(leading_number(".5").unwrap(), 0.5);
        assert!(leading_number("1,5").is_ok_and(|v| v == 1.0));
        assert!(leading_number("").is_err());
        assert!(leading_number("-").is_err());
        assert!(leading_number("N/A").is_err());
    }

    #[test]
    fn zero_possible_parses_but_has_no_ratio() {
        let score = normalize(&record(Some("0"), Some("/ 0"))).unwrap();
        assert_eq!(score.possible, 0.0);
        assert_eq!(score.ratio(), Err(ScoreError::ZeroDenominator));
    }

    #[test]
    fn negative_possible_has_no_ratio() {
        let score = normalize(&record(Some("5"), Some("/ -5"))).unwrap();
        assert_eq!(score.possible, -5.0);
        assert_eq!(score.ratio(), Err(ScoreError::ZeroDenominator));
    }
}
