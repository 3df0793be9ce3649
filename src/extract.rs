use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use clap::ValueEnum;
use scraper::{ElementRef, Html, Selector};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::config::TitleRules;
use crate::models::AssignmentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    /// Saved grades page
    Html,
    Csv,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "html" | "htm" => Some(SourceFormat::Html),
            "csv" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            _ => None,
        }
    }
}

pub fn load_records(
    path: &Path,
    format: Option<SourceFormat>,
    rules: &TitleRules,
) -> anyhow::Result<Vec<AssignmentRecord>> {
    let Some(format) = format.or_else(|| SourceFormat::from_path(path)) else {
        bail!(
            "cannot tell the input format of {}; pass --format",
            path.display()
        );
    };

    let records = match format {
        SourceFormat::Html => {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            records_from_html(&html, rules)?
        }
        SourceFormat::Csv => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            records_from_csv(file, rules)
                .with_context(|| format!("failed to import {}", path.display()))?
        }
        SourceFormat::Json => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            records_from_json(&text, rules)
                .with_context(|| format!("failed to import {}", path.display()))?
        }
    };

    info!(count = records.len(), source = %path.display(), ?format, "loaded assignment records");
    Ok(records)
}

struct PageSelectors {
    row: Selector,
    title_cell: Selector,
    title_link: Selector,
    context: Selector,
    missing_pill: Selector,
    score_cell: Selector,
    grade: Selector,
    original_points: Selector,
}

impl PageSelectors {
    fn new() -> anyhow::Result<Self> {
        Ok(Self {
            row: selector("tr.student_assignment")?,
            title_cell: selector("th.title")?,
            title_link: selector("a")?,
            context: selector("div.context")?,
            missing_pill: selector("span.submission-missing-pill")?,
            score_cell: selector("td.assignment_score")?,
            grade: selector("span.grade")?,
            original_points: selector("span.original_points")?,
        })
    }
}

fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("invalid selector {css:?}: {err:?}"))
}

/// Reads every `tr.student_assignment` row of a grades page, in document order.
pub fn records_from_html(html: &str, rules: &TitleRules) -> anyhow::Result<Vec<AssignmentRecord>> {
    let selectors = PageSelectors::new()?;
    let document = Html::parse_document(html);

    let records = document
        .select(&selectors.row)
        .map(|row| read_row(row, &selectors, rules))
        .collect();
    Ok(records)
}

fn read_row(row: ElementRef<'_>, selectors: &PageSelectors, rules: &TitleRules) -> AssignmentRecord {
    let title_cell = row.select(&selectors.title_cell).next();
    let title = title_cell
        .map(|cell| {
            cell.select(&selectors.title_link)
                .next()
                .map(collapsed_text)
                .unwrap_or_else(|| collapsed_text(cell))
        })
        .unwrap_or_default();

    let is_ungraded = title_cell
        .and_then(|cell| cell.select(&selectors.context).next())
        .is_some_and(|context| collapsed_text(context) == rules.ungraded_marker);

    // The explanatory note lives in the row that follows the assignment.
    let is_excluded_from_final = next_element_sibling(row).is_some_and(|next| {
        next.value().name() == "tr" && collapsed_text(next).contains(&rules.excluded_note)
    });

    let score_cell = row.select(&selectors.score_cell).next();
    let grade = score_cell.and_then(|cell| cell.select(&selectors.grade).next());

    let mut record = AssignmentRecord {
        title,
        has_missing_submission_marker: row.select(&selectors.missing_pill).next().is_some(),
        is_ungraded,
        is_excluded_from_final,
        score_text: grade.map(collapsed_text).filter(|text| !text.is_empty()),
        possible_text: grade
            .and_then(next_element_sibling)
            .map(collapsed_text)
            .filter(|text| !text.is_empty()),
        original_score_text: score_cell
            .and_then(|cell| cell.select(&selectors.original_points).next())
            .map(collapsed_text)
            .filter(|text| !text.is_empty()),
        ..AssignmentRecord::default()
    };
    rules.tag(&mut record);

    debug!(title = %record.title, score = ?record.score_text, possible = ?record.possible_text, "read row");
    record
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

fn parse_flag(value: Option<&str>) -> anyhow::Result<bool> {
    let Some(value) = value else {
        return Ok(false);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" => Ok(false),
        "true" | "yes" | "y" | "1" | "x" => Ok(true),
        other => bail!("'{other}' is not a yes/no value"),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Columns: title,score,possible,original_score,missing,ungraded,excluded_from_final
pub fn records_from_csv<R: Read>(input: R, rules: &TitleRules) -> anyhow::Result<Vec<AssignmentRecord>> {
    #[derive(Deserialize)]
    struct CsvRow {
        title: String,
        score: Option<String>,
        possible: Option<String>,
        original_score: Option<String>,
        missing: Option<String>,
        ungraded: Option<String>,
        excluded_from_final: Option<String>,
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut records = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = result.with_context(|| format!("malformed CSV record on line {line}"))?;

        let mut record = AssignmentRecord {
            title: row.title,
            has_missing_submission_marker: parse_flag(row.missing.as_deref())
                .with_context(|| format!("line {line}: missing"))?,
            is_ungraded: parse_flag(row.ungraded.as_deref())
                .with_context(|| format!("line {line}: ungraded"))?,
            is_excluded_from_final: parse_flag(row.excluded_from_final.as_deref())
                .with_context(|| format!("line {line}: excluded_from_final"))?,
            score_text: non_empty(row.score),
            possible_text: non_empty(row.possible),
            original_score_text: non_empty(row.original_score),
            ..AssignmentRecord::default()
        };
        rules.tag(&mut record);
        records.push(record);
    }

    Ok(records)
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(text)) => Ok(Some(text)),
        Some(serde_json::Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected text or a number, found {other}"
        ))),
    }
}

/// An array of objects with the CSV column names; flags are JSON booleans.
pub fn records_from_json(text: &str, rules: &TitleRules) -> anyhow::Result<Vec<AssignmentRecord>> {
    #[derive(Deserialize)]
    struct JsonRow {
        title: String,
        #[serde(default, deserialize_with = "text_or_number")]
        score: Option<String>,
        #[serde(default, deserialize_with = "text_or_number")]
        possible: Option<String>,
        #[serde(default, deserialize_with = "text_or_number")]
        original_score: Option<String>,
        #[serde(default)]
        missing: bool,
        #[serde(default)]
        ungraded: bool,
        #[serde(default)]
        excluded_from_final: bool,
    }

    let rows: Vec<JsonRow> =
        serde_json::from_str(text).context("expected a JSON array of assignment objects")?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let mut record = AssignmentRecord {
                title: row.title,
                has_missing_submission_marker: row.missing,
                is_ungraded: row.ungraded,
                is_excluded_from_final: row.excluded_from_final,
                score_text: non_empty(row.score),
                possible_text: non_empty(row.possible),
                original_score_text: non_empty(row.original_score),
                ..AssignmentRecord::default()
            };
            rules.tag(&mut record);
            record
        })
        .collect())
}
