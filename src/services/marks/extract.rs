use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::dates::parse_release_date;
use super::grading::{parse_mark, GradeStatus};
use super::types::RawOccurrence;

pub(crate) const UNKNOWN_PLACEHOLDER: &str = "غير معروف";

const MIN_CELLS: usize = 4;

static NAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.bottom").expect("valid name selector"));
static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".panel-heading").expect("valid heading selector"));
static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.table-striped").expect("valid table selector"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid tr selector"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid td selector"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipReason {
    TooFewCells,
    MissingField,
    UnparsableMark,
}

impl SkipReason {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::TooFewCells => "too_few_cells",
            Self::MissingField => "missing_field",
            Self::UnparsableMark => "unparsable_mark",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SkipTally {
    pub(crate) too_few_cells: usize,
    pub(crate) missing_field: usize,
    pub(crate) unparsable_mark: usize,
}

impl SkipTally {
    fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::TooFewCells => self.too_few_cells += 1,
            SkipReason::MissingField => self.missing_field += 1,
            SkipReason::UnparsableMark => self.unparsable_mark += 1,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.too_few_cells + self.missing_field + self.unparsable_mark
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (SkipReason, usize)> {
        [
            (SkipReason::TooFewCells, self.too_few_cells),
            (SkipReason::MissingField, self.missing_field),
            (SkipReason::UnparsableMark, self.unparsable_mark),
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ExtractedPage {
    pub(crate) name: String,
    pub(crate) cohort: String,
    pub(crate) occurrences: Vec<RawOccurrence>,
    pub(crate) skipped: SkipTally,
}

/// Returned when the page carries no grade table at all, which is how the
/// source site answers for unknown students.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NoGradeTable;

/// Pulls the student name, cohort label and grade rows out of a marks page.
///
/// Selection rules follow the page layout: the name is the first `span.bottom`,
/// the cohort is the *last* `.panel-heading`, and the grades come from the *last*
/// `table.table-striped`, because the current year is appended after older years.
pub(crate) fn extract_page(html: &str) -> Result<ExtractedPage, NoGradeTable> {
    let document = Html::parse_document(html);

    let name = document
        .select(&NAME_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string());

    let cohort = document
        .select(&HEADING_SELECTOR)
        .last()
        .map(element_text)
        .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string());

    let table = document.select(&TABLE_SELECTOR).last().ok_or(NoGradeTable)?;

    let mut occurrences = Vec::new();
    let mut skipped = SkipTally::default();

    // First row is the header.
    for row in table.select(&ROW_SELECTOR).skip(1) {
        let cells = row.select(&CELL_SELECTOR).map(element_text).collect::<Vec<_>>();
        match parse_row(&cells) {
            Ok(occurrence) => occurrences.push(occurrence),
            Err(reason) => skipped.record(reason),
        }
    }

    Ok(ExtractedPage { name, cohort, occurrences, skipped })
}

fn parse_row(cells: &[String]) -> Result<RawOccurrence, SkipReason> {
    if cells.len() < MIN_CELLS {
        return Err(SkipReason::TooFewCells);
    }

    let subject = &cells[0];
    let semester = &cells[1];
    let mark_display = &cells[2];
    // Release date is the trailing column; some years add columns before it.
    let release_date = &cells[cells.len() - 1];

    if subject.is_empty() || mark_display.is_empty() {
        return Err(SkipReason::MissingField);
    }

    let mark = parse_mark(mark_display).ok_or(SkipReason::UnparsableMark)?;

    Ok(RawOccurrence {
        subject: subject.clone(),
        semester: semester.clone(),
        mark,
        mark_display: mark_display.clone(),
        release_date: release_date.clone(),
        parsed_date: parse_release_date(release_date),
        status: GradeStatus::classify_text(mark_display),
    })
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
