//! Student marks pipeline: page extraction, duplicate-sitting reconciliation and
//! report formatting.

use async_trait::async_trait;
use thiserror::Error;

pub(crate) mod client;
pub(crate) mod dates;
pub(crate) mod extract;
pub(crate) mod grading;
pub(crate) mod numerals;
pub(crate) mod reconcile;
pub(crate) mod report;
pub(crate) mod types;

pub(crate) use client::MarksClient;
pub(crate) use types::StudentReport;

use extract::{extract_page, NoGradeTable};
use reconcile::reconcile;

/// The only failure callers ever see: the student is unknown or the data could not
/// be fetched. Causes are reported to logs, not to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no marks data available for this student")]
pub(crate) struct NoDataFound;

#[async_trait]
pub(crate) trait StudentSource: Send + Sync {
    async fn fetch_report(&self, student_id: &str) -> Result<StudentReport, NoDataFound>;
}

/// Turns a fetched marks page into a reconciled report.
pub(crate) fn build_report(html: &str, student_id: &str) -> Result<StudentReport, NoGradeTable> {
    let page = extract_page(html)?;

    if page.skipped.total() > 0 {
        for (reason, count) in page.skipped.iter().filter(|(_, count)| *count > 0) {
            metrics::counter!("marks_rows_skipped_total", "reason" => reason.as_str())
                .increment(count as u64);
        }
        tracing::debug!(
            student_id,
            too_few_cells = page.skipped.too_few_cells,
            missing_field = page.skipped.missing_field,
            unparsable_mark = page.skipped.unparsable_mark,
            "Skipped grade rows"
        );
    }

    let subjects = reconcile(&page.occurrences);
    tracing::debug!(
        student_id,
        occurrences = page.occurrences.len(),
        subjects = subjects.len(),
        "Reconciled grade rows"
    );

    Ok(StudentReport {
        name: page.name,
        cohort: page.cohort,
        student_id: student_id.to_string(),
        subjects,
    })
}
