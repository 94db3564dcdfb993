use time::Date;

use super::grading::GradeStatus;

/// One grade-table row for one exam sitting.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawOccurrence {
    pub(crate) subject: String,
    pub(crate) semester: String,
    pub(crate) mark: f64,
    pub(crate) mark_display: String,
    pub(crate) release_date: String,
    pub(crate) parsed_date: Option<Date>,
    pub(crate) status: GradeStatus,
}

/// The authoritative record for one subject after duplicate sittings are merged.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReconciledSubject {
    pub(crate) subject: String,
    pub(crate) mark: f64,
    pub(crate) mark_display: String,
    pub(crate) semester: String,
    pub(crate) release_date: String,
    pub(crate) parsed_date: Option<Date>,
    pub(crate) status: GradeStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StudentReport {
    pub(crate) name: String,
    pub(crate) cohort: String,
    pub(crate) student_id: String,
    pub(crate) subjects: Vec<ReconciledSubject>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rating {
    Excellent,
    VeryGood,
    Good,
    Acceptable,
}

impl Rating {
    pub(crate) fn from_average(average: f64) -> Self {
        if average >= 85.0 {
            Self::Excellent
        } else if average >= 75.0 {
            Self::VeryGood
        } else if average >= 65.0 {
            Self::Good
        } else {
            Self::Acceptable
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Excellent => "ممتاز 🏆",
            Self::VeryGood => "جيد جداً 🥈",
            Self::Good => "جيد 🥉",
            Self::Acceptable => "مقبول ⚠️",
        }
    }
}

impl StudentReport {
    pub(crate) fn average(&self) -> Option<f64> {
        if self.subjects.is_empty() {
            return None;
        }
        let total: f64 = self.subjects.iter().map(|subject| subject.mark).sum();
        Some(total / self.subjects.len() as f64)
    }

    pub(crate) fn passed_count(&self) -> usize {
        self.subjects.iter().filter(|subject| subject.status == GradeStatus::Pass).count()
    }

    pub(crate) fn failed_count(&self) -> usize {
        self.subjects.len() - self.passed_count()
    }

    pub(crate) fn rating(&self) -> Option<Rating> {
        self.average().map(Rating::from_average)
    }
}
