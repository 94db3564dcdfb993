use super::numerals::normalize_digits;

pub(crate) const PASS_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GradeStatus {
    Pass,
    Fail,
    Unknown,
}

impl GradeStatus {
    pub(crate) fn classify(mark: f64) -> Self {
        if !mark.is_finite() {
            return Self::Unknown;
        }
        if mark >= PASS_THRESHOLD {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    /// Classifies a raw mark cell; anything that is not a finite number is `Unknown`.
    pub(crate) fn classify_text(raw: &str) -> Self {
        match parse_mark(raw) {
            Some(mark) => Self::classify(mark),
            None => Self::Unknown,
        }
    }

    pub(crate) fn marker(self) -> &'static str {
        match self {
            Self::Pass => "✅",
            Self::Fail => "❌",
            Self::Unknown => "❓",
        }
    }
}

pub(crate) fn parse_mark(raw: &str) -> Option<f64> {
    let normalized = normalize_digits(raw);
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}
