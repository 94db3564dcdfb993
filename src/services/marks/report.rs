use super::types::StudentReport;

pub(crate) const MESSAGE_CHUNK_LIMIT: usize = 4000;
pub(crate) const NO_SUBJECTS_MESSAGE: &str = "❌ لم يتم العثور على بيانات للطالب";

const BOOK_MARKERS: [&str; 4] = ["📕", "📗", "📘", "📙"];
const SUBJECT_SEPARATOR: &str = "———————";
const PARAGRAPH_BREAK: &str = "\n\n";

/// Display grouping for a semester label. Labels containing an ASCII `1` are the
/// first semester; every other label is shown as the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Semester {
    First,
    Second,
}

impl Semester {
    pub(crate) fn from_label(label: &str) -> Self {
        if label.contains('1') {
            Self::First
        } else {
            Self::Second
        }
    }

    fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

pub(crate) fn format_report(report: &StudentReport) -> String {
    let (Some(average), Some(rating)) = (report.average(), report.rating()) else {
        return NO_SUBJECTS_MESSAGE.to_string();
    };

    let mut lines = Vec::with_capacity(report.subjects.len() * 3 + 8);
    lines.push(format!("👤 *{}*", report.name));
    lines.push(format!("🆔 {}", report.student_id));
    lines.push(String::new());

    let mut current_semester = None;
    for (idx, subject) in report.subjects.iter().enumerate() {
        let semester = Semester::from_label(&subject.semester);
        if current_semester != Some(semester) {
            current_semester = Some(semester);
            lines.push(format!("*الفصل {}*", semester.number()));
        }

        lines.push(format!("{} {}", BOOK_MARKERS[idx % BOOK_MARKERS.len()], subject.subject));
        lines.push(format!("   {} {}", subject.status.marker(), subject.mark_display));
        lines.push(SUBJECT_SEPARATOR.to_string());
    }

    lines.push(String::new());
    lines.push(format!("📊 المعدل: *{average:.1}* · {}", rating.label()));
    lines.push(format!(
        "✓ الناجح: {}  ✗ الراسب: {}",
        report.passed_count(),
        report.failed_count()
    ));

    lines.join("\n")
}

/// Splits a message into chunks of at most `limit` characters.
///
/// Paragraphs (separated by a blank line) are packed greedily and never broken
/// while they fit; a paragraph longer than `limit` is broken at line boundaries,
/// and a single line longer than `limit` at the character limit.
pub(crate) fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if char_len(text) <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split(PARAGRAPH_BREAK) {
        for piece in fit_paragraph(paragraph, limit) {
            let joined_len = if current.is_empty() {
                char_len(&piece)
            } else {
                char_len(&current) + char_len(PARAGRAPH_BREAK) + char_len(&piece)
            };

            if joined_len > limit && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push_str(PARAGRAPH_BREAK);
            }
            current.push_str(&piece);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn fit_paragraph(paragraph: &str, limit: usize) -> Vec<String> {
    if char_len(paragraph) <= limit {
        return vec![paragraph.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for line in paragraph.split('\n') {
        for part in hard_wrap(line, limit) {
            let joined_len = if current.is_empty() {
                char_len(&part)
            } else {
                char_len(&current) + 1 + char_len(&part)
            };
            if joined_len > limit && !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(&part);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn hard_wrap(line: &str, limit: usize) -> Vec<String> {
    if char_len(line) <= limit {
        return vec![line.to_string()];
    }
    let chars = line.chars().collect::<Vec<_>>();
    chars.chunks(limit).map(|chunk| chunk.iter().collect()).collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
