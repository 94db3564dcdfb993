use std::collections::HashMap;

use super::grading::GradeStatus;
use super::types::{RawOccurrence, ReconciledSubject};

/// Merges repeated sittings of the same subject into one record each.
///
/// Subjects are grouped by exact name. Each record takes its semester and release
/// date from the oldest sitting (unparsable dates count as oldest) and its mark from
/// the highest sitting (first one wins on ties). The result is ordered by the chosen
/// release date, groups keeping first-appearance order when dates are equal.
pub(crate) fn reconcile(occurrences: &[RawOccurrence]) -> Vec<ReconciledSubject> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&RawOccurrence>> = Vec::new();

    for occurrence in occurrences {
        match index.get(occurrence.subject.as_str()) {
            Some(&slot) => groups[slot].push(occurrence),
            None => {
                index.insert(occurrence.subject.as_str(), groups.len());
                groups.push(vec![occurrence]);
            }
        }
    }

    let mut subjects =
        groups.into_iter().filter_map(|group| merge_group(&group)).collect::<Vec<_>>();
    subjects.sort_by_key(|subject| subject.parsed_date);
    subjects
}

fn merge_group(group: &[&RawOccurrence]) -> Option<ReconciledSubject> {
    // min_by_key keeps the first of equal minimums.
    let oldest = group.iter().min_by_key(|occurrence| occurrence.parsed_date)?;
    let best = highest_mark(group)?;

    Some(ReconciledSubject {
        subject: oldest.subject.clone(),
        mark: best.mark,
        mark_display: best.mark_display.clone(),
        semester: oldest.semester.clone(),
        release_date: oldest.release_date.clone(),
        parsed_date: oldest.parsed_date,
        status: GradeStatus::classify(best.mark),
    })
}

fn highest_mark<'a>(group: &[&'a RawOccurrence]) -> Option<&'a RawOccurrence> {
    let mut best: Option<&RawOccurrence> = None;
    for occurrence in group {
        match best {
            Some(current) if occurrence.mark <= current.mark => {}
            _ => best = Some(*occurrence),
        }
    }
    best
}
