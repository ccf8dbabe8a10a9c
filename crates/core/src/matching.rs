//! Mentor matching for a user's segment.

use crate::types::DbId;

/// A mentor as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentorCandidate {
    pub mentor_id: DbId,
    pub segments: Vec<String>,
    pub accepting_bookings: bool,
    /// SCHEDULED bookings not yet completed or cancelled.
    pub upcoming_bookings: i64,
}

/// Rank mentors for `segment`: accepting mentors serving the segment,
/// least loaded first, ties broken by mentor id.
pub fn rank_mentors(candidates: Vec<MentorCandidate>, segment: &str) -> Vec<MentorCandidate> {
    let mut matches: Vec<MentorCandidate> = candidates
        .into_iter()
        .filter(|m| m.accepting_bookings && m.segments.iter().any(|s| s == segment))
        .collect();
    matches.sort_by_key(|m| (m.upcoming_bookings, m.mentor_id));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentor(id: DbId, segments: &[&str], accepting: bool, load: i64) -> MentorCandidate {
        MentorCandidate {
            mentor_id: id,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            accepting_bookings: accepting,
            upcoming_bookings: load,
        }
    }

    #[test]
    fn filters_by_segment_and_availability() {
        let ranked = rank_mentors(
            vec![
                mentor(1, &["senior"], true, 0),
                mentor(2, &["student"], true, 0),
                mentor(3, &["senior", "executive"], false, 0),
            ],
            "senior",
        );
        let ids: Vec<DbId> = ranked.iter().map(|m| m.mentor_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn least_loaded_first_then_id() {
        let ranked = rank_mentors(
            vec![
                mentor(5, &["student"], true, 3),
                mentor(2, &["student"], true, 1),
                mentor(1, &["student"], true, 1),
            ],
            "student",
        );
        let ids: Vec<DbId> = ranked.iter().map(|m| m.mentor_id).collect();
        assert_eq!(ids, vec![1, 2, 5]);
    }

    #[test]
    fn no_candidates_yields_empty() {
        assert!(rank_mentors(Vec::new(), "student").is_empty());
    }
}
