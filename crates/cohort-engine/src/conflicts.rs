//! Pairwise conflict detection for scheduled sessions.
//!
//! A candidate collides with a booking on the same date when their
//! half-open time windows overlap and either the same instructor teaches
//! both or at least one student is affected by both.

use std::collections::BTreeSet;

use chrono::NaiveTime;
use cohort_models::{ConflictCheckResponse, ConflictReason, InstructorId, SessionId, StudentId};

use crate::errors::EngineError;

/// A validated `[start, end)` interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, EngineError> {
        if start >= end {
            return Err(EngineError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Windows that merely touch (one ends as the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Students a session concerns: its group's roster when the group has
/// members, otherwise everyone enrolled in its course.
pub fn affected_students(
    group_roster: Option<&BTreeSet<StudentId>>,
    course_roster: &BTreeSet<StudentId>,
) -> BTreeSet<StudentId> {
    match group_roster {
        Some(roster) if !roster.is_empty() => roster.clone(),
        _ => course_roster.clone(),
    }
}

/// An existing session on the candidate's date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub session_id: SessionId,
    pub window: TimeWindow,
    pub instructor_id: Option<InstructorId>,
    pub roster: BTreeSet<StudentId>,
}

/// The session being proposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub window: TimeWindow,
    pub instructor_id: Option<InstructorId>,
    pub roster: BTreeSet<StudentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictOutcome {
    Clear,
    Conflict {
        reason: ConflictReason,
        session_id: SessionId,
    },
}

impl ConflictOutcome {
    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }
}

impl From<ConflictOutcome> for ConflictCheckResponse {
    fn from(outcome: ConflictOutcome) -> Self {
        match outcome {
            ConflictOutcome::Clear => ConflictCheckResponse::clear(),
            ConflictOutcome::Conflict { reason, session_id } => {
                ConflictCheckResponse::rejected(reason, session_id)
            }
        }
    }
}

fn collision(candidate: &Candidate, booking: &Booking) -> Option<ConflictReason> {
    if !candidate.window.overlaps(&booking.window) {
        return None;
    }

    if let (Some(mine), Some(theirs)) = (candidate.instructor_id, booking.instructor_id)
        && mine == theirs
    {
        return Some(ConflictReason::InstructorConflict);
    }

    if !candidate.roster.is_disjoint(&booking.roster) {
        return Some(ConflictReason::StudentConflict);
    }

    None
}

/// Checks `candidate` against same-day `bookings`, skipping `exclude`.
///
/// Bookings are examined in start-time order, then by id; the first
/// collision found is reported.
pub fn check_conflict(
    candidate: &Candidate,
    bookings: &[Booking],
    exclude: Option<SessionId>,
) -> ConflictOutcome {
    let mut ordered: Vec<&Booking> = bookings
        .iter()
        .filter(|b| Some(b.session_id) != exclude)
        .collect();
    ordered.sort_by_key(|b| (b.window.start, b.session_id));

    ordered
        .into_iter()
        .find_map(|booking| {
            collision(candidate, booking).map(|reason| ConflictOutcome::Conflict {
                reason,
                session_id: booking.session_id,
            })
        })
        .unwrap_or(ConflictOutcome::Clear)
}
