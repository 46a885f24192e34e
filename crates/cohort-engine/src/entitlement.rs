//! Course entitlement derived from group membership.
//!
//! A student may take a course exactly when some group contains both. The
//! functions here work on an explicit snapshot of group grants so the
//! caller decides what "current membership" means.

use std::collections::BTreeSet;

use cohort_models::{CourseCode, GroupId, StudentId};

/// One group's roster and course set, as read from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupGrant {
    pub group_id: GroupId,
    pub students: BTreeSet<StudentId>,
    pub courses: BTreeSet<CourseCode>,
}

impl GroupGrant {
    pub fn new(
        group_id: GroupId,
        students: impl IntoIterator<Item = StudentId>,
        courses: impl IntoIterator<Item = CourseCode>,
    ) -> Self {
        Self {
            group_id,
            students: students.into_iter().collect(),
            courses: courses.into_iter().collect(),
        }
    }
}

/// Union of the course sets of every group containing `student`.
pub fn allowed_courses(groups: &[GroupGrant], student: StudentId) -> BTreeSet<CourseCode> {
    groups
        .iter()
        .filter(|g| g.students.contains(&student))
        .flat_map(|g| g.courses.iter().cloned())
        .collect()
}

/// Students touched by a roster change: old and new rosters combined,
/// deduplicated and sorted.
pub fn roster_union(old: &[StudentId], new: &[StudentId]) -> Vec<StudentId> {
    old.iter()
        .chain(new)
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Enrollment changes that make one student's enrollments match their
/// entitlement. Grants are applied before revokes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub student_id: StudentId,
    pub grants: Vec<CourseCode>,
    pub revokes: Vec<CourseCode>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty() && self.revokes.is_empty()
    }
}

/// Diffs `enrolled` against `allowed`. Both outputs are in course-code order.
pub fn plan_reconciliation(
    student: StudentId,
    allowed: &BTreeSet<CourseCode>,
    enrolled: &BTreeSet<CourseCode>,
) -> ReconcilePlan {
    ReconcilePlan {
        student_id: student,
        grants: allowed.difference(enrolled).cloned().collect(),
        revokes: enrolled.difference(allowed).cloned().collect(),
    }
}
