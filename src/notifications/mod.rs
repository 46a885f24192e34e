//! Enrollment notifications.
//!
//! The reconciler hands a [`Notification`] to a [`Notifier`] after the
//! owning transaction commits. Delivery is fire-and-forget: a notifier must
//! never block the caller or report failure back to it.

mod email;
#[cfg(any(test, feature = "test-utils"))]
mod recording;

use std::fmt;

use cohort_models::{CourseCode, CourseContact, Student, StudentId};

pub use email::EmailNotifier;
#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingNotifier;

pub trait Notifier: Send + Sync + fmt::Debug {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Enrolled,
    Unenrolled,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
            Self::Unenrolled => "unenrolled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    Student,
    Instructor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub audience: Audience,
    pub to_email: String,
    pub to_name: String,
    pub student_id: StudentId,
    pub course_code: CourseCode,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn student_enrolled(student: &Student, course: &CourseContact) -> Self {
        Self {
            kind: NotificationKind::Enrolled,
            audience: Audience::Student,
            to_email: student.email.clone(),
            to_name: student.full_name(),
            student_id: student.id,
            course_code: course.code.clone(),
            subject: format!("Enrolled in {}", course.code),
            body: format!("You have been enrolled in course {}.", course.label()),
        }
    }

    /// `None` when the course has no instructor to tell.
    pub fn instructor_enrolled(student: &Student, course: &CourseContact) -> Option<Self> {
        let (to_email, to_name) = instructor_contact(course)?;
        Some(Self {
            kind: NotificationKind::Enrolled,
            audience: Audience::Instructor,
            to_email,
            to_name,
            student_id: student.id,
            course_code: course.code.clone(),
            subject: format!("New student in {}", course.code),
            body: format!(
                "Student {} has been enrolled in {}.",
                student.full_name(),
                course.label()
            ),
        })
    }

    pub fn instructor_unenrolled(student: &Student, course: &CourseContact) -> Option<Self> {
        let (to_email, to_name) = instructor_contact(course)?;
        Some(Self {
            kind: NotificationKind::Unenrolled,
            audience: Audience::Instructor,
            to_email,
            to_name,
            student_id: student.id,
            course_code: course.code.clone(),
            subject: format!("Student left {}", course.code),
            body: format!(
                "Student {} has been unenrolled from {}.",
                student.full_name(),
                course.label()
            ),
        })
    }
}

fn instructor_contact(course: &CourseContact) -> Option<(String, String)> {
    let email = course
        .instructor_id
        .and(course.instructor_email.clone())
        .filter(|email| !email.trim().is_empty())?;
    Some((email, course.instructor_name.clone().unwrap_or_default()))
}

/// Notifications for one student's grants and revokes, in that order.
pub fn enrollment_notifications(
    student: &Student,
    granted: &[CourseContact],
    revoked: &[CourseContact],
) -> Vec<Notification> {
    let mut out = Vec::with_capacity(granted.len() * 2 + revoked.len());
    for course in granted {
        out.push(Notification::student_enrolled(student, course));
        out.extend(Notification::instructor_enrolled(student, course));
    }
    for course in revoked {
        out.extend(Notification::instructor_unenrolled(student, course));
    }
    out
}

/// Hand every notification to `notifier`.
pub fn dispatch(notifier: &dyn Notifier, notifications: Vec<Notification>) {
    for notification in notifications {
        notifier.notify(notification);
    }
}
