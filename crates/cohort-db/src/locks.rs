//! Transaction-scoped advisory locks.
//!
//! Locks are taken with `pg_advisory_xact_lock` and released automatically
//! when the enclosing transaction commits or rolls back. Keys are derived
//! from a textual scope with `hashtextextended`, so unrelated students or
//! dates never contend with each other.

use chrono::NaiveDate;
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// A unit of work that must not run concurrently with itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockScope {
    /// Enrollment state of one student.
    Student(Uuid),
    /// The set of sessions scheduled on one calendar date.
    SessionDate(NaiveDate),
}

impl LockScope {
    pub fn key(&self) -> String {
        match self {
            Self::Student(id) => format!("cohort:student:{id}"),
            Self::SessionDate(date) => format!("cohort:sessions:{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Blocks until the scope's lock is held by the current transaction.
#[instrument(skip(conn))]
pub async fn acquire(conn: &mut PgConnection, scope: LockScope) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(scope.key())
        .execute(conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_key_is_stable() {
        let id = Uuid::from_u128(0x12345678_1234_1234_1234_123456789abc);
        assert_eq!(
            LockScope::Student(id).key(),
            "cohort:student:12345678-1234-1234-1234-123456789abc"
        );
    }

    #[test]
    fn test_date_key_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(LockScope::SessionDate(date).key(), "cohort:sessions:2024-05-01");
    }

    #[test]
    fn test_scopes_do_not_collide() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let id = Uuid::nil();
        assert_ne!(LockScope::Student(id).key(), LockScope::SessionDate(date).key());
    }
}
