//! Validated value types for domain primitives.
//!
//! # Example
//!
//! ```ignore
//! use cohort_models::value_types::CourseCode;
//!
//! let code: CourseCode = "MATH101".parse().unwrap();
//! assert_eq!(code.as_str(), "MATH101");
//! assert!("".parse::<CourseCode>().is_err());
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Longest course code the catalog stores.
pub const COURSE_CODE_MAX_LEN: usize = 10;

/// Error type for value type parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTypeError {
    InvalidCourseCode(String),
}

impl std::error::Error for ValueTypeError {}

impl fmt::Display for ValueTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCourseCode(msg) => write!(f, "Invalid course code: {}", msg),
        }
    }
}

/// A course identifier such as `MATH101`.
///
/// Codes are the catalog's natural key: 1 to 10 characters with no
/// whitespace. Surrounding whitespace is trimmed on parse.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[schema(value_type = String, example = "MATH101")]
pub struct CourseCode(String);

impl CourseCode {
    pub fn new(code: impl Into<String>) -> Result<Self, ValueTypeError> {
        let code = code.into();
        let trimmed = code.trim();
        Self::validate(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// Wrap a code loaded from a trusted source without validating it.
    #[inline]
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    fn validate(code: &str) -> Result<(), ValueTypeError> {
        if code.is_empty() {
            return Err(ValueTypeError::InvalidCourseCode(
                "course code cannot be empty".into(),
            ));
        }

        if code.chars().count() > COURSE_CODE_MAX_LEN {
            return Err(ValueTypeError::InvalidCourseCode(format!(
                "'{}' is longer than {} characters",
                code, COURSE_CODE_MAX_LEN
            )));
        }

        if code.chars().any(char::is_whitespace) {
            return Err(ValueTypeError::InvalidCourseCode(format!(
                "'{}' must not contain whitespace",
                code
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CourseCode({})", self.0)
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CourseCode {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CourseCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl Type<sqlx::Postgres> for CourseCode {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for CourseCode {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for CourseCode {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <String as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
    }
}

impl PgHasArrayType for CourseCode {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }

    fn array_compatible(ty: &PgTypeInfo) -> bool {
        <String as PgHasArrayType>::array_compatible(ty)
    }
}
