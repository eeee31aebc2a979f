//! Request handlers

pub mod health;
pub mod submissions;
pub mod queue;

use std::str::FromStr;

use crate::error::ApiError;

/// Parses a path segment with the type's `FromStr`, answering 400 on failure
pub(crate) fn parse_segment<T>(kind: &str, raw: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid {kind} '{raw}': {e}")))
}
