pub mod customers;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use std::str::FromStr;

use crate::error::ApiError;

/// Parses an identifier taken from the request path.
pub(crate) fn parse_id<T>(id: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
