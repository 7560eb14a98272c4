//! Parser for the ranked amenities summary carried by each listing row.
//!
//! Grammar:
//!
//! ```text
//! Entries := Entry ("), " Entry)*
//! Entry   := Name " (" Int ", " Float "%)"
//! ```
//!
//! The entry separator consumes the closing parenthesis of every entry except
//! the last one. A malformed entry is skipped; the rest of the string is still
//! parsed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENTRY_SEPARATOR: &str = "), ";
const COUNT_OPEN: &str = " (";
const FIELD_SEPARATOR: &str = ", ";

/// One amenity with the number of listings offering it and their share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityEntry {
    pub name: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmenityParseError {
    #[error("expected exactly one ' (' in '{0}'")]
    MissingCounts(String),

    #[error("expected 'count, percentage' in '{0}'")]
    MissingPercentage(String),

    #[error("invalid count '{0}'")]
    InvalidCount(String),

    #[error("invalid percentage '{0}'")]
    InvalidPercentage(String),
}

/// Parses a full amenities string, keeping source order and skipping
/// malformed entries. Empty input yields an empty list.
pub fn parse_amenities(raw: &str) -> Vec<AmenityEntry> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    raw.split(ENTRY_SEPARATOR)
        .filter_map(|token| match parse_entry(token) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(token, error = %e, "Skipping malformed amenity");
                None
            }
        })
        .collect()
}

/// Parses one `Name (count, percentage%` token. A trailing `)` is accepted so
/// the last entry of a string parses the same as the others.
pub fn parse_entry(token: &str) -> Result<AmenityEntry, AmenityParseError> {
    let mut parts = token.split(COUNT_OPEN);
    let (Some(name), Some(rest), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AmenityParseError::MissingCounts(token.to_string()));
    };

    let mut fields = rest.split(FIELD_SEPARATOR);
    let (Some(count), Some(percentage), None) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(AmenityParseError::MissingPercentage(rest.to_string()));
    };

    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|_| AmenityParseError::InvalidCount(count.to_string()))?;
    let percentage = percentage
        .trim_matches(|c| c == '%' || c == ')')
        .trim()
        .parse::<f64>()
        .map_err(|_| AmenityParseError::InvalidPercentage(percentage.to_string()))?;

    Ok(AmenityEntry {
        name: name.to_string(),
        count,
        percentage,
    })
}
