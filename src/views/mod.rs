//! Projections from the loaded repository and a resolved selection to the
//! datasets each visual consumes. Every projection is a pure function: the
//! same selection over the same repository yields the same output.

pub mod amenities;
pub mod map;
pub mod options;
pub mod table;
pub mod time_series;

use serde::Serialize;

use crate::domain::selection::InvalidSelection;

/// Outcome of a projection. An unusable selection is a regular outcome that
/// the presentation layer renders as a notice, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "view", rename_all = "snake_case")]
pub enum View<T> {
    Ready(T),
    InvalidSelection(InvalidSelection),
}

impl<T> View<T> {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidSelection(InvalidSelection::new(reason))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(view) => Some(view),
            Self::InvalidSelection(_) => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(view) => Some(view),
            Self::InvalidSelection(_) => None,
        }
    }
}

impl<T> From<Result<T, InvalidSelection>> for View<T> {
    fn from(result: Result<T, InvalidSelection>) -> Self {
        match result {
            Ok(view) => Self::Ready(view),
            Err(invalid) => Self::InvalidSelection(invalid),
        }
    }
}
