//! Per-key load state.

use std::sync::Arc;

use super::ThumbnailImage;
use crate::domain::errors::ThumbnailError;

/// Status of a key in the loading pipeline.
///
/// Moves `NotStarted -> InFlight -> Completed | Failed`. Invalidation resets
/// a key back to `NotStarted`.
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    /// Nothing cached and nothing in flight.
    #[default]
    NotStarted,
    /// A fetch is running for the key.
    InFlight,
    /// The weak slot holds a live image.
    Completed(Arc<ThumbnailImage>),
    /// The last attempt failed.
    Failed(ThumbnailError),
}

impl LoadState {
    /// Returns true if a fetch is running.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    /// Returns true if the state is `Completed` or `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    /// Returns the loaded image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&Arc<ThumbnailImage>> {
        match self {
            Self::Completed(image) => Some(image),
            _ => None,
        }
    }
}
