//! The storage/query collaborator as seen by the browse state.
//!
//! A [`TruckSource`] answers [`TruckQuery`]s with active trucks. The store
//! re-filters and re-sorts whatever comes back; it never assumes the source
//! applied the same narrowing it does.

use async_trait::async_trait;

use crate::model::{Coordinate, Truck};
use crate::storage::StorageError;

/// Radius used for nearby queries when none is configured.
pub const DEFAULT_RADIUS_METERS: f64 = 5_000.0;

/// Result cap used when none is given.
pub const DEFAULT_LIMIT: usize = 50;

/// Server-side narrowing applied before trucks reach the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TruckQuery {
    /// Exact cuisine tag; `"all"` or empty disables it.
    pub cuisine: Option<String>,

    /// Free text, matched word by word.
    pub search_text: Option<String>,

    /// Restrict to a radius and order nearest first.
    pub near: Option<Near>,

    /// Maximum number of trucks to return (defaults to [`DEFAULT_LIMIT`]).
    pub limit: Option<usize>,

    /// Keep only trucks open at the time of the query.
    pub open_now: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Near {
    pub coordinate: Coordinate,
    pub radius_meters: f64,
}

/// Anything that can answer a truck query.
#[async_trait]
pub trait TruckSource: Send + Sync {
    async fn fetch_trucks(&self, query: &TruckQuery) -> Result<Vec<Truck>, StorageError>;
}
