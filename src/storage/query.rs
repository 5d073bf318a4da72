//! Truck queries: the server-side half of a search.
//!
//! Narrowing here is coarse on purpose. Active and cuisine filtering run in
//! SQL. Text search is word based and ranked by how many words hit, and
//! nearby search keeps a radius and orders by distance; both run over the
//! selected rows in memory, which is fine for a city's worth of trucks.
//! The browse pipeline refines whatever comes back.

use async_trait::async_trait;
use jiff::civil::Time;
use tracing::debug;

use crate::geo::distance_meters;
use crate::model::{DayOfWeek, Truck};
use crate::pipeline::{ALL_CUISINES, matches_text};
use crate::source::{DEFAULT_LIMIT, TruckQuery, TruckSource};

use super::{Result, Storage, StorageError};

impl Storage {
    /// Answers a query against active trucks, evaluating open-now at the
    /// current local time.
    pub fn fetch_trucks(&self, query: &TruckQuery) -> Result<Vec<Truck>> {
        let now = jiff::Zoned::now();
        self.fetch_trucks_at(query, now.weekday().into(), now.time())
    }

    /// Like [`Storage::fetch_trucks`], with open-now evaluated at `day`/`time`.
    pub fn fetch_trucks_at(
        &self,
        query: &TruckQuery,
        day: DayOfWeek,
        time: Time,
    ) -> Result<Vec<Truck>> {
        let cuisine = query
            .cuisine
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_CUISINES);
        let mut trucks = self.list_active(cuisine)?;

        if let Some(text) = query.search_text.as_deref() {
            trucks = rank_by_text(trucks, text);
        }

        if let Some(near) = query.near {
            let mut ranked: Vec<(f64, Truck)> = trucks
                .into_iter()
                .map(|t| (distance_meters(near.coordinate, t.coordinate), t))
                .filter(|(d, _)| *d <= near.radius_meters)
                .collect();
            ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
            trucks = ranked.into_iter().map(|(_, t)| t).collect();
        }

        if query.open_now {
            trucks.retain(|t| t.weekly_hours.is_open_at(day, time));
        }

        trucks.truncate(query.limit.unwrap_or(DEFAULT_LIMIT));
        debug!(count = trucks.len(), ?query, "fetched trucks");
        Ok(trucks)
    }
}

/// Keeps trucks matching at least one word of `text`, most matches first.
///
/// Blank text keeps everything in order.
fn rank_by_text(trucks: Vec<Truck>, text: &str) -> Vec<Truck> {
    let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    if words.is_empty() {
        return trucks;
    }

    let mut scored: Vec<(usize, Truck)> = trucks
        .into_iter()
        .filter_map(|t| {
            let score = words.iter().filter(|w| matches_text(&t, w)).count();
            (score > 0).then_some((score, t))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, t)| t).collect()
}

#[async_trait]
impl TruckSource for Storage {
    async fn fetch_trucks(
        &self,
        query: &TruckQuery,
    ) -> core::result::Result<Vec<Truck>, StorageError> {
        Storage::fetch_trucks(self, query)
    }
}
