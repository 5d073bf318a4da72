//! The browse state: one authoritative holder for trucks, listings and status.
//!
//! Every transition is a method taking `&mut self` and running to completion.
//! Changing the query, the cuisine selection, the observer or the full list
//! re-runs the pipeline; the other transitions only store what they are given.
//!
//! Fetching trucks and acquiring a location are split into `begin_*` and
//! `complete_*` halves so both can be in flight at once. Each `begin_*` hands
//! out a ticket; a completion whose ticket has since been superseded is
//! dropped without touching data or flags.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, warn};

use crate::locate::{self, LocationError, LocationProvider};
use crate::model::{Coordinate, Listing, Truck};
use crate::pipeline::{self, Criteria};
use crate::source::{TruckQuery, TruckSource};
use crate::storage::StorageError;

/// The two independent failure domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concern {
    Trucks,
    Location,
}

/// Loading flag and last error for one concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub loading: bool,
    pub error: Option<String>,
}

/// Proof that a truck fetch was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket(u64);

/// Proof that a location acquisition was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LocateTicket(u64);

#[derive(Debug, Default)]
struct Slot {
    status: Status,
    latest: u64,
}

impl Slot {
    fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.status.loading = true;
        self.status.error = None;
        self.latest
    }

    fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

#[derive(Debug, Default)]
pub struct TruckStore {
    trucks: Vec<Truck>,
    listings: Vec<Listing>,
    selected: Option<Truck>,
    criteria: Criteria,
    fetch: Slot,
    locate: Slot,
}

impl TruckStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Reads ──

    /// The full, unfiltered list from the last successful fetch.
    pub fn trucks(&self) -> &[Truck] {
        &self.trucks
    }

    /// The derived list, ready to render.
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn selected(&self) -> Option<&Truck> {
        self.selected.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.criteria.query
    }

    pub fn cuisines(&self) -> &BTreeSet<String> {
        &self.criteria.cuisines
    }

    pub fn observer(&self) -> Option<Coordinate> {
        self.criteria.observer
    }

    pub fn status(&self, concern: Concern) -> &Status {
        &self.slot(concern).status
    }

    // ── Transitions ──

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.criteria.query = query.into();
        self.recompute();
    }

    pub fn set_cuisine_selection<I, S>(&mut self, cuisines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.cuisines = cuisines.into_iter().map(Into::into).collect();
        self.recompute();
    }

    pub fn set_observer_coordinate(&mut self, observer: Option<Coordinate>) {
        self.criteria.observer = observer;
        self.recompute();
    }

    /// Stores the selection. The derived list is left alone.
    pub fn set_selected(&mut self, truck: Option<Truck>) {
        self.selected = truck;
    }

    pub fn replace_full_list(&mut self, trucks: Vec<Truck>) {
        self.trucks = trucks;
        self.recompute();
    }

    pub fn set_loading(&mut self, concern: Concern, loading: bool) {
        self.slot_mut(concern).status.loading = loading;
    }

    pub fn set_error(&mut self, concern: Concern, error: Option<String>) {
        self.slot_mut(concern).status.error = error;
    }

    /// Back to the initial state. Outstanding tickets become stale.
    pub fn reset(&mut self) {
        let fetch_seq = self.fetch.latest;
        let locate_seq = self.locate.latest;
        *self = Self::default();
        self.fetch.latest = fetch_seq + 1;
        self.locate.latest = locate_seq + 1;
    }

    // ── Truck fetch ──

    pub fn begin_fetch(&mut self) -> FetchTicket {
        FetchTicket(self.fetch.begin())
    }

    /// Applies a fetch result. Returns `false` if the ticket was stale.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Truck>, StorageError>,
    ) -> bool {
        if !self.fetch.is_current(ticket.0) {
            debug!(ticket = ticket.0, latest = self.fetch.latest, "ignoring stale fetch");
            return false;
        }
        match result {
            Ok(trucks) => {
                debug!(count = trucks.len(), "fetched trucks");
                self.replace_full_list(trucks);
            }
            Err(e) => {
                warn!(error = %e, "truck fetch failed");
                self.set_error(Concern::Trucks, Some(format!("failed to fetch trucks: {e}")));
            }
        }
        self.set_loading(Concern::Trucks, false);
        true
    }

    /// Fetches from `source` and applies the result.
    pub async fn refresh(&mut self, source: &dyn TruckSource, query: &TruckQuery) {
        let ticket = self.begin_fetch();
        let result = source.fetch_trucks(query).await;
        self.complete_fetch(ticket, result);
    }

    // ── Location ──

    pub fn begin_locate(&mut self) -> LocateTicket {
        LocateTicket(self.locate.begin())
    }

    /// Applies a location result. Returns `false` if the ticket was stale.
    ///
    /// A failure keeps the previous observer.
    pub fn complete_locate(
        &mut self,
        ticket: LocateTicket,
        result: Result<Coordinate, LocationError>,
    ) -> bool {
        if !self.locate.is_current(ticket.0) {
            debug!(ticket = ticket.0, latest = self.locate.latest, "ignoring stale location");
            return false;
        }
        match result {
            Ok(coordinate) => {
                debug!(%coordinate, "located observer");
                self.set_observer_coordinate(Some(coordinate));
            }
            Err(e) => {
                warn!(error = %e, "location failed");
                self.set_error(Concern::Location, Some(format!("Location error: {e}")));
            }
        }
        self.set_loading(Concern::Location, false);
        true
    }

    /// Asks `provider` for the observer's coordinate, giving up after `limit`.
    pub async fn locate(&mut self, provider: &dyn LocationProvider, limit: Duration) {
        let ticket = self.begin_locate();
        let result = locate::locate_within(provider, limit).await;
        self.complete_locate(ticket, result);
    }

    fn recompute(&mut self) {
        self.listings = pipeline::apply(&self.trucks, &self.criteria);
    }

    fn slot(&self, concern: Concern) -> &Slot {
        match concern {
            Concern::Trucks => &self.fetch,
            Concern::Location => &self.locate,
        }
    }

    fn slot_mut(&mut self, concern: Concern) -> &mut Slot {
        match concern {
            Concern::Trucks => &mut self.fetch,
            Concern::Location => &mut self.locate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use jiff::Timestamp;

    use crate::geo::distance_meters;
    use crate::locate::FixedLocation;
    use crate::seed;

    fn sample() -> Vec<Truck> {
        seed::sample_trucks()
            .into_iter()
            .map(|t| t.into_truck(Timestamp::UNIX_EPOCH))
            .collect()
    }

    fn names(store: &TruckStore) -> Vec<&str> {
        store.listings().iter().map(|l| l.truck.name.as_str()).collect()
    }

    struct FakeSource {
        trucks: Option<Vec<Truck>>,
    }

    #[async_trait]
    impl TruckSource for FakeSource {
        async fn fetch_trucks(&self, _query: &TruckQuery) -> Result<Vec<Truck>, StorageError> {
            self.trucks
                .clone()
                .ok_or_else(|| StorageError::Corrupt("connection reset".into()))
        }
    }

    struct NeverLocates;

    #[async_trait]
    impl LocationProvider for NeverLocates {
        async fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
            std::future::pending().await
        }
    }

    #[test]
    fn starts_empty_and_idle() {
        let store = TruckStore::new();
        assert!(store.trucks().is_empty());
        assert!(store.listings().is_empty());
        assert!(store.selected().is_none());
        assert!(store.observer().is_none());
        assert_eq!(store.status(Concern::Trucks), &Status::default());
        assert_eq!(store.status(Concern::Location), &Status::default());
    }

    #[test]
    fn five_truck_walkthrough() {
        let mut store = TruckStore::new();
        store.replace_full_list(sample());
        assert_eq!(store.listings().len(), 5);

        store.set_query("taco");
        assert_eq!(names(&store), ["Taco Paradise"]);

        store.set_query("");
        store.set_cuisine_selection(["Italian"]);
        assert_eq!(names(&store), ["Little Italy Express"]);

        store.set_cuisine_selection(Vec::<String>::new());
        // Between Taco Paradise and Little Italy Express, a little closer to the latter.
        let observer = Coordinate::new(40.7165, -74.0010);
        store.set_observer_coordinate(Some(observer));

        let listings = store.listings();
        assert_eq!(listings.len(), 5);
        assert_eq!(listings[0].truck.name, "Little Italy Express");
        assert_eq!(listings[1].truck.name, "Taco Paradise");
        let distances: Vec<f64> = listings.iter().map(|l| l.distance_meters.unwrap()).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]), "{distances:?}");
        for listing in listings {
            let expected = distance_meters(observer, listing.truck.coordinate);
            assert!((listing.distance_meters.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn selection_does_not_recompute() {
        let mut store = TruckStore::new();
        store.replace_full_list(sample());
        store.set_query("vegan");
        let before = store.listings().to_vec();

        let pick = store.trucks()[0].clone();
        store.set_selected(Some(pick.clone()));

        assert_eq!(store.selected(), Some(&pick));
        assert_eq!(store.listings(), before.as_slice());
    }

    #[test]
    fn flags_are_independent() {
        let mut store = TruckStore::new();
        store.replace_full_list(sample());

        store.set_loading(Concern::Location, true);
        store.set_error(Concern::Trucks, Some("nope".into()));

        assert!(store.status(Concern::Location).loading);
        assert!(store.status(Concern::Location).error.is_none());
        assert!(!store.status(Concern::Trucks).loading);
        assert_eq!(store.listings().len(), 5);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut store = TruckStore::new();
        store.replace_full_list(sample());
        store.set_query("taco");
        store.set_cuisine_selection(["Mexican"]);
        store.set_observer_coordinate(Some(Coordinate::new(40.0, -74.0)));
        store.set_error(Concern::Location, Some("denied".into()));

        store.reset();

        assert!(store.trucks().is_empty());
        assert!(store.listings().is_empty());
        assert_eq!(store.query(), "");
        assert!(store.cuisines().is_empty());
        assert!(store.observer().is_none());
        assert_eq!(store.status(Concern::Location), &Status::default());
    }

    #[tokio::test]
    async fn refresh_replaces_list_and_clears_loading() {
        let mut store = TruckStore::new();
        store.set_query("kitchen");
        let source = FakeSource {
            trucks: Some(sample()),
        };

        store.refresh(&source, &TruckQuery::default()).await;

        assert_eq!(store.trucks().len(), 5);
        assert_eq!(names(&store), ["Seoul Kitchen Truck"]);
        assert_eq!(store.status(Concern::Trucks), &Status::default());
    }

    #[tokio::test]
    async fn failing_fetch_touches_only_its_own_slot() {
        let mut store = TruckStore::new();
        store.replace_full_list(sample());
        store.set_error(Concern::Location, Some("earlier".into()));

        store
            .refresh(&FakeSource { trucks: None }, &TruckQuery::default())
            .await;

        let trucks = store.status(Concern::Trucks);
        assert!(!trucks.loading);
        let error = trucks.error.as_deref().unwrap();
        assert!(error.starts_with("failed to fetch trucks:"), "{error}");
        assert!(error.contains("connection reset"), "{error}");

        assert_eq!(
            store.status(Concern::Location),
            &Status {
                loading: false,
                error: Some("earlier".into()),
            }
        );
        // The previous list survives.
        assert_eq!(store.listings().len(), 5);
    }

    #[tokio::test]
    async fn successful_fetch_clears_previous_error() {
        let mut store = TruckStore::new();
        store
            .refresh(&FakeSource { trucks: None }, &TruckQuery::default())
            .await;
        assert!(store.status(Concern::Trucks).error.is_some());

        let source = FakeSource {
            trucks: Some(sample()),
        };
        store.refresh(&source, &TruckQuery::default()).await;
        assert!(store.status(Concern::Trucks).error.is_none());
    }

    #[tokio::test]
    async fn locate_sets_observer_and_ranks() {
        let mut store = TruckStore::new();
        store.replace_full_list(sample());
        let provider = FixedLocation(Coordinate::new(40.7829, -73.9734));

        store.locate(&provider, Duration::from_secs(1)).await;

        assert_eq!(store.observer(), Some(Coordinate::new(40.7829, -73.9734)));
        assert_eq!(store.listings()[0].truck.name, "Green Garden Vegan");
        assert_eq!(store.status(Concern::Location), &Status::default());
    }

    #[tokio::test]
    async fn location_timeout_is_an_error_and_clears_loading() {
        let mut store = TruckStore::new();
        store.set_observer_coordinate(Some(Coordinate::new(1.0, 1.0)));

        store.locate(&NeverLocates, Duration::from_millis(20)).await;

        let status = store.status(Concern::Location);
        assert!(!status.loading);
        assert_eq!(status.error.as_deref(), Some("Location error: timed out after 20ms"));
        // The previous observer survives.
        assert_eq!(store.observer(), Some(Coordinate::new(1.0, 1.0)));
        assert_eq!(store.status(Concern::Trucks), &Status::default());
    }

    #[test]
    fn stale_fetch_is_ignored() {
        let mut store = TruckStore::new();
        let first = store.begin_fetch();
        let second = store.begin_fetch();

        let mut newer = sample();
        newer.truncate(2);
        assert!(store.complete_fetch(second, Ok(newer)));
        assert!(!store.complete_fetch(first, Ok(sample())));

        assert_eq!(store.trucks().len(), 2);
        assert!(!store.status(Concern::Trucks).loading);
    }

    #[test]
    fn stale_completion_leaves_loading_alone() {
        let mut store = TruckStore::new();
        let first = store.begin_fetch();
        let _second = store.begin_fetch();

        assert!(!store.complete_fetch(first, Err(StorageError::Corrupt("late".into()))));

        let status = store.status(Concern::Trucks);
        assert!(status.loading);
        assert!(status.error.is_none());
    }

    #[test]
    fn fetch_and_locate_commute() {
        let observer = Coordinate::new(40.7192, -73.9969);

        let mut a = TruckStore::new();
        let fetch = a.begin_fetch();
        let locate = a.begin_locate();
        a.complete_fetch(fetch, Ok(sample()));
        a.complete_locate(locate, Ok(observer));

        let mut b = TruckStore::new();
        let fetch = b.begin_fetch();
        let locate = b.begin_locate();
        b.complete_locate(locate, Ok(observer));
        b.complete_fetch(fetch, Ok(sample()));

        assert_eq!(a.listings(), b.listings());
        assert_eq!(a.listings()[0].truck.name, "Little Italy Express");
        assert!(!a.status(Concern::Trucks).loading && !a.status(Concern::Location).loading);
    }

    #[test]
    fn reset_makes_outstanding_tickets_stale() {
        let mut store = TruckStore::new();
        let ticket = store.begin_fetch();
        store.reset();
        assert!(!store.complete_fetch(ticket, Ok(sample())));
        assert!(store.trucks().is_empty());
    }
}
