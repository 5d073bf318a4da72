//! The search pipeline: text filter, cuisine filter, then distance ranking.
//!
//! Stages always run in that order over the full list and never touch the
//! input records. The last stage produces annotated copies.

use std::collections::BTreeSet;

use crate::geo::distance_meters;
use crate::model::{Coordinate, Listing, Truck};

/// Cuisine selection entry that disables cuisine filtering.
pub const ALL_CUISINES: &str = "all";

/// Everything the pipeline needs besides the trucks themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub query: String,
    pub cuisines: BTreeSet<String>,
    pub observer: Option<Coordinate>,
}

/// Runs all three stages over `trucks`.
pub fn apply(trucks: &[Truck], criteria: &Criteria) -> Vec<Listing> {
    let candidates: Vec<&Truck> = trucks.iter().collect();
    let candidates = filter_by_text(candidates, &criteria.query);
    let candidates = filter_by_cuisine(candidates, &criteria.cuisines);
    rank_by_distance(&candidates, criteria.observer)
}

/// Keeps trucks where any searchable field contains `query`, ignoring case.
///
/// A blank query keeps everything.
pub fn filter_by_text<'a>(candidates: Vec<&'a Truck>, query: &str) -> Vec<&'a Truck> {
    if query.trim().is_empty() {
        return candidates;
    }
    let needle = query.to_lowercase();
    candidates
        .into_iter()
        .filter(|truck| matches_text(truck, &needle))
        .collect()
}

/// `needle` must already be lowercase.
pub(crate) fn matches_text(truck: &Truck, needle: &str) -> bool {
    contains_folded(&truck.name, needle)
        || contains_folded(&truck.description, needle)
        || truck
            .cuisine_tags
            .iter()
            .any(|tag| contains_folded(tag, needle))
        || contains_folded(&truck.address, needle)
        || truck
            .neighborhood
            .as_deref()
            .is_some_and(|n| contains_folded(n, needle))
}

fn contains_folded(field: &str, needle: &str) -> bool {
    field.to_lowercase().contains(needle)
}

/// Keeps trucks tagged with at least one selected cuisine.
///
/// Tags compare exactly, case included. An empty selection, or one that
/// includes [`ALL_CUISINES`], keeps everything.
pub fn filter_by_cuisine<'a>(
    candidates: Vec<&'a Truck>,
    selection: &BTreeSet<String>,
) -> Vec<&'a Truck> {
    if selection.is_empty() || selection.contains(ALL_CUISINES) {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|truck| truck.cuisine_tags.iter().any(|tag| selection.contains(tag)))
        .collect()
}

/// Copies candidates into listings, nearest first when an observer is known.
///
/// Without an observer the order is unchanged and no distance is attached.
/// Equal distances keep their input order.
pub fn rank_by_distance(candidates: &[&Truck], observer: Option<Coordinate>) -> Vec<Listing> {
    let Some(observer) = observer else {
        return candidates
            .iter()
            .map(|truck| Listing::unranked((*truck).clone()))
            .collect();
    };

    let mut listings: Vec<Listing> = candidates
        .iter()
        .map(|truck| Listing {
            distance_meters: Some(distance_meters(observer, truck.coordinate)),
            truck: (*truck).clone(),
        })
        .collect();
    // `sort_by` is stable.
    listings.sort_by(|a, b| {
        let a = a.distance_meters.unwrap_or_default();
        let b = b.distance_meters.unwrap_or_default();
        a.total_cmp(&b)
    });
    listings
}
