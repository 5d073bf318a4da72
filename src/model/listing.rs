//! Listing: a truck as it appears in a result list.

use serde::Serialize;

use super::Truck;

/// A copy of a truck, annotated for display.
///
/// `distance_meters` is present only when the list was ranked against an
/// observer coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(flatten)]
    pub truck: Truck,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

impl Listing {
    pub fn unranked(truck: Truck) -> Self {
        Self {
            truck,
            distance_meters: None,
        }
    }
}
