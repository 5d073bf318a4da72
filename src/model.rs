//! Core data model for curbside.
//!
//! Trucks as stored, the partial shapes used to create and patch them,
//! and the annotated listings the search pipeline produces.

mod coordinate;
mod hours;
mod listing;
mod truck;

pub use coordinate::Coordinate;
pub use hours::{DayHours, DayOfWeek, WeeklyHours};
pub use listing::Listing;
pub use truck::{
    Contact, Dietary, Menu, MenuItem, NewTruck, Rating, Social, Truck, TruckPatch,
    ValidationError,
};
