//! Truck types: the records the directory is made of.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Coordinate, WeeklyHours};

/// A food truck as stored and listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    /// Opaque id assigned by storage.
    pub id: String,
    pub name: String,
    pub description: String,

    /// Short labels such as `"Mexican"`. Display order is preserved.
    pub cuisine_tags: Vec<String>,
    pub coordinate: Coordinate,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub weekly_hours: WeeklyHours,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<Menu>,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default = "default_active")]
    pub active: bool,

    /// Last time the truck's record was touched (created or updated).
    pub last_seen: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Truck {
    /// Checks every field constraint, reporting the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "is required"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::new("description", "is required"));
        }
        if self.cuisine_tags.is_empty() {
            return Err(ValidationError::new(
                "cuisineTags",
                "must contain at least one tag",
            ));
        }
        if self.cuisine_tags.iter().any(|t| t.trim().is_empty()) {
            return Err(ValidationError::new("cuisineTags", "tags must be non-empty"));
        }
        if !self.coordinate.is_valid() {
            return Err(ValidationError::new(
                "coordinate",
                format!("{} is out of range", self.coordinate),
            ));
        }
        if self.address.trim().is_empty() {
            return Err(ValidationError::new("address", "is required"));
        }
        for (day, hours) in self.weekly_hours.iter() {
            hours.validate().map_err(|reason| {
                ValidationError::new("weeklyHours", format!("{}: {reason}", day.as_str()))
            })?;
        }
        if !(0.0..=5.0).contains(&self.rating.average) {
            return Err(ValidationError::new("rating", "average must be within 0..=5"));
        }
        if let Some(menu) = &self.menu {
            for item in &menu.items {
                item.validate()?;
            }
        }
        Ok(())
    }
}

fn default_active() -> bool {
    true
}

/// A truck as submitted for creation: no id or timestamps required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTruck {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub cuisine_tags: Vec<String>,
    pub coordinate: Coordinate,
    pub address: String,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub weekly_hours: Option<WeeklyHours>,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub menu: Option<Menu>,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl NewTruck {
    /// Assigns an id (when absent) and stamps all timestamps with `now`.
    ///
    /// The name is trimmed. Missing hours fall back to the default schedule.
    pub fn into_truck(self, now: Timestamp) -> Truck {
        Truck {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: self.name.trim().to_string(),
            description: self.description,
            cuisine_tags: self.cuisine_tags,
            coordinate: self.coordinate,
            address: self.address,
            neighborhood: self.neighborhood,
            weekly_hours: self.weekly_hours.unwrap_or_default(),
            contact: self.contact,
            menu: self.menu,
            rating: self.rating,
            active: self.active,
            last_seen: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update: every provided field replaces the stored one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TruckPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cuisine_tags: Option<Vec<String>>,
    pub coordinate: Option<Coordinate>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub weekly_hours: Option<WeeklyHours>,
    pub contact: Option<Contact>,
    pub menu: Option<Menu>,
    pub rating: Option<Rating>,
    pub active: Option<bool>,
}

impl TruckPatch {
    /// Applies the patch and stamps `lastSeen`/`updatedAt` with `now`.
    pub fn apply(&self, truck: &mut Truck, now: Timestamp) {
        if let Some(name) = &self.name {
            truck.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            truck.description.clone_from(description);
        }
        if let Some(tags) = &self.cuisine_tags {
            truck.cuisine_tags.clone_from(tags);
        }
        if let Some(coordinate) = self.coordinate {
            truck.coordinate = coordinate;
        }
        if let Some(address) = &self.address {
            truck.address.clone_from(address);
        }
        if let Some(neighborhood) = &self.neighborhood {
            truck.neighborhood = Some(neighborhood.clone());
        }
        if let Some(hours) = &self.weekly_hours {
            truck.weekly_hours = hours.clone();
        }
        if let Some(contact) = &self.contact {
            truck.contact = contact.clone();
        }
        if let Some(menu) = &self.menu {
            truck.menu = Some(menu.clone());
        }
        if let Some(rating) = self.rating {
            truck.rating = rating;
        }
        if let Some(active) = self.active {
            truck.active = active;
        }
        truck.last_seen = now;
        truck.updated_at = now;
    }
}

/// Average star rating and number of ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub average: f64,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub social: Social,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Social {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub items: Vec<MenuItem>,
    pub last_updated: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dietary: Vec<Dietary>,

    /// Heat from 1 (mild) to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spicy_level: Option<u8>,
}

impl MenuItem {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("menu", "item name is required"));
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::new(
                "menu",
                format!("'{}' needs a category", self.name),
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::new(
                "menu",
                format!("'{}' has an invalid price", self.name),
            ));
        }
        if let Some(level) = self.spicy_level
            && !(1..=5).contains(&level)
        {
            return Err(ValidationError::new(
                "menu",
                format!("'{}' spicy level must be within 1..=5", self.name),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dietary {
    Vegan,
    Vegetarian,
    GlutenFree,
}

/// A record that breaks a field constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
