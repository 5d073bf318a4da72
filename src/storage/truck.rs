//! Truck storage: create, load, update, delete, list, and seed trucks.

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use tracing::debug;

use crate::model::{Coordinate, Rating, Truck, TruckPatch};

use super::{Result, Storage, StorageError};

const COLUMNS: &str = "id, name, description, cuisine_tags, lat, lng, address, neighborhood, \
     weekly_hours, contact, menu, rating_average, rating_count, active, \
     last_seen, created_at, updated_at";

impl Storage {
    /// Validates and inserts a new truck.
    pub fn create_truck(&self, truck: &Truck) -> Result<()> {
        truck.validate()?;
        let conn = self.open_db()?;
        if truck_exists(&conn, &truck.id)? {
            return Err(StorageError::TruckAlreadyExists(truck.id.clone()));
        }
        insert_truck(&conn, truck)?;
        debug!(id = %truck.id, name = %truck.name, "created truck");
        Ok(())
    }

    /// Loads a single truck by id.
    pub fn load_truck(&self, id: &str) -> Result<Truck> {
        let conn = self.open_db()?;
        let raw = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM truck WHERE id = ?1"),
                [id],
                RawTruck::from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::TruckNotFound(id.to_string()))?;
        raw.into_truck()
    }

    /// Applies a patch to a stored truck and returns the updated record.
    ///
    /// `lastSeen` and `updatedAt` are always bumped. The patched truck must
    /// still validate, otherwise nothing is written.
    pub fn update_truck(&self, id: &str, patch: &TruckPatch) -> Result<Truck> {
        let mut truck = self.load_truck(id)?;
        patch.apply(&mut truck, Timestamp::now());
        truck.validate()?;

        let conn = self.open_db()?;
        let row = TruckColumns::new(&truck)?;
        let rows = conn.execute(
            "UPDATE truck
             SET name = ?2, description = ?3, cuisine_tags = ?4, lat = ?5, lng = ?6,
                 address = ?7, neighborhood = ?8, weekly_hours = ?9, contact = ?10,
                 menu = ?11, rating_average = ?12, rating_count = ?13, active = ?14,
                 last_seen = ?15, created_at = ?16, updated_at = ?17
             WHERE id = ?1",
            &row.params(),
        )?;
        if rows == 0 {
            return Err(StorageError::TruckNotFound(id.to_string()));
        }
        debug!(id = %truck.id, "updated truck");
        Ok(truck)
    }

    /// Deletes a truck by id.
    pub fn delete_truck(&self, id: &str) -> Result<()> {
        let conn = self.open_db()?;
        let rows = conn.execute("DELETE FROM truck WHERE id = ?1", [id])?;
        if rows == 0 {
            return Err(StorageError::TruckNotFound(id.to_string()));
        }
        debug!(id, "deleted truck");
        Ok(())
    }

    /// Lists every truck, inactive ones included, oldest first.
    pub fn list_trucks(&self) -> Result<Vec<Truck>> {
        let conn = self.open_db()?;
        let mut trucks = select_trucks(&conn, "", &[])?;
        trucks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(trucks)
    }

    /// Lists active trucks in insertion order.
    pub(super) fn list_active(&self, cuisine: Option<&str>) -> Result<Vec<Truck>> {
        let conn = self.open_db()?;
        match cuisine {
            Some(cuisine) => select_trucks(
                &conn,
                "WHERE active = 1 \
                 AND EXISTS (SELECT 1 FROM json_each(truck.cuisine_tags) WHERE value = ?1)",
                &[&cuisine],
            ),
            None => select_trucks(&conn, "WHERE active = 1", &[]),
        }
    }

    /// Replaces the whole collection with `trucks` in one transaction.
    ///
    /// Every truck is validated before anything is deleted.
    pub fn seed(&self, trucks: &[Truck]) -> Result<usize> {
        for truck in trucks {
            truck.validate()?;
        }

        let mut conn = self.open_db()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM truck", [])?;
        for truck in trucks {
            insert_truck(&tx, truck)?;
        }
        tx.commit()?;

        debug!(count = trucks.len(), "seeded trucks");
        Ok(trucks.len())
    }

    /// Number of stored trucks, inactive ones included.
    pub fn count(&self) -> Result<usize> {
        let conn = self.open_db()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM truck", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|e| StorageError::Corrupt(format!("row count: {e}")))
    }
}

fn truck_exists(conn: &Connection, id: &str) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM truck WHERE id = ?1", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn insert_truck(conn: &Connection, truck: &Truck) -> Result<()> {
    let row = TruckColumns::new(truck)?;
    conn.execute(
        &format!(
            "INSERT INTO truck ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
        ),
        &row.params(),
    )?;
    Ok(())
}

fn select_trucks(conn: &Connection, filter: &str, params: &[&dyn ToSql]) -> Result<Vec<Truck>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM truck {filter} ORDER BY rowid"
    ))?;
    let rows = stmt.query_map(params, RawTruck::from_row)?;
    let mut trucks = Vec::new();
    for raw in rows {
        trucks.push(raw?.into_truck()?);
    }
    Ok(trucks)
}

/// A truck flattened into column values, ready to bind.
struct TruckColumns<'a> {
    truck: &'a Truck,
    cuisine_tags: String,
    weekly_hours: String,
    contact: String,
    menu: Option<String>,
    last_seen: String,
    created_at: String,
    updated_at: String,
}

impl<'a> TruckColumns<'a> {
    fn new(truck: &'a Truck) -> Result<Self> {
        Ok(Self {
            truck,
            cuisine_tags: serde_json::to_string(&truck.cuisine_tags)?,
            weekly_hours: serde_json::to_string(&truck.weekly_hours)?,
            contact: serde_json::to_string(&truck.contact)?,
            menu: truck.menu.as_ref().map(serde_json::to_string).transpose()?,
            last_seen: truck.last_seen.to_string(),
            created_at: truck.created_at.to_string(),
            updated_at: truck.updated_at.to_string(),
        })
    }

    /// Positional parameters in [`COLUMNS`] order.
    fn params(&self) -> [&dyn ToSql; 17] {
        let t = self.truck;
        [
            &t.id,
            &t.name,
            &t.description,
            &self.cuisine_tags,
            &t.coordinate.lat,
            &t.coordinate.lng,
            &t.address,
            &t.neighborhood,
            &self.weekly_hours,
            &self.contact,
            &self.menu,
            &t.rating.average,
            &t.rating.count,
            &t.active,
            &self.last_seen,
            &self.created_at,
            &self.updated_at,
        ]
    }
}

/// Column values as read back, before JSON and timestamp decoding.
struct RawTruck {
    id: String,
    name: String,
    description: String,
    cuisine_tags: String,
    lat: f64,
    lng: f64,
    address: String,
    neighborhood: Option<String>,
    weekly_hours: String,
    contact: String,
    menu: Option<String>,
    rating_average: f64,
    rating_count: i64,
    active: bool,
    last_seen: String,
    created_at: String,
    updated_at: String,
}

impl RawTruck {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            cuisine_tags: row.get(3)?,
            lat: row.get(4)?,
            lng: row.get(5)?,
            address: row.get(6)?,
            neighborhood: row.get(7)?,
            weekly_hours: row.get(8)?,
            contact: row.get(9)?,
            menu: row.get(10)?,
            rating_average: row.get(11)?,
            rating_count: row.get(12)?,
            active: row.get(13)?,
            last_seen: row.get(14)?,
            created_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }

    fn into_truck(self) -> Result<Truck> {
        let id = self.id;
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            StorageError::Corrupt(format!("{id}: invalid {field}: {e}"))
        };

        let count = u32::try_from(self.rating_count).map_err(|e| corrupt("rating_count", &e))?;
        let timestamp = |field: &str, value: &str| {
            value
                .parse::<Timestamp>()
                .map_err(|e| corrupt(field, &e))
        };
        let last_seen = timestamp("last_seen", &self.last_seen)?;
        let created_at = timestamp("created_at", &self.created_at)?;
        let updated_at = timestamp("updated_at", &self.updated_at)?;

        Ok(Truck {
            name: self.name,
            description: self.description,
            cuisine_tags: serde_json::from_str(&self.cuisine_tags)?,
            coordinate: Coordinate::new(self.lat, self.lng),
            address: self.address,
            neighborhood: self.neighborhood,
            weekly_hours: serde_json::from_str(&self.weekly_hours)?,
            contact: serde_json::from_str(&self.contact)?,
            menu: self.menu.as_deref().map(serde_json::from_str).transpose()?,
            rating: Rating {
                average: self.rating_average,
                count,
            },
            active: self.active,
            last_seen,
            created_at,
            updated_at,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Contact, Menu, MenuItem, NewTruck};
    use crate::seed;
    use crate::storage::tests::test_storage;

    fn sample_truck() -> Truck {
        NewTruck {
            id: None,
            name: "Taco Paradise".into(),
            description: "Street tacos.".into(),
            cuisine_tags: vec!["Mexican".into(), "Tex-Mex".into()],
            coordinate: Coordinate::new(40.7128, -74.0060),
            address: "123 Broadway".into(),
            neighborhood: Some("Financial District".into()),
            weekly_hours: None,
            contact: Contact::default(),
            menu: None,
            rating: Rating {
                average: 4.5,
                count: 127,
            },
            active: true,
        }
        .into_truck(Timestamp::now())
    }

    fn seeded_trucks() -> Vec<Truck> {
        seed::sample_trucks()
            .into_iter()
            .map(|t| t.into_truck(Timestamp::now()))
            .collect()
    }

    #[test]
    fn create_and_load_truck() {
        let (_dir, storage) = test_storage();
        let truck = sample_truck();

        storage.create_truck(&truck).unwrap();
        let loaded = storage.load_truck(&truck.id).unwrap();

        assert_eq!(loaded, truck);
    }

    #[test]
    fn create_and_load_preserves_menu() {
        let (_dir, storage) = test_storage();
        let mut truck = sample_truck();
        truck.menu = Some(Menu {
            items: vec![MenuItem {
                name: "Street Tacos".into(),
                description: None,
                price: 12.99,
                category: "Tacos".into(),
                dietary: vec![],
                spicy_level: Some(2),
            }],
            last_updated: Timestamp::now(),
        });

        storage.create_truck(&truck).unwrap();
        let loaded = storage.load_truck(&truck.id).unwrap();

        assert_eq!(loaded.menu, truck.menu);
    }

    #[test]
    fn create_duplicate_truck_fails() {
        let (_dir, storage) = test_storage();
        let truck = sample_truck();

        storage.create_truck(&truck).unwrap();
        let err = storage.create_truck(&truck).unwrap_err();

        assert!(matches!(err, StorageError::TruckAlreadyExists(_)));
    }

    #[test]
    fn create_invalid_truck_fails() {
        let (_dir, storage) = test_storage();
        let mut truck = sample_truck();
        truck.address = String::new();

        let err = storage.create_truck(&truck).unwrap_err();

        assert!(matches!(err, StorageError::Invalid(ref e) if e.field == "address"));
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn load_nonexistent_truck_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_truck("missing").unwrap_err();

        assert!(matches!(err, StorageError::TruckNotFound(_)));
    }

    #[test]
    fn update_truck_merges_patch_and_bumps_last_seen() {
        let (_dir, storage) = test_storage();
        let mut truck = sample_truck();
        truck.last_seen = Timestamp::new(1_000_000_000, 0).unwrap();
        storage.create_truck(&truck).unwrap();

        let patch = TruckPatch {
            address: Some("500 Broadway".into()),
            ..TruckPatch::default()
        };
        let updated = storage.update_truck(&truck.id, &patch).unwrap();

        assert_eq!(updated.address, "500 Broadway");
        assert_eq!(updated.name, truck.name);
        assert!(updated.last_seen > truck.last_seen);

        let loaded = storage.load_truck(&truck.id).unwrap();
        assert_eq!(loaded, updated);
    }

    #[test]
    fn update_that_breaks_validation_is_not_written() {
        let (_dir, storage) = test_storage();
        let truck = sample_truck();
        storage.create_truck(&truck).unwrap();

        let patch = TruckPatch {
            cuisine_tags: Some(vec![]),
            ..TruckPatch::default()
        };
        let err = storage.update_truck(&truck.id, &patch).unwrap_err();

        assert!(matches!(err, StorageError::Invalid(_)));
        let loaded = storage.load_truck(&truck.id).unwrap();
        assert_eq!(loaded.cuisine_tags, truck.cuisine_tags);
    }

    #[test]
    fn update_nonexistent_truck_fails() {
        let (_dir, storage) = test_storage();
        let err = storage
            .update_truck("missing", &TruckPatch::default())
            .unwrap_err();

        assert!(matches!(err, StorageError::TruckNotFound(_)));
    }

    #[test]
    fn delete_truck_removes_it() {
        let (_dir, storage) = test_storage();
        let truck = sample_truck();
        storage.create_truck(&truck).unwrap();

        storage.delete_truck(&truck.id).unwrap();

        assert!(matches!(
            storage.load_truck(&truck.id).unwrap_err(),
            StorageError::TruckNotFound(_)
        ));
        assert!(matches!(
            storage.delete_truck(&truck.id).unwrap_err(),
            StorageError::TruckNotFound(_)
        ));
    }

    #[test]
    fn list_trucks_empty() {
        let (_dir, storage) = test_storage();
        assert!(storage.list_trucks().unwrap().is_empty());
    }

    #[test]
    fn list_trucks_sorted_by_created_at_including_inactive() {
        let (_dir, storage) = test_storage();

        let mut first = sample_truck();
        first.name = "First".into();
        first.active = false;
        first.created_at = Timestamp::new(1_000_000_000, 0).unwrap();

        let mut second = sample_truck();
        second.name = "Second".into();
        second.created_at = Timestamp::new(2_000_000_000, 0).unwrap();

        // Create in reverse order to verify sorting.
        storage.create_truck(&second).unwrap();
        storage.create_truck(&first).unwrap();

        let trucks = storage.list_trucks().unwrap();
        let names: Vec<&str> = trucks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
    }

    #[test]
    fn seed_replaces_existing_trucks() {
        let (_dir, storage) = test_storage();
        storage.create_truck(&sample_truck()).unwrap();

        let trucks = seeded_trucks();
        let count = storage.seed(&trucks).unwrap();

        assert_eq!(count, 5);
        assert_eq!(storage.count().unwrap(), 5);
        let names: Vec<String> = storage
            .list_active(None)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names[0], "Taco Paradise");
        assert_eq!(names[4], "Little Italy Express");
    }

    #[test]
    fn list_active_filters_cuisine_by_whole_tag() {
        let (_dir, storage) = test_storage();
        let mut trucks = seeded_trucks();
        trucks[3].active = false;
        storage.seed(&trucks).unwrap();

        let names = |cuisine: Option<&str>| -> Vec<String> {
            storage
                .list_active(cuisine)
                .unwrap()
                .into_iter()
                .map(|t| t.name)
                .collect()
        };
        assert_eq!(names(Some("Korean")), ["Seoul Kitchen Truck"]);
        assert_eq!(names(Some("American")), ["Brooklyn BBQ Mobile"]);
        assert!(names(Some("Kor")).is_empty());
        assert!(names(Some("Vegan")).is_empty());
        assert_eq!(names(None).len(), 4);
    }

    #[test]
    fn seed_with_invalid_truck_keeps_existing_data() {
        let (_dir, storage) = test_storage();
        storage.create_truck(&sample_truck()).unwrap();

        let mut trucks = seeded_trucks();
        trucks[2].name = "   ".into();
        let err = storage.seed(&trucks).unwrap_err();

        assert!(matches!(err, StorageError::Invalid(_)));
        assert_eq!(storage.count().unwrap(), 1);
    }

    #[test]
    fn corrupt_timestamp_is_reported() {
        let (_dir, storage) = test_storage();
        let truck = sample_truck();
        storage.create_truck(&truck).unwrap();

        let conn = storage.open_db().unwrap();
        conn.execute(
            "UPDATE truck SET created_at = 'yesterday' WHERE id = ?1",
            [&truck.id],
        )
        .unwrap();

        let err = storage.load_truck(&truck.id).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(ref m) if m.contains("created_at")));
    }
}
