//! SQLite persistence for locations and their settings.

use super::{Location, LocationInput, LocationSetting, LocationSummary};
use crate::db::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;

const LOCATION_COLUMNS: &str = "id, locale, extra_id, title, street, number, zip, city, country,
     latitude, longitude, show_in_overview, created_on, edited_on";

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid timestamp: {}", raw))?
        .with_timezone(&Utc))
}

struct LocationRecord {
    id: i64,
    locale: String,
    extra_id: i64,
    title: String,
    street: String,
    number: String,
    zip: String,
    city: String,
    country: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    show_in_overview: bool,
    created_on: String,
    edited_on: String,
}

impl LocationRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            locale: row.get(1)?,
            extra_id: row.get(2)?,
            title: row.get(3)?,
            street: row.get(4)?,
            number: row.get(5)?,
            zip: row.get(6)?,
            city: row.get(7)?,
            country: row.get(8)?,
            latitude: row.get(9)?,
            longitude: row.get(10)?,
            show_in_overview: row.get(11)?,
            created_on: row.get(12)?,
            edited_on: row.get(13)?,
        })
    }

    fn into_location(self, settings: Vec<LocationSetting>) -> Result<Location> {
        Ok(Location {
            id: self.id,
            locale: self.locale,
            extra_id: self.extra_id,
            title: self.title,
            street: self.street,
            number: self.number,
            zip: self.zip,
            city: self.city,
            country: self.country,
            latitude: self.latitude,
            longitude: self.longitude,
            show_in_overview: self.show_in_overview,
            created_on: parse_timestamp(&self.created_on)?,
            edited_on: parse_timestamp(&self.edited_on)?,
            settings,
        })
    }
}

fn settings_for(conn: &Connection, location_id: i64) -> Result<Vec<LocationSetting>> {
    let mut stmt = conn.prepare(
        "SELECT name, value FROM location_settings WHERE location_id = ?1 ORDER BY rowid ASC",
    )?;

    let raw = stmt
        .query_map(params![location_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(name, value)| {
            let value = serde_json::from_str(&value)
                .with_context(|| format!("Failed to parse setting {} of location {}", name, location_id))?;
            Ok(LocationSetting { name, value })
        })
        .collect()
}

impl Database {
    // ==================== Locations ====================

    pub fn find_location(&self, id: i64) -> Result<Option<Location>> {
        let conn = self.conn()?;

        let record = conn
            .query_row(
                &format!("SELECT {} FROM location WHERE id = ?1", LOCATION_COLUMNS),
                params![id],
                LocationRecord::from_row,
            )
            .optional()?;

        match record {
            Some(record) => {
                let settings = settings_for(&conn, record.id)?;
                Ok(Some(record.into_location(settings)?))
            }
            None => Ok(None),
        }
    }

    pub fn find_all_locations(&self) -> Result<Vec<Location>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM location ORDER BY id ASC", LOCATION_COLUMNS))?;

        let records = stmt
            .query_map([], LocationRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        records
            .into_iter()
            .map(|record| {
                let settings = settings_for(&conn, record.id)?;
                record.into_location(settings)
            })
            .collect()
    }

    pub fn location_exists(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM location WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Listing rows for one locale, address formatted as
    /// "<street> <number>, <zip> <city>, <country>"
    pub fn browse_locations(&self, locale: &str) -> Result<Vec<LocationSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, street || ' ' || number || ', ' || zip || ' ' || city || ', ' || country
             FROM location
             WHERE locale = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt
            .query_map(params![locale], |row| {
                Ok(LocationSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    address: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn insert_location(&self, input: &LocationInput, extra_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO location (locale, extra_id, title, street, number, zip, city, country,
                                   latitude, longitude, show_in_overview, created_on, edited_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
            params![
                input.locale,
                extra_id,
                input.title,
                input.street,
                input.number,
                input.zip,
                input.city,
                input.country,
                input.latitude,
                input.longitude,
                input.show_in_overview,
                now
            ],
        )
        .context("Failed to insert location")?;

        Ok(conn.last_insert_rowid())
    }

    /// Overwrite the mutable fields of a location. Locale and extra stay.
    pub fn update_location(&self, id: i64, input: &LocationInput) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "UPDATE location
             SET title = ?1, street = ?2, number = ?3, zip = ?4, city = ?5, country = ?6,
                 latitude = ?7, longitude = ?8, show_in_overview = ?9, edited_on = ?10
             WHERE id = ?11",
            params![
                input.title,
                input.street,
                input.number,
                input.zip,
                input.city,
                input.country,
                input.latitude,
                input.longitude,
                input.show_in_overview,
                Utc::now().to_rfc3339(),
                id
            ],
        )
        .context(format!("Failed to update location {}", id))?;

        Ok(())
    }

    /// Delete a location; its settings go with it.
    pub fn delete_location(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM location WHERE id = ?1", params![id])
            .context(format!("Failed to delete location {}", id))?;
        Ok(())
    }

    // ==================== Location settings ====================

    pub fn location_settings(&self, location_id: i64) -> Result<Vec<LocationSetting>> {
        let conn = self.conn()?;
        settings_for(&conn, location_id)
    }

    pub fn save_location_setting(&self, location_id: i64, name: &str, value: &Value) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO location_settings (location_id, name, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (location_id, name) DO UPDATE SET value = excluded.value",
            params![location_id, name, value.to_string()],
        )
        .context(format!("Failed to save setting {} of location {}", name, location_id))?;
        Ok(())
    }
}
