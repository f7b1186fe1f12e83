//! Location module: addresses shown on a map, each registered as a widget
//! extra so it can be placed on pages.

pub mod geocode;
mod repository;

use crate::db::Database;
use crate::error::ModelError;
use crate::extras::{ExtraField, ExtraRegistry, ExtraType};
use crate::i18n::{ucfirst, LocaleContext, LocaleType, CORE_MODULE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{info, warn};

pub use geocode::{address_query, country_name, Coordinates, Geocoder, DEFAULT_GEOCODE_API_URL};

/// Module name used for the widget extra.
pub const MODULE: &str = "Location";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub id: i64,
    pub locale: String,
    pub extra_id: i64,
    pub title: String,
    pub street: String,
    pub number: String,
    pub zip: String,
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub show_in_overview: bool,
    pub created_on: DateTime<Utc>,
    pub edited_on: DateTime<Utc>,
    pub settings: Vec<LocationSetting>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSetting {
    pub name: String,
    pub value: Value,
}

/// Fields a location is created or updated from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationInput {
    pub locale: String,
    pub title: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "default_show_in_overview")]
    pub show_in_overview: bool,
}

fn default_show_in_overview() -> bool {
    true
}

impl LocationInput {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.latitude = coordinates.latitude;
        self.longitude = coordinates.longitude;
    }
}

/// A row of the locations overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub id: i64,
    pub title: String,
    pub address: String,
}

#[derive(Clone)]
pub struct LocationModel<R: ExtraRegistry = Database> {
    db: Database,
    extras: R,
    backend_url: String,
}

impl LocationModel<Database> {
    pub fn new(db: Database, backend_url: impl Into<String>) -> Self {
        Self::with_registry(db.clone(), db, backend_url)
    }
}

impl<R: ExtraRegistry> LocationModel<R> {
    pub fn with_registry(db: Database, extras: R, backend_url: impl Into<String>) -> Self {
        Self {
            db,
            extras,
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn get(&self, id: i64) -> Result<Option<Location>, ModelError> {
        Ok(self.db.find_location(id)?)
    }

    pub fn get_all(&self) -> Result<Vec<Location>, ModelError> {
        Ok(self.db.find_all_locations()?)
    }

    pub fn exists(&self, id: i64) -> Result<bool, ModelError> {
        Ok(self.db.location_exists(id)?)
    }

    pub fn browse(&self, locale: &str) -> Result<Vec<LocationSummary>, ModelError> {
        Ok(self.db.browse_locations(locale)?)
    }

    /// Create a location and its widget extra. Returns the new id.
    pub fn insert(&self, input: &LocationInput, ctx: &LocaleContext) -> Result<i64, ModelError> {
        let extra_id = self.extras.insert_extra(ExtraType::Widget, MODULE, MODULE)?;

        let id = match self.db.insert_location(input, extra_id) {
            Ok(id) => id,
            Err(e) => {
                if let Err(cleanup) = self.extras.delete_extra_by_id(extra_id) {
                    warn!("Failed to remove extra {} of unsaved location: {:#}", extra_id, cleanup);
                }
                return Err(e.into());
            }
        };

        self.refresh_extra(extra_id, id, &input.title, &input.locale, ctx)?;
        info!("Inserted location {} ({})", id, input.title);

        Ok(id)
    }

    /// Update a location. Returns 0 (and writes nothing) when it doesn't exist.
    pub fn update(&self, id: i64, input: &LocationInput, ctx: &LocaleContext) -> Result<i64, ModelError> {
        let Some(current) = self.db.find_location(id)? else {
            return Ok(0);
        };

        self.db.update_location(id, input)?;
        self.refresh_extra(current.extra_id, id, &input.title, &current.locale, ctx)?;
        info!("Updated location {}", id);

        Ok(id)
    }

    /// Delete a location with its extra and settings. Unknown ids are ignored.
    pub fn delete(&self, id: i64) -> Result<(), ModelError> {
        if let Some(location) = self.db.find_location(id)? {
            self.extras.delete_extra_by_id(location.extra_id)?;
            self.db.delete_location(id)?;
            info!("Deleted location {}", id);
        }
        Ok(())
    }

    /// All settings of a location; empty when it doesn't exist.
    pub fn get_map_settings(&self, id: i64) -> Result<BTreeMap<String, Value>, ModelError> {
        Ok(self
            .db
            .location_settings(id)?
            .into_iter()
            .map(|setting| (setting.name, setting.value))
            .collect())
    }

    pub fn get_map_setting(&self, id: i64, name: &str) -> Result<Option<Value>, ModelError> {
        Ok(self.get_map_settings(id)?.remove(name))
    }

    /// Insert or replace a setting.
    pub fn set_map_setting(&self, id: i64, name: &str, value: &Value) -> Result<(), ModelError> {
        if !self.db.location_exists(id)? {
            return Err(ModelError::LocationNotFound(id));
        }
        self.db.save_location_setting(id, name, value)?;
        Ok(())
    }

    pub fn edit_url(&self, locale: &str, id: i64) -> String {
        format!("{}/{}/location/edit?id={}", self.backend_url, locale, id)
    }

    fn refresh_extra(
        &self,
        extra_id: i64,
        id: i64,
        title: &str,
        locale: &str,
        ctx: &LocaleContext,
    ) -> Result<(), ModelError> {
        let label = ctx
            .lookup_in_module(LocaleType::Label, CORE_MODULE, "Location", true)
            .into_string();

        let data = json!({
            "id": id,
            "extra_label": format!("{}: {}", ucfirst(&label), title),
            "language": locale,
            "edit_url": self.edit_url(locale, id),
        });

        self.extras.update_extra(extra_id, ExtraField::Data(data))?;
        Ok(())
    }
}
