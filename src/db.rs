use crate::i18n::{Application, LocaleType};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// A translation as fetched for one (language, application) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleRow {
    pub locale_type: LocaleType,
    pub module: String,
    pub name: String,
    pub value: String,
}

/// A translation to store.
#[derive(Debug, Clone)]
pub struct LocaleEntry {
    pub language: String,
    pub application: Application,
    pub locale_type: LocaleType,
    pub module: String,
    pub name: String,
    pub value: String,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS locale (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        language TEXT NOT NULL,
        application TEXT NOT NULL,
        module TEXT NOT NULL,
        type TEXT NOT NULL,
        name TEXT NOT NULL,
        value TEXT NOT NULL,
        edited_on TEXT NOT NULL,
        UNIQUE (type, module, name, language, application)
    );

    CREATE TABLE IF NOT EXISTS modules_settings (
        module TEXT NOT NULL,
        name TEXT NOT NULL,
        value TEXT NOT NULL,
        PRIMARY KEY (module, name)
    );

    CREATE TABLE IF NOT EXISTS modules_extras (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        module TEXT NOT NULL,
        type TEXT NOT NULL,
        label TEXT NOT NULL,
        action TEXT,
        data TEXT,
        hidden INTEGER NOT NULL DEFAULT 0,
        sequence INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS location (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        locale TEXT NOT NULL,
        extra_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        street TEXT NOT NULL,
        number TEXT NOT NULL,
        zip TEXT NOT NULL,
        city TEXT NOT NULL,
        country TEXT NOT NULL,
        latitude REAL,
        longitude REAL,
        show_in_overview INTEGER NOT NULL DEFAULT 1,
        created_on TEXT NOT NULL,
        edited_on TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS location_settings (
        location_id INTEGER NOT NULL REFERENCES location (id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        value TEXT NOT NULL,
        PRIMARY KEY (location_id, name)
    );
";

impl Database {
    /// Open (or create) the database and make sure all tables exist
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to create tables")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection mutex poisoned"))
    }

    // ==================== Locale ====================

    /// Insert a translation, or replace the value of an existing one
    pub fn save_locale(&self, entry: &LocaleEntry) -> Result<i64> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO locale (language, application, module, type, name, value, edited_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (type, module, name, language, application)
             DO UPDATE SET value = excluded.value, edited_on = excluded.edited_on",
            params![
                entry.language,
                entry.application.as_str(),
                entry.module,
                entry.locale_type.code(),
                entry.name,
                entry.value,
                now
            ],
        )
        .context("Failed to save locale")?;

        let id = conn.query_row(
            "SELECT id FROM locale
             WHERE type = ?1 AND module = ?2 AND name = ?3 AND language = ?4 AND application = ?5",
            params![
                entry.locale_type.code(),
                entry.module,
                entry.name,
                entry.language,
                entry.application.as_str()
            ],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    /// Get all translations for a language, ordered by type, module and name
    pub fn get_locale(&self, language: &str, application: Application) -> Result<Vec<LocaleRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT type, module, name, value
             FROM locale
             WHERE language = ?1 AND application = ?2
             ORDER BY type ASC, module ASC, name ASC",
        )?;

        let raw = stmt
            .query_map(params![language, application.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(locale_type, module, name, value)| {
                Ok(LocaleRow {
                    locale_type: locale_type.parse().map_err(anyhow::Error::msg)?,
                    module,
                    name,
                    value,
                })
            })
            .collect()
    }

    /// Count the translations stored for a language
    pub fn locale_count(&self, language: &str, application: Application) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM locale WHERE language = ?1 AND application = ?2",
            params![language, application.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ==================== Module settings ====================

    pub fn get_module_setting(&self, module: &str, name: &str) -> Result<Option<Value>> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM modules_settings WHERE module = ?1 AND name = ?2",
                params![module, name],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|value| {
            serde_json::from_str(&value).context(format!(
                "Failed to parse module setting {}.{}",
                module, name
            ))
        })
        .transpose()
    }

    pub fn set_module_setting(&self, module: &str, name: &str, value: &Value) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO modules_settings (module, name, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (module, name) DO UPDATE SET value = excluded.value",
            params![module, name, value.to_string()],
        )
        .context("Failed to save module setting")?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    /// Create a temporary database for testing
    pub(crate) fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_forkcms.db");
        let db = Database::new(db_path.to_str().unwrap()).expect("Failed to create database");
        (db, temp_dir)
    }

    pub(crate) fn entry(
        language: &str,
        application: Application,
        locale_type: LocaleType,
        module: &str,
        name: &str,
        value: &str,
    ) -> LocaleEntry {
        LocaleEntry {
            language: language.to_string(),
            application,
            locale_type,
            module: module.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    // ==================== Database Initialization Tests ====================

    #[test]
    fn test_database_creation() {
        let (db, _temp_dir) = create_test_db();

        let count = db.locale_count("en", Application::Frontend).expect("Should count");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_database_reopening() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let path_str = db_path.to_str().unwrap();

        {
            let db = Database::new(path_str).expect("Failed to create database");
            db.save_locale(&entry("en", Application::Frontend, LocaleType::Label, "Core", "Home", "home"))
                .expect("Should save");
        }

        {
            let db = Database::new(path_str).expect("Failed to reopen database");
            let count = db.locale_count("en", Application::Frontend).expect("Should count");
            assert_eq!(count, 1, "Locale should persist");
        }
    }

    #[test]
    fn test_invalid_database_path() {
        let result = Database::new("/non/existent/path/db.db");
        assert!(result.is_err());
    }

    // ==================== Locale Tests ====================

    #[test]
    fn test_save_locale_upserts_value() {
        let (db, _temp_dir) = create_test_db();

        let first = db
            .save_locale(&entry("en", Application::Frontend, LocaleType::Label, "Core", "Home", "home"))
            .unwrap();
        let second = db
            .save_locale(&entry("en", Application::Frontend, LocaleType::Label, "Core", "Home", "start"))
            .unwrap();

        assert_eq!(first, second);
        let rows = db.get_locale("en", Application::Frontend).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "start");
    }

    #[test]
    fn test_same_name_in_other_scope_is_distinct() {
        let (db, _temp_dir) = create_test_db();

        db.save_locale(&entry("en", Application::Frontend, LocaleType::Label, "Core", "Home", "home"))
            .unwrap();
        db.save_locale(&entry("en", Application::Backend, LocaleType::Label, "Core", "Home", "dashboard"))
            .unwrap();
        db.save_locale(&entry("nl", Application::Frontend, LocaleType::Label, "Core", "Home", "start"))
            .unwrap();
        db.save_locale(&entry("en", Application::Frontend, LocaleType::Message, "Core", "Home", "welcome"))
            .unwrap();

        assert_eq!(db.locale_count("en", Application::Frontend).unwrap(), 2);
        assert_eq!(db.locale_count("en", Application::Backend).unwrap(), 1);
        assert_eq!(db.locale_count("nl", Application::Frontend).unwrap(), 1);
    }

    #[test]
    fn test_get_locale_orders_by_type_module_name() {
        let (db, _temp_dir) = create_test_db();

        db.save_locale(&entry("en", Application::Backend, LocaleType::Message, "Core", "Saved", "saved"))
            .unwrap();
        db.save_locale(&entry("en", Application::Backend, LocaleType::Label, "Location", "Map", "map"))
            .unwrap();
        db.save_locale(&entry("en", Application::Backend, LocaleType::Label, "Core", "Zip", "zip"))
            .unwrap();
        db.save_locale(&entry("en", Application::Backend, LocaleType::Label, "Core", "City", "city"))
            .unwrap();
        db.save_locale(&entry("en", Application::Backend, LocaleType::Action, "Core", "Edit", "edit"))
            .unwrap();

        let rows = db.get_locale("en", Application::Backend).unwrap();
        let order: Vec<_> = rows
            .iter()
            .map(|row| format!("{}.{}.{}", row.locale_type, row.module, row.name))
            .collect();

        assert_eq!(
            order,
            vec![
                "act.Core.Edit",
                "lbl.Core.City",
                "lbl.Core.Zip",
                "lbl.Location.Map",
                "msg.Core.Saved",
            ]
        );
    }

    #[test]
    fn test_get_locale_unknown_language_is_empty() {
        let (db, _temp_dir) = create_test_db();
        assert!(db.get_locale("fr", Application::Frontend).unwrap().is_empty());
    }

    // ==================== Module Setting Tests ====================

    #[test]
    fn test_module_setting_missing() {
        let (db, _temp_dir) = create_test_db();
        assert!(db.get_module_setting("core", "active_languages").unwrap().is_none());
    }

    #[test]
    fn test_module_setting_round_trip_and_overwrite() {
        let (db, _temp_dir) = create_test_db();

        db.set_module_setting("core", "active_languages", &json!(["en"]))
            .unwrap();
        db.set_module_setting("core", "active_languages", &json!(["en", "nl"]))
            .unwrap();

        let value = db.get_module_setting("core", "active_languages").unwrap();
        assert_eq!(value, Some(json!(["en", "nl"])));
    }
}
