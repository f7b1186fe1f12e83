//! Module extras: widgets and blocks that modules register so pages can
//! embed them.

use crate::db::Database;
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraType {
    Widget,
    Block,
    Homepage,
}

impl ExtraType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtraType::Widget => "widget",
            ExtraType::Block => "block",
            ExtraType::Homepage => "homepage",
        }
    }
}

impl fmt::Display for ExtraType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtraType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "widget" => Ok(ExtraType::Widget),
            "block" => Ok(ExtraType::Block),
            "homepage" => Ok(ExtraType::Homepage),
            other => Err(format!("Unknown extra type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleExtra {
    pub id: i64,
    pub module: String,
    #[serde(rename = "type")]
    pub extra_type: ExtraType,
    pub label: String,
    pub action: Option<String>,
    pub data: Option<Value>,
    pub hidden: bool,
    pub sequence: i64,
}

/// A single column of an extra that can be changed after registration.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraField {
    Data(Value),
    Label(String),
    Hidden(bool),
}

/// Where modules register their extras.
pub trait ExtraRegistry {
    /// Register an extra at the end of the module's sequence and return its id.
    fn insert_extra(&self, extra_type: ExtraType, module: &str, label: &str) -> Result<i64>;

    fn update_extra(&self, id: i64, field: ExtraField) -> Result<()>;

    /// Remove an extra. Removing an unknown id is not an error.
    fn delete_extra_by_id(&self, id: i64) -> Result<()>;

    fn get_extra(&self, id: i64) -> Result<Option<ModuleExtra>>;
}

impl ExtraRegistry for Database {
    fn insert_extra(&self, extra_type: ExtraType, module: &str, label: &str) -> Result<i64> {
        let conn = self.conn()?;

        let sequence: i64 = conn.query_row(
            "SELECT COALESCE(MAX(sequence), 0) + 1 FROM modules_extras WHERE module = ?1",
            params![module],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO modules_extras (module, type, label, hidden, sequence)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![module, extra_type.as_str(), label, sequence],
        )
        .context("Failed to insert module extra")?;

        Ok(conn.last_insert_rowid())
    }

    fn update_extra(&self, id: i64, field: ExtraField) -> Result<()> {
        let conn = self.conn()?;

        match field {
            ExtraField::Data(data) => conn.execute(
                "UPDATE modules_extras SET data = ?1 WHERE id = ?2",
                params![data.to_string(), id],
            ),
            ExtraField::Label(label) => conn.execute(
                "UPDATE modules_extras SET label = ?1 WHERE id = ?2",
                params![label, id],
            ),
            ExtraField::Hidden(hidden) => conn.execute(
                "UPDATE modules_extras SET hidden = ?1 WHERE id = ?2",
                params![hidden, id],
            ),
        }
        .context(format!("Failed to update module extra {}", id))?;

        Ok(())
    }

    fn delete_extra_by_id(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM modules_extras WHERE id = ?1", params![id])
            .context(format!("Failed to delete module extra {}", id))?;
        Ok(())
    }

    fn get_extra(&self, id: i64) -> Result<Option<ModuleExtra>> {
        let conn = self.conn()?;

        let raw = conn
            .query_row(
                "SELECT id, module, type, label, action, data, hidden, sequence
                 FROM modules_extras WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, bool>(6)?,
                        row.get::<_, i64>(7)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, module, extra_type, label, action, data, hidden, sequence)) = raw else {
            return Ok(None);
        };

        let data = data
            .map(|data| serde_json::from_str(&data))
            .transpose()
            .context(format!("Failed to parse data of module extra {}", id))?;

        Ok(Some(ModuleExtra {
            id,
            module,
            extra_type: extra_type.parse().map_err(anyhow::Error::msg)?,
            label,
            action,
            data,
            hidden,
            sequence,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::create_test_db;
    use serde_json::json;

    #[test]
    fn test_insert_extra_defaults() {
        let (db, _temp_dir) = create_test_db();

        let id = db.insert_extra(ExtraType::Widget, "Location", "Location").unwrap();
        let extra = db.get_extra(id).unwrap().unwrap();

        assert_eq!(extra.module, "Location");
        assert_eq!(extra.extra_type, ExtraType::Widget);
        assert_eq!(extra.label, "Location");
        assert_eq!(extra.data, None);
        assert!(!extra.hidden);
        assert_eq!(extra.sequence, 1);
    }

    #[test]
    fn test_sequence_is_per_module() {
        let (db, _temp_dir) = create_test_db();

        let first = db.insert_extra(ExtraType::Widget, "Location", "Location").unwrap();
        let second = db.insert_extra(ExtraType::Widget, "Location", "Location").unwrap();
        let other = db.insert_extra(ExtraType::Block, "Blog", "Blog").unwrap();

        assert_eq!(db.get_extra(first).unwrap().unwrap().sequence, 1);
        assert_eq!(db.get_extra(second).unwrap().unwrap().sequence, 2);
        assert_eq!(db.get_extra(other).unwrap().unwrap().sequence, 1);
    }

    #[test]
    fn test_update_each_field() {
        let (db, _temp_dir) = create_test_db();
        let id = db.insert_extra(ExtraType::Widget, "Location", "Location").unwrap();

        db.update_extra(id, ExtraField::Data(json!({ "id": 7 }))).unwrap();
        db.update_extra(id, ExtraField::Label("Map".to_string())).unwrap();
        db.update_extra(id, ExtraField::Hidden(true)).unwrap();

        let extra = db.get_extra(id).unwrap().unwrap();
        assert_eq!(extra.data, Some(json!({ "id": 7 })));
        assert_eq!(extra.label, "Map");
        assert!(extra.hidden);
    }

    #[test]
    fn test_delete_extra() {
        let (db, _temp_dir) = create_test_db();
        let id = db.insert_extra(ExtraType::Widget, "Location", "Location").unwrap();

        db.delete_extra_by_id(id).unwrap();
        assert!(db.get_extra(id).unwrap().is_none());

        // Unknown ids are ignored
        db.delete_extra_by_id(id).unwrap();
    }

    #[test]
    fn test_extra_type_parsing() {
        assert_eq!("homepage".parse::<ExtraType>().unwrap(), ExtraType::Homepage);
        assert!("page".parse::<ExtraType>().is_err());
    }
}
