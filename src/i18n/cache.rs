//! Typed locale cache entries and the on-disk cache directory.
//!
//! Every (language, application) pair gets two artifacts in
//! `<root>/<application>/Locale/`:
//!
//! - `<language>.cache`: the serialized `LocaleCache`, read back by the resolver
//! - `<language>.json`: the JSON handed to frontend scripts
//!
//! Both are written through a temporary file and renamed into place, so a
//! concurrent reader sees either the old or the new artifact, never a
//! truncated one.

use crate::db::LocaleRow;
use crate::i18n::{Application, LocaleType};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `module → name → value`
pub type ModuleTable = BTreeMap<String, BTreeMap<String, String>>;

/// Compiled translations of one language for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleCache {
    pub language: String,
    pub application: Application,
    pub generated_at: DateTime<Utc>,
    pub translations: BTreeMap<LocaleType, ModuleTable>,
}

impl LocaleCache {
    /// Group rows by type and module.
    pub fn from_rows(
        language: &str,
        application: Application,
        rows: &[LocaleRow],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut translations: BTreeMap<LocaleType, ModuleTable> = BTreeMap::new();

        for row in rows {
            translations
                .entry(row.locale_type)
                .or_default()
                .entry(row.module.clone())
                .or_default()
                .insert(row.name.clone(), row.value.clone());
        }

        Self {
            language: language.to_string(),
            application,
            generated_at,
            translations,
        }
    }

    pub fn get(&self, locale_type: LocaleType, module: &str, name: &str) -> Option<&str> {
        self.translations
            .get(&locale_type)?
            .get(module)?
            .get(name)
            .map(String::as_str)
    }

    /// All names of a type with the module level dropped. When two modules
    /// define the same name, the module sorting last wins.
    pub fn flatten(&self, locale_type: LocaleType) -> BTreeMap<String, String> {
        let mut flat = BTreeMap::new();

        if let Some(modules) = self.translations.get(&locale_type) {
            for names in modules.values() {
                for (name, value) in names {
                    flat.insert(name.clone(), value.clone());
                }
            }
        }

        flat
    }

    /// Number of translations in the cache.
    pub fn len(&self) -> usize {
        self.translations
            .values()
            .flat_map(|modules| modules.values())
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The JSON artifact: nested by module for the backend, flat otherwise,
    /// with the calendar labels under `loc`.
    pub fn to_json(&self, calendar: &BTreeMap<String, String>) -> Value {
        let mut root = Map::new();

        for (locale_type, modules) in &self.translations {
            let section = if self.application.is_nested() {
                let nested = modules
                    .iter()
                    .map(|(module, names)| (module.clone(), string_object(names)))
                    .collect();
                Value::Object(nested)
            } else {
                string_object(&self.flatten(*locale_type))
            };
            root.insert(locale_type.code().to_string(), section);
        }

        root.insert("loc".to_string(), string_object(calendar));

        Value::Object(root)
    }
}

fn string_object(values: &BTreeMap<String, String>) -> Value {
    Value::Object(
        values
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect(),
    )
}

/// The directory the locale artifacts live in.
#[derive(Debug, Clone)]
pub struct CacheDirectory {
    root: PathBuf,
}

impl CacheDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locale_dir(&self, application: Application) -> PathBuf {
        self.root.join(application.as_str()).join("Locale")
    }

    pub fn cache_path(&self, language: &str, application: Application) -> PathBuf {
        self.locale_dir(application).join(format!("{}.cache", language))
    }

    pub fn json_path(&self, language: &str, application: Application) -> PathBuf {
        self.locale_dir(application).join(format!("{}.json", language))
    }

    pub fn exists(&self, language: &str, application: Application) -> bool {
        self.cache_path(language, application).is_file()
    }

    /// Store both artifacts for a cache entry.
    pub fn write(&self, cache: &LocaleCache, json: &Value) -> Result<()> {
        let source = serde_json::to_string_pretty(cache).context("Failed to serialize locale cache")?;
        let json = serde_json::to_string(json).context("Failed to serialize locale JSON")?;

        write_atomic(&self.cache_path(&cache.language, cache.application), &source)?;
        write_atomic(&self.json_path(&cache.language, cache.application), &json)?;

        Ok(())
    }

    /// Load a cache entry. `Ok(None)` when it was never built.
    pub fn load(&self, language: &str, application: Application) -> Result<Option<LocaleCache>> {
        let path = self.cache_path(language, application);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read locale cache: {}", path.display()))?;
        let cache = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse locale cache: {}", path.display()))?;

        Ok(Some(cache))
    }

    pub fn read_json(&self, language: &str, application: Application) -> Result<Option<String>> {
        let path = self.json_path(language, application);
        if !path.is_file() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("Failed to read locale JSON: {}", path.display()))
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("Cache path has no parent: {}", path.display()))?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Failed to move cache file into place: {}", path.display()))?;

    Ok(())
}
