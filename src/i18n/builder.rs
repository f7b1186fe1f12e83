//! Compiles the translations stored in the database into cache artifacts.

use crate::db::Database;
use crate::i18n::{calendar_labels, Application, CacheDirectory, Language, LocaleCache, LocaleMetrics};
use anyhow::Result;
use chrono::Utc;
use tracing::info;

#[derive(Clone)]
pub struct LocaleCacheBuilder {
    db: Database,
    cache: CacheDirectory,
}

impl LocaleCacheBuilder {
    pub fn new(db: Database, cache: CacheDirectory) -> Self {
        Self { db, cache }
    }

    pub fn cache_directory(&self) -> &CacheDirectory {
        &self.cache
    }

    /// Build (or rebuild) both artifacts for a language and return the cache.
    pub fn build(&self, language: Language, application: Application) -> Result<LocaleCache> {
        let rows = self.db.get_locale(language.code(), application)?;
        let cache = LocaleCache::from_rows(language.code(), application, &rows, Utc::now());
        let json = cache.to_json(&calendar_labels(language));

        self.cache.write(&cache, &json)?;
        LocaleMetrics::global().record_cache_build();

        info!(
            "Built {} locale cache for {} ({} translations)",
            application,
            language,
            cache.len()
        );

        Ok(cache)
    }

    /// Rebuild every application's cache for each of the given languages.
    pub fn build_all(&self, languages: &[Language]) -> Result<usize> {
        let mut built = 0;
        for language in languages {
            for application in Application::ALL {
                self.build(*language, application)?;
                built += 1;
            }
        }
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{create_test_db, entry};
    use crate::i18n::LocaleType;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (LocaleCacheBuilder, Database, TempDir, TempDir) {
        let (db, db_dir) = create_test_db();
        let cache_dir = TempDir::new().unwrap();
        let builder = LocaleCacheBuilder::new(db.clone(), CacheDirectory::new(cache_dir.path()));
        (builder, db, db_dir, cache_dir)
    }

    fn seed(db: &Database) {
        let rows = [
            ("en", Application::Frontend, LocaleType::Label, "Core", "Address", "address"),
            ("en", Application::Frontend, LocaleType::Message, "Core", "Saved", "It's \"saved\"."),
            ("en", Application::Backend, LocaleType::Label, "Location", "Map", "map"),
            ("en", Application::Backend, LocaleType::Label, "Core", "Location", "location"),
            ("nl", Application::Frontend, LocaleType::Label, "Core", "Address", "adres"),
        ];
        for (language, application, locale_type, module, name, value) in rows {
            db.save_locale(&entry(language, application, locale_type, module, name, value))
                .unwrap();
        }
    }

    #[test]
    fn test_build_writes_both_artifacts() {
        let (builder, db, _db_dir, _cache_dir) = setup();
        seed(&db);

        let cache = builder.build(Language::ENGLISH, Application::Frontend).unwrap();
        assert_eq!(cache.len(), 2);

        let directory = builder.cache_directory();
        assert!(directory.cache_path("en", Application::Frontend).is_file());
        assert!(directory.json_path("en", Application::Frontend).is_file());
        assert_eq!(directory.load("en", Application::Frontend).unwrap(), Some(cache));
    }

    #[test]
    fn test_frontend_json_shape() {
        let (builder, db, _db_dir, _cache_dir) = setup();
        seed(&db);

        builder.build(Language::ENGLISH, Application::Frontend).unwrap();
        let raw = builder
            .cache_directory()
            .read_json("en", Application::Frontend)
            .unwrap()
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(json["lbl"]["Address"], "address");
        assert_eq!(json["msg"]["Saved"], "It's \"saved\".");
        assert_eq!(json["loc"]["MonthLong1"], "January");
        assert_eq!(json["loc"]["DayShortSun"], "Sun");
    }

    #[test]
    fn test_backend_json_shape() {
        let (builder, db, _db_dir, _cache_dir) = setup();
        seed(&db);

        builder.build(Language::ENGLISH, Application::Backend).unwrap();
        let raw = builder
            .cache_directory()
            .read_json("en", Application::Backend)
            .unwrap()
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(json["lbl"]["Location"]["Map"], "map");
        assert_eq!(json["lbl"]["Core"]["Location"], "location");
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let (builder, db, _db_dir, _cache_dir) = setup();
        seed(&db);

        builder.build(Language::ENGLISH, Application::Backend).unwrap();
        let path = builder.cache_directory().json_path("en", Application::Backend);
        let first = fs::read(&path).unwrap();

        builder.build(Language::ENGLISH, Application::Backend).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_build_empty_language() {
        let (builder, _db, _db_dir, _cache_dir) = setup();

        let cache = builder.build(Language::from_code("fr").unwrap(), Application::Frontend).unwrap();
        assert!(cache.is_empty());

        let raw = builder
            .cache_directory()
            .read_json("fr", Application::Frontend)
            .unwrap()
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["loc"]["MonthLong1"], "janvier");
        assert!(json.get("lbl").is_none());
    }

    #[test]
    fn test_build_all_covers_every_application() {
        let (builder, db, _db_dir, _cache_dir) = setup();
        seed(&db);

        let languages = [Language::ENGLISH, Language::from_code("nl").unwrap()];
        assert_eq!(builder.build_all(&languages).unwrap(), 4);

        let directory = builder.cache_directory();
        for language in ["en", "nl"] {
            for application in Application::ALL {
                assert!(directory.exists(language, application));
            }
        }
    }
}
