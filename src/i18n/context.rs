//! The per-request translation context.
//!
//! A `LocaleContext` is built once per request from the active language's
//! cache and the fallback language's cache, and passed to whatever needs to
//! translate. It is immutable; switching languages means building a new one.

use crate::error::LocaleError;
use crate::i18n::{to_camel_case, Application, Language, LocaleCache, LocaleMetrics, LocaleType};
use serde::Serialize;
use std::collections::BTreeMap;

/// Module every other module falls back to for shared translations.
pub const CORE_MODULE: &str = "Core";

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Translation {
    /// Present in the active language
    Found(String),

    /// Taken from the fallback language
    FallbackUsed(String),

    /// Absent everywhere; carries the `{$<prefix><Key>}` placeholder
    Missing(String),
}

impl Translation {
    pub fn as_str(&self) -> &str {
        match self {
            Translation::Found(value)
            | Translation::FallbackUsed(value)
            | Translation::Missing(value) => value,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Translation::Found(value)
            | Translation::FallbackUsed(value)
            | Translation::Missing(value) => value,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Translation::Missing(_))
    }

    /// Strict variant for callers that must not render a placeholder.
    pub fn require(self) -> Result<String, LocaleError> {
        match self {
            Translation::Missing(placeholder) => Err(LocaleError::MissingTranslation(placeholder)),
            other => Ok(other.into_string()),
        }
    }
}

/// Placeholder rendered for a translation that doesn't exist.
pub fn placeholder(locale_type: LocaleType, key: &str) -> String {
    format!("{{${}{}}}", locale_type.code(), key)
}

type FlatTables = BTreeMap<LocaleType, BTreeMap<String, String>>;

fn flatten_all(cache: &LocaleCache) -> FlatTables {
    LocaleType::ALL
        .iter()
        .map(|locale_type| (*locale_type, cache.flatten(*locale_type)))
        .collect()
}

#[derive(Debug, Clone)]
pub struct LocaleContext {
    language: Language,
    application: Application,
    debug: bool,
    active: LocaleCache,
    fallback: LocaleCache,
    active_flat: FlatTables,
    fallback_flat: FlatTables,
}

impl LocaleContext {
    /// In debug mode fallback values are never used, so missing translations
    /// show up as placeholders.
    pub fn new(language: Language, active: LocaleCache, fallback: LocaleCache, debug: bool) -> Self {
        Self {
            language,
            application: active.application,
            debug,
            active_flat: flatten_all(&active),
            fallback_flat: flatten_all(&fallback),
            active,
            fallback,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn application(&self) -> Application {
        self.application
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    fn uses_fallback(&self, fallback: bool) -> bool {
        fallback && !self.debug
    }

    /// Look a key up across all modules.
    pub fn lookup(&self, locale_type: LocaleType, key: &str, fallback: bool) -> Translation {
        let key = to_camel_case(key);

        let active = self.active_flat.get(&locale_type).and_then(|table| table.get(&key));
        let fallback_value = if self.uses_fallback(fallback) {
            self.fallback_flat.get(&locale_type).and_then(|table| table.get(&key))
        } else {
            None
        };

        resolve(locale_type, &key, active.map(String::as_str), fallback_value.map(String::as_str))
    }

    /// Look a key up in one module, then in `Core`.
    pub fn lookup_in_module(
        &self,
        locale_type: LocaleType,
        module: &str,
        key: &str,
        fallback: bool,
    ) -> Translation {
        let key = to_camel_case(key);

        let find = |cache: &LocaleCache| {
            cache
                .get(locale_type, module, &key)
                .or_else(|| cache.get(locale_type, CORE_MODULE, &key))
                .map(str::to_string)
        };

        let active = find(&self.active);
        let fallback_value = if self.uses_fallback(fallback) {
            find(&self.fallback)
        } else {
            None
        };

        resolve(locale_type, &key, active.as_deref(), fallback_value.as_deref())
    }

    pub fn action(&self, key: &str) -> String {
        self.lookup(LocaleType::Action, key, true).into_string()
    }

    pub fn error(&self, key: &str) -> String {
        self.lookup(LocaleType::Error, key, true).into_string()
    }

    pub fn label(&self, key: &str) -> String {
        self.lookup(LocaleType::Label, key, true).into_string()
    }

    pub fn message(&self, key: &str) -> String {
        self.lookup(LocaleType::Message, key, true).into_string()
    }

    pub fn act(&self, key: &str) -> String {
        self.action(key)
    }

    pub fn err(&self, key: &str) -> String {
        self.error(key)
    }

    pub fn lbl(&self, key: &str) -> String {
        self.label(key)
    }

    pub fn msg(&self, key: &str) -> String {
        self.message(key)
    }

    /// The whole table of a type: the active language over the fallback
    /// language, or only the active language in debug mode.
    pub fn table(&self, locale_type: LocaleType) -> BTreeMap<String, String> {
        let active = self.active_flat.get(&locale_type).cloned().unwrap_or_default();
        if self.debug {
            return active;
        }

        let mut merged = self.fallback_flat.get(&locale_type).cloned().unwrap_or_default();
        merged.extend(active);
        merged
    }

    pub fn actions(&self) -> BTreeMap<String, String> {
        self.table(LocaleType::Action)
    }

    pub fn errors(&self) -> BTreeMap<String, String> {
        self.table(LocaleType::Error)
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        self.table(LocaleType::Label)
    }

    pub fn messages(&self) -> BTreeMap<String, String> {
        self.table(LocaleType::Message)
    }
}

fn resolve(
    locale_type: LocaleType,
    key: &str,
    active: Option<&str>,
    fallback: Option<&str>,
) -> Translation {
    let metrics = LocaleMetrics::global();

    match (active, fallback) {
        (Some(value), _) => {
            metrics.record_found();
            Translation::Found(value.to_string())
        }
        (None, Some(value)) => {
            metrics.record_fallback();
            Translation::FallbackUsed(value.to_string())
        }
        (None, None) => {
            metrics.record_missing();
            Translation::Missing(placeholder(locale_type, key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocaleRow;
    use chrono::Utc;

    // ==================== Helper Functions ====================

    fn row(locale_type: LocaleType, module: &str, name: &str, value: &str) -> LocaleRow {
        LocaleRow {
            locale_type,
            module: module.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn english() -> LocaleCache {
        LocaleCache::from_rows(
            "en",
            Application::Frontend,
            &[
                row(LocaleType::Label, "Core", "Address", "address"),
                row(LocaleType::Label, "Core", "Zip", "zip code"),
                row(LocaleType::Label, "Location", "Map", "map"),
                row(LocaleType::Error, "Core", "FieldIsRequired", "This field is required."),
                row(LocaleType::Action, "Core", "Detail", "detail"),
                row(LocaleType::Message, "Core", "Saved", "Saved."),
            ],
            Utc::now(),
        )
    }

    fn dutch() -> LocaleCache {
        LocaleCache::from_rows(
            "nl",
            Application::Frontend,
            &[
                row(LocaleType::Label, "Core", "Address", "adres"),
                row(LocaleType::Action, "Core", "Detail", "detail-nl"),
            ],
            Utc::now(),
        )
    }

    fn context(debug: bool) -> LocaleContext {
        LocaleContext::new(Language::from_code("nl").unwrap(), dutch(), english(), debug)
    }

    // ==================== Lookup Tests ====================

    #[test]
    fn test_active_value_is_returned_verbatim() {
        let ctx = context(false);
        assert_eq!(
            ctx.lookup(LocaleType::Label, "Address", true),
            Translation::Found("adres".to_string())
        );
        assert_eq!(ctx.label("Address"), "adres");
    }

    #[test]
    fn test_active_value_wins_even_without_fallback() {
        let ctx = context(true);
        assert_eq!(ctx.label("Address"), "adres");
        assert_eq!(
            ctx.lookup(LocaleType::Label, "Address", false),
            Translation::Found("adres".to_string())
        );
    }

    #[test]
    fn test_fallback_value_when_enabled() {
        let ctx = context(false);
        assert_eq!(
            ctx.lookup(LocaleType::Label, "Zip", true),
            Translation::FallbackUsed("zip code".to_string())
        );
        assert_eq!(ctx.error("FieldIsRequired"), "This field is required.");
    }

    #[test]
    fn test_placeholder_when_fallback_disabled_per_call() {
        let ctx = context(false);
        assert_eq!(
            ctx.lookup(LocaleType::Label, "Zip", false),
            Translation::Missing("{$lblZip}".to_string())
        );
    }

    #[test]
    fn test_placeholder_when_debug_suppresses_fallback() {
        let ctx = context(true);
        assert_eq!(ctx.label("Zip"), "{$lblZip}");
        assert_eq!(ctx.message("Saved"), "{$msgSaved}");
    }

    #[test]
    fn test_placeholder_when_absent_everywhere() {
        let ctx = context(false);
        assert_eq!(ctx.lbl("Nope"), "{$lblNope}");
        assert_eq!(ctx.act("Nope"), "{$actNope}");
        assert_eq!(ctx.err("Nope"), "{$errNope}");
        assert_eq!(ctx.msg("Nope"), "{$msgNope}");
    }

    #[test]
    fn test_key_is_normalized_to_camel_case() {
        let ctx = context(false);
        assert_eq!(ctx.label("address"), "adres");
        assert_eq!(ctx.error("field_is_required"), "This field is required.");
        assert_eq!(ctx.label("not_there"), "{$lblNotThere}");
    }

    #[test]
    fn test_types_have_separate_namespaces() {
        let ctx = context(false);
        assert_eq!(ctx.action("Address"), "{$actAddress}");
        assert_eq!(ctx.action("Detail"), "detail-nl");
    }

    // ==================== Module Lookup Tests ====================

    #[test]
    fn test_lookup_in_module_falls_back_to_core() {
        let ctx = context(false);
        assert_eq!(
            ctx.lookup_in_module(LocaleType::Label, "Location", "Address", true),
            Translation::Found("adres".to_string())
        );
        assert_eq!(
            ctx.lookup_in_module(LocaleType::Label, "Location", "Map", true),
            Translation::FallbackUsed("map".to_string())
        );
        assert_eq!(
            ctx.lookup_in_module(LocaleType::Label, "Blog", "Map", true),
            Translation::Missing("{$lblMap}".to_string())
        );
    }

    // ==================== Table Tests ====================

    #[test]
    fn test_table_merges_fallback_under_active() {
        let labels = context(false).labels();

        assert_eq!(labels["Address"], "adres");
        assert_eq!(labels["Zip"], "zip code");
        assert_eq!(labels["Map"], "map");
    }

    #[test]
    fn test_table_in_debug_is_active_only() {
        let ctx = context(true);

        assert_eq!(ctx.labels().len(), 1);
        assert!(ctx.errors().is_empty());
        assert_eq!(ctx.actions()["Detail"], "detail-nl");
        assert!(ctx.messages().is_empty());
    }

    // ==================== Translation Tests ====================

    #[test]
    fn test_require_rejects_missing() {
        let ctx = context(false);

        assert_eq!(ctx.lookup(LocaleType::Label, "Zip", true).require().unwrap(), "zip code");
        let err = ctx.lookup(LocaleType::Label, "Nope", true).require().unwrap_err();
        assert!(matches!(err, LocaleError::MissingTranslation(ref p) if p == "{$lblNope}"));
    }

    #[test]
    fn test_translation_serializes_with_status() {
        let json = serde_json::to_value(Translation::FallbackUsed("x".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "fallback_used", "value": "x" }));
    }

    #[test]
    fn test_context_metadata() {
        let ctx = context(true);
        assert_eq!(ctx.language().code(), "nl");
        assert_eq!(ctx.application(), Application::Frontend);
        assert!(ctx.is_debug());
    }
}
