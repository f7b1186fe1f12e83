//! Resolves which language a request uses and builds its `LocaleContext`.

use crate::db::Database;
use crate::error::LocaleError;
use crate::i18n::{
    negotiate_language, Application, CacheDirectory, Language, LocaleCache, LocaleCacheBuilder,
    LocaleContext, LocaleMetrics,
};
use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, warn};

/// Module whose settings hold the site languages.
pub const SETTINGS_MODULE: &str = "core";
pub const ACTIVE_LANGUAGES: &str = "active_languages";
pub const REDIRECT_LANGUAGES: &str = "redirect_languages";

#[derive(Clone)]
pub struct LocaleResolver {
    db: Database,
    builder: LocaleCacheBuilder,
    site_default_language: Language,
    debug: bool,
}

impl LocaleResolver {
    pub fn new(db: Database, cache: CacheDirectory, site_default_language: Language, debug: bool) -> Self {
        Self {
            builder: LocaleCacheBuilder::new(db.clone(), cache),
            db,
            site_default_language,
            debug,
        }
    }

    pub fn builder(&self) -> &LocaleCacheBuilder {
        &self.builder
    }

    pub fn site_default_language(&self) -> Language {
        self.site_default_language
    }

    // ==================== Language sets ====================

    fn language_setting(&self, name: &str) -> Result<Vec<String>> {
        match self.db.get_module_setting(SETTINGS_MODULE, name)? {
            Some(value) => serde_json::from_value(value)
                .with_context(|| format!("Setting {}.{} is not a list of languages", SETTINGS_MODULE, name)),
            None => Ok(vec![self.site_default_language.code().to_string()]),
        }
    }

    /// Languages the site can be browsed in.
    pub fn active_languages(&self) -> Result<Vec<String>> {
        self.language_setting(ACTIVE_LANGUAGES)
    }

    /// Languages a visitor may be redirected to based on the browser.
    pub fn redirect_languages(&self) -> Result<Vec<String>> {
        self.language_setting(REDIRECT_LANGUAGES)
    }

    pub fn set_active_languages(&self, languages: &[Language]) -> Result<()> {
        let codes: Vec<_> = languages.iter().map(Language::code).collect();
        self.db
            .set_module_setting(SETTINGS_MODULE, ACTIVE_LANGUAGES, &json!(codes))
    }

    pub fn set_redirect_languages(&self, languages: &[Language]) -> Result<()> {
        let codes: Vec<_> = languages.iter().map(Language::code).collect();
        self.db
            .set_module_setting(SETTINGS_MODULE, REDIRECT_LANGUAGES, &json!(codes))
    }

    /// Preferred language of the browser, restricted to the redirect
    /// languages (or the active languages when `for_redirect` is false).
    pub fn browser_language(&self, accept_language: Option<&str>, for_redirect: bool) -> Result<String> {
        let eligible = if for_redirect {
            self.redirect_languages()?
        } else {
            self.active_languages()?
        };

        Ok(negotiate_language(
            accept_language,
            &eligible,
            self.site_default_language.code(),
        ))
    }

    // ==================== Contexts ====================

    /// Build the frontend context for a language (the site default when
    /// `None`). Unless `force` is set the language has to be active.
    pub fn set_locale(&self, language: Option<&str>, force: bool) -> Result<LocaleContext, LocaleError> {
        let code = language.unwrap_or(self.site_default_language.code());

        if !force && !self.active_languages()?.iter().any(|active| active == code) {
            return Err(LocaleError::InvalidLanguage(code.to_string()));
        }

        let language = Language::from_code(code)?;
        self.context(language, Application::Frontend)
    }

    /// Build the backend context for an interface language.
    pub fn backend_context(&self, language: &str) -> Result<LocaleContext, LocaleError> {
        let language = Language::from_code(language)?;
        self.context(language, Application::Backend)
    }

    fn context(&self, language: Language, application: Application) -> Result<LocaleContext, LocaleError> {
        let canonical = Language::canonical();
        let fallback = self.ensure_cache(canonical, application)?;
        let active = if language == canonical {
            fallback.clone()
        } else {
            self.ensure_cache(language, application)?
        };

        Ok(LocaleContext::new(language, active, fallback, self.debug))
    }

    /// Load a cache, building it when it is absent or unreadable.
    pub fn ensure_cache(&self, language: Language, application: Application) -> Result<LocaleCache> {
        let metrics = LocaleMetrics::global();

        match self.builder.cache_directory().load(language.code(), application) {
            Ok(Some(cache)) => {
                metrics.record_cache_hit();
                return Ok(cache);
            }
            Ok(None) => debug!("No {} locale cache for {}, building it", application, language),
            Err(e) => warn!("Rebuilding unreadable {} locale cache for {}: {:#}", application, language, e),
        }

        metrics.record_cache_miss();
        self.builder.build(language, application)
    }

    /// The JSON artifact of a language, built on demand.
    pub fn json_artifact(&self, language: &str, application: Application) -> Result<String, LocaleError> {
        let language = Language::from_code(language)?;
        let directory = self.builder.cache_directory();

        if let Some(json) = directory.read_json(language.code(), application)? {
            LocaleMetrics::global().record_cache_hit();
            return Ok(json);
        }

        LocaleMetrics::global().record_cache_miss();
        self.builder.build(language, application)?;
        directory
            .read_json(language.code(), application)?
            .context("Locale JSON missing right after building it")
            .map_err(LocaleError::from)
    }
}
