//! Language registry: Single source of truth for all languages the CMS ships.
//!
//! Site configuration (the active and redirect language sets) can only
//! reference languages listed here. It uses a singleton pattern with
//! `OnceLock` to ensure thread-safe initialization and access.

use chrono::Locale;
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "nl")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Dutch")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Nederlands")
    pub native_name: &'static str,

    /// Locale used for month and weekday names in the calendar labels
    pub calendar_locale: Locale,

    /// Whether this is the fallback language (only one should be true)
    pub is_canonical: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all registered languages.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the canonical language configuration.
    ///
    /// The canonical language provides the fallback translations for every
    /// other language.
    ///
    /// # Panics
    /// Panics if the registry does not define exactly one canonical language.
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// Check if a language code is registered.
    pub fn is_known(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

fn language(
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    calendar_locale: Locale,
) -> LanguageConfig {
    LanguageConfig {
        code,
        name,
        native_name,
        calendar_locale,
        is_canonical: false,
    }
}

/// The interface and site languages Fork CMS ships translations for.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            is_canonical: true,
            ..language("en", "English", "English", Locale::en_US)
        },
        language("bg", "Bulgarian", "Български", Locale::bg_BG),
        language("cs", "Czech", "Čeština", Locale::cs_CZ),
        language("da", "Danish", "Dansk", Locale::da_DK),
        language("de", "German", "Deutsch", Locale::de_DE),
        language("el", "Greek", "Ελληνικά", Locale::el_GR),
        language("es", "Spanish", "Español", Locale::es_ES),
        language("fi", "Finnish", "Suomi", Locale::fi_FI),
        language("fr", "French", "Français", Locale::fr_FR),
        language("hr", "Croatian", "Hrvatski", Locale::hr_HR),
        language("hu", "Hungarian", "Magyar", Locale::hu_HU),
        language("it", "Italian", "Italiano", Locale::it_IT),
        language("ja", "Japanese", "日本語", Locale::ja_JP),
        language("lt", "Lithuanian", "Lietuvių", Locale::lt_LT),
        language("nl", "Dutch", "Nederlands", Locale::nl_NL),
        language("pl", "Polish", "Polski", Locale::pl_PL),
        language("pt", "Portuguese", "Português", Locale::pt_PT),
        language("ro", "Romanian", "Română", Locale::ro_RO),
        language("ru", "Russian", "Русский", Locale::ru_RU),
        language("sv", "Swedish", "Svenska", Locale::sv_SE),
        language("tr", "Turkish", "Türkçe", Locale::tr_TR),
        language("uk", "Ukrainian", "Українська", Locale::uk_UA),
        language("zh", "Chinese", "中文", Locale::zh_CN),
    ]
}
