use crate::i18n::Language;
use crate::location::DEFAULT_GEOCODE_API_URL;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_path: String,
    pub cache_path: String,

    // Locale
    pub site_default_language: Language,
    pub debug: bool,

    // Geocoding
    pub geocode_api_url: String,
    pub geocode_api_key: Option<String>,

    // HTTP
    pub api_key: Option<String>,
    pub backend_url: String,
    pub port: u16,
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let language = non_empty("SITE_DEFAULT_LANGUAGE").unwrap_or_else(|| "en".to_string());
        let site_default_language = Language::from_code(&language)
            .with_context(|| format!("SITE_DEFAULT_LANGUAGE is not a supported language: {}", language))?;

        let port = match non_empty("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", port))?,
            None => 8080,
        };

        Ok(Self {
            // Storage
            database_path: non_empty("DATABASE_PATH").unwrap_or_else(|| "data/forkcms.db".to_string()),
            cache_path: non_empty("CACHE_PATH").unwrap_or_else(|| "var/cache".to_string()),

            // Locale - DEBUG disables fallback lookups so missing translations show
            site_default_language,
            debug: non_empty("DEBUG")
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1"))
                .unwrap_or(false),

            // Geocoding
            geocode_api_url: non_empty("GEOCODE_API_URL")
                .unwrap_or_else(|| DEFAULT_GEOCODE_API_URL.to_string()),
            geocode_api_key: non_empty("GEOCODE_API_KEY"),

            // HTTP
            api_key: non_empty("API_KEY"),
            backend_url: non_empty("BACKEND_URL").unwrap_or_else(|| "/private".to_string()),
            port,
        })
    }
}
