//! Rebuild the locale caches of every active language
//!
//! Usage:
//!   cargo run --bin build-locale              # Rebuild backend and frontend caches
//!   cargo run --bin build-locale -- --check   # Also validate every language against English
//!
//! Uses the same environment variables as the server (DATABASE_PATH,
//! CACHE_PATH, SITE_DEFAULT_LANGUAGE). `--check` exits with an error when a
//! translation has mismatched placeholders.

use anyhow::{bail, Result};
use forkcms_core::config::Config;
use forkcms_core::db::Database;
use forkcms_core::i18n::{Application, CacheDirectory, Language, LocaleResolver, LocaleValidator};
use tracing::{info, warn};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("forkcms_core=info".parse()?)
                .add_directive("build_locale=info".parse()?),
        )
        .init();

    let check = std::env::args().skip(1).any(|arg| arg == "--check");

    let config = Config::from_env()?;
    let db = Database::new(&config.database_path)?;
    let resolver = LocaleResolver::new(
        db,
        CacheDirectory::new(&config.cache_path),
        config.site_default_language,
        config.debug,
    );

    let canonical = Language::canonical();
    let mut languages = vec![canonical];
    for code in resolver.active_languages()? {
        match Language::from_code(&code) {
            Ok(language) if !languages.contains(&language) => languages.push(language),
            Ok(_) => {}
            Err(e) => warn!("Skipping active language: {}", e),
        }
    }

    let built = resolver.builder().build_all(&languages)?;
    info!("Built {} locale caches in {}", built, config.cache_path);

    if !check {
        return Ok(());
    }

    let mut errors = 0;
    for application in Application::ALL {
        let fallback = resolver.ensure_cache(canonical, application)?;

        for language in languages.iter().filter(|language| **language != canonical) {
            let active = resolver.ensure_cache(*language, application)?;
            let report = LocaleValidator::validate(&fallback, &active);

            for warning in &report.warnings {
                warn!("[{} {}] {}", application, language, warning);
            }
            for error in &report.errors {
                warn!("[{} {}] {}", application, language, error);
            }
            errors += report.errors.len();

            info!(
                "{} {}: {} warnings, {} errors",
                application,
                language,
                report.warnings.len(),
                report.errors.len()
            );
        }
    }

    if errors > 0 {
        bail!("{} translations have mismatched placeholders", errors);
    }

    Ok(())
}
