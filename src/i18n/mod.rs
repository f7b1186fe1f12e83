//! Internationalization (i18n) module: locale caches and translation lookup.
//!
//! Translations live in the `locale` table. The builder compiles them per
//! (language, application) into cache artifacts on disk, the resolver loads
//! those artifacts (building them on a miss) and hands out an immutable
//! `LocaleContext` for the request's language.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Validated `Language` values
//! - `types`: Locale types (`act`, `err`, `lbl`, `msg`) and applications
//! - `cache`: Typed cache entries and the on-disk cache directory
//! - `builder`: Compiles database rows into cache artifacts
//! - `calendar`: Localized month and day names for the JSON artifact
//! - `context`: Per-request lookups with fallback and placeholders
//! - `negotiation`: `Accept-Language` parsing
//! - `resolver`: Picks the language and builds contexts
//! - `validator`: Completeness and placeholder checks
//! - `metrics`: Lookup and cache counters
//!
//! # Example
//!
//! ```rust,ignore
//! use forkcms_core::i18n::{CacheDirectory, Language, LocaleResolver};
//!
//! let resolver = LocaleResolver::new(db, CacheDirectory::new("var/cache"), Language::ENGLISH, false);
//! let ctx = resolver.set_locale(Some("nl"), false)?;
//! let label = ctx.label("address");
//! ```

mod builder;
mod cache;
mod calendar;
mod context;
mod language;
mod metrics;
mod negotiation;
mod registry;
mod resolver;
mod types;
mod validator;

pub use builder::LocaleCacheBuilder;
pub use cache::{CacheDirectory, LocaleCache, ModuleTable};
pub use calendar::calendar_labels;
pub use context::{placeholder, LocaleContext, Translation, CORE_MODULE};
pub use language::Language;
pub use metrics::{LocaleMetrics, MetricsReport};
pub use negotiation::{negotiate_language, parse_accept_language, AcceptedLanguage};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use resolver::{LocaleResolver, ACTIVE_LANGUAGES, REDIRECT_LANGUAGES, SETTINGS_MODULE};
pub use types::{to_camel_case, ucfirst, Application, LocaleType};
pub use validator::{LocaleValidator, ValidationReport};
