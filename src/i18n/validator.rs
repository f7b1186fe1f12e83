//! Translation completeness and placeholder validation.
//!
//! Compares the cache of a language against the cache of the fallback
//! language: keys the translators haven't covered yet are warnings, values
//! whose `%s`/`%1$s`/`%d`/`{$var}` placeholders drifted from the fallback are
//! errors (they would break the `sprintf`-style formatting done by callers).

use crate::i18n::LocaleCache;
use regex::Regex;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Translations that will render incorrectly
    pub errors: Vec<String>,

    /// Missing or empty translations
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub struct LocaleValidator;

static PRINTF_REGEX: OnceLock<Regex> = OnceLock::new();
static TEMPLATE_VAR_REGEX: OnceLock<Regex> = OnceLock::new();

impl LocaleValidator {
    /// Check `active` against `fallback`, key by key.
    pub fn validate(fallback: &LocaleCache, active: &LocaleCache) -> ValidationReport {
        let mut report = ValidationReport::new();

        for (locale_type, modules) in &fallback.translations {
            for (module, names) in modules {
                for (name, original) in names {
                    let key = format!("{}.{}.{}", locale_type.code(), module, name);

                    let Some(translated) = active.get(*locale_type, module, name) else {
                        report
                            .warnings
                            .push(format!("Missing translation for {} in {}", key, active.language));
                        continue;
                    };

                    if translated.trim().is_empty() {
                        report
                            .warnings
                            .push(format!("Empty translation for {} in {}", key, active.language));
                        continue;
                    }

                    if let Some(error) = Self::compare_placeholders(original, translated) {
                        report.errors.push(format!("{}: {}", key, error));
                    }
                }
            }
        }

        report
    }

    /// Describe the difference between the placeholders of two values, if any.
    pub fn compare_placeholders(original: &str, translated: &str) -> Option<String> {
        let mut orig_printf = Self::extract_printf(original);
        let mut trans_printf = Self::extract_printf(translated);
        orig_printf.sort();
        trans_printf.sort();
        if orig_printf != trans_printf {
            return Some(format!(
                "Placeholder mismatch: original has {:?}, translation has {:?}",
                orig_printf, trans_printf
            ));
        }

        let mut orig_vars = Self::extract_template_vars(original);
        let mut trans_vars = Self::extract_template_vars(translated);
        orig_vars.sort();
        trans_vars.sort();
        if orig_vars != trans_vars {
            return Some(format!(
                "Template variable mismatch: original has {:?}, translation has {:?}",
                orig_vars, trans_vars
            ));
        }

        None
    }

    /// `%s`, `%d`, `%1$s` and friends; `%%` is a literal percent sign.
    fn extract_printf(text: &str) -> Vec<String> {
        let regex = PRINTF_REGEX
            .get_or_init(|| Regex::new(r"%%|%(?:\d+\$)?[-+0#]*\d*(?:\.\d+)?[bcdeEufFgGosxX]").unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|m| *m != "%%")
            .map(str::to_string)
            .collect()
    }

    /// `{$var}` template variables
    fn extract_template_vars(text: &str) -> Vec<String> {
        let regex = TEMPLATE_VAR_REGEX.get_or_init(|| Regex::new(r"\{\$[A-Za-z_][A-Za-z0-9_.]*\}").unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
