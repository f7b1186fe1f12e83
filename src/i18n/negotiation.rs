//! Language negotiation based on the `Accept-Language` header.

/// One entry of an `Accept-Language` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedLanguage {
    /// Lower-cased language tag (e.g., "en-us")
    pub tag: String,
    /// Quality weight in `0.0..=1.0`, 1.0 when not given
    pub weight: f32,
}

impl AcceptedLanguage {
    /// Parses one entry (e.g., "en-US;q=0.9"). Returns `None` for empty entries.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(';');
        let tag = parts.next()?.trim().to_lowercase();
        if tag.is_empty() {
            return None;
        }

        let mut weight = 1.0;
        for param in parts {
            if let Some((key, value)) = param.split_once('=') {
                if key.trim() == "q" {
                    weight = value
                        .trim()
                        .parse::<f32>()
                        .ok()
                        .filter(|weight| weight.is_finite())
                        .map_or(0.0, |weight| weight.clamp(0.0, 1.0));
                }
            }
        }

        Some(Self { tag, weight })
    }

    /// The two-letter language prefix of the tag.
    pub fn prefix(&self) -> String {
        self.tag.chars().take(2).collect()
    }
}

/// Parse a header into its entries, highest weight first. Entries with equal
/// weight keep their order from the header.
pub fn parse_accept_language(header: &str) -> Vec<AcceptedLanguage> {
    let mut languages: Vec<_> = header.split(',').filter_map(AcceptedLanguage::parse).collect();

    languages.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    languages
}

/// Pick the first language of the header (by weight) whose two-letter prefix
/// is in `eligible`, or `default` when none matches.
pub fn negotiate_language(header: Option<&str>, eligible: &[String], default: &str) -> String {
    let Some(header) = header.filter(|header| header.len() >= 2) else {
        return default.to_string();
    };

    parse_accept_language(header)
        .iter()
        .map(AcceptedLanguage::prefix)
        .find(|prefix| eligible.iter().any(|language| language == prefix))
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn eligible(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|code| code.to_string()).collect()
    }

    // ==================== Parse Tests ====================

    #[test]
    fn test_parse_with_weight() {
        let language = AcceptedLanguage::parse("en-US;q=0.9").unwrap();
        assert_eq!(language.tag, "en-us");
        assert_eq!(language.weight, 0.9);
        assert_eq!(language.prefix(), "en");
    }

    #[test]
    fn test_parse_defaults_weight_to_one() {
        let language = AcceptedLanguage::parse(" fr ").unwrap();
        assert_eq!(language.tag, "fr");
        assert_eq!(language.weight, 1.0);
    }

    #[test]
    fn test_parse_invalid_weight_is_zero() {
        let language = AcceptedLanguage::parse("de;q=abc").unwrap();
        assert_eq!(language.weight, 0.0);
    }

    #[test]
    fn test_parse_non_finite_weight_is_zero() {
        assert_eq!(AcceptedLanguage::parse("de;q=NaN").unwrap().weight, 0.0);
        assert_eq!(AcceptedLanguage::parse("de;q=inf").unwrap().weight, 0.0);
        assert_eq!(AcceptedLanguage::parse("de;q=-inf").unwrap().weight, 0.0);
    }

    #[test]
    fn test_parse_weight_is_clamped() {
        assert_eq!(AcceptedLanguage::parse("de;q=5").unwrap().weight, 1.0);
        assert_eq!(AcceptedLanguage::parse("de;q=-0.5").unwrap().weight, 0.0);
    }

    #[test]
    fn test_malformed_weight_does_not_beat_valid_entry() {
        let languages = eligible(&["en", "de"]);
        assert_eq!(negotiate_language(Some("de;q=NaN, en"), &languages, "nl"), "en");
        assert_eq!(negotiate_language(Some("de;q=inf, en"), &languages, "nl"), "en");
    }

    #[test]
    fn test_parse_empty_entry() {
        assert!(AcceptedLanguage::parse("").is_none());
        assert!(AcceptedLanguage::parse(" ;q=0.5").is_none());
    }

    #[test]
    fn test_parse_header_sorts_by_weight_stably() {
        let languages = parse_accept_language("nl;q=0.5, fr, de;q=0.8, en");
        let tags: Vec<_> = languages.iter().map(|l| l.tag.as_str()).collect();
        assert_eq!(tags, vec!["fr", "en", "de", "nl"]);
    }

    // ==================== Negotiation Tests ====================

    #[test]
    fn test_skips_ineligible_languages() {
        let result = negotiate_language(Some("fr;q=0.9,en;q=0.8"), &eligible(&["en", "nl"]), "nl");
        assert_eq!(result, "en");
    }

    #[test]
    fn test_no_match_returns_default() {
        let result = negotiate_language(Some("fr,de;q=0.5"), &eligible(&["en", "nl"]), "nl");
        assert_eq!(result, "nl");
    }

    #[test]
    fn test_missing_or_short_header_returns_default() {
        assert_eq!(negotiate_language(None, &eligible(&["en"]), "en"), "en");
        assert_eq!(negotiate_language(Some("n"), &eligible(&["nl"]), "en"), "en");
    }

    #[test]
    fn test_region_is_truncated() {
        let result = negotiate_language(Some("nl-BE,en;q=0.7"), &eligible(&["en", "nl"]), "en");
        assert_eq!(result, "nl");
    }

    #[test]
    fn test_highest_weight_wins_regardless_of_position() {
        let result = negotiate_language(Some("en;q=0.2, nl;q=0.9"), &eligible(&["en", "nl"]), "fr");
        assert_eq!(result, "nl");
    }

    #[test]
    fn test_empty_eligible_set_returns_default() {
        assert_eq!(negotiate_language(Some("en"), &[], "en"), "en");
    }

    proptest! {
        #[test]
        fn negotiation_result_is_eligible_or_default(header in ".{0,64}") {
            let eligible = eligible(&["en", "nl", "fr"]);
            let result = negotiate_language(Some(&header), &eligible, "de");
            prop_assert!(result == "de" || eligible.contains(&result));
        }
    }
}
