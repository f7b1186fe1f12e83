use subtle::ConstantTimeEq;

/// Header carrying the API key on write requests.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Constant-time string comparison for secrets
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check a presented API key. Without a configured key nothing is accepted.
pub fn verify_api_key(configured: Option<&str>, presented: Option<&str>) -> bool {
    match (configured, presented) {
        (Some(expected), Some(presented)) if !expected.is_empty() => {
            constant_time_compare(expected, presented)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_verify_api_key() {
        assert!(verify_api_key(Some("k3y"), Some("k3y")));
        assert!(!verify_api_key(Some("k3y"), Some("key")));
        assert!(!verify_api_key(Some("k3y"), None));
    }

    #[test]
    fn test_unconfigured_key_rejects_everything() {
        assert!(!verify_api_key(None, Some("anything")));
        assert!(!verify_api_key(Some(""), Some("")));
    }
}
