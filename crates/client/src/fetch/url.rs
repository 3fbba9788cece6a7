//! URL canonicalization for cache keys and interception decisions.

use url::Url;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a request URL as the page would resolve it.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references against `origin`
/// 3. Reject anything that is not http(s)
/// 4. Remove fragment (#...); the host is lowercased by the parser
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str, origin: &Url) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Whether `input` uses one of the pseudo-schemes that must never be intercepted.
pub fn has_bypass_scheme(input: &str, schemes: &[String]) -> bool {
    let Some((scheme, _)) = input.trim().split_once(':') else {
        return false;
    };
    schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme))
}

pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://yourportfolio.com").unwrap()
    }

    #[test]
    fn test_canonicalize_relative() {
        let url = canonicalize("/index.html", &origin()).unwrap();
        assert_eq!(url.as_str(), "https://yourportfolio.com/index.html");
    }

    #[test]
    fn test_canonicalize_root() {
        let url = canonicalize("/", &origin()).unwrap();
        assert_eq!(url.as_str(), "https://yourportfolio.com/");
    }

    #[test]
    fn test_canonicalize_absolute_other_origin() {
        let url = canonicalize("https://fonts.example.net/a.css", &origin()).unwrap();
        assert_eq!(url.host_str(), Some("fonts.example.net"));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://YOURPORTFOLIO.COM/", &origin()).unwrap();
        assert_eq!(url.host_str(), Some("yourportfolio.com"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("/#projects", &origin()).unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.as_str(), "https://yourportfolio.com/");
    }

    #[test]
    fn test_canonicalize_preserve_query() {
        let url = canonicalize("/api/projects?tag=rust&page=2", &origin()).unwrap();
        assert_eq!(url.query(), Some("tag=rust&page=2"));
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("data:text/plain,hi", &origin());
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize("   ", &origin()), Err(UrlError::Empty)));
    }

    #[test]
    fn test_bypass_scheme() {
        let schemes = vec!["chrome-extension".to_string(), "moz-extension".to_string()];
        assert!(has_bypass_scheme("chrome-extension://abcdef/popup.js", &schemes));
        assert!(has_bypass_scheme("MOZ-EXTENSION://x/y", &schemes));
        assert!(!has_bypass_scheme("https://yourportfolio.com/", &schemes));
        assert!(!has_bypass_scheme("/index.html", &schemes));
    }

    #[test]
    fn test_same_origin() {
        let a = Url::parse("https://yourportfolio.com/a").unwrap();
        let b = Url::parse("https://yourportfolio.com/b?x=1").unwrap();
        let c = Url::parse("http://yourportfolio.com/a").unwrap();
        assert!(is_same_origin(&a, &b));
        assert!(!is_same_origin(&a, &c));
    }
}
