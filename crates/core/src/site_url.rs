//! Website URL normalization.
//!
//! Businesses are keyed by their normalized website URL, so
//! `Example.com`, `www.example.com/` and `HTTP://Example.com` must all land
//! on the same row.

use url::Url;

use crate::error::CoreError;
use crate::i18n::Message;

const SCHEMES: [&str; 2] = ["https://", "http://"];
const WWW: &str = "www.";

/// Normalize a user-supplied website URL to `https://<host>[/<path>]`.
///
/// Lowercases, drops any `http(s)://` scheme and leading `www.`, and trims
/// trailing slashes. The result is idempotent under re-normalization.
/// Inputs without a dotted host or containing whitespace are rejected.
pub fn normalize_url(input: &str) -> Result<String, CoreError> {
    let lowered = input.trim().to_lowercase();
    let mut rest = lowered.as_str();

    loop {
        let before = rest;
        for scheme in SCHEMES {
            if let Some(stripped) = rest.strip_prefix(scheme) {
                rest = stripped;
            }
        }
        if let Some(stripped) = rest.strip_prefix(WWW) {
            rest = stripped;
        }
        if rest == before {
            break;
        }
    }

    let rest = rest.trim_end_matches('/');

    if rest.is_empty() || rest.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(Message::InvalidUrl));
    }

    let candidate = format!("https://{rest}");
    let parsed = Url::parse(&candidate).map_err(|_| CoreError::Validation(Message::InvalidUrl))?;
    match parsed.host_str() {
        Some(host) if host.contains('.') && !host.starts_with('.') && !host.ends_with('.') => {
            Ok(candidate)
        }
        _ => Err(CoreError::Validation(Message::InvalidUrl)),
    }
}

/// True when `input` is an absolute `http` or `https` URL with a host.
pub fn is_http_url(input: &str) -> bool {
    Url::parse(input)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equivalent_spellings_normalize_identically() {
        for input in [
            "Example.com",
            "www.example.com/",
            "HTTP://Example.com",
            "https://www.EXAMPLE.com//",
            "  example.com  ",
        ] {
            assert_eq!(normalize_url(input).unwrap(), "https://example.com", "input: {input}");
        }
    }

    #[test]
    fn keeps_path() {
        assert_eq!(
            normalize_url("https://Shop.Example.com/Products/").unwrap(),
            "https://shop.example.com/products"
        );
    }

    #[test]
    fn strips_repeated_prefixes() {
        assert_eq!(normalize_url("www.www.example.com").unwrap(), "https://example.com");
        assert_eq!(normalize_url("http://https://example.com").unwrap(), "https://example.com");
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_url("").is_err());
        assert!(normalize_url("https://").is_err());
        assert!(normalize_url("not a url").is_err());
        assert!(normalize_url("localhost").is_err());
        assert!(normalize_url("/").is_err());
    }

    #[test]
    fn http_url_detection() {
        assert!(is_http_url("https://cdn.example.com/a.png"));
        assert!(is_http_url("http://example.com"));
        assert!(!is_http_url("ftp://example.com/file"));
        assert!(!is_http_url("file:///etc/passwd"));
        assert!(!is_http_url("example.com"));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(
            input in "(HTTPS?://|https?://)?(www\\.|WWW\\.)?[a-vx-zA-VX-Z0-9][a-zA-Z0-9]{0,11}\\.(com|io|Shop)(/[a-zA-Z]{0,6}){0,2}/{0,2}"
        ) {
            let once = normalize_url(&input).unwrap();
            let twice = normalize_url(&once).unwrap();
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.starts_with("https://"));
            prop_assert!(!once.ends_with('/'));
        }
    }
}
