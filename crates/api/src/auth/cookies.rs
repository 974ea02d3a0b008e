//! Session cookies shared with the front end.

use adstudio_cloud::AuthSession;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::{Cookie, SameSite};

/// Access token cookie, also accepted in place of a Bearer header.
pub const ACCESS_COOKIE: &str = "sb-access-token";

pub const REFRESH_COOKIE: &str = "sb-refresh-token";

/// PKCE code verifier written by the front end before an OAuth redirect.
pub const VERIFIER_COOKIE: &str = "sb-code-verifier";

/// Refresh cookies outlive the access token.
const REFRESH_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;

fn session_cookie(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(max_age_secs))
        .path("/")
        .build()
}

fn removal_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    session_cookie(name, String::new(), 0, secure)
}

/// Cookies that establish a signed-in session.
pub fn session_cookies(session: &AuthSession, secure: bool) -> Vec<Cookie<'static>> {
    vec![
        session_cookie(ACCESS_COOKIE, session.access_token.clone(), session.expires_in, secure),
        session_cookie(REFRESH_COOKIE, session.refresh_token.clone(), REFRESH_MAX_AGE_SECS, secure),
    ]
}

/// Cookies that end the session.
pub fn cleared_session_cookies(secure: bool) -> Vec<Cookie<'static>> {
    vec![
        removal_cookie(ACCESS_COOKIE, secure),
        removal_cookie(REFRESH_COOKIE, secure),
    ]
}

/// Expire the PKCE verifier once it has been used.
pub fn cleared_verifier_cookie(secure: bool) -> Cookie<'static> {
    removal_cookie(VERIFIER_COOKIE, secure)
}

/// Append `Set-Cookie` headers.
pub fn append_cookies(headers: &mut HeaderMap, cookies: impl IntoIterator<Item = Cookie<'static>>) {
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            headers.append(SET_COOKIE, value);
        }
    }
}

/// Read a cookie value from the request's `Cookie` headers.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| Cookie::parse(pair.trim()).ok())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
