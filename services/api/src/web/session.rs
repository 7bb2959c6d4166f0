//! services/api/src/web/session.rs
//!
//! Signed session tokens and the cookie that carries them. This is
//! single-tenant, password-only auth: the token asserts "authenticated"
//! and nothing else, and expires after seven days.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the HTTP-only cookie holding the session token.
pub const SESSION_COOKIE: &str = "nulis-session";

/// Token and cookie lifetime.
const SESSION_TTL_DAYS: i64 = 7;

#[derive(Serialize, Deserialize)]
struct SessionClaims {
    authenticated: bool,
    exp: i64,
}

/// Issues a signed token asserting "authenticated", expiring in seven days.
pub fn create_session(secret: &[u8]) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = SessionClaims {
        authenticated: true,
        exp: (Utc::now() + Duration::days(SESSION_TTL_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// True iff the token's signature and expiry both validate.
pub fn verify_token(secret: &[u8], token: &str) -> bool {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .is_ok()
}

/// Extracts the session token from the request's cookie header, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|c| {
        let c = c.trim();
        c.strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
    })
}

/// Reads the session cookie and validates the token it carries.
pub fn verify_session(headers: &HeaderMap, secret: &[u8]) -> bool {
    match token_from_headers(headers) {
        Some(token) => verify_token(secret, token),
        None => false,
    }
}

/// Builds the Set-Cookie value attaching the session token. The cookie
/// lifetime matches the token's.
pub fn session_cookie(token: &str, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        if secure { " Secure;" } else { "" },
        Duration::days(SESSION_TTL_DAYS).num_seconds()
    )
}

/// Builds the Set-Cookie value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    format!(
        "{}=; HttpOnly;{} SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE,
        if secure { " Secure;" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn issued_tokens_verify() {
        let token = create_session(SECRET).unwrap();
        assert!(verify_token(SECRET, &token));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let token = create_session(SECRET).unwrap();
        assert!(!verify_token(b"other-secret", &token));
    }

    #[test]
    fn garbage_tokens_fail_verification() {
        assert!(!verify_token(SECRET, "not-a-token"));
        assert!(!verify_token(SECRET, ""));
    }

    #[test]
    fn cookie_is_parsed_out_of_the_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; nulis-session=abc123; other=1"),
        );
        assert_eq!(token_from_headers(&headers), Some("abc123"));
    }

    #[test]
    fn missing_cookie_is_not_authenticated() {
        let headers = HeaderMap::new();
        assert!(!verify_session(&headers, SECRET));
    }

    #[test]
    fn session_round_trips_through_the_cookie_header() {
        let token = create_session(SECRET).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token)).unwrap(),
        );
        assert!(verify_session(&headers, SECRET));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.starts_with("nulis-session=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
        assert!(clear_session_cookie(true).contains("Secure"));
    }
}
