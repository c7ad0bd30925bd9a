//! Session cookie handling: the only channel the session token travels on.

use axum::http::{header, HeaderMap, HeaderValue};

use super::jwt::SESSION_TTL;
use crate::config::CookieConfig;

pub const SESSION_COOKIE: &str = "accessToken";

const CLEAR: &str =
    "accessToken=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax";
const CLEAR_SECURE: &str = "accessToken=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax; Secure";

#[derive(Debug, Clone)]
pub struct SessionCookie {
    secure: bool,
}

impl SessionCookie {
    pub fn new(cfg: &CookieConfig) -> Self {
        Self { secure: cfg.secure }
    }

    /// `Set-Cookie` value carrying `token` for the lifetime of the session.
    pub fn set(&self, token: &str) -> anyhow::Result<HeaderValue> {
        let value = format!(
            "{SESSION_COOKIE}={token}; Path=/; Max-Age={}; {}",
            SESSION_TTL.whole_seconds(),
            self.flags()
        );
        Ok(HeaderValue::from_str(&value)?)
    }

    /// `Set-Cookie` value that makes the client drop its copy.
    pub fn clear(&self) -> HeaderValue {
        if self.secure {
            HeaderValue::from_static(CLEAR_SECURE)
        } else {
            HeaderValue::from_static(CLEAR)
        }
    }

    fn flags(&self) -> &'static str {
        if self.secure {
            "HttpOnly; SameSite=Lax; Secure"
        } else {
            "HttpOnly; SameSite=Lax"
        }
    }
}

/// Token from the session cookie, if any. Empty values count as absent.
pub fn read_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
