use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    /// Adds the `Secure` attribute; on in production.
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    /// Origin allowed to call the API with credentials. Permissive CORS when unset.
    pub frontend_url: Option<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        // No fallback secret: a known default would let anyone mint sessions.
        let secret = get("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let jwt = JwtConfig {
            secret,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "rsvp".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "rsvp-users".into()),
        };

        let production = get("APP_ENV").map(|v| v == "production").unwrap_or(false);
        let cookie = CookieConfig {
            secure: get("COOKIE_SECURE")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(production),
        };

        let port = match get("APP_PORT") {
            Some(v) => v.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 3001,
        };

        Ok(Self {
            database_url,
            jwt,
            cookie,
            frontend_url: get("FRONTEND_URL").filter(|v| !v.is_empty()),
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
        })
    }
}
