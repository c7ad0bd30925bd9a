use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, SessionClaim};
use crate::config::JwtConfig;

/// Sessions are valid for a fixed window from issuance; activity does not extend them.
pub const SESSION_TTL: Duration = Duration::days(7);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token could not be decoded")]
    Malformed,
}

/// Signing and verification keys, built once from config.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }

    pub fn issue(&self, subject_id: i64, email: &str) -> anyhow::Result<String> {
        self.issue_at(subject_id, email, OffsetDateTime::now_utc())
    }

    pub fn issue_at(
        &self,
        subject_id: i64,
        email: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let exp = now + SESSION_TTL;
        let claims = Claims {
            sub: subject_id.to_string(),
            email: email.to_owned(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = subject_id, "jwt signed");
        Ok(token)
    }

    #[cfg(test)]
    pub fn verify(&self, token: &str) -> Result<SessionClaim, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Checks signature, issuer and audience, then expiry against `now`.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<SessionClaim, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is compared against the caller's clock below, with no leeway
        validation.validate_exp = false;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;
        let claims = data.claims;

        let subject_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed)?;
        let issued_at =
            OffsetDateTime::from_unix_timestamp(claims.iat).map_err(|_| TokenError::Malformed)?;
        let expires_at =
            OffsetDateTime::from_unix_timestamp(claims.exp).map_err(|_| TokenError::Malformed)?;

        if now > expires_at {
            return Err(TokenError::Expired);
        }

        debug!(user_id = subject_id, "jwt verified");
        Ok(SessionClaim {
            subject_id,
            email: claims.email,
            issued_at,
            expires_at,
        })
    }
}
