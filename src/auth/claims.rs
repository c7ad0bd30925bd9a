use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// JWT payload as it travels inside the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // user ID, decimal
    pub email: String, // email at issuance time, informational only
    pub iat: i64,      // issued at (unix timestamp)
    pub exp: i64,      // expires at (unix timestamp)
    pub iss: String,   // issuer
    pub aud: String,   // audience
}

/// A verified session. Only `subject_id` is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaim {
    pub subject_id: i64,
    pub email: String,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}
