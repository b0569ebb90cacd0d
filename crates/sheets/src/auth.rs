use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const ASSERTION_TTL_SECONDS: i64 = 3600;

#[derive(Clone)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
}

impl ServiceAccountCredentials {
    /// Keys pasted into environment variables usually carry literal `\n`
    /// sequences instead of line breaks; both forms are accepted.
    pub fn new(client_email: impl Into<String>, private_key: impl AsRef<str>) -> Self {
        Self {
            client_email: client_email.into(),
            private_key: private_key.as_ref().replace("\\n", "\n"),
        }
    }
}

impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Signs the RS256 assertion that the token endpoint trades for an access token.
pub fn mint_assertion(
    credentials: &ServiceAccountCredentials,
    token_uri: &str,
    now: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = now + Duration::seconds(ASSERTION_TTL_SECONDS);
    let claims = Claims {
        iss: &credentials.client_email,
        scope: SHEETS_SCOPE,
        aud: token_uri,
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())?,
    )
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
