//! Signed, time-bound bearer tokens.
//!
//! Wire format: `<hex(claims json)>.<hex(HMAC-SHA256(secret, first segment))>`.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Longest accepted token lifetime: one year.
pub const MAX_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to.
    pub sub: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("token lifetime must be between 1 and {max} seconds, got {0}", max = MAX_TTL_SECS)]
pub struct InvalidLifetime(pub i64);

#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: i64) -> Result<Self, InvalidLifetime> {
        let ttl = Duration::try_seconds(ttl_secs)
            .filter(|_| (1..=MAX_TTL_SECS).contains(&ttl_secs))
            .ok_or(InvalidLifetime(ttl_secs))?;
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            ttl,
        })
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    pub fn issue(&self, subject: &str) -> String {
        self.issue_at(subject, Utc::now())
    }

    pub(crate) fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.timestamp(),
            // Saturates at the end of chrono's range instead of overflowing.
            exp: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
        };
        let payload = hex::encode(
            serde_json::to_vec(&claims).expect("claims always serialise to JSON"),
        );

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        format!("{payload}.{signature}")
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub(crate) fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        // Constant-time comparison.
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let bytes = hex::decode(payload).map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
