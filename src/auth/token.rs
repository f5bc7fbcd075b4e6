//! Bearer tokens
//!
//! Stateless HMAC-signed tokens. Nothing is stored server-side, so there
//! is no revocation: a token is good until it expires.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// How long an issued token stays valid, in hours
pub const TOKEN_TTL_HOURS: i64 = 24;

pub fn token_ttl() -> Duration {
    Duration::hours(TOKEN_TTL_HOURS)
}

/// Identity embedded in a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    pub fn new(user_id: &str, username: &str, now: DateTime<Utc>) -> Self {
        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            issued_at: now,
            expires_at: now + token_ttl(),
        }
    }

    /// Check if the token has expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

fn sign(payload_b64: &str, secret: &str) -> Result<HmacSha256, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid token secret: {e}")))?;
    mac.update(payload_b64.as_bytes());
    Ok(mac)
}

/// Create a signed token
///
/// Token format: base64url(json claims).base64url(hmac_sha256(payload))
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    // 1. Serialize and encode the claims
    let payload = serde_json::to_vec(claims).map_err(|e| AppError::Internal(e.into()))?;
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload);

    // 2. Sign the encoded payload
    let signature = sign(&payload_b64, secret)?.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{payload_b64}.{signature_b64}"))
}

/// Verify and decode a token
///
/// # Errors
/// `Forbidden` if the token is malformed, tampered with or expired at
/// `now`
pub fn verify_token(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Claims, AppError> {
    // 1. Split token into payload and signature
    let (payload_b64, signature_b64) = token.split_once('.').ok_or(AppError::Forbidden)?;

    // 2. Verify HMAC signature
    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::Forbidden)?;
    sign(payload_b64, secret)?
        .verify_slice(&signature)
        .map_err(|_| AppError::Forbidden)?;

    // 3. Decode claims
    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AppError::Forbidden)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| AppError::Forbidden)?;

    // 4. Check expiry
    if claims.is_expired(now) {
        return Err(AppError::Forbidden);
    }

    Ok(claims)
}
