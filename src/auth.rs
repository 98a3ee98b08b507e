//! Bearer-token auth for admin mutations.
//!
//! Tokens are HS256 JWTs signed with the server-held secret from config.
//! The payload carries the admin id and a 7-day expiry. Password hashes
//! are salted, iterated SHA-256 in `salt$digest` hex form.

use crate::error::ApiError;
use crate::server::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_TTL_DAYS: i64 = 7;
const HASH_ROUNDS: u32 = 100_000;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Admin id.
    sub: String,
    /// Unix expiry.
    exp: i64,
}

/// Sign a token for an authenticated admin.
pub fn issue_token(secret: &str, admin_id: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = Claims {
        sub: admin_id.to_string(),
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    let payload =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).expect("claims serialize"));
    let signing_input = format!("{header}.{payload}");
    let signature = URL_SAFE_NO_PAD.encode(sign(secret, signing_input.as_bytes()));
    format!("{signing_input}.{signature}")
}

/// Verify a token and return the admin id it was issued for.
pub fn verify_token(secret: &str, token: &str) -> Result<String, ApiError> {
    let mut parts = token.splitn(3, '.');
    let (header, payload, signature) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s)) => (h, p, s),
        _ => return Err(ApiError::unauthorized("Invalid token format")),
    };

    let signing_input = format!("{header}.{payload}");
    let given = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key");
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&given)
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;

    let claims: Claims = URL_SAFE_NO_PAD
        .decode(payload)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;
    if claims.exp <= Utc::now().timestamp() {
        return Err(ApiError::unauthorized("Token expired"));
    }
    Ok(claims.sub)
}

fn sign(secret: &str, input: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key");
    mac.update(input);
    mac.finalize().into_bytes().to_vec()
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::rng().fill_bytes(&mut salt);
    format!("{}${}", hex::encode(salt), hex::encode(digest(&salt, password)))
}

/// Check a password against a stored `salt$digest` hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return false;
    };
    // Constant-time comparison via HMAC verify.
    let mut mac = HmacSha256::new_from_slice(&salt).expect("hmac accepts any key");
    mac.update(&digest(&salt, password));
    let tag = mac.finalize().into_bytes();
    let mut mac = HmacSha256::new_from_slice(&salt).expect("hmac accepts any key");
    mac.update(&expected);
    mac.verify_slice(&tag).is_ok()
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let mut out: [u8; 32] = hasher.finalize().into();
    for _ in 1..HASH_ROUNDS {
        out = Sha256::digest(out).into();
    }
    out
}

/// Extractor for authenticated admin routes. Rejects anonymous callers
/// before any handler logic runs.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub String);

impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("No token provided"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid token format"))?;
        let admin_id = verify_token(&state.secret, token)?;
        Ok(Self(admin_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_and_carry_the_admin_id() {
        let token = issue_token("top-secret", "admin-42");
        assert_eq!(verify_token("top-secret", &token).unwrap(), "admin-42");
    }

    #[test]
    fn wrong_secret_or_tampering_is_rejected() {
        let token = issue_token("top-secret", "admin-42");
        assert!(verify_token("other-secret", &token).is_err());

        let mut tampered = token.clone();
        tampered.truncate(token.len() - 2);
        assert!(verify_token("top-secret", &tampered).is_err());
        assert!(verify_token("top-secret", "not.a.jwt").is_err());
        assert!(verify_token("top-secret", "single-segment").is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        // Build a token that expired an hour ago.
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = Claims {
            sub: "admin-42".into(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let input = format!("{header}.{payload}");
        let sig = URL_SAFE_NO_PAD.encode(sign("top-secret", input.as_bytes()));
        let token = format!("{input}.{sig}");

        let err = verify_token("top-secret", &token).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn password_hashes_verify_and_are_salted() {
        let a = hash_password("laksh");
        let b = hash_password("laksh");
        assert_ne!(a, b);
        assert!(verify_password("laksh", &a));
        assert!(verify_password("laksh", &b));
        assert!(!verify_password("wrong", &a));
        assert!(!verify_password("laksh", "garbage"));
    }
}
