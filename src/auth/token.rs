//! Stateless bearer-token issuance and verification.
//!
//! Tokens are HS256-signed JWTs carrying the user identity, issue time and
//! expiry. The server keeps no record of issued tokens; a token becomes
//! invalid when its signature fails or its expiry passes. Signature
//! comparison happens inside `jsonwebtoken` and is constant-time.
//!
//! Expiry is deliberately checked here against an explicit clock rather
//! than by the library: verification at `now >= exp` must report
//! `Expired` with no leeway, and tests need to supply their own clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;

/// Claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the opaque user identity.
    pub sub: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Issues and verifies signed, time-bounded bearer tokens.
///
/// Pure with respect to everything but the clock: no I/O, no stored state,
/// safe to share across any number of concurrent requests.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced in verify_at with an exact boundary.
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a token for `identity` expiring `ttl` from now.
    pub fn issue(&self, identity: &str) -> Result<String, AuthError> {
        self.issue_at(identity, unix_now())
    }

    /// Issue a token with an explicit issue time.
    pub fn issue_at(&self, identity: &str, now: u64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: identity.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "token signing failed");
            AuthError::StoreUnavailable
        })
    }

    /// Verify a token against the current clock and return its identity.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token against an explicit clock.
    ///
    /// The signature is checked before anything else, so a tampered token
    /// reports `InvalidSignature` even when it is also past its expiry.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;
        if now >= data.claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(data.claims.sub)
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, Duration::from_secs(60))
    }

    #[test]
    fn test_round_trip_returns_identity() {
        let codec = codec();
        let token = codec.issue_at("user-42", 1_000).unwrap();
        assert_eq!(codec.verify_at(&token, 1_030).unwrap(), "user-42");
    }

    #[test]
    fn test_expiry_boundary_is_exact() {
        let codec = codec();
        let token = codec.issue_at("user-42", 1_000).unwrap();
        // Valid one second before expiry, Expired exactly at it.
        assert!(codec.verify_at(&token, 1_059).is_ok());
        assert_eq!(codec.verify_at(&token, 1_060), Err(AuthError::Expired));
        assert_eq!(codec.verify_at(&token, 2_000), Err(AuthError::Expired));
    }

    #[test]
    fn test_bit_flip_in_signature_is_invalid_signature() {
        let codec = codec();
        let token = codec.issue_at("user-42", 1_000).unwrap();
        let (payload, signature) = token.rsplit_once('.').unwrap();
        let mut raw = URL_SAFE_NO_PAD.decode(signature).unwrap();
        raw[0] ^= 0x01;
        let tampered = format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(raw));
        assert_eq!(codec.verify_at(&tampered, 1_030), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_expired_and_tampered_reports_signature_first() {
        let codec = codec();
        let token = codec.issue_at("user-42", 1_000).unwrap();
        let (payload, signature) = token.rsplit_once('.').unwrap();
        let mut raw = URL_SAFE_NO_PAD.decode(signature).unwrap();
        raw[0] ^= 0x01;
        let tampered = format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(raw));
        assert_eq!(codec.verify_at(&tampered, 5_000), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_wrong_key_is_invalid_signature() {
        let codec = codec();
        let other = TokenCodec::new(b"ffffffffffffffffffffffffffffffff", Duration::from_secs(60));
        let token = codec.issue_at("user-42", 1_000).unwrap();
        assert_eq!(other.verify_at(&token, 1_030), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.verify_at("not-a-token", 1_000), Err(AuthError::Malformed));
        assert_eq!(codec.verify_at("", 1_000), Err(AuthError::Malformed));
        assert_eq!(codec.verify_at("a.b.c", 1_000), Err(AuthError::Malformed));
    }

    #[test]
    fn test_expired_valid_token_is_never_invalid_signature() {
        let codec = codec();
        let token = codec.issue_at("user-42", 1_000).unwrap();
        for now in [1_060, 1_061, 10_000] {
            assert_eq!(codec.verify_at(&token, now), Err(AuthError::Expired));
        }
    }
}
