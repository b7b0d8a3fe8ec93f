use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use shared_models::auth::TokenClaims;

/// Decode the claims segment of a JWT without checking the signature. The
/// upstream owns the token; we only read it to learn when it runs out.
/// Opaque (non-JWT) tokens yield `None`.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut parts = token.split('.');
    let (_header, claims_b64, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let bytes = match URL_SAFE_NO_PAD.decode(claims_b64.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Token claims are not base64url: {}", e);
            return None;
        }
    };

    match serde_json::from_slice::<TokenClaims>(&bytes) {
        Ok(claims) => Some(claims),
        Err(e) => {
            debug!("Token claims are not JSON: {}", e);
            None
        }
    }
}

/// Expiry from the `exp` claim, when the token carries one.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let exp = decode_claims(token)?.exp?;
    Utc.timestamp_opt(exp, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TokenTestUtils;

    #[test]
    fn test_reads_expiry_from_jwt() {
        let token = TokenTestUtils::create_token_expiring_at(1_900_000_000);
        let expiry = token_expiry(&token).unwrap();
        assert_eq!(expiry.timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_opaque_tokens_have_no_expiry() {
        assert!(token_expiry("opaque-session-token").is_none());
        assert!(token_expiry("a.b").is_none());
        assert!(token_expiry("a.!!!.c").is_none());
        assert!(token_expiry("a.b.c.d").is_none());
    }

    #[test]
    fn test_token_without_exp_claim() {
        let token = TokenTestUtils::create_token_without_expiry();
        assert!(decode_claims(&token).is_some());
        assert!(token_expiry(&token).is_none());
    }
}
