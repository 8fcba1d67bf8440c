//! Client-side access-token claim inspection.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use queuedeck_core::error::AppError;

/// The subset of access-token claims the client reads.
///
/// The client holds no verification key and never trusts these claims for
/// authorization; the server validates every request on its own. The only
/// thing decided locally is whether a refresh is needed before the token
/// is put back into service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Subject — the user ID, when present.
    #[serde(default)]
    pub sub: Option<String>,
}

impl AccessClaims {
    /// Checks whether this token has expired at the given epoch second.
    pub fn is_expired_at(&self, now_epoch: i64) -> bool {
        now_epoch >= self.exp
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// Decodes the claims of an access token without verifying its signature.
///
/// Expiry checking is disabled at decode time as well — an expired token
/// must still decode so the caller can distinguish "expired, try refresh"
/// from "garbage, force logout".
pub fn decode_unverified(token: &str) -> Result<AccessClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    // Accept whatever algorithm the identity service signs with.
    validation.algorithms = vec![
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::ES256,
        Algorithm::ES384,
    ];

    let token_data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| {
            AppError::invalid_credential(format!("Failed to decode access token: {e}"))
        })?;

    Ok(token_data.claims)
}
