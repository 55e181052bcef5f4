//! Video-meeting access tokens.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token lifetime: 120 minutes.
pub const TOKEN_TTL_SECS: i64 = 120 * 60;
const PERMISSIONS: [&str; 2] = ["allow_join", "allow_mod"];

#[derive(Error, Debug)]
pub enum MeetError {
    #[error("Meeting signing secret is not configured")]
    MissingSecret,

    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingClaims {
    pub apikey: String,
    pub permissions: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

pub struct MeetingTokenSigner {
    api_key: String,
    secret: String,
}

impl MeetingTokenSigner {
    pub fn new(api_key: &str, secret: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            secret: secret.to_string(),
        }
    }

    /// HS256 token granting join + moderate.
    pub fn sign(&self) -> Result<String, MeetError> {
        if self.secret.is_empty() {
            return Err(MeetError::MissingSecret);
        }
        let iat = Utc::now().timestamp();
        let claims = MeetingClaims {
            apikey: self.api_key.clone(),
            permissions: PERMISSIONS.iter().map(|p| p.to_string()).collect(),
            iat,
            exp: iat + TOKEN_TTL_SECS,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    #[test]
    fn token_decodes_with_fixed_claims() {
        let signer = MeetingTokenSigner::new("vsdk-key", "vsdk-secret");
        let token = signer.sign().unwrap();

        let data = decode::<MeetingClaims>(
            &token,
            &DecodingKey::from_secret(b"vsdk-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.header.alg, Algorithm::HS256);
        assert_eq!(data.claims.apikey, "vsdk-key");
        assert_eq!(data.claims.permissions, vec!["allow_join", "allow_mod"]);
        assert_eq!(data.claims.exp - data.claims.iat, 7200);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let token = MeetingTokenSigner::new("k", "right").sign().unwrap();
        let result = decode::<MeetingClaims>(
            &token,
            &DecodingKey::from_secret(b"wrong"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let err = MeetingTokenSigner::new("k", "").sign().unwrap_err();
        assert!(matches!(err, MeetError::MissingSecret));
    }
}
