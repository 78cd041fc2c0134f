//! Access token verification for incoming connections.
//!
//! Tokens are issued elsewhere; the gateway only verifies HS256 JWTs signed
//! with a shared secret and records the subject on the participant.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Username (optional)
    #[serde(default)]
    pub username: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
}

/// Authorization failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Access token is missing")]
    MissingToken,

    #[error("Access token is invalid: {0}")]
    InvalidToken(String),
}

/// HS256 token verifier
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn create_token(secret: &str, exp: u64) -> String {
        let claims = Claims {
            sub: "user-1".to_string(),
            username: Some("alice".to_string()),
            exp,
            iat: now(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        // テスト項目: 正しい秘密鍵で署名されたトークンを検証できる
        // given (前提条件):
        let verifier = TokenVerifier::new("secret");
        let token = create_token("secret", now() + 3600);

        // when (操作):
        let claims = verifier.verify(Some(&token)).unwrap();

        // then (期待する結果):
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_verify_missing_token() {
        // テスト項目: トークンがない場合は MissingToken
        let verifier = TokenVerifier::new("secret");

        assert_eq!(verifier.verify(None), Err(AuthError::MissingToken));
        assert_eq!(verifier.verify(Some("")), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_verify_wrong_secret() {
        // テスト項目: 異なる秘密鍵で署名されたトークンは拒否される
        // given (前提条件):
        let verifier = TokenVerifier::new("secret");
        let token = create_token("other-secret", now() + 3600);

        // then (期待する結果):
        assert!(matches!(
            verifier.verify(Some(&token)),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_verify_expired_token() {
        // テスト項目: 期限切れのトークンは拒否される
        // given (前提条件): leeway (60 秒) を超えて期限切れ
        let verifier = TokenVerifier::new("secret");
        let token = create_token("secret", now() - 3600);

        // then (期待する結果):
        assert!(matches!(
            verifier.verify(Some(&token)),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_verify_garbage_token() {
        let verifier = TokenVerifier::new("secret");

        assert!(matches!(
            verifier.verify(Some("invalid.token.here")),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
