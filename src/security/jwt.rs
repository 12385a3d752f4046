use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<i32, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }
}

pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expire_in: i64,
}

impl JwtManager {
    pub fn new(secret: &str, expire_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expire_in,
        }
    }

    /// 签发 HS256 Token
    pub fn generate_token(
        &self,
        user_id: i32,
        username: &str,
        role: &str,
    ) -> Result<String, AppError> {
        self.generate_token_with_ttl(user_id, username, role, self.expire_in)
    }

    fn generate_token_with_ttl(
        &self,
        user_id: i32,
        username: &str,
        role: &str,
        ttl: i64,
    ) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            exp: now + ttl,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("JWT encode failed: {}", e)))
    }

    /// 验证并解析 Token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    #[test]
    fn test_jwt_generate_and_verify() {
        let manager = JwtManager::new(SECRET, 3600);
        let token = manager.generate_token(7, "admin", "admin").unwrap();

        let claims = manager.verify_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_jwt_expired_token() {
        let manager = JwtManager::new(SECRET, 3600);
        let token = manager.generate_token_with_ttl(7, "alice", "user", -60).unwrap();

        let result = manager.verify_token(&token);
        assert!(matches!(result, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_jwt_wrong_secret() {
        let issuer = JwtManager::new(SECRET, 3600);
        let other = JwtManager::new("another-secret-key-at-least-32-characters", 3600);
        let token = issuer.generate_token(1, "alice", "user").unwrap();

        assert!(matches!(other.verify_token(&token), Err(AppError::InvalidToken)));
    }
}
