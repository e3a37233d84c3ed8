use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::auth::{AuthError, Claims, UserSession};

/// Verifies HS256 tokens minted by the identity provider
#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given secret
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Extract user session from token
    pub fn extract_user_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let claims = self.validate_token(token)?;
        UserSession::from_claims(&claims).map_err(|_| AuthError::InvalidToken)
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidAuthHeaderFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    fn token(secret: &str, sub: String, role: UserRole, expires_in: Duration) -> String {
        let claims = Claims {
            sub,
            role,
            exp: (Utc::now() + expires_in).timestamp() as usize,
            iat: Some(Utc::now().timestamp() as usize),
            email: Some("admin@example.com".to_string()),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_valid_token_yields_session() {
        let jwt_service = JwtService::new("test_secret");
        let user_id = Uuid::new_v4();

        let session = jwt_service
            .extract_user_session(&token("test_secret", user_id.to_string(), UserRole::Admin, Duration::minutes(15)))
            .unwrap();

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.role, UserRole::Admin);
        assert!(session.is_admin());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let jwt_service = JwtService::new("test_secret");
        let forged = token("other_secret", Uuid::new_v4().to_string(), UserRole::Admin, Duration::minutes(15));

        assert!(matches!(jwt_service.validate_token(&forged), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt_service = JwtService::new("test_secret");
        let expired = token("test_secret", Uuid::new_v4().to_string(), UserRole::User, Duration::hours(-2));

        assert!(matches!(jwt_service.validate_token(&expired), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(extract_bearer_token("Bearer test_token").unwrap(), "test_token");
        assert!(extract_bearer_token("Invalid header").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
    }
}
