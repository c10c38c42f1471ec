use anyhow::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by access tokens.
///
/// Tokens are minted by the identity service sharing our secret and issuer;
/// `sub` is the user's UUID.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

/// Verifies HS256 access tokens
#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Verify and decode a token
    ///
    /// Returns claims if the signature, issuer and expiry all check out.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn mint(secret: &str, issuer: &str, sub: Uuid, ttl_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub,
            exp: now + ttl_secs,
            iat: now,
            iss: issuer.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verifies_token_from_shared_secret() {
        let service = JwtService::new("test_secret_key", "helpdesk".to_string());
        let user_id = Uuid::now_v7();
        let token = mint("test_secret_key", "helpdesk", user_id, 3600);

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "helpdesk");
    }

    #[test]
    fn rejects_garbage() {
        let service = JwtService::new("test_secret_key", "helpdesk".to_string());
        assert!(service.verify_token("invalid_token").is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let service = JwtService::new("secret2", "helpdesk".to_string());
        let token = mint("secret1", "helpdesk", Uuid::now_v7(), 3600);
        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_foreign_issuer() {
        let service = JwtService::new("secret", "helpdesk".to_string());
        let token = mint("secret", "someone-else", Uuid::now_v7(), 3600);
        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let service = JwtService::new("secret", "helpdesk".to_string());
        // Past the default 60s leeway.
        let token = mint("secret", "helpdesk", Uuid::now_v7(), -600);
        assert!(service.verify_token(&token).is_err());
    }
}
