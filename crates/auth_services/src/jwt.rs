use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::types::{AuthError, Claims};

/// Signs and verifies the bearer tokens callers present to the API
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Creates a service keyed from the `JWT_SECRET` environment variable
    pub fn new() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Issues a short-lived access token for the given user
    pub fn generate_access_token(&self, user_id: &Uuid, email: &str) -> Result<String, AuthError> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::hours(1))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: "user".to_string(),
            exp: expiration,
            iat: Utc::now().timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies a token's signature and expiry, returning its claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Verifies a token and resolves the caller's id and email from its claims
    pub fn extract_caller(&self, token: &str) -> Result<(Uuid, String), AuthError> {
        let claims = self.verify_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            AuthError::Jwt(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ))
        })?;

        Ok((user_id, claims.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_and_carry_the_caller() {
        let service = JwtService::new();
        let user_id = Uuid::new_v4();

        let token = service
            .generate_access_token(&user_id, "camper@example.com")
            .unwrap();
        let (parsed_id, email) = service.extract_caller(&token).unwrap();

        assert_eq!(parsed_id, user_id);
        assert_eq!(email, "camper@example.com");
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let service = JwtService::new();

        let token = service
            .generate_access_token(&Uuid::new_v4(), "camper@example.com")
            .unwrap();
        let mut tampered = token.clone();
        tampered.push('x');

        assert!(service.verify_token(&tampered).is_err());
    }

    #[test]
    fn tokens_with_non_uuid_subjects_are_rejected() {
        let service = JwtService::new();

        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            email: "camper@example.com".to_string(),
            role: "user".to_string(),
            exp: (Utc::now().timestamp() + 3600) as usize,
            iat: Utc::now().timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("your-secret-key-change-this-in-production".as_ref()),
        )
        .unwrap();

        assert!(service.extract_caller(&token).is_err());
    }
}
