use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::ErrorMessage, models::usermodel::UserRole};

/// Signed claims: subject is the user id, role travels with it so
/// downstream consumers can pre-filter without a lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn create_token(
    user_id: &str,
    role: UserRole,
    secret: &[u8],
    expires_in_minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    if user_id.is_empty() {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
    }

    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        role: role.to_str().to_owned(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(expires_in_minutes)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<String, ErrorMessage> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    );

    match decoded {
        Ok(token) => Ok(token.claims.sub),
        Err(_) => Err(ErrorMessage::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip_returns_subject() {
        let secret = b"test-secret";
        let user_id = uuid::Uuid::new_v4().to_string();

        let token = create_token(&user_id, UserRole::Farmer, secret, 60).unwrap();
        let decoded = decode_token(token, secret).unwrap();

        assert_eq!(decoded, user_id);
    }

    #[test]
    fn token_with_wrong_secret_is_invalid() {
        let token = create_token("some-user", UserRole::Customer, b"secret-a", 60).unwrap();
        assert_eq!(
            decode_token(token, b"secret-b").unwrap_err(),
            ErrorMessage::InvalidToken
        );
    }

    #[test]
    fn empty_subject_is_rejected() {
        assert!(create_token("", UserRole::Customer, b"secret", 60).is_err());
    }
}
