//! HS256 access tokens

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tubely_core::AppError;
use uuid::Uuid;

use super::models::JwtClaims;

/// Mint an access token for `user_id`, valid for `ttl`.
pub fn issue_access_token(
    user_id: Uuid,
    secret: &str,
    issuer: &str,
    ttl: Duration,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        iss: issuer.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign access token: {}", e)))
}

/// Validate signature, expiry and issuer, returning the claims.
pub fn validate_access_token(
    token: &str,
    secret: &str,
    issuer: &str,
) -> Result<JwtClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.leeway = 0;

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token has expired".to_string())
            }
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                AppError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => AppError::Unauthorized("Invalid access token".to_string()),
        }
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const ISSUER: &str = "tubely-access";

    #[test]
    fn test_issue_and_validate() {
        let user_id = Uuid::new_v4();
        let token = issue_access_token(user_id, SECRET, ISSUER, Duration::minutes(5)).unwrap();

        let claims = validate_access_token(&token, SECRET, ISSUER).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn test_expired_token() {
        let token =
            issue_access_token(Uuid::new_v4(), SECRET, ISSUER, Duration::minutes(-5)).unwrap();

        match validate_access_token(&token, SECRET, ISSUER) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_secret_and_issuer() {
        let token =
            issue_access_token(Uuid::new_v4(), SECRET, ISSUER, Duration::minutes(5)).unwrap();

        assert!(matches!(
            validate_access_token(&token, "another-secret-another-secret-xx", ISSUER),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            validate_access_token(&token, SECRET, "someone-else"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            validate_access_token("not.a.jwt", SECRET, ISSUER),
            Err(AppError::Unauthorized(_))
        ));
    }
}
