//! Authentication Middleware
//!
//! JWT validation for protected routes and the websocket handshake.
//! Tokens are issued by the identity collaborator; this subsystem only
//! verifies them.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::startup::AppState;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Account email
    pub email: String,
    /// Account role: creator, business, or admin
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: String,
}

/// Decode and validate a bearer token.
///
/// Shared by the HTTP middleware and the websocket handshake so both
/// surfaces accept exactly the same credentials.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".into())
        }
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    let user_id: i64 = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid token claims".into()))?;

    Ok(AuthUser {
        user_id,
        email: token_data.claims.email,
        role: token_data.claims.role,
    })
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let user = verify_token(token, &state.settings.jwt.secret)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long!!";

    fn token_for(sub: &str, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: "creator@example.com".to_string(),
            role: "creator".to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verify_token_accepts_valid_token() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let user = verify_token(&token_for("42", exp), SECRET).unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.role, "creator");
    }

    #[test]
    fn verify_token_rejects_expired_token() {
        let exp = chrono::Utc::now().timestamp() - 3600;
        let err = verify_token(&token_for("42", exp), SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg.contains("expired")));
    }

    #[test]
    fn verify_token_rejects_wrong_secret() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let err = verify_token(&token_for("42", exp), "another-secret-that-is-32-bytes-xx").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn verify_token_rejects_non_numeric_subject() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let err = verify_token(&token_for("not-a-number", exp), SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
