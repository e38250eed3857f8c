use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::user::{self, UserRole};
use crate::errors::{ServiceError, ServiceResult};

const TOKEN_ISSUER: &str = "autoshop-api";

/// Claim structure for access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub name: String,
    pub role: UserRole,
    /// Token id
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Authenticated caller extracted from a verified bearer token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_at_least(&self, required: UserRole) -> bool {
        self.role.at_least(required)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: AuthUser,
}

/// Issues and validates bearer tokens. Credential verification itself
/// (password hashing) lives in the users service; this type only deals
/// in tokens.
#[derive(Clone)]
pub struct AuthService {
    secret: String,
    expiration_secs: u64,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration_secs: config.jwt_expiration_secs,
        }
    }

    /// Mint an access token for a verified account.
    pub fn issue_token(&self, account: &user::Model) -> ServiceResult<TokenResponse> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id.to_string(),
            name: account.name.clone(),
            role: account.role,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.expiration_secs as i64,
            iss: TOKEN_ISSUER.to_string(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("token creation failed: {e}")))?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.expiration_secs,
            user: AuthUser {
                id: account.id,
                name: account.name.clone(),
                role: account.role,
            },
        })
    }

    /// Decode and verify a bearer token, yielding the caller identity.
    pub fn validate_token(&self, token: &str) -> ServiceResult<AuthUser> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ServiceError::Unauthorized("token expired".to_string())
            }
            _ => ServiceError::Unauthorized("invalid token".to_string()),
        })?
        .claims;

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("invalid token subject".to_string()))?;

        Ok(AuthUser {
            id,
            name: claims.name,
            role: claims.role,
        })
    }
}

/// Authentication middleware: verify the bearer token and stash the
/// caller identity in request extensions for extractors and role checks.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return ServiceError::InternalError("auth service not configured".to_string())
                .into_response();
        }
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        return ServiceError::Unauthorized("missing bearer token".to_string()).into_response();
    };

    match auth_service.validate_token(token) {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Role middleware: require the authenticated caller to hold at least
/// the given role.
pub async fn min_role_middleware(
    State(required): State<UserRole>,
    request: Request,
    next: Next,
) -> Response {
    let Some(auth_user) = request.extensions().get::<AuthUser>() else {
        return ServiceError::Unauthorized("missing bearer token".to_string()).into_response();
    };

    if !auth_user.is_at_least(required) {
        return ServiceError::Forbidden(format!("requires the {required} role or higher"))
            .into_response();
    }

    next.run(request).await
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".to_string()))
    }
}

/// Extension methods for gating routers behind authentication.
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_min_role(self, role: UserRole) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_min_role(self, role: UserRole) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            role,
            min_role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn test_service(expiration_secs: u64) -> AuthService {
        let mut config = AppConfig::new(
            "sqlite::memory:",
            "a_sufficiently_long_test_secret_value!!",
        );
        config.jwt_expiration_secs = expiration_secs;
        AuthService::new(&config)
    }

    fn test_account(role: UserRole) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            name: "Test Mechanic".to_string(),
            email: "mechanic@example.com".to_string(),
            password_hash: String::new(),
            role,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_round_trip() {
        let service = test_service(3600);
        let account = test_account(UserRole::Admin);

        let issued = service.issue_token(&account).unwrap();
        let verified = service.validate_token(&issued.access_token).unwrap();

        assert_eq!(verified.id, account.id);
        assert_eq!(verified.role, UserRole::Admin);
        assert_eq!(issued.token_type, "Bearer");
    }

    #[test]
    fn tampered_token_rejected() {
        let service = test_service(3600);
        let account = test_account(UserRole::Staff);
        let issued = service.issue_token(&account).unwrap();

        let mut tampered = issued.access_token.clone();
        tampered.push('x');
        assert!(service.validate_token(&tampered).is_err());
        assert!(service.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let issuer = test_service(3600);
        let other = AuthService {
            secret: "a_completely_different_secret_value_0000".to_string(),
            expiration_secs: 3600,
        };
        let issued = issuer.issue_token(&test_account(UserRole::Staff)).unwrap();
        assert!(other.validate_token(&issued.access_token).is_err());
    }
}
