//! Identity Context
//!
//! Resolves a bearer credential into `(account_id, role)`. Tokens are HS256
//! JWTs signed with the configured secret. Handlers take [`Identity`] to
//! require a caller, or [`MaybeIdentity`] where authentication is optional.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use crate::config::AuthSettings;
use crate::error::ServiceError;
use crate::models::AccountRole;

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub user_type: AccountRole,
    pub exp: i64,
}

/// Signing and verification keys, built once from settings
#[derive(Clone)]
pub struct IdentityContext {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl IdentityContext {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(&settings.jwt_secret, settings.token_ttl_hours)
    }

    /// Issue a token for the account
    pub fn issue(&self, account_id: &str, role: AccountRole) -> Result<String, ServiceError> {
        let claims = Claims {
            user_id: account_id.to_string(),
            user_type: role,
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            ServiceError::Storage("could not issue token".to_string())
        })
    }

    /// Verify a token and resolve it to an identity
    pub fn verify(&self, token: &str) -> Result<Identity, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            ServiceError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(Identity {
            account_id: data.claims.user_id,
            role: data.claims.user_type,
        })
    }
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: String,
    pub role: AccountRole,
}

/// Caller that may or may not be authenticated
///
/// A missing header, or a credential that fails to resolve, yields `None`.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl MaybeIdentity {
    pub fn account_id(&self) -> Option<&str> {
        self.0.as_ref().map(|identity| identity.account_id.as_str())
    }
}

/// Token from `Authorization: Bearer <token>`; `Ok(None)` when the header is absent
fn bearer_token(req: &HttpRequest) -> Result<Option<&str>, ServiceError> {
    let Some(header) = req.headers().get(actix_web::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| ServiceError::Unauthorized("Invalid authorization header".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| ServiceError::Unauthorized("Expected 'Bearer <token>'".to_string()))?;

    if token.is_empty() {
        return Err(ServiceError::Unauthorized("Empty bearer token".to_string()));
    }

    Ok(Some(token))
}

fn resolve(req: &HttpRequest) -> Result<Option<Identity>, ServiceError> {
    let Some(token) = bearer_token(req)? else {
        return Ok(None);
    };

    let context = req.app_data::<web::Data<IdentityContext>>().ok_or_else(|| {
        tracing::error!("IdentityContext missing from app data");
        ServiceError::Unauthorized("Authentication unavailable".to_string())
    })?;

    context.verify(token).map(Some)
}

impl FromRequest for Identity {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).and_then(|identity| {
            identity.ok_or_else(|| ServiceError::Unauthorized("Not authenticated".to_string()))
        }))
    }
}

impl FromRequest for MaybeIdentity {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = resolve(req).unwrap_or_else(|e| {
            tracing::debug!("Treating caller as anonymous: {}", e);
            None
        });
        ready(Ok(MaybeIdentity(identity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_issue_and_verify() {
        let context = IdentityContext::new("test-secret", 168);
        let token = context.issue("account-1", AccountRole::Vendor).unwrap();

        let identity = context.verify(&token).unwrap();
        assert_eq!(identity.account_id, "account-1");
        assert_eq!(identity.role, AccountRole::Vendor);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = IdentityContext::new("one-secret", 168);
        let verifier = IdentityContext::new("another-secret", 168);
        let token = issuer.issue("account-1", AccountRole::User).unwrap();

        assert!(matches!(verifier.verify(&token), Err(ServiceError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Well past the default 60s leeway
        let context = IdentityContext::new("test-secret", -1);
        let token = context.issue("account-1", AccountRole::User).unwrap();

        assert!(context.verify(&token).is_err());
    }

    #[test]
    fn test_bearer_parsing() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(bearer_token(&req), Ok(None)));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), Some("abc.def"));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic xyz"))
            .to_http_request();
        assert!(bearer_token(&req).is_err());
    }

    #[actix_web::test]
    async fn test_extractors() {
        let context = IdentityContext::new("test-secret", 168);
        let token = context.issue("account-1", AccountRole::Guest).unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(context.clone()))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        let identity = Identity::extract(&req).await.unwrap();
        assert_eq!(identity.role, AccountRole::Guest);

        let anonymous = TestRequest::default()
            .app_data(web::Data::new(context))
            .to_http_request();
        assert!(Identity::extract(&anonymous).await.is_err());
        assert!(MaybeIdentity::extract(&anonymous).await.unwrap().0.is_none());
    }

    #[actix_web::test]
    async fn test_optional_identity_ignores_bad_credentials() {
        let context = IdentityContext::new("test-secret", 168);
        let expired = IdentityContext::new("test-secret", -1)
            .issue("account-1", AccountRole::User)
            .unwrap();

        for header in [format!("Bearer {}", expired), "Bearer not-a-token".to_string(), "Basic xyz".to_string()] {
            let req = TestRequest::default()
                .app_data(web::Data::new(context.clone()))
                .insert_header(("Authorization", header))
                .to_http_request();

            assert!(Identity::extract(&req).await.is_err());
            assert!(MaybeIdentity::extract(&req).await.unwrap().0.is_none());
        }
    }
}
