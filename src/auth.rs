use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    gateway::{Gateway, RequestBody},
    models::{LoginRequest, LogoutRequest, RegisterRequest, TokenPair, UserProfile},
    session::{Role, Session, SessionProvider},
};

/// AccessClaims
///
/// The subset of the access token payload the client reads. The token is issued and
/// signed by the server; the client only looks at the expiry so it can skip requests
/// that would be rejected anyway.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// TokenFreshness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFreshness {
    /// A JWT whose `exp` is still in the future.
    Fresh,
    /// A JWT whose `exp` has passed.
    Expired,
    /// Not a JWT the client can read; the server decides.
    Opaque,
}

/// inspect_access_token
///
/// Decodes the JWT payload without verifying the signature (the signing key never leaves
/// the server). Only `ExpiredSignature` is conclusive; any other decoding failure leaves
/// the token to the server.
pub fn inspect_access_token(token: &str) -> TokenFreshness {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = true;
    validation.validate_aud = false;
    // The server applies no grace period, so neither does the client.
    validation.leeway = 0;

    match decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(_) => TokenFreshness::Fresh,
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => TokenFreshness::Expired,
            _ => TokenFreshness::Opaque,
        },
    }
}

/// AuthService
///
/// Login, registration and logout. The only writer of the session: `login` is the one
/// path that can turn a viewer into `User` or `Admin`.
#[derive(Clone)]
pub struct AuthService {
    gateway: Gateway,
    session: SessionProvider,
}

impl AuthService {
    pub fn new(gateway: Gateway) -> Self {
        let session = gateway.session().clone();
        Self { gateway, session }
    }

    /// login
    ///
    /// 1. `POST /login/` exchanges the credentials for a token pair.
    /// 2. `GET /me/` with the new access token resolves the role from `is_admin`.
    /// 3. Token, refresh token and role are persisted in one store write and published.
    ///
    /// Any failure leaves the previous session untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let credentials = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let tokens: TokenPair = self
            .gateway
            .send_anonymous(Method::POST, "/login/", RequestBody::json(&credentials)?)
            .await?;

        let me: UserProfile = self
            .gateway
            .send_with_token(Method::GET, "/me/", &tokens.access, RequestBody::Empty)
            .await?;

        let role = Role::from_is_admin(me.is_admin);
        let session = self.session.establish(tokens, role).await?;

        tracing::info!(username = %me.username, role = role.as_str(), "login succeeded");
        Ok(session)
    }

    /// register
    ///
    /// Creates an account. The caller still has to log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, ApiError> {
        request.validate()?;
        let created: UserProfile = self
            .gateway
            .send_anonymous(Method::POST, "/register/", RequestBody::json(request)?)
            .await?;
        tracing::info!(username = %created.username, "account registered");
        Ok(created)
    }

    /// logout
    ///
    /// Revokes the refresh token on the server when there is one (best effort), then
    /// clears the local session. The viewer is anonymous afterwards even if both steps
    /// fail.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let refresh = self
            .session
            .current()
            .and_then(|session| session.refresh_token);

        if let Some(refresh) = refresh {
            if let Err(e) = self.revoke(refresh).await {
                tracing::warn!(error = %e, "refresh token revocation failed");
            }
        }

        self.session.clear().await?;
        tracing::info!("logged out");
        Ok(())
    }

    async fn revoke(&self, refresh: String) -> Result<(), ApiError> {
        let body = RequestBody::json(&LogoutRequest { refresh })?;
        self.gateway
            .send_anonymous::<serde_json::Value>(Method::POST, "/logout/", body)
            .await?;
        Ok(())
    }
}
