//! Session provider: the single in-memory owner of the current viewer's credentials.
//!
//! Screens and the Gateway read the session through [`SessionProvider::current`] or
//! follow it through [`SessionProvider::subscribe`]; only the login and logout flows
//! write it, and every write goes to the credential store first.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{ApiError, StoreError};
use crate::models::TokenPair;
use crate::storage::{CredentialKey, CredentialState};

/// Role
///
/// The role the server reported for the logged-in account. Persisted as `"admin"` /
/// `"user"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Maps the `is_admin` flag from `GET /me/`.
    pub fn from_is_admin(is_admin: bool) -> Self {
        if is_admin { Role::Admin } else { Role::User }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Session
///
/// Read-only snapshot of the credentials held by the running client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub role: Option<Role>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session counts as authenticated only when both the token and the role are
    /// present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.role.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.role == Some(Role::Admin)
    }
}

/// SessionStatus
///
/// `Loading` until the first credential store read completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Ready(Session),
}

impl SessionStatus {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionStatus::Loading => None,
            SessionStatus::Ready(session) => Some(session),
        }
    }
}

/// SessionProvider
///
/// Cheap to clone; all clones share one store and one watch channel.
#[derive(Clone)]
pub struct SessionProvider {
    store: CredentialState,
    tx: Arc<watch::Sender<SessionStatus>>,
}

impl SessionProvider {
    pub fn new(store: CredentialState) -> Self {
        let (tx, _rx) = watch::channel(SessionStatus::Loading);
        Self {
            store,
            tx: Arc::new(tx),
        }
    }

    /// load
    ///
    /// Reads the persisted credentials and publishes the result. A store failure, a
    /// half-written session (token without role or the reverse) or an unknown role all
    /// resolve to the anonymous session.
    pub async fn load(&self) -> Session {
        let session = match self.read_persisted().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "credential store unreadable, treating viewer as logged out");
                Session::anonymous()
            }
        };
        self.publish(session.clone());
        session
    }

    async fn read_persisted(&self) -> Result<Session, StoreError> {
        let access_token = self.store.get(CredentialKey::AccessToken).await?;
        let refresh_token = self.store.get(CredentialKey::RefreshToken).await?;
        let raw_role = self.store.get(CredentialKey::Role).await?;

        let role = match raw_role.as_deref().map(Role::parse) {
            Some(Some(role)) => Some(role),
            Some(None) => {
                tracing::warn!(role = ?raw_role, "unknown persisted role");
                return Ok(Session::anonymous());
            }
            None => None,
        };

        match (access_token, role) {
            (Some(access_token), Some(role)) => Ok(Session {
                access_token: Some(access_token),
                refresh_token,
                role: Some(role),
            }),
            (None, None) => Ok(Session::anonymous()),
            _ => {
                tracing::warn!("persisted session is incomplete, ignoring it");
                Ok(Session::anonymous())
            }
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.tx.borrow().clone()
    }

    /// The current session, or `None` while still loading.
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().session().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.tx.subscribe()
    }

    /// establish
    ///
    /// Persists token, refresh token and role in one store write, then publishes them.
    /// Only the login flow calls this.
    pub(crate) async fn establish(
        &self,
        tokens: TokenPair,
        role: Role,
    ) -> Result<Session, ApiError> {
        let mut entries = vec![
            (CredentialKey::AccessToken, tokens.access.clone()),
            (CredentialKey::Role, role.as_str().to_string()),
        ];
        if let Some(refresh) = &tokens.refresh {
            entries.push((CredentialKey::RefreshToken, refresh.clone()));
        }

        // A refresh token from an older login must not outlive this one.
        let stale: &[CredentialKey] = if tokens.refresh.is_none() {
            &[CredentialKey::RefreshToken]
        } else {
            &[]
        };
        self.store.replace(&entries, stale).await?;

        let session = Session {
            access_token: Some(tokens.access),
            refresh_token: tokens.refresh,
            role: Some(role),
        };
        self.publish(session.clone());
        Ok(session)
    }

    /// clear
    ///
    /// Publishes the anonymous session and removes every credential from the store. The
    /// in-memory session is anonymous even when the store write fails; the error is
    /// still returned so the caller can report it.
    pub async fn clear(&self) -> Result<(), ApiError> {
        self.publish(Session::anonymous());
        self.store.clear(&CredentialKey::ALL).await?;
        Ok(())
    }

    fn publish(&self, session: Session) {
        self.tx.send_replace(SessionStatus::Ready(session));
    }
}
