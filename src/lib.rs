use std::sync::Arc;

// --- Module Structure ---

// Core client services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod repository;
pub mod session;
pub mod storage;

// Navigation: route table per group (Public, Tabs, Admin) and the guard deciding between them.
pub mod router;
pub mod routes;

// View-state synchronisation for the list screens.
pub mod screens;

// --- Public Re-exports ---

pub use auth::AuthService;
pub use config::{ClientConfig, Env};
pub use error::{ApiError, StoreError};
pub use gateway::Gateway;
pub use repository::{
    ClubRepository, ClubRepositoryState, EventRepository, EventRepositoryState, RemoteRepository,
    UserRepository, UserRepositoryState,
};
pub use router::{RoleGatedRouter, RouteDecision, ViewerState};
pub use routes::Route;
pub use session::{Role, Session, SessionProvider, SessionStatus};
pub use storage::{CredentialState, FileCredentialStore, MemoryCredentialStore};

/// ClientState
///
/// Single container holding every client service, wired to one session provider. Clones
/// share the store, the session channel and the HTTP connection pool.
#[derive(Clone)]
pub struct ClientState {
    /// Configuration: the loaded, immutable environment configuration.
    pub config: ClientConfig,
    /// Session: the in-memory view of the persisted credentials.
    pub session: SessionProvider,
    /// Gateway: every outbound call, authenticated from `session`.
    pub gateway: Gateway,
    pub auth: AuthService,
    /// Remote access to clubs, events and users.
    pub repo: Arc<RemoteRepository>,
}

impl ClientState {
    /// Wires the services over `store`. The session stays `Loading` until
    /// [`SessionProvider::load`] runs.
    pub fn new(config: ClientConfig, store: CredentialState) -> Result<Self, ApiError> {
        let session = SessionProvider::new(store);
        let gateway = Gateway::new(&config, session.clone())?;
        let auth = AuthService::new(gateway.clone());
        let repo = Arc::new(RemoteRepository::new(gateway.clone()));
        Ok(Self {
            config,
            session,
            gateway,
            auth,
            repo,
        })
    }

    /// bootstrap
    ///
    /// Opens the credential file named by the configuration and loads the session from it.
    pub async fn bootstrap(config: ClientConfig) -> Result<Self, ApiError> {
        let store: CredentialState = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
        let state = Self::new(config, store)?;
        let session = state.session.load().await;
        tracing::debug!(authenticated = session.is_authenticated(), "session loaded");
        Ok(state)
    }

    pub fn clubs(&self) -> ClubRepositoryState {
        self.repo.clone()
    }

    pub fn events(&self) -> EventRepositoryState {
        self.repo.clone()
    }

    pub fn users(&self) -> UserRepositoryState {
        self.repo.clone()
    }

    /// A router subscribed to this client's session.
    pub fn router(&self) -> RoleGatedRouter {
        RoleGatedRouter::new(&self.session)
    }
}
