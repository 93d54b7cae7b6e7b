//! Role-Gated Router.
//!
//! Decides, at every navigation boundary, whether the current viewer may enter a route
//! group. The viewer state is derived from the session on every evaluation, so a logout
//! published by the session provider takes effect at the next decision.

use tokio::sync::watch;

use crate::routes::{Route, RouteGroup, TabRoute};
use crate::session::{Role, SessionProvider, SessionStatus};

/// ViewerState
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    /// The credential store has not been read yet.
    Unknown,
    Anonymous,
    User,
    Admin,
}

impl ViewerState {
    pub fn from_status(status: &SessionStatus) -> Self {
        let Some(session) = status.session() else {
            return ViewerState::Unknown;
        };
        if !session.is_authenticated() {
            return ViewerState::Anonymous;
        }
        match session.role {
            Some(Role::Admin) => ViewerState::Admin,
            Some(Role::User) => ViewerState::User,
            None => ViewerState::Anonymous,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            ViewerState::Admin => Some(Role::Admin),
            ViewerState::User => Some(Role::User),
            ViewerState::Unknown | ViewerState::Anonymous => None,
        }
    }

    /// Group-level permission; tab visibility is checked separately in [`decide`].
    pub fn permits(&self, group: RouteGroup) -> bool {
        match (self, group) {
            (ViewerState::Unknown, _) => false,
            (ViewerState::Anonymous, RouteGroup::Anonymous) => true,
            (ViewerState::Anonymous, _) => false,
            (_, RouteGroup::Anonymous) => false,
            (ViewerState::User, RouteGroup::Tabs) => true,
            (ViewerState::User, RouteGroup::Admin) => false,
            (ViewerState::Admin, _) => true,
        }
    }

    /// Where a viewer lands when the requested route is not permitted.
    pub fn home(&self) -> Option<Route> {
        match self {
            ViewerState::Unknown => None,
            ViewerState::Anonymous => Some(Route::login()),
            ViewerState::User | ViewerState::Admin => Some(Route::tabs_root()),
        }
    }
}

/// RouteDecision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session not loaded yet: render nothing.
    Pending,
    Render(Route),
    Redirect(Route),
}

impl RouteDecision {
    /// The route that ends up on screen, if any.
    pub fn route(&self) -> Option<Route> {
        match self {
            RouteDecision::Pending => None,
            RouteDecision::Render(route) | RouteDecision::Redirect(route) => Some(*route),
        }
    }
}

/// decide
///
/// Pure decision for one navigation attempt.
pub fn decide(viewer: ViewerState, target: Route) -> RouteDecision {
    if viewer == ViewerState::Unknown {
        return RouteDecision::Pending;
    }

    if !viewer.permits(target.group()) {
        return match viewer.home() {
            Some(home) => RouteDecision::Redirect(home),
            None => RouteDecision::Pending,
        };
    }

    if let (Route::Tabs(tab), Some(role)) = (target, viewer.role()) {
        if !tab.is_visible_to(role) {
            return RouteDecision::Redirect(Route::tabs_root());
        }
    }

    RouteDecision::Render(target)
}

/// RoleGatedRouter
///
/// Navigation state for one client. Holds a subscription to the session and the route
/// currently on screen.
pub struct RoleGatedRouter {
    session: watch::Receiver<SessionStatus>,
    current: Option<Route>,
    // Requested while the session was still loading.
    pending: Option<Route>,
}

impl RoleGatedRouter {
    pub fn new(session: &SessionProvider) -> Self {
        Self {
            session: session.subscribe(),
            current: None,
            pending: None,
        }
    }

    pub fn viewer(&self) -> ViewerState {
        ViewerState::from_status(&self.session.borrow())
    }

    pub fn current(&self) -> Option<Route> {
        self.current
    }

    /// Decision for app start: login for anonymous viewers, the tabs root otherwise.
    pub fn initial_route(&mut self) -> RouteDecision {
        match self.viewer().home() {
            Some(home) => self.navigate(home),
            None => RouteDecision::Pending,
        }
    }

    /// navigate
    ///
    /// Evaluates `target` against the current viewer and records what ends up on screen.
    pub fn navigate(&mut self, target: Route) -> RouteDecision {
        let viewer = self.viewer();
        let decision = decide(viewer, target);
        match decision {
            RouteDecision::Pending => {
                self.pending = Some(target);
                self.current = None;
            }
            RouteDecision::Render(route) => {
                self.pending = None;
                self.current = Some(route);
            }
            RouteDecision::Redirect(route) => {
                tracing::debug!(from = %target, to = %route, ?viewer, "navigation redirected");
                self.pending = None;
                self.current = Some(route);
            }
        }
        decision
    }

    /// reevaluate
    ///
    /// Re-checks the route on screen (or the one requested while loading) against the
    /// current session. A logout turns any guarded route into a redirect to login.
    pub fn reevaluate(&mut self) -> RouteDecision {
        match self.pending.or(self.current) {
            Some(route) => self.navigate(route),
            None => self.initial_route(),
        }
    }

    /// changed
    ///
    /// Waits for the next session change and re-evaluates. Returns `None` once the
    /// session provider is gone.
    pub async fn changed(&mut self) -> Option<RouteDecision> {
        self.session.changed().await.ok()?;
        Some(self.reevaluate())
    }

    /// Tabs shown in the tab bar for the current viewer; empty when not authenticated.
    pub fn visible_tabs(&self) -> Vec<TabRoute> {
        self.viewer()
            .role()
            .map(TabRoute::visible_tabs)
            .unwrap_or_default()
    }
}
