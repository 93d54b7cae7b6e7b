/// Route Table Index
///
/// Organizes the client's screens into access-segregated groups. The three modules map
/// directly to the route groups the Role-Gated Router guards.

/// Screens reachable without a session (login, registration).
pub mod public;

/// Screens shared by every authenticated viewer (the tab bar and club details).
pub mod authenticated;

/// Screens restricted to viewers with the admin role.
pub mod admin;

pub use admin::AdminRoute;
pub use authenticated::TabRoute;
pub use public::PublicRoute;

/// RouteGroup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteGroup {
    Anonymous,
    Tabs,
    Admin,
}

/// Route
///
/// A navigable screen. `path()` and `parse()` are inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Public(PublicRoute),
    Tabs(TabRoute),
    Admin(AdminRoute),
}

impl Route {
    pub fn login() -> Self {
        Route::Public(PublicRoute::Login)
    }

    /// Root of the shared authenticated tree.
    pub fn tabs_root() -> Self {
        Route::Tabs(TabRoute::Home)
    }

    /// Root of the admin tree.
    pub fn admin_root() -> Self {
        Route::Admin(AdminRoute::Dashboard)
    }

    pub fn group(&self) -> RouteGroup {
        match self {
            Route::Public(_) => RouteGroup::Anonymous,
            Route::Tabs(_) => RouteGroup::Tabs,
            Route::Admin(_) => RouteGroup::Admin,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Public(route) => route.path().to_string(),
            Route::Tabs(route) => route.path(),
            Route::Admin(route) => route.path(),
        }
    }

    /// Parses a path such as `/(admin)/club-form/3`. Trailing slashes and query strings
    /// are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.split_first() {
            Some((&"(admin)", rest)) => AdminRoute::parse(rest).map(Route::Admin),
            Some((&"(tabs)", rest)) => TabRoute::parse(rest).map(Route::Tabs),
            Some((&"club", [id])) => id.parse().ok().map(|id| Route::Tabs(TabRoute::ClubDetail(id))),
            Some((first, [])) => PublicRoute::parse(first).map(Route::Public),
            // The bare root resolves like the app's entry point.
            None => Some(Route::tabs_root()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Parses an optional trailing id segment (`club-form` vs `club-form/3`).
fn optional_id(rest: &[&str]) -> Option<Option<i64>> {
    match rest {
        [] => Some(None),
        [id] => id.parse().ok().map(Some),
        _ => None,
    }
}

/// Parses a mandatory trailing id segment.
fn required_id(rest: &[&str]) -> Option<i64> {
    match rest {
        [id] => id.parse().ok(),
        _ => None,
    }
}
