/// Public Route Module
///
/// Screens reachable without a session. An authenticated viewer is sent to the tabs root
/// instead of seeing them again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicRoute {
    // /login
    Login,
    // /register
    Register,
}

impl PublicRoute {
    pub fn path(&self) -> &'static str {
        match self {
            PublicRoute::Login => "/login",
            PublicRoute::Register => "/register",
        }
    }

    pub(super) fn parse(segment: &str) -> Option<Self> {
        match segment {
            "login" => Some(PublicRoute::Login),
            "register" => Some(PublicRoute::Register),
            _ => None,
        }
    }
}
