use super::{optional_id, required_id};

/// Admin Route Module
///
/// Screens restricted exclusively to viewers with the admin role: moderation of clubs,
/// their posts, events and user accounts.
///
/// Access Control:
/// The Role-Gated Router never renders these for a non-admin viewer, not even while a
/// redirect is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminRoute {
    // /(admin)/dashboard: root of the admin tree.
    Dashboard,
    // /(admin)/clubs: club list with search, edit and delete.
    Clubs,
    // /(admin)/club-form[/{id}]: create a club, or edit the given one.
    ClubForm(Option<i64>),
    // /(admin)/club-content/{id}: posts of one club.
    ClubContent(i64),
    // /(admin)/events
    Events,
    // /(admin)/users
    Users,
    // /(admin)/user-form[/{id}]
    UserForm(Option<i64>),
}

impl AdminRoute {
    pub fn path(&self) -> String {
        match self {
            AdminRoute::Dashboard => "/(admin)/dashboard".to_string(),
            AdminRoute::Clubs => "/(admin)/clubs".to_string(),
            AdminRoute::ClubForm(None) => "/(admin)/club-form".to_string(),
            AdminRoute::ClubForm(Some(id)) => format!("/(admin)/club-form/{id}"),
            AdminRoute::ClubContent(id) => format!("/(admin)/club-content/{id}"),
            AdminRoute::Events => "/(admin)/events".to_string(),
            AdminRoute::Users => "/(admin)/users".to_string(),
            AdminRoute::UserForm(None) => "/(admin)/user-form".to_string(),
            AdminRoute::UserForm(Some(id)) => format!("/(admin)/user-form/{id}"),
        }
    }

    pub(super) fn parse(rest: &[&str]) -> Option<Self> {
        let (screen, tail) = match rest.split_first() {
            Some((screen, tail)) => (*screen, tail),
            None => return Some(AdminRoute::Dashboard),
        };
        match (screen, tail) {
            ("dashboard", []) => Some(AdminRoute::Dashboard),
            ("clubs", []) => Some(AdminRoute::Clubs),
            ("club-form", tail) => optional_id(tail).map(AdminRoute::ClubForm),
            ("club-content", tail) => required_id(tail).map(AdminRoute::ClubContent),
            ("events", []) => Some(AdminRoute::Events),
            ("users", []) => Some(AdminRoute::Users),
            ("user-form", tail) => optional_id(tail).map(AdminRoute::UserForm),
            _ => None,
        }
    }
}
