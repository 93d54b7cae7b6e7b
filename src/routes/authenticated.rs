use crate::session::Role;

/// Authenticated Route Module
///
/// Screens shared by every authenticated viewer. Two tabs depend on the role: admins do
/// not get a profile tab, users do not get the dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabRoute {
    // /(tabs): home feed.
    Home,
    // /(tabs)/events: calendar of events with follow toggles.
    Events,
    // /(tabs)/club: club directory with follow toggles.
    Club,
    // /(tabs)/profile: followed events and liked posts. Hidden for admins.
    Profile,
    // /(tabs)/dashboard: entry into the admin tree. Hidden for users.
    Dashboard,
    // /club/{id}: club detail with posts.
    ClubDetail(i64),
}

impl TabRoute {
    /// The tab bar, in display order.
    pub const TAB_BAR: [TabRoute; 5] = [
        TabRoute::Home,
        TabRoute::Events,
        TabRoute::Club,
        TabRoute::Profile,
        TabRoute::Dashboard,
    ];

    pub fn path(&self) -> String {
        match self {
            TabRoute::Home => "/(tabs)".to_string(),
            TabRoute::Events => "/(tabs)/events".to_string(),
            TabRoute::Club => "/(tabs)/club".to_string(),
            TabRoute::Profile => "/(tabs)/profile".to_string(),
            TabRoute::Dashboard => "/(tabs)/dashboard".to_string(),
            TabRoute::ClubDetail(id) => format!("/club/{id}"),
        }
    }

    pub fn is_visible_to(&self, role: Role) -> bool {
        match self {
            TabRoute::Profile => role != Role::Admin,
            TabRoute::Dashboard => role == Role::Admin,
            _ => true,
        }
    }

    /// Tabs shown in the tab bar for `role`.
    pub fn visible_tabs(role: Role) -> Vec<TabRoute> {
        Self::TAB_BAR
            .into_iter()
            .filter(|tab| tab.is_visible_to(role))
            .collect()
    }

    pub(super) fn parse(rest: &[&str]) -> Option<Self> {
        match rest {
            [] | ["index"] => Some(TabRoute::Home),
            ["events"] => Some(TabRoute::Events),
            ["club"] => Some(TabRoute::Club),
            ["profile"] => Some(TabRoute::Profile),
            ["dashboard"] => Some(TabRoute::Dashboard),
            _ => None,
        }
    }
}
