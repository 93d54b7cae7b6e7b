//! Screen-side synchronisation of remote resources.
//!
//! A screen issues a [`Ticket`] when it starts a request and hands the result back with
//! that ticket. Results for a screen that has since unmounted, or for a refresh that a
//! newer refresh superseded, are discarded instead of being written into stale state.

use crate::error::ApiError;
use crate::models::{AdminClub, AdminUser, Club, ClubPost, Event};
use crate::routes::Route;

/// Alert
///
/// A dismissable message shown to the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    /// "Failed to create club."
    pub fn failure(action: &str) -> Self {
        Self {
            title: "Error".to_string(),
            message: format!("Failed to {action}."),
        }
    }

    /// "Club created." style confirmation.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            title: "Success".to_string(),
            message: message.into(),
        }
    }
}

/// Mutation
///
/// Names a write for the viewer: `action` fills "Failed to {action}." and `done` is the
/// confirmation shown on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation<'a> {
    pub action: &'a str,
    pub done: &'a str,
}

impl<'a> Mutation<'a> {
    pub const fn new(action: &'a str, done: &'a str) -> Self {
        Self { action, done }
    }
}

/// Feedback
///
/// What the screen should do after applying a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    None,
    Alert(Alert),
    Redirect(Route),
}

impl Feedback {
    /// Maps a failure to user-visible feedback. Errors that need a new login redirect;
    /// everything else names the action that failed.
    pub fn for_error(action: &str, err: &ApiError) -> Self {
        if err.requires_login() {
            Feedback::Redirect(Route::login())
        } else {
            Feedback::Alert(Alert::failure(action))
        }
    }
}

/// Applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The screen unmounted or a newer request superseded this one.
    Discarded,
    Applied(Feedback),
}

/// Ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    generation: Option<u64>,
}

/// Records with a stable server id.
pub trait Identified {
    fn id(&self) -> i64;
}

/// Records the admin search box filters on.
pub trait Searchable {
    fn matches(&self, needle: &str) -> bool;
}

/// ResourceScreen
///
/// Local view state of one list screen.
#[derive(Debug, Clone)]
pub struct ResourceScreen<T> {
    items: Vec<T>,
    mounted: bool,
    // Bumped on every unmount; tickets from an older epoch are stale.
    epoch: u64,
    // Bumped on every refresh; only the latest refresh may replace the list.
    generation: u64,
    loading: bool,
}

impl<T> Default for ResourceScreen<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            mounted: false,
            epoch: 0,
            generation: 0,
            loading: false,
        }
    }
}

impl<T: Identified> ResourceScreen<T> {
    pub fn mount() -> Self {
        Self {
            mounted: true,
            ..Self::default()
        }
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.epoch += 1;
        self.loading = false;
    }

    pub fn remount(&mut self) {
        self.mounted = true;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn begin_refresh(&mut self) -> Ticket {
        self.generation += 1;
        self.loading = true;
        Ticket {
            epoch: self.epoch,
            generation: Some(self.generation),
        }
    }

    pub fn begin_mutation(&self) -> Ticket {
        Ticket {
            epoch: self.epoch,
            generation: None,
        }
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        if !self.mounted || ticket.epoch != self.epoch {
            return false;
        }
        match ticket.generation {
            Some(generation) => generation == self.generation,
            None => true,
        }
    }

    /// apply_list
    ///
    /// Replaces the list on success. A failed refresh keeps the previous list.
    pub fn apply_list(&mut self, ticket: Ticket, action: &str, result: Result<Vec<T>, ApiError>) -> Applied {
        if !self.accepts(ticket) {
            tracing::debug!(action, "discarding stale list response");
            return Applied::Discarded;
        }
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                Applied::Applied(Feedback::None)
            }
            Err(e) => {
                tracing::warn!(action, error = %e, "list refresh failed");
                Applied::Applied(Feedback::for_error(action, &e))
            }
        }
    }

    /// apply_saved
    ///
    /// On success the saved record replaces the one with the same id (or is appended)
    /// and the form is reset. On failure neither the list nor the form changes.
    pub fn apply_saved<F: Default>(
        &mut self,
        ticket: Ticket,
        mutation: Mutation<'_>,
        result: Result<T, ApiError>,
        form: &mut F,
    ) -> Applied {
        let action = mutation.action;
        if !self.accepts(ticket) {
            tracing::debug!(action, "discarding response for unmounted screen");
            return Applied::Discarded;
        }
        match result {
            Ok(saved) => {
                match self.items.iter_mut().find(|item| item.id() == saved.id()) {
                    Some(existing) => *existing = saved,
                    None => self.items.push(saved),
                }
                *form = F::default();
                Applied::Applied(Feedback::Alert(Alert::success(mutation.done)))
            }
            Err(e) => {
                tracing::warn!(action, error = %e, "save failed");
                Applied::Applied(Feedback::for_error(action, &e))
            }
        }
    }

    /// apply_deleted
    pub fn apply_deleted(
        &mut self,
        ticket: Ticket,
        mutation: Mutation<'_>,
        id: i64,
        result: Result<(), ApiError>,
    ) -> Applied {
        let action = mutation.action;
        if !self.accepts(ticket) {
            tracing::debug!(action, "discarding response for unmounted screen");
            return Applied::Discarded;
        }
        match result {
            Ok(()) => {
                self.items.retain(|item| item.id() != id);
                Applied::Applied(Feedback::Alert(Alert::success(mutation.done)))
            }
            Err(e) => {
                tracing::warn!(action, id, error = %e, "delete failed");
                Applied::Applied(Feedback::for_error(action, &e))
            }
        }
    }
}

impl<T: Identified + Searchable> ResourceScreen<T> {
    /// Case-insensitive filter; an empty query returns everything.
    pub fn search(&self, query: &str) -> Vec<&T> {
        let needle = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.matches(&needle))
            .collect()
    }
}

impl Identified for Club {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for AdminClub {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for ClubPost {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Event {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for AdminUser {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Searchable for Club {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

impl Searchable for AdminClub {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

impl Searchable for AdminUser {
    fn matches(&self, needle: &str) -> bool {
        self.username.to_lowercase().contains(needle) || self.email.to_lowercase().contains(needle)
    }
}
