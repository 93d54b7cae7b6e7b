use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::gateway::MultipartForm;

// --- Authentication Schemas ---

/// LoginRequest
///
/// Body of `POST /login/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// TokenPair
///
/// Response of `POST /login/`. The refresh token is only used to revoke the session at
/// logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// RegisterRequest
///
/// Body of `POST /register/`. Registration does not log the account in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        require(&[
            ("username", &self.username),
            ("email", &self.email),
            ("password", &self.password),
        ])
    }
}

/// LogoutRequest
///
/// Body of `POST /logout/`; the server blacklists the refresh token.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest {
    pub refresh: String,
}

/// UserProfile
///
/// The viewer's own account (`GET /me/`). `is_admin` drives the role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub profile_image: Option<String>,
}

// --- Club Schemas ---

/// Club
///
/// Club as listed to every authenticated viewer (`GET /clubs/`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub is_followed: bool,
}

/// ClubDetail
///
/// `GET /clubs/{id}/`: the listing fields plus the club's posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubDetail {
    #[serde(flatten)]
    pub club: Club,
    #[serde(default)]
    pub posts: Vec<ClubPost>,
}

/// AdminClub
///
/// Club as managed from the admin subtree (`/clubs/admin/clubs/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClub {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub created_by: i64,
    pub created_by_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// ClubPost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    pub created_by: i64,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

/// FollowToggle
///
/// Response of the follow endpoints for clubs and events: the state after the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowToggle {
    pub followed: bool,
}

/// LikeToggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    pub liked: bool,
}

// --- Event Schemas ---

/// Event
///
/// `created_by` is the creator's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub created_by: String,
    #[serde(default)]
    pub followers_count: i64,
}

impl Event {
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Groups events by calendar day (UTC), each day sorted by start time.
pub fn events_by_day(events: &[Event]) -> BTreeMap<NaiveDate, Vec<&Event>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Event>> = BTreeMap::new();
    for event in events {
        days.entry(event.day()).or_default().push(event);
    }
    for day in days.values_mut() {
        day.sort_by_key(|event| event.date);
    }
    days
}

// --- User Management Schemas ---

/// AdminUser
///
/// Account as managed from `/admin/users/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub profile_image: Option<String>,
}

// --- Form Payloads (Input Schemas) ---

/// Upload
///
/// A file attached to a multipart form (club image, post attachment).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// ClubForm
///
/// Create/update payload for a club, sent as multipart because of the optional image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClubForm {
    pub name: String,
    pub description: String,
    pub image: Option<Upload>,
}

impl ClubForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        require(&[("name", &self.name), ("description", &self.description)])
    }

    pub fn to_multipart(&self) -> MultipartForm {
        let form = MultipartForm::new()
            .text("name", &self.name)
            .text("description", &self.description);
        match &self.image {
            Some(image) => form.file("image", image.clone()),
            None => form,
        }
    }
}

/// PostForm
///
/// Create/update payload for a club post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub image: Option<Upload>,
    pub file: Option<Upload>,
}

impl PostForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        require(&[("title", &self.title), ("content", &self.content)])
    }

    pub fn to_multipart(&self) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("title", &self.title)
            .text("content", &self.content);
        if let Some(image) = &self.image {
            form = form.file("image", image.clone());
        }
        if let Some(file) = &self.file {
            form = form.file("file", file.clone());
        }
        form
    }
}

/// EventForm
///
/// JSON payload for `POST /events/` and `PUT /events/{id}/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
}

impl EventForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        require(&[("title", &self.title), ("description", &self.description)])?;
        if self.date.is_none() {
            return Err(ApiError::InvalidRequest("date is required".to_string()));
        }
        Ok(())
    }
}

/// UserForm
///
/// JSON payload for admin user management. An empty password is omitted so an update
/// keeps the existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub password: Option<String>,
    pub is_superuser: bool,
}

impl UserForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        require(&[("username", &self.username)])
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn require(fields: &[(&str, &String)]) -> Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}
