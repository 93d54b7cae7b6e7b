use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

use crate::error::ApiError;
use crate::gateway::{Gateway, RequestBody};
use crate::models::{
    AdminClub, AdminUser, Club, ClubDetail, ClubForm, ClubPost, Event, EventForm, FollowToggle,
    LikeToggle, PostForm, UserForm, UserProfile,
};

/// ClubRepository
///
/// Remote access to clubs and their posts. The screens depend on this trait, not on the
/// Gateway, so their state handling can be tested without a backend.
///
/// **Send + Sync + async_trait** make `Arc<dyn ClubRepository>` shareable across tasks.
#[async_trait]
pub trait ClubRepository: Send + Sync {
    // --- Shared tabs ---
    async fn list_clubs(&self) -> Result<Vec<Club>, ApiError>;
    async fn get_club(&self, id: i64) -> Result<ClubDetail, ApiError>;
    async fn toggle_follow_club(&self, id: i64) -> Result<FollowToggle, ApiError>;
    async fn list_club_posts(&self, club_id: i64) -> Result<Vec<ClubPost>, ApiError>;
    async fn toggle_like_post(&self, post_id: i64) -> Result<LikeToggle, ApiError>;
    async fn liked_posts(&self) -> Result<Vec<ClubPost>, ApiError>;

    // --- Admin: clubs ---
    async fn admin_list_clubs(&self) -> Result<Vec<AdminClub>, ApiError>;
    async fn admin_create_club(&self, form: &ClubForm) -> Result<AdminClub, ApiError>;
    async fn admin_update_club(&self, id: i64, form: &ClubForm) -> Result<AdminClub, ApiError>;
    async fn admin_delete_club(&self, id: i64) -> Result<(), ApiError>;

    // --- Admin: posts ---
    async fn create_post(&self, club_id: i64, form: &PostForm) -> Result<ClubPost, ApiError>;
    async fn update_post(&self, id: i64, form: &PostForm) -> Result<ClubPost, ApiError>;
    async fn delete_post(&self, id: i64) -> Result<(), ApiError>;
}

/// EventRepository
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError>;
    async fn toggle_follow_event(&self, id: i64) -> Result<FollowToggle, ApiError>;
    async fn followed_events(&self) -> Result<Vec<Event>, ApiError>;

    // --- Admin ---
    async fn create_event(&self, form: &EventForm) -> Result<Event, ApiError>;
    async fn update_event(&self, id: i64, form: &EventForm) -> Result<Event, ApiError>;
    async fn delete_event(&self, id: i64) -> Result<(), ApiError>;
}

/// UserRepository
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn me(&self) -> Result<UserProfile, ApiError>;

    // --- Admin ---
    async fn admin_list_users(&self) -> Result<Vec<AdminUser>, ApiError>;
    async fn admin_create_user(&self, form: &UserForm) -> Result<AdminUser, ApiError>;
    async fn admin_update_user(&self, id: i64, form: &UserForm) -> Result<AdminUser, ApiError>;
    async fn admin_delete_user(&self, id: i64) -> Result<(), ApiError>;
}

pub type ClubRepositoryState = Arc<dyn ClubRepository>;
pub type EventRepositoryState = Arc<dyn EventRepository>;
pub type UserRepositoryState = Arc<dyn UserRepository>;

/// RemoteRepository
///
/// Implements every repository trait over the Gateway. Forms are validated before the
/// request is built, so an incomplete form never reaches the network.
#[derive(Clone)]
pub struct RemoteRepository {
    gateway: Gateway,
}

impl RemoteRepository {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ClubRepository for RemoteRepository {
    async fn list_clubs(&self) -> Result<Vec<Club>, ApiError> {
        self.gateway.send(Method::GET, "/clubs/", RequestBody::Empty).await
    }

    async fn get_club(&self, id: i64) -> Result<ClubDetail, ApiError> {
        self.gateway
            .send(Method::GET, &format!("/clubs/{id}/"), RequestBody::Empty)
            .await
    }

    async fn toggle_follow_club(&self, id: i64) -> Result<FollowToggle, ApiError> {
        self.gateway
            .send(Method::POST, &format!("/clubs/{id}/follow/"), RequestBody::Empty)
            .await
    }

    async fn list_club_posts(&self, club_id: i64) -> Result<Vec<ClubPost>, ApiError> {
        self.gateway
            .send(Method::GET, &format!("/clubs/{club_id}/posts/"), RequestBody::Empty)
            .await
    }

    async fn toggle_like_post(&self, post_id: i64) -> Result<LikeToggle, ApiError> {
        self.gateway
            .send(Method::POST, &format!("/clubs/posts/{post_id}/like/"), RequestBody::Empty)
            .await
    }

    async fn liked_posts(&self) -> Result<Vec<ClubPost>, ApiError> {
        self.gateway
            .send(Method::GET, "/clubs/me/liked-posts/", RequestBody::Empty)
            .await
    }

    async fn admin_list_clubs(&self) -> Result<Vec<AdminClub>, ApiError> {
        self.gateway
            .send(Method::GET, "/clubs/admin/clubs/", RequestBody::Empty)
            .await
    }

    async fn admin_create_club(&self, form: &ClubForm) -> Result<AdminClub, ApiError> {
        form.validate()?;
        self.gateway
            .send(
                Method::POST,
                "/clubs/admin/clubs/",
                RequestBody::Multipart(form.to_multipart()),
            )
            .await
    }

    async fn admin_update_club(&self, id: i64, form: &ClubForm) -> Result<AdminClub, ApiError> {
        form.validate()?;
        self.gateway
            .send(
                Method::PUT,
                &format!("/clubs/admin/clubs/{id}/"),
                RequestBody::Multipart(form.to_multipart()),
            )
            .await
    }

    async fn admin_delete_club(&self, id: i64) -> Result<(), ApiError> {
        self.gateway
            .execute(Method::DELETE, &format!("/clubs/admin/clubs/{id}/"), RequestBody::Empty)
            .await
    }

    async fn create_post(&self, club_id: i64, form: &PostForm) -> Result<ClubPost, ApiError> {
        form.validate()?;
        self.gateway
            .send(
                Method::POST,
                &format!("/clubs/{club_id}/posts/create/"),
                RequestBody::Multipart(form.to_multipart()),
            )
            .await
    }

    async fn update_post(&self, id: i64, form: &PostForm) -> Result<ClubPost, ApiError> {
        form.validate()?;
        self.gateway
            .send(
                Method::PUT,
                &format!("/clubs/posts/{id}/"),
                RequestBody::Multipart(form.to_multipart()),
            )
            .await
    }

    async fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        self.gateway
            .execute(Method::DELETE, &format!("/clubs/posts/{id}/"), RequestBody::Empty)
            .await
    }
}

#[async_trait]
impl EventRepository for RemoteRepository {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        self.gateway.send(Method::GET, "/events/", RequestBody::Empty).await
    }

    async fn toggle_follow_event(&self, id: i64) -> Result<FollowToggle, ApiError> {
        self.gateway
            .send(Method::POST, &format!("/events/{id}/toggle-follow/"), RequestBody::Empty)
            .await
    }

    async fn followed_events(&self) -> Result<Vec<Event>, ApiError> {
        self.gateway
            .send(Method::GET, "/events/me/followed-events/", RequestBody::Empty)
            .await
    }

    async fn create_event(&self, form: &EventForm) -> Result<Event, ApiError> {
        form.validate()?;
        self.gateway
            .send(Method::POST, "/events/", RequestBody::json(form)?)
            .await
    }

    async fn update_event(&self, id: i64, form: &EventForm) -> Result<Event, ApiError> {
        form.validate()?;
        self.gateway
            .send(Method::PUT, &format!("/events/{id}/"), RequestBody::json(form)?)
            .await
    }

    async fn delete_event(&self, id: i64) -> Result<(), ApiError> {
        self.gateway
            .execute(Method::DELETE, &format!("/events/{id}/"), RequestBody::Empty)
            .await
    }
}

#[async_trait]
impl UserRepository for RemoteRepository {
    async fn me(&self) -> Result<UserProfile, ApiError> {
        self.gateway.send(Method::GET, "/me/", RequestBody::Empty).await
    }

    async fn admin_list_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        self.gateway
            .send(Method::GET, "/admin/users/", RequestBody::Empty)
            .await
    }

    async fn admin_create_user(&self, form: &UserForm) -> Result<AdminUser, ApiError> {
        form.validate()?;
        self.gateway
            .send(Method::POST, "/admin/users/", RequestBody::json(form)?)
            .await
    }

    async fn admin_update_user(&self, id: i64, form: &UserForm) -> Result<AdminUser, ApiError> {
        form.validate()?;
        self.gateway
            .send(Method::PUT, &format!("/admin/users/{id}/"), RequestBody::json(form)?)
            .await
    }

    async fn admin_delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.gateway
            .execute(Method::DELETE, &format!("/admin/users/{id}/"), RequestBody::Empty)
            .await
    }
}
