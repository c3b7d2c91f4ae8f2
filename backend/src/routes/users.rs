//! `/users` resource.
//!
//! Uniqueness of `email` is checked here before each write. The check is not
//! atomic with the write; the repository enforces it again under its own lock.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use users_common::{messages, MessageResponse, UserResponse};

use crate::error::{ApiError, Result};
use crate::validation::{UserId, ValidatedUser};
use crate::AppState;

/// Build the users router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// POST /users - Create a user.
async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedUser(payload): ValidatedUser,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    if state.users.find_by_email(&payload.email)?.is_some() {
        return Err(ApiError::DuplicateEmail(payload.email));
    }

    state.users.create(&payload.username, &payload.email)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(messages::user_added(&payload.email))),
    ))
}

/// GET /users - List every user in creation order.
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserResponse>>> {
    let users = state.users.list_all()?;
    tracing::debug!("Returning {} users", users.len());
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/:id
async fn get_user(
    State(state): State<Arc<AppState>>,
    UserId(id): UserId,
) -> Result<Json<UserResponse>> {
    let user = state.users.find_by_id(id)?.ok_or(ApiError::NotFound(id))?;
    Ok(Json(user.into()))
}

/// PUT /users/:id - Overwrite username and email.
async fn update_user(
    State(state): State<Arc<AppState>>,
    UserId(id): UserId,
    ValidatedUser(payload): ValidatedUser,
) -> Result<Json<MessageResponse>> {
    let user = state.users.find_by_id(id)?.ok_or(ApiError::NotFound(id))?;

    if let Some(owner) = state.users.find_by_email(&payload.email)? {
        if owner.id != user.id {
            return Err(ApiError::DuplicateEmail(payload.email));
        }
    }

    state.users.update(&user, &payload.username, &payload.email)?;

    Ok(Json(MessageResponse::new(messages::user_updated(id))))
}

/// DELETE /users/:id
async fn delete_user(
    State(state): State<Arc<AppState>>,
    UserId(id): UserId,
) -> Result<Json<MessageResponse>> {
    let user = state.users.find_by_id(id)?.ok_or(ApiError::NotFound(id))?;

    state.users.delete(&user)?;

    Ok(Json(MessageResponse::new(messages::user_removed(&user.email))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::repository::{MockUserRepository, RepositoryError};
    use crate::test_util::{json_request, read_json, test_state};
    use axum::http::Method;
    use chrono::Utc;
    use serde_json::json;
    use tower::ServiceExt;

    fn user(id: i64, username: &str, email: &str) -> User {
        User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        }
    }

    fn app(repo: MockUserRepository) -> Router {
        crate::app(test_state(Arc::new(repo)))
    }

    async fn send(
        repo: MockUserRepository,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let response = app(repo)
            .oneshot(json_request(method, uri, body))
            .await
            .unwrap();
        read_json(response).await
    }

    #[tokio::test]
    async fn test_add_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .withf(|email| email == "michael@testdriven.io")
            .returning(|_| Ok(None));
        repo.expect_create()
            .times(1)
            .returning(|username, email| Ok(user(1, username, email)));

        let (status, body) = send(
            repo,
            Method::POST,
            "/users",
            Some(json!({"username": "michael", "email": "michael@testdriven.io"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "michael@testdriven.io was added!");
    }

    #[tokio::test]
    async fn test_add_user_duplicate_email_skips_insert() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(user(1, "michael", email))));
        repo.expect_create().never();

        let (status, body) = send(
            repo,
            Method::POST,
            "/users",
            Some(json!({"username": "michael", "email": "michael@testdriven.io"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Sorry. That email already exists.");
    }

    #[tokio::test]
    async fn test_add_user_lost_race_is_still_a_duplicate() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create()
            .returning(|_, email| Err(RepositoryError::DuplicateEmail(email.to_string())));

        let (status, body) = send(
            repo,
            Method::POST,
            "/users",
            Some(json!({"username": "michael", "email": "michael@testdriven.io"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Sorry. That email already exists.");
    }

    #[tokio::test]
    async fn test_add_user_invalid_json_keys_never_touches_storage() {
        // No expectations: any repository call panics.
        let (status, body) = send(
            MockUserRepository::new(),
            Method::POST,
            "/users",
            Some(json!({"email": "john@testdriven.io"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Input payload validation failed");
        assert_eq!(body["errors"]["username"], "'username' is a required property");
    }

    #[tokio::test]
    async fn test_single_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .withf(|id| *id == 1)
            .returning(|id| Ok(Some(user(id, "midCenturyDude7", "mgriffes@gmail.com"))));

        let (status, body) = send(repo, Method::GET, "/users/1", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"id": 1, "username": "midCenturyDude7", "email": "mgriffes@gmail.com"})
        );
    }

    #[tokio::test]
    async fn test_remove_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(user(id, "user-to-be-removed", "remove-me@testdriven.io"))));
        repo.expect_delete()
            .withf(|u| u.id == 1)
            .times(1)
            .returning(|_| Ok(()));

        let (status, body) = send(repo, Method::DELETE, "/users/1", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "remove-me@testdriven.io was removed!");
    }

    #[tokio::test]
    async fn test_remove_user_incorrect_id() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_delete().never();

        let (status, body) = send(repo, Method::DELETE, "/users/999", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User 999 does not exist");
    }

    #[tokio::test]
    async fn test_update_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(user(id, "me", "me@testdriven.io"))));
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_update()
            .withf(|u, username, email| {
                u.id == 1 && username == "new" && email == "new@testdriven.io"
            })
            .times(1)
            .returning(|u, username, email| Ok(user(u.id, username, email)));

        let (status, body) = send(
            repo,
            Method::PUT,
            "/users/1",
            Some(json!({"username": "new", "email": "new@testdriven.io"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "1 was updated!");
    }

    #[tokio::test]
    async fn test_update_user_duplicate_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(user(id, "me", "me@testdriven.io"))));
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(user(2, "someone-else", email))));
        repo.expect_update().never();

        let (status, body) = send(
            repo,
            Method::PUT,
            "/users/1",
            Some(json!({"username": "me", "email": "taken@testdriven.io"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Sorry. That email already exists.");
    }

    #[tokio::test]
    async fn test_update_user_keeping_own_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(user(id, "me", "me@testdriven.io"))));
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(user(1, "me", email))));
        repo.expect_update()
            .times(1)
            .returning(|u, username, email| Ok(user(u.id, username, email)));

        let (status, _) = send(
            repo,
            Method::PUT,
            "/users/1",
            Some(json!({"username": "renamed", "email": "me@testdriven.io"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let mut repo = MockUserRepository::new();
        repo.expect_list_all()
            .returning(|| Err(RepositoryError::DatabaseError("disk I/O error".to_string())));

        let (status, body) = send(repo, Method::GET, "/users", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }
}
