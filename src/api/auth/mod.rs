//! Authentication API endpoints
//!
//! Registration and login are public; the user management routes require a
//! bearer token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::Identity;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{User, UserId};
use crate::infrastructure::user::{ChangePasswordRequest, RegisterUserRequest, UpdateUserRequest};

/// Routes that do not need a token
pub fn create_public_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes behind the identity middleware
pub fn create_protected_auth_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_user))
        .route("/users", post(create_user))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route("/users/{id}/password", post(change_password))
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: UserId,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

/// User response (safe to expose)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().to_string(),
            name: user.name().to_string(),
            role: user.role().as_str().to_string(),
            created_at: user.created_at().to_rfc3339(),
            updated_at: user.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserBody {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state
        .user_service
        .register(RegisterUserRequest {
            name: request.name,
            email: request.email,
            password: request.password,
            role: request.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { id: user.id() })))
}

/// POST /api/v1/auth/users
///
/// Administrators create accounts with any role.
pub async fn create_user(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .user_service
        .create_user(
            actor,
            RegisterUserRequest {
                name: request.name,
                email: request.email,
                password: request.password,
                role: request.role,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /api/v1/auth/login
///
/// Returns a bearer token on successful authentication.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let issued = state
        .token_service
        .issue_token(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at.to_rfc3339(),
        user: UserResponse::from(&issued.user),
    }))
}

/// GET /api/v1/auth/me
pub async fn get_current_user(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get(user_id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/v1/auth/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserBody>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&id)?;
    debug!(user_id = %id, actor = %actor, "Updating user");

    let user = state
        .user_service
        .update(
            actor,
            id,
            UpdateUserRequest {
                name: body.name,
                email: body.email,
                role: body.role,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/v1/auth/users/{id}/password
pub async fn change_password(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
    Json(body): Json<ChangePasswordBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_user_id(&id)?;

    state
        .user_service
        .change_password(
            actor,
            id,
            ChangePasswordRequest {
                old_password: body.old_password,
                new_password: body.new_password,
            },
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}

/// DELETE /api/v1/auth/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_user_id(&id)?;
    state.user_service.delete(actor, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<UserId>()
        .map_err(|_| ApiError::bad_request(format!("Invalid user id '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::TestApp;

    #[tokio::test]
    async fn test_register_and_login() {
        let app = TestApp::new();

        let (status, body) = app
            .post(
                "/api/v1/auth/register",
                None,
                json!({"name": "Ann", "email": "ann@x.com", "password": "secure_password123"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_i64().unwrap();

        let (status, body) = app
            .post(
                "/api/v1/auth/login",
                None,
                json!({"email": "ann@x.com", "password": "secure_password123"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], id);
        assert_eq!(body["user"]["role"], "member");
        assert!(body["user"].get("password_hash").is_none());

        let token = body["token"].as_str().unwrap().to_string();
        let (status, body) = app.get("/api/v1/auth/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ann@x.com");
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let app = TestApp::new();
        app.register("ann@x.com", None).await;

        let (status, body) = app
            .post(
                "/api/v1/auth/register",
                None,
                json!({"name": "Ann", "email": "ann@x.com", "password": "secure_password123"}),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = TestApp::new();
        app.register("ann@x.com", None).await;

        let (status, body) = app
            .post(
                "/api/v1/auth/login",
                None,
                json!({"email": "ann@x.com", "password": "not_the_password"}),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid email or password");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = TestApp::new();

        let (status, body) = app
            .post("/api/v1/auth/login", None, json!({"email": "ann@x.com"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("password"));
    }

    #[tokio::test]
    async fn test_user_management_permissions() {
        let app = TestApp::new();
        let (ann_id, ann_token) = app.register("ann@x.com", None).await;
        let (bob_id, _) = app.register("bob@x.com", None).await;
        let (_, admin_token) = app.register("root@x.com", Some("admin")).await;

        let (status, body) = app
            .put(
                &format!("/api/v1/auth/users/{}", ann_id),
                Some(&ann_token),
                json!({"name": "Annie", "email": "annie@x.com", "role": "member"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Annie");

        let (status, _) = app
            .delete(&format!("/api/v1/auth/users/{}", bob_id), Some(&ann_token))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .post(
                &format!("/api/v1/auth/users/{}/password", ann_id),
                Some(&ann_token),
                json!({"old_password": "secure_password123", "new_password": "brand_new_password"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .delete(&format!("/api/v1/auth/users/{}", bob_id), Some(&admin_token))
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app
            .delete("/api/v1/auth/users/abc", Some(&admin_token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_anonymous_registration_cannot_pick_admin() {
        let app = TestApp::new();
        let (victim_id, _) = app.register("victim@x.com", None).await;

        let (status, body) = app
            .post(
                "/api/v1/auth/register",
                None,
                json!({"name": "Eve", "email": "eve@x.com", "password": "secure_password123", "role": "admin"}),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].as_str().unwrap().contains("admin"));

        let (status, _) = app
            .post(
                "/api/v1/auth/login",
                None,
                json!({"email": "eve@x.com", "password": "secure_password123"}),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .post(
                "/api/v1/auth/register",
                None,
                json!({"name": "Eve", "email": "eve@x.com", "password": "secure_password123", "role": "member"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, eve_token) = app.login("eve@x.com").await;
        let (status, _) = app
            .delete(&format!("/api/v1/auth/users/{}", victim_id), Some(&eve_token))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_member_cannot_promote_themselves() {
        let app = TestApp::new();
        let (ann_id, ann_token) = app.register("ann@x.com", None).await;
        let (bob_id, _) = app.register("bob@x.com", None).await;

        let (status, _) = app
            .put(
                &format!("/api/v1/auth/users/{}", ann_id),
                Some(&ann_token),
                json!({"name": "Ann", "email": "ann@x.com", "role": "admin"}),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, me) = app.get("/api/v1/auth/me", Some(&ann_token)).await;
        assert_eq!(me["role"], "member");

        let (status, _) = app
            .delete(&format!("/api/v1/auth/users/{}", bob_id), Some(&ann_token))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_assigns_roles() {
        let app = TestApp::new();
        let (_, admin_token) = app.register("root@x.com", Some("admin")).await;
        let (ann_id, ann_token) = app.register("ann@x.com", None).await;

        let (status, body) = app
            .put(
                &format!("/api/v1/auth/users/{}", ann_id),
                Some(&admin_token),
                json!({"name": "Ann", "email": "ann@x.com", "role": "manager"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "manager");

        let (status, body) = app
            .post(
                "/api/v1/auth/users",
                Some(&admin_token),
                json!({"name": "Max", "email": "max@x.com", "password": "secure_password123", "role": "manager"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["role"], "manager");

        let (status, _) = app
            .post(
                "/api/v1/auth/users",
                Some(&ann_token),
                json!({"name": "Sam", "email": "sam@x.com", "password": "secure_password123", "role": "admin"}),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_user_owning_resources_cannot_be_deleted() {
        let app = TestApp::new();
        let (ann_id, ann_token) = app.register("ann@x.com", None).await;
        app.create_team(&ann_token).await;

        let (status, body) = app
            .delete(&format!("/api/v1/auth/users/{}", ann_id), Some(&ann_token))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("still owns"));

        let (status, _) = app.get("/api/v1/auth/me", Some(&ann_token)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
