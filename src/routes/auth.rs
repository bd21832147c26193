use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    auth::{password, AdminRole, AuthenticatedUser},
    error::{AppError, AppResult},
    models::Admin,
    routes::admins::{insert_admin, AdminDraft, AdminResponse},
    schema::admins,
    state::AppState,
    utils::json::JsonBody,
};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AdminResponse,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let identifier = payload.identifier.trim();
    if identifier.is_empty() || payload.password.is_empty() {
        return Err(AppError::unauthorized());
    }

    let mut conn = state.db()?;
    let admin: Option<Admin> = admins::table
        .filter(
            admins::username
                .eq(identifier)
                .or(admins::email.eq(identifier.to_lowercase())),
        )
        .order(admins::created_at.asc())
        .first(&mut conn)
        .optional()?;

    let Some(admin) = admin else {
        warn!(identifier = %identifier, "login for unknown account");
        return Err(AppError::unauthorized());
    };

    let valid = password::verify_password(&payload.password, &admin.password_hash)
        .map_err(|_| AppError::unauthorized())?;
    if !valid {
        warn!(admin_id = %admin.id, "login with wrong password");
        return Err(AppError::unauthorized());
    }

    let token = state
        .jwt
        .generate_token(admin.id, &admin.username, &admin.role)
        .map_err(AppError::from)?;
    info!(admin_id = %admin.id, "admin logged in");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.expires_in(),
        user: admin.into(),
    }))
}

/// Superadmins create plain administrators here; roles are managed through
/// the admin routes.
pub async fn register(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AdminResponse>)> {
    user.require_superadmin()?;
    let draft = AdminDraft::parse(
        payload.username,
        payload.email,
        payload.password,
        Some(AdminRole::Admin.as_str().to_string()),
    )?;

    let mut conn = state.db()?;
    let admin = insert_admin(&mut conn, draft)?;
    info!(admin_id = %admin.id, registered_by = %user.username, "admin registered");

    Ok((StatusCode::CREATED, Json(admin.into())))
}

pub async fn me(user: AuthenticatedUser) -> Json<AuthenticatedUser> {
    Json(user)
}
