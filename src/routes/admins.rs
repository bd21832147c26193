use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{password, AdminRole, AuthenticatedUser};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{Admin, NewAdmin};
use crate::schema::admins;
use crate::state::{AppState, DbConnection};
use crate::utils::json::{non_blank, JsonBody, PathId};
use crate::utils::time::{now_micros, to_iso};

pub const USERNAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 255;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            role: admin.role,
            created_at: to_iso(admin.created_at),
            updated_at: to_iso(admin.updated_at),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateAdminRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateAdminRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = admins)]
struct UpdateAdminChangeset {
    username: Option<String>,
    email: Option<String>,
    password_hash: Option<String>,
    role: Option<String>,
}

fn bounded_username(value: Option<String>) -> Result<Option<String>, ValidationError> {
    let username = non_blank(value);
    if let Some(name) = username.as_deref() {
        ValidationError::check_length("username", USERNAME_MAX_LEN, name)?;
    }
    Ok(username)
}

fn bounded_email(value: Option<String>) -> Result<Option<String>, ValidationError> {
    let email = non_blank(value).map(|e| e.to_lowercase());
    if let Some(email) = email.as_deref() {
        ValidationError::check_length("email", EMAIL_MAX_LEN, email)?;
    }
    Ok(email)
}

/// Validated fields for a new administrator account.
pub struct AdminDraft {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: AdminRole,
}

impl AdminDraft {
    pub fn parse(
        username: Option<String>,
        email: Option<String>,
        password: Option<String>,
        role: Option<String>,
    ) -> Result<Self, ValidationError> {
        let username =
            bounded_username(username)?.ok_or(ValidationError::MissingField("username"))?;
        let email = bounded_email(email)?.ok_or(ValidationError::MissingField("email"))?;
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or(ValidationError::MissingField("password"))?;
        let role = match non_blank(role) {
            Some(raw) => raw.parse()?,
            None => AdminRole::Admin,
        };
        Ok(Self {
            username,
            email,
            password,
            role,
        })
    }
}

/// Inserts an account after checking that neither the username nor the
/// email is taken.
pub fn insert_admin(conn: &mut DbConnection, draft: AdminDraft) -> AppResult<Admin> {
    let taken: i64 = admins::table
        .filter(
            admins::email
                .eq(&draft.email)
                .or(admins::username.eq(&draft.username)),
        )
        .count()
        .get_result(conn)?;
    if taken > 0 {
        return Err(AppError::conflict("username or email already in use"));
    }

    let password_hash = password::hash_password(&draft.password)?;
    let new_admin = NewAdmin {
        id: Uuid::new_v4(),
        username: draft.username,
        email: draft.email,
        password_hash,
        role: draft.role.as_str().to_string(),
    };

    let admin = diesel::insert_into(admins::table)
        .values(&new_admin)
        .get_result::<Admin>(conn)?;
    Ok(admin)
}

pub async fn list_admins(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<AdminResponse>>> {
    user.require_superadmin()?;
    let mut conn = state.db()?;

    let rows: Vec<Admin> = admins::table
        .order((admins::created_at.desc(), admins::id.desc()))
        .load(&mut conn)?;

    Ok(Json(rows.into_iter().map(AdminResponse::from).collect()))
}

pub async fn create_admin(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<AdminResponse>)> {
    user.require_superadmin()?;
    let draft = AdminDraft::parse(
        payload.username,
        payload.email,
        payload.password,
        payload.role,
    )?;

    let mut conn = state.db()?;
    let admin = insert_admin(&mut conn, draft)?;
    info!(admin_id = %admin.id, role = %admin.role, created_by = %user.username, "admin created");

    Ok((StatusCode::CREATED, Json(admin.into())))
}

pub async fn update_admin(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathId(admin_id): PathId,
    JsonBody(payload): JsonBody<UpdateAdminRequest>,
) -> AppResult<Json<AdminResponse>> {
    user.require_superadmin()?;

    let role = non_blank(payload.role)
        .map(|raw| raw.parse::<AdminRole>())
        .transpose()?;
    let username = bounded_username(payload.username)?;
    let email = bounded_email(payload.email)?;
    let password_hash = payload
        .password
        .filter(|p| !p.is_empty())
        .map(|p| password::hash_password(&p))
        .transpose()?;

    let mut conn = state.db()?;
    let existing: Admin = admins::table.find(admin_id).first(&mut conn)?;

    if let Some(username) = username.as_deref() {
        let other: i64 = admins::table
            .filter(admins::username.eq(username))
            .filter(admins::id.ne(existing.id))
            .count()
            .get_result(&mut conn)?;
        if other > 0 {
            return Err(AppError::conflict(
                "username already in use by another admin",
            ));
        }
    }

    if let Some(email) = email.as_deref() {
        let other: i64 = admins::table
            .filter(admins::email.eq(email))
            .filter(admins::id.ne(existing.id))
            .count()
            .get_result(&mut conn)?;
        if other > 0 {
            return Err(AppError::conflict("email already in use by another admin"));
        }
    }

    let changeset = UpdateAdminChangeset {
        username,
        email,
        password_hash,
        role: role.map(|r| r.as_str().to_string()),
    };

    let admin = diesel::update(admins::table.find(existing.id))
        .set((&changeset, admins::updated_at.eq(now_micros())))
        .get_result::<Admin>(&mut conn)?;
    info!(admin_id = %admin.id, updated_by = %user.username, "admin updated");

    Ok(Json(admin.into()))
}

pub async fn delete_admin(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathId(admin_id): PathId,
) -> AppResult<StatusCode> {
    user.require_superadmin()?;
    let mut conn = state.db()?;

    let removed = diesel::delete(admins::table.find(admin_id)).execute(&mut conn)?;
    if removed == 0 {
        return Err(AppError::not_found());
    }
    info!(admin_id = %admin_id, deleted_by = %user.username, "admin deleted");

    Ok(StatusCode::NO_CONTENT)
}
