use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::applicant::{
    current_status, Actor, ApplicantResponse, CreateApplicantRequest, StatusUpdateRequest,
    UpdateApplicantRequest,
};
use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AppResult};
use crate::models::{Applicant, NewStatusTransition, StatusTransition};
use crate::schema::{applicants, status_transitions};
use crate::state::AppState;
use crate::status::{set_status, ApplicantStatus, StatusChange};
use crate::storage::{
    attachment_content_disposition, cv_object_key, filename_from_key, resolve_content_type,
    CV_URL_TTL,
};
use crate::utils::json::{JsonBody, PathId};
use crate::utils::time::{next_modified_at, now_micros, to_iso};

pub const CV_FIELD: &str = "cvFile";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub id: Uuid,
    pub from_status: Option<String>,
    pub to_status: String,
    pub actor_id: Option<Uuid>,
    pub actor_name: String,
    pub created_at: String,
}

impl From<StatusTransition> for TransitionResponse {
    fn from(entry: StatusTransition) -> Self {
        Self {
            id: entry.id,
            from_status: entry.from_status,
            to_status: entry.to_status,
            actor_id: entry.actor_id,
            actor_name: entry.actor_name,
            created_at: to_iso(entry.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvLinkResponse {
    pub url: String,
    pub expires_in: u64,
    pub filename: String,
}

fn record_transition(
    conn: &mut PgConnection,
    applicant_id: Uuid,
    actor: &Actor,
    from: Option<ApplicantStatus>,
    to: ApplicantStatus,
    at: NaiveDateTime,
) -> QueryResult<()> {
    let entry = NewStatusTransition {
        id: Uuid::new_v4(),
        applicant_id,
        actor_id: Some(actor.id),
        actor_name: actor.name.clone(),
        from_status: from.map(|status| status.as_str().to_string()),
        to_status: to.as_str().to_string(),
        created_at: at,
    };
    diesel::insert_into(status_transitions::table)
        .values(&entry)
        .execute(conn)?;
    Ok(())
}

fn log_status_change(applicant_id: Uuid, change: &StatusChange, actor: &Actor) {
    if change.is_transition() {
        info!(
            applicant_id = %applicant_id,
            from = %change.from,
            to = %change.to,
            actor = %actor.name,
            "applicant status changed"
        );
    }
}

pub async fn list_applicants(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<ApplicantResponse>>> {
    user.require_staff()?;
    let mut conn = state.db()?;

    let rows: Vec<Applicant> = applicants::table
        .order((applicants::created_at.desc(), applicants::id.desc()))
        .load(&mut conn)?;

    let response = rows
        .into_iter()
        .map(ApplicantResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(response))
}

pub async fn create_applicant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<CreateApplicantRequest>,
) -> AppResult<(StatusCode, Json<ApplicantResponse>)> {
    user.require_staff()?;
    let actor = user.actor();
    let new_applicant = payload.into_new_applicant(&actor, now_micros())?;
    let initial_status: ApplicantStatus = new_applicant.status.parse()?;

    let mut conn = state.db()?;
    let applicant = conn.transaction::<_, AppError, _>(|conn| {
        let applicant = diesel::insert_into(applicants::table)
            .values(&new_applicant)
            .get_result::<Applicant>(conn)?;
        record_transition(
            conn,
            applicant.id,
            &actor,
            None,
            initial_status,
            applicant.created_at,
        )?;
        Ok(applicant)
    })?;

    info!(
        applicant_id = %applicant.id,
        total_marks = applicant.total_marks,
        status = %applicant.status,
        actor = %actor.name,
        "applicant created"
    );
    Ok((StatusCode::CREATED, Json(applicant.try_into()?)))
}

pub async fn get_applicant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathId(applicant_id): PathId,
) -> AppResult<Json<ApplicantResponse>> {
    user.require_staff()?;
    let mut conn = state.db()?;
    let applicant: Applicant = applicants::table.find(applicant_id).first(&mut conn)?;
    Ok(Json(applicant.try_into()?))
}

pub async fn update_applicant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathId(applicant_id): PathId,
    JsonBody(payload): JsonBody<UpdateApplicantRequest>,
) -> AppResult<Json<ApplicantResponse>> {
    user.require_staff()?;
    let actor = user.actor();

    let mut conn = state.db()?;
    let (applicant, change) = conn.transaction::<_, AppError, _>(|conn| {
        let existing: Applicant = applicants::table
            .find(applicant_id)
            .for_update()
            .first(conn)?;
        let prepared = payload.prepare(&existing, now_micros())?;

        let applicant = diesel::update(applicants::table.find(existing.id))
            .set(&prepared.changeset)
            .get_result::<Applicant>(conn)?;

        if let Some(change) = prepared.status_change.filter(StatusChange::is_transition) {
            record_transition(
                conn,
                applicant.id,
                &actor,
                Some(change.from),
                change.to,
                applicant.updated_at,
            )?;
        }
        Ok((applicant, prepared.status_change))
    })?;

    if let Some(change) = change.as_ref() {
        log_status_change(applicant.id, change, &actor);
    }
    info!(applicant_id = %applicant.id, actor = %actor.name, "applicant updated");
    Ok(Json(applicant.try_into()?))
}

pub async fn update_applicant_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathId(applicant_id): PathId,
    JsonBody(payload): JsonBody<StatusUpdateRequest>,
) -> AppResult<Json<ApplicantResponse>> {
    user.require_staff()?;
    let actor = user.actor();
    let requested = payload
        .status
        .ok_or_else(|| AppError::validation("no valid update fields provided"))?;

    let mut conn = state.db()?;
    let (applicant, change) = conn.transaction::<_, AppError, _>(|conn| {
        let existing: Applicant = applicants::table
            .find(applicant_id)
            .for_update()
            .first(conn)?;
        let change = set_status(
            current_status(&existing),
            &requested,
            existing.updated_at,
            now_micros(),
        )?;

        let applicant = diesel::update(applicants::table.find(existing.id))
            .set((
                applicants::status.eq(change.to.as_str()),
                applicants::updated_at.eq(change.updated_at),
            ))
            .get_result::<Applicant>(conn)?;

        if change.is_transition() {
            record_transition(
                conn,
                applicant.id,
                &actor,
                Some(change.from),
                change.to,
                change.updated_at,
            )?;
        }
        Ok((applicant, change))
    })?;

    log_status_change(applicant.id, &change, &actor);
    Ok(Json(applicant.try_into()?))
}

pub async fn delete_applicant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathId(applicant_id): PathId,
) -> AppResult<StatusCode> {
    user.require_staff()?;
    let mut conn = state.db()?;

    let removed: Option<Option<String>> = diesel::delete(applicants::table.find(applicant_id))
        .returning(applicants::cv_file)
        .get_result(&mut conn)
        .optional()?;
    drop(conn);

    let Some(cv_file) = removed else {
        return Err(AppError::not_found());
    };

    if let Some(key) = cv_file {
        if let Err(err) = state.storage.delete_object(&key).await {
            warn!(applicant_id = %applicant_id, key = %key, error = ?err, "failed to delete CV object");
        }
    }

    info!(applicant_id = %applicant_id, actor = %user.username, "applicant deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn applicant_history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathId(applicant_id): PathId,
) -> AppResult<Json<Vec<TransitionResponse>>> {
    user.require_staff()?;
    let mut conn = state.db()?;

    let applicant: Applicant = applicants::table.find(applicant_id).first(&mut conn)?;
    let entries: Vec<StatusTransition> = StatusTransition::belonging_to(&applicant)
        .order((
            status_transitions::created_at.asc(),
            status_transitions::id.asc(),
        ))
        .load(&mut conn)?;

    Ok(Json(entries.into_iter().map(TransitionResponse::from).collect()))
}

pub async fn upload_cv(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathId(applicant_id): PathId,
    mut multipart: Multipart,
) -> AppResult<Json<ApplicantResponse>> {
    user.require_staff()?;

    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error!(error = %err, "invalid multipart data");
        AppError::validation(format!("invalid multipart data: {err}"))
    })? {
        if field.name() != Some(CV_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("cv").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|err| {
            error!(error = %err, "failed to read CV bytes");
            AppError::validation(format!("failed to read file bytes: {err}"))
        })?;
        upload = Some((filename, content_type, data.to_vec()));
    }

    let Some((filename, declared_type, bytes)) = upload else {
        return Err(AppError::validation(format!("{CV_FIELD} field is required")));
    };
    if bytes.is_empty() {
        return Err(AppError::validation(format!("{CV_FIELD} must not be empty")));
    }

    let mut conn = state.db()?;
    let existing: Applicant = applicants::table.find(applicant_id).first(&mut conn)?;
    drop(conn);

    let key = cv_object_key(existing.id, Utc::now().timestamp_millis(), &filename);
    let content_type = resolve_content_type(declared_type.as_deref(), &filename);
    let size = bytes.len();
    state
        .storage
        .put_object(
            &key,
            bytes,
            Some(content_type),
            Some(attachment_content_disposition(&filename)),
        )
        .await
        .map_err(|err| {
            error!(applicant_id = %existing.id, error = ?err, "CV upload failed");
            AppError::internal(format!("failed to store CV: {err}"))
        })?;

    let updated = state.db().and_then(|mut conn| {
        diesel::update(applicants::table.find(existing.id))
            .set((
                applicants::cv_file.eq(key.as_str()),
                applicants::updated_at.eq(next_modified_at(existing.updated_at, now_micros())),
            ))
            .get_result::<Applicant>(&mut conn)
            .map_err(AppError::from)
    });
    let applicant = match updated {
        Ok(applicant) => applicant,
        Err(err) => {
            if let Err(cleanup) = state.storage.delete_object(&key).await {
                warn!(applicant_id = %existing.id, key = %key, error = ?cleanup, "failed to remove orphaned CV");
            }
            return Err(err);
        }
    };

    if let Some(previous) = existing.cv_file.filter(|previous| *previous != key) {
        if let Err(err) = state.storage.delete_object(&previous).await {
            warn!(applicant_id = %applicant.id, key = %previous, error = ?err, "failed to delete replaced CV");
        }
    }

    info!(applicant_id = %applicant.id, key = %key, bytes = size, "CV uploaded");
    Ok(Json(applicant.try_into()?))
}

pub async fn cv_download_link(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathId(applicant_id): PathId,
) -> AppResult<Json<CvLinkResponse>> {
    user.require_staff()?;
    let mut conn = state.db()?;
    let cv_file: Option<String> = applicants::table
        .find(applicant_id)
        .select(applicants::cv_file)
        .first(&mut conn)?;
    drop(conn);

    let key = cv_file.ok_or_else(AppError::not_found)?;
    let url = state
        .storage
        .presign_get_object(&key, CV_URL_TTL)
        .await
        .map_err(|err| AppError::internal(format!("failed to presign CV: {err}")))?;

    Ok(Json(CvLinkResponse {
        url,
        expires_in: CV_URL_TTL.as_secs(),
        filename: filename_from_key(&key).to_string(),
    }))
}
