use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::dashboard::{ActivityEntry, DashboardStats, ReportRange, RECENT_ACTIVITY_LIMIT};
use crate::error::{AppError, AppResult};
use crate::report::{render_csv, ReportRow, CSV_FILENAME, PDF_UNSUPPORTED};
use crate::schema::applicants;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

impl RangeQuery {
    fn range(&self) -> ReportRange {
        ReportRange::from_query(self.range.as_deref())
    }
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<DashboardStats>> {
    user.require_staff()?;
    let range = query.range();
    let mut conn = state.db()?;

    let mut rows = applicants::table
        .select((applicants::status, applicants::created_at))
        .into_boxed();
    if let Some(bound) = range.lower_bound(Utc::now()) {
        rows = rows.filter(applicants::created_at.ge(bound));
    }
    let rows: Vec<(String, NaiveDateTime)> = rows.load(&mut conn)?;

    Ok(Json(DashboardStats::from_rows(rows)))
}

pub async fn recent_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<ActivityEntry>>> {
    user.require_staff()?;
    let mut conn = state.db()?;

    let rows: Vec<(Uuid, String, String, NaiveDateTime)> = applicants::table
        .select((
            applicants::id,
            applicants::name,
            applicants::status,
            applicants::updated_at,
        ))
        .order((applicants::updated_at.desc(), applicants::id.desc()))
        .limit(RECENT_ACTIVITY_LIMIT)
        .load(&mut conn)?;

    let feed = rows
        .into_iter()
        .map(|(id, name, status, updated_at)| {
            ActivityEntry::from_record(id, name, &status, updated_at)
        })
        .collect();
    Ok(Json(feed))
}

pub async fn csv_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Response> {
    user.require_staff()?;
    let range = query.range();
    let mut conn = state.db()?;

    let mut rows = applicants::table
        .select((
            applicants::name,
            applicants::email,
            applicants::status,
            applicants::created_at,
        ))
        .order((applicants::created_at.asc(), applicants::id.asc()))
        .into_boxed();
    if let Some(bound) = range.lower_bound(Utc::now()) {
        rows = rows.filter(applicants::created_at.ge(bound));
    }
    let rows: Vec<(String, Option<String>, String, NaiveDateTime)> = rows.load(&mut conn)?;
    drop(conn);

    let report: Vec<ReportRow> = rows
        .into_iter()
        .map(|(name, email, status, created_at)| ReportRow {
            name,
            email,
            status,
            created_at,
        })
        .collect();
    let body = render_csv(&report)?;
    info!(range = range.as_str(), rows = report.len(), actor = %user.username, "csv report exported");

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{CSV_FILENAME}\""))
        .map_err(AppError::internal)?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub async fn pdf_report(
    user: AuthenticatedUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Response> {
    user.require_staff()?;
    info!(range = query.range().as_str(), "pdf report requested");
    Err(AppError::not_implemented(PDF_UNSUPPORTED))
}
