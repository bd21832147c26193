//! Date-windowed applicant statistics and the recent activity feed.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::status::ApplicantStatus;
use crate::utils::time::to_iso;

pub const RECENT_ACTIVITY_LIMIT: i64 = 10;
pub const SYSTEM_ACTOR: &str = "System Update";

/// Named creation-date window used by the dashboard and the reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportRange {
    #[default]
    AllTime,
    Last7Days,
    Last30Days,
    ThisYear,
}

impl ReportRange {
    /// Unknown or missing selectors fall back to all time.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("last-7-days") => ReportRange::Last7Days,
            Some("last-30-days") => ReportRange::Last30Days,
            Some("this-year") => ReportRange::ThisYear,
            _ => ReportRange::AllTime,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportRange::AllTime => "all-time",
            ReportRange::Last7Days => "last-7-days",
            ReportRange::Last30Days => "last-30-days",
            ReportRange::ThisYear => "this-year",
        }
    }

    /// Inclusive lower bound on `created_at`, in UTC.
    pub fn lower_bound(self, now: DateTime<Utc>) -> Option<NaiveDateTime> {
        let now = now.naive_utc();
        match self {
            ReportRange::AllTime => None,
            ReportRange::Last7Days => Some(now - Duration::days(7)),
            ReportRange::Last30Days => Some(now - Duration::days(30)),
            ReportRange::ThisYear => NaiveDate::from_ymd_opt(now.year(), 1, 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub month: u32,
    pub applicants: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_applicants: i64,
    pub selected_count: i64,
    pub not_selected_count: i64,
    pub future_select_count: i64,
    pub pending_count: i64,
    pub monthly: Vec<MonthlyBucket>,
}

impl DashboardStats {
    /// Aggregates `(status, created_at)` rows that already passed the date
    /// filter. Statuses outside the known four count toward the total only.
    ///
    /// Months are bucketed by calendar month number alone, so March 2024 and
    /// March 2025 share a bucket.
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, NaiveDateTime)>,
        S: AsRef<str>,
    {
        let mut stats = DashboardStats::default();
        let mut months: BTreeMap<u32, i64> = BTreeMap::new();

        for (status, created_at) in rows {
            stats.total_applicants += 1;
            match status.as_ref().parse::<ApplicantStatus>() {
                Ok(ApplicantStatus::Selected) => stats.selected_count += 1,
                Ok(ApplicantStatus::NotSelected) => stats.not_selected_count += 1,
                Ok(ApplicantStatus::FutureSelect) => stats.future_select_count += 1,
                Ok(ApplicantStatus::Pending) => stats.pending_count += 1,
                Err(_) => {}
            }
            *months.entry(created_at.month()).or_insert(0) += 1;
        }

        stats.monthly = months
            .into_iter()
            .map(|(month, applicants)| MonthlyBucket { month, applicants })
            .collect();
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub applicant_name: String,
    pub action: String,
    pub timestamp: String,
    pub user_name: String,
}

impl ActivityEntry {
    pub fn from_record(id: Uuid, name: String, status: &str, updated_at: NaiveDateTime) -> Self {
        Self {
            id,
            applicant_name: name,
            action: format!("updated status to {}", status.replace('-', " ")),
            timestamp: to_iso(updated_at),
            user_name: SYSTEM_ACTOR.to_string(),
        }
    }
}
