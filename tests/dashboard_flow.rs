mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use common::{acquire_db_lock, body_to_vec, read_json, TestApp};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize, PartialEq)]
struct Bucket {
    month: u32,
    applicants: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    total_applicants: i64,
    selected_count: i64,
    not_selected_count: i64,
    future_select_count: i64,
    pending_count: i64,
    monthly: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Activity {
    id: Uuid,
    applicant_name: String,
    action: String,
    user_name: String,
}

#[derive(Deserialize)]
struct Created {
    id: Uuid,
}

async fn create(app: &TestApp, token: &str, name: &str, status: &str) -> Result<Uuid> {
    let response = app
        .post_json(
            "/api/applicants",
            &json!({ "name": name, "email": format!("{}@example.com", name.to_lowercase()), "status": status }),
            Some(token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Created = read_json(response).await?;
    Ok(created.id)
}

async fn stats(app: &TestApp, token: &str, range: &str) -> Result<Stats> {
    let response = app
        .get(
            &format!("/api/applicants/dashboard-stats?range={range}"),
            Some(token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await
}

#[tokio::test]
async fn last_seven_days_excludes_older_applicants() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let token = app.admin_token("analyst", "admin").await?;

    let id = create(&app, &token, "Kamal", "pending").await?;
    app.set_created_at(id, (Utc::now() - Duration::days(10)).naive_utc())
        .await?;

    let recent = stats(&app, &token, "last-7-days").await?;
    assert_eq!(recent.total_applicants, 0);
    assert!(recent.monthly.is_empty());

    let month = stats(&app, &token, "last-30-days").await?;
    assert_eq!(month.total_applicants, 1);
    assert_eq!(month.pending_count, 1);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn counts_by_status_sum_to_total() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let token = app.admin_token("analyst", "admin").await?;

    create(&app, &token, "Amal", "selected").await?;
    create(&app, &token, "Bimal", "not-selected").await?;
    create(&app, &token, "Chamal", "future-select").await?;
    create(&app, &token, "Dinuka", "pending").await?;
    create(&app, &token, "Eranga", "pending").await?;

    for range in ["all-time", "this-year", "unknown-range"] {
        let stats = stats(&app, &token, range).await?;
        assert_eq!(stats.total_applicants, 5, "{range}");
        assert_eq!(stats.selected_count, 1);
        assert_eq!(stats.not_selected_count, 1);
        assert_eq!(stats.future_select_count, 1);
        assert_eq!(stats.pending_count, 2);
        assert_eq!(
            stats.selected_count
                + stats.not_selected_count
                + stats.future_select_count
                + stats.pending_count,
            stats.total_applicants
        );
        assert_eq!(
            stats.monthly,
            vec![Bucket {
                month: Utc::now().month(),
                applicants: 5
            }]
        );
    }

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn same_month_of_different_years_share_a_bucket() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let token = app.admin_token("analyst", "admin").await?;
    let this_year = Utc::now().year();

    let older = create(&app, &token, "Older", "pending").await?;
    let newer = create(&app, &token, "Newer", "pending").await?;
    let march = |year: i32| {
        NaiveDate::from_ymd_opt(year, 3, 15)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid date")
    };
    app.set_created_at(older, march(this_year - 1)).await?;
    app.set_created_at(newer, march(this_year)).await?;

    let all_time = stats(&app, &token, "all-time").await?;
    assert_eq!(
        all_time.monthly,
        vec![Bucket {
            month: 3,
            applicants: 2
        }]
    );

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn recent_activity_lists_latest_changes_first() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let token = app.admin_token("analyst", "admin").await?;

    let mut ids = Vec::new();
    for i in 0..12 {
        ids.push(create(&app, &token, &format!("Applicant{i:02}"), "pending").await?);
    }
    let response = app
        .patch_json(
            &format!("/api/applicants/{}", ids[0]),
            &json!({ "status": "not-selected" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get("/api/applicants/recent-activity", Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let feed: Vec<Activity> = read_json(response).await?;

    assert_eq!(feed.len(), 10);
    assert_eq!(feed[0].id, ids[0]);
    assert_eq!(feed[0].applicant_name, "Applicant00");
    assert_eq!(feed[0].action, "updated status to not selected");
    assert_eq!(feed[0].user_name, "System Update");
    assert_eq!(feed[1].id, ids[11]);
    assert!(!feed.iter().any(|entry| entry.id == ids[1]));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn csv_report_has_one_row_per_applicant() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let token = app.admin_token("analyst", "admin").await?;

    let old = create(&app, &token, "Nimal", "selected").await?;
    create(&app, &token, "Ayesha", "pending").await?;
    create(&app, &token, "Ruwan", "future-select").await?;
    app.set_created_at(old, (Utc::now() - Duration::days(40)).naive_utc())
        .await?;

    let response = app
        .get("/api/applicants/report/csv?range=all-time", Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"applicants_report.csv\""
    );
    let body = String::from_utf8(body_to_vec(response.into_body()).await?)?;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Name,Email,Status,Date Applied");
    assert!(lines[1].starts_with("Nimal,nimal@example.com,selected,"));
    assert!(lines[2].starts_with("Ayesha,ayesha@example.com,pending,"));
    assert!(lines[3].starts_with("Ruwan,ruwan@example.com,future-select,"));

    let response = app
        .get("/api/applicants/report/csv?range=last-30-days", Some(&token))
        .await?;
    let body = String::from_utf8(body_to_vec(response.into_body()).await?)?;
    assert_eq!(body.lines().count(), 3);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn pdf_report_is_not_implemented() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let token = app.admin_token("analyst", "admin").await?;

    let response = app
        .get("/api/applicants/report/pdf?range=this-year", Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    #[derive(Deserialize)]
    struct ErrorBody {
        kind: String,
    }
    let error: ErrorBody = read_json(response).await?;
    assert_eq!(error.kind, "not_implemented");

    app.cleanup().await?;
    Ok(())
}
