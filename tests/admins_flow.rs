mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_vec, read_json, TestApp};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminBody {
    id: Uuid,
    username: String,
    email: String,
    role: String,
}

#[tokio::test]
async fn superadmin_manages_admin_accounts() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let token = app.admin_token("root", "superadmin").await?;

    let response = app
        .post_json(
            "/api/admin",
            &json!({ "username": "kasun", "email": "Kasun@Example.com", "password": "pw-1" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let kasun: AdminBody = read_json(response).await?;
    assert_eq!(kasun.email, "kasun@example.com");
    assert_eq!(kasun.role, "admin");

    let response = app
        .post_json(
            "/api/admin",
            &json!({ "username": "kasun2", "email": "kasun@example.com", "password": "pw-2" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.get("/api/admin", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_vec(response.into_body()).await?;
    let raw = String::from_utf8_lossy(&body).to_string();
    assert!(!raw.contains("password"));
    let listed: Vec<AdminBody> = serde_json::from_slice(&body)?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, kasun.id);

    let response = app
        .put_json(
            &format!("/api/admin/{}", kasun.id),
            &json!({ "role": "superadmin", "password": "pw-new" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let promoted: AdminBody = read_json(response).await?;
    assert_eq!(promoted.role, "superadmin");
    assert_eq!(promoted.username, "kasun");
    app.login_token("kasun", "pw-new").await?;

    let response = app
        .put_json(
            &format!("/api/admin/{}", kasun.id),
            &json!({ "email": "root@example.com" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .put_json(
            &format!("/api/admin/{}", kasun.id),
            &json!({ "role": "owner" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .delete(&format!("/api/admin/{}", kasun.id), Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .delete(&format!("/api/admin/{}", kasun.id), Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .put_json(
            &format!("/api/admin/{}", Uuid::new_v4()),
            &json!({ "username": "ghost" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn usernames_stay_unique_across_renames() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let token = app.admin_token("root", "superadmin").await?;
    app.insert_admin("alice", "pw-alice", "admin").await?;
    let bob = app.insert_admin("bob", "pw-bob", "admin").await?;

    let response = app
        .put_json(
            &format!("/api/admin/{bob}"),
            &json!({ "username": "alice" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    app.login_token("alice", "pw-alice").await?;
    app.login_token("bob", "pw-bob").await?;

    let response = app
        .put_json(
            &format!("/api/admin/{bob}"),
            &json!({ "username": "bob", "email": "bob@example.com" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .put_json(
            &format!("/api/admin/{bob}"),
            &json!({ "username": "b".repeat(101) }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .put_json(
            "/api/admin/not-a-uuid",
            &json!({ "username": "robert" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    #[derive(Deserialize)]
    struct ErrorBody {
        kind: String,
    }
    let error: ErrorBody = read_json(response).await?;
    assert_eq!(error.kind, "validation");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn plain_admins_cannot_manage_accounts() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let token = app.admin_token("plain", "admin").await?;

    let response = app.get("/api/admin", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_json(
            "/api/admin",
            &json!({ "username": "x", "email": "x@example.com", "password": "pw" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/api/admin", None).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/api/applicants", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::OK);

    app.cleanup().await?;
    Ok(())
}
