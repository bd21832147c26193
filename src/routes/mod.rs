use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{auth::AuthenticatedUser, state::AppState};

pub mod admins;
pub mod applicants;
pub mod auth;
pub mod dashboard;
pub mod health;

/// Upper bound on request bodies, sized for CV uploads.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Origins allowed to make credentialed cross-origin requests.
#[derive(Debug, PartialEq)]
enum OriginPolicy {
    MirrorAny,
    List(Vec<HeaderValue>),
}

fn origin_policy(origins: &[String]) -> OriginPolicy {
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return OriginPolicy::MirrorAny;
    }
    let headers = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(origin = %origin, error = %err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    OriginPolicy::List(headers)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = match origin_policy(origins) {
        OriginPolicy::MirrorAny => {
            tracing::warn!(
                "CORS_ALLOWED_ORIGINS is unset or a wildcard; any origin may send credentialed requests"
            );
            AllowOrigin::mirror_request()
        }
        OriginPolicy::List(headers) => AllowOrigin::list(headers),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router<()> {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/me", get(auth::me));

    let applicant_routes = Router::new()
        .route(
            "/",
            get(applicants::list_applicants).post(applicants::create_applicant),
        )
        .route("/dashboard-stats", get(dashboard::dashboard_stats))
        .route("/recent-activity", get(dashboard::recent_activity))
        .route("/report/csv", get(dashboard::csv_report))
        .route("/report/pdf", get(dashboard::pdf_report))
        .route(
            "/:id",
            get(applicants::get_applicant)
                .put(applicants::update_applicant)
                .patch(applicants::update_applicant_status)
                .delete(applicants::delete_applicant),
        )
        .route("/:id/history", get(applicants::applicant_history))
        .route(
            "/:id/cv",
            get(applicants::cv_download_link).post(applicants::upload_cv),
        );

    let admin_routes = Router::new()
        .route("/", get(admins::list_admins).post(admins::create_admin))
        .route(
            "/:id",
            put(admins::update_admin).delete(admins::delete_admin),
        );

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/applicants", applicant_routes)
        .nest("/api/admin", admin_routes)
        .layer(middleware::from_extractor_with_state::<AuthenticatedUser, _>(protected_state));

    Router::new()
        .merge(protected_routes)
        .route("/api/auth/login", post(auth::login))
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
