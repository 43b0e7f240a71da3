pub mod admin;
pub mod auth;
pub mod content;

use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use common::types::Health;
use configs::{AppConfig, BackendMode};
use models::{JobPosition, Project, Record, Service, TeamMember};
use service::metrics::encode_metrics;
use service::runtime::UPLOADS_ROUTE;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::errors::JsonApiError;
use crate::state::AppState;

/// Multipart framing on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Filesystem and size settings the router needs.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub static_dir: PathBuf,
    /// Served under `/uploads` when set (file backend).
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl RouterOptions {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            static_dir: PathBuf::from(&cfg.server.static_dir),
            upload_dir: (cfg.backend.mode == BackendMode::File).then(|| PathBuf::from(&cfg.storage.upload_dir)),
            max_upload_bytes: cfg.storage.max_upload_bytes,
        }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn metrics() -> Result<impl IntoResponse, JsonApiError> {
    let body = encode_metrics()
        .map_err(|e| JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

/// CRUD routes for one content kind under `/admin/<slug>`.
fn admin_resource<T: Record>() -> Router<AppState> {
    let base = format!("/admin/{}", T::KIND.slug());
    Router::new()
        .route(&base, get(admin::list_stored::<T>).post(admin::create::<T>))
        .route(&format!("{base}/:id"), put(admin::update::<T>).delete(admin::remove::<T>))
}

/// Build the full application router: public content, auth, admin and static files.
pub fn build_router(state: AppState, opts: &RouterOptions, cors: CorsLayer) -> Router {
    // Public routes (content, health, metrics)
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/services", get(content::list::<Service>))
        .route("/api/services/:id", get(content::get_one::<Service>))
        .route("/api/projects", get(content::list_projects))
        .route("/api/projects/categories", get(content::project_categories))
        .route("/api/projects/:id", get(content::get_one::<Project>))
        .route("/api/jobs", get(content::list::<JobPosition>))
        .route("/api/jobs/:id", get(content::get_one::<JobPosition>))
        .route("/api/team", get(content::list::<TeamMember>));

    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    // Admin routes，统一经过会话校验中间件
    let admin_routes = Router::new()
        .merge(admin_resource::<Service>())
        .merge(admin_resource::<Project>())
        .merge(admin_resource::<JobPosition>())
        .merge(admin_resource::<TeamMember>())
        .route(
            "/admin/uploads",
            post(admin::upload_image)
                .layer(DefaultBodyLimit::max(opts.max_upload_bytes + MULTIPART_OVERHEAD)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::require_admin_session));

    let index = opts.static_dir.join("index.html");
    let static_files = ServeDir::new(&opts.static_dir).fallback(ServeFile::new(index));

    let mut app = public.merge(auth_routes).merge(admin_routes);
    if let Some(dir) = &opts.upload_dir {
        app = app.nest_service(UPLOADS_ROUTE, ServeDir::new(dir));
    }

    app.fallback_service(static_files)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径，日志级别为 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
