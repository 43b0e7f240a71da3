use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use models::Record;
use serde::Serialize;
use service::backend::Caller;
use service::media::ImageFile;
use tracing::{debug, warn};

use crate::errors::JsonApiError;
use crate::routes::auth::session_token;
use crate::state::AppState;

/// Field name the admin forms use for the picked image.
pub const UPLOAD_FIELD: &str = "file";

/// Access token of the verified session; admin writes are sent with it.
#[derive(Debug, Clone)]
pub struct AdminToken(pub String);

impl AdminToken {
    pub fn caller(&self) -> Caller<'_> {
        Caller::User(&self.0)
    }
}

#[derive(Debug, Serialize)]
pub struct UploadOutput {
    pub url: String,
}

/// Middleware: every admin route needs a valid session (bearer token or cookie).
pub async fn require_admin_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let Some(token) = session_token(&headers, &jar) else {
        warn!(%path, "admin request without session");
        return Err(JsonApiError::unauthorized("authentication required"));
    };
    let user = state.auth.verify(&token).await.map_err(|e| {
        warn!(%path, error = %e, "admin session rejected");
        JsonApiError::from(e)
    })?;
    debug!(%path, user_id = %user.id, "admin session ok");
    // 写操作以当前管理员身份发往后端（行级权限依赖该 token）
    req.extensions_mut().insert(user);
    req.extensions_mut().insert(AdminToken(token));
    Ok(next.run(req).await)
}

/// Stored records only; the admin view never shows built-in content.
pub async fn list_stored<T: Record>(State(state): State<AppState>) -> Result<Json<Vec<T>>, JsonApiError> {
    Ok(Json(state.content.list_stored::<T>().await?))
}

pub async fn create<T: Record>(
    State(state): State<AppState>,
    Extension(token): Extension<AdminToken>,
    payload: Result<Json<T::Input>, JsonRejection>,
) -> Result<(StatusCode, Json<T>), JsonApiError> {
    let Json(input) = payload.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let created = state.content.create_record::<T>(input, token.caller()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<T: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(token): Extension<AdminToken>,
    payload: Result<Json<T::Input>, JsonRejection>,
) -> Result<Json<T>, JsonApiError> {
    let Json(input) = payload.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    Ok(Json(state.content.update_record::<T>(&id, input, token.caller()).await?))
}

pub async fn remove<T: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(token): Extension<AdminToken>,
) -> Result<StatusCode, JsonApiError> {
    state.content.delete_record::<T>(&id, token.caller()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `multipart/form-data` with one `file` field; answers with the public URL.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(token): Extension<AdminToken>,
    mut multipart: Multipart,
) -> Result<Json<UploadOutput>, JsonApiError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| JsonApiError::new(e.status(), e.body_text()))?;
        file = Some(ImageFile { filename, bytes: bytes.to_vec(), content_type });
        break;
    }
    let url = state.uploader.upload_image(file, token.caller()).await?;
    Ok(Json(UploadOutput { url }))
}
