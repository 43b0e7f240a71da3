use axum::extract::{Path, Query, State};
use axum::Json;
use models::{Project, Record};
use serde::Deserialize;

use crate::errors::JsonApiError;
use crate::state::AppState;

/// Every record of one kind; never fails, see the fallback policy.
pub async fn list<T: Record>(State(state): State<AppState>) -> Json<Vec<T>> {
    Json(state.content.fetch_collection::<T>().await)
}

pub async fn get_one<T: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<T>, JsonApiError> {
    state
        .content
        .fetch_by_id::<T>(&id)
        .await
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found(format!("{} {id} not found", T::KIND)))
}

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub category: Option<String>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Query(q): Query<ProjectQuery>,
) -> Json<Vec<Project>> {
    let category = q.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    Json(state.content.fetch_projects_in_category(category).await)
}

pub async fn project_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.content.fetch_project_categories().await)
}
