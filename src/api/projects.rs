use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use time::PrimitiveDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::list_query::{ListEnvelope, ListQuery};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::list::{parse_timestamp, run_list};
use crate::schemas::project::{ProjectCreate, ProjectResponse, ProjectUpdate};
use crate::schemas::DataEnvelope;
use crate::services::slugs::slugify;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_projects)).route(
        "/:project_id",
        get(get_project).put(update_project).delete(delete_project),
    )
}

/// Routes nested under `/customers/:customer_id/projects`.
pub(crate) fn customer_router() -> Router<AppState> {
    Router::new().route("/", get(list_customer_projects).post(create_project))
}

async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListEnvelope>, ApiError> {
    let query = ListQuery::from_params(&params);
    let page =
        run_list(state.db(), &repositories::projects::LISTABLE, &query, &["customer"]).await?;
    Ok(Json(ListEnvelope::new(&query, page.total, page.records)))
}

async fn list_customer_projects(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(customer_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListEnvelope>, ApiError> {
    ensure_customer_exists(&state, &customer_id).await?;

    let query = ListQuery::from_params(&params).with_filter("customer_id", &customer_id);
    let page = run_list(state.db(), &repositories::projects::LISTABLE, &query, &[]).await?;
    Ok(Json(ListEnvelope::new(&query, page.total, page.records)))
}

async fn get_project(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(project_id): Path<String>,
) -> Result<Json<DataEnvelope<serde_json::Value>>, ApiError> {
    let project = repositories::projects::find_by_id(state.db(), &project_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load project"))?
        .ok_or_else(|| ApiError::NotFound(format!("Project {project_id} not found")))?;

    let customer = repositories::customers::find_by_id(state.db(), &project.customer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load customer"))?;

    let mut data = serde_json::to_value(ProjectResponse::from_db(project))
        .map_err(|e| ApiError::internal(e, "Failed to serialize project"))?;
    if let Some(map) = data.as_object_mut() {
        let expanded = customer
            .map(|customer| json!({"id": customer.id, "name": customer.name, "status": customer.status}))
            .unwrap_or(serde_json::Value::Null);
        map.insert("customer".to_string(), expanded);
    }

    Ok(Json(DataEnvelope::new(data)))
}

async fn create_project(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(customer_id): Path<String>,
    Json(payload): Json<ProjectCreate>,
) -> Result<(StatusCode, Json<DataEnvelope<ProjectResponse>>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ensure_customer_exists(&state, &customer_id).await?;

    let start_date = parse_date_field(payload.start_date.as_deref(), "start_date")?;
    let end_date = parse_date_field(payload.end_date.as_deref(), "end_date")?;

    let slug = slugify(&payload.title);
    let now = primitive_now_utc();
    let project = repositories::projects::create(
        state.db(),
        repositories::projects::CreateProject {
            id: &Uuid::new_v4().to_string(),
            customer_id: &customer_id,
            title: &payload.title,
            slug: &slug,
            description: payload.description.as_deref(),
            status: payload.status,
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create project"))?;

    tracing::info!(project_id = %project.id, customer_id = %customer_id, "Project created");

    Ok((StatusCode::CREATED, Json(DataEnvelope::new(ProjectResponse::from_db(project)))))
}

async fn update_project(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(project_id): Path<String>,
    Json(payload): Json<ProjectUpdate>,
) -> Result<Json<DataEnvelope<ProjectResponse>>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let start_date = parse_date_field(payload.start_date.as_deref(), "start_date")?;
    let end_date = parse_date_field(payload.end_date.as_deref(), "end_date")?;

    // Slug tracks the title.
    let slug = payload.title.as_deref().map(slugify);

    let project = repositories::projects::update(
        state.db(),
        &project_id,
        repositories::projects::UpdateProject {
            title: payload.title,
            slug,
            description: payload.description,
            status: payload.status,
            start_date,
            end_date,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update project"))?
    .ok_or_else(|| ApiError::NotFound(format!("Project {project_id} not found")))?;

    Ok(Json(DataEnvelope::new(ProjectResponse::from_db(project))))
}

async fn delete_project(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(project_id): Path<String>,
) -> Result<Json<DataEnvelope<serde_json::Value>>, ApiError> {
    let deleted = repositories::projects::delete(state.db(), &project_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete project"))?;

    if !deleted {
        return Err(ApiError::NotFound(format!("Project {project_id} not found")));
    }

    tracing::info!(project_id = %project_id, "Project deleted");

    Ok(Json(DataEnvelope::new(json!({}))))
}

async fn ensure_customer_exists(state: &AppState, customer_id: &str) -> Result<(), ApiError> {
    let customer = repositories::customers::find_by_id(state.db(), customer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load customer"))?;
    if customer.is_none() {
        return Err(ApiError::NotFound(format!("Customer {customer_id} not found")));
    }
    Ok(())
}

fn parse_date_field(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<PrimitiveDateTime>, ApiError> {
    match raw {
        None => Ok(None),
        Some(value) => parse_timestamp(value)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid date for {field}: {value}"))),
    }
}

#[cfg(test)]
mod tests;
