use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::list_query::{ListEnvelope, ListQuery};
use crate::core::state::AppState;
use crate::repositories;
use crate::repositories::list::run_list;
use crate::schemas::user::UserResponse;
use crate::schemas::DataEnvelope;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_users)).route("/:user_id", get(get_user))
}

async fn list_users(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListEnvelope>, ApiError> {
    let query = ListQuery::from_params(&params);
    let page = run_list(state.db(), &repositories::users::LISTABLE, &query, &[]).await?;
    Ok(Json(ListEnvelope::new(&query, page.total, page.records)))
}

async fn get_user(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<DataEnvelope<UserResponse>>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound(format!("User {user_id} not found")))?;

    Ok(Json(DataEnvelope::new(UserResponse::from_db(user))))
}
