use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::PrimitiveDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::list_query::{ListEnvelope, ListQuery};
use crate::api::projects;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::list::{parse_timestamp, run_list};
use crate::schemas::customer::{CustomerCreate, CustomerResponse, CustomerUpdate};
use crate::schemas::DataEnvelope;
use crate::services::slugs::slugify;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:customer_id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .nest("/:customer_id/projects", projects::customer_router())
}

async fn list_customers(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListEnvelope>, ApiError> {
    let query = ListQuery::from_params(&params);
    let page = run_list(state.db(), &repositories::customers::LISTABLE, &query, &[]).await?;
    Ok(Json(ListEnvelope::new(&query, page.total, page.records)))
}

async fn get_customer(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(customer_id): Path<String>,
) -> Result<Json<DataEnvelope<CustomerResponse>>, ApiError> {
    let customer = repositories::customers::find_by_id(state.db(), &customer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load customer"))?
        .ok_or_else(|| ApiError::NotFound(format!("Customer {customer_id} not found")))?;

    Ok(Json(DataEnvelope::new(CustomerResponse::from_db(customer))))
}

async fn create_customer(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(payload): Json<CustomerCreate>,
) -> Result<(StatusCode, Json<DataEnvelope<CustomerResponse>>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let existing = repositories::customers::exists_by_name(state.db(), &payload.name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing customer"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Customer with this name already exists".to_string()));
    }

    let contract_date = parse_date_field(payload.contract_date.as_deref(), "contract_date")?;
    let renewal_date = parse_date_field(payload.renewal_date.as_deref(), "renewal_date")?;

    let slug = slugify(&payload.name);
    let now = primitive_now_utc();
    let customer = repositories::customers::create(
        state.db(),
        repositories::customers::CreateCustomer {
            id: &Uuid::new_v4().to_string(),
            name: &payload.name,
            slug: &slug,
            description: payload.description.as_deref(),
            website: payload.website.as_deref(),
            email: &payload.email,
            phone: payload.phone.as_deref(),
            address: &payload.address,
            status: payload.status,
            contract_date,
            renewal_date,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create customer"))?;

    tracing::info!(customer_id = %customer.id, "Customer created");

    Ok((StatusCode::CREATED, Json(DataEnvelope::new(CustomerResponse::from_db(customer)))))
}

async fn update_customer(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(customer_id): Path<String>,
    Json(payload): Json<CustomerUpdate>,
) -> Result<Json<DataEnvelope<CustomerResponse>>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if let Some(name) = &payload.name {
        let taken = repositories::customers::exists_by_name(state.db(), name)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check existing customer"))?;
        if taken.is_some_and(|id| id != customer_id) {
            return Err(ApiError::Conflict("Customer with this name already exists".to_string()));
        }
    }

    let contract_date = parse_date_field(payload.contract_date.as_deref(), "contract_date")?;
    let renewal_date = parse_date_field(payload.renewal_date.as_deref(), "renewal_date")?;

    // Slug tracks the name.
    let slug = payload.name.as_deref().map(slugify);

    let customer = repositories::customers::update(
        state.db(),
        &customer_id,
        repositories::customers::UpdateCustomer {
            name: payload.name,
            slug,
            description: payload.description,
            website: payload.website,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            status: payload.status,
            contract_date,
            renewal_date,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update customer"))?
    .ok_or_else(|| ApiError::NotFound(format!("Customer {customer_id} not found")))?;

    Ok(Json(DataEnvelope::new(CustomerResponse::from_db(customer))))
}

async fn delete_customer(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(customer_id): Path<String>,
) -> Result<Json<DataEnvelope<serde_json::Value>>, ApiError> {
    let deleted = repositories::customers::delete(state.db(), &customer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete customer"))?;

    if !deleted {
        return Err(ApiError::NotFound(format!("Customer {customer_id} not found")));
    }

    tracing::info!(customer_id = %customer_id, "Customer deleted");

    Ok(Json(DataEnvelope::new(serde_json::json!({}))))
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
