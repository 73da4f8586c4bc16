use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use super::domain::{ItemDraft, StockTransaction};
use super::repository::{InventoryRepository, RepositoryError};
use super::service::{InventoryService, ServiceError};

/// Router builder exposing the inventory CRUD and transaction endpoints.
pub fn inventory_router<R>(service: Arc<InventoryService<R>>) -> Router
where
    R: InventoryRepository + 'static,
{
    Router::new()
        .route("/api/v1/inventory", get(list_handler::<R>))
        .route("/api/v1/inventory", post(add_handler::<R>))
        .route("/api/v1/inventory/:id", put(update_handler::<R>))
        .route("/api/v1/inventory/:id", delete(remove_handler::<R>))
        .route(
            "/api/v1/inventory/:id/transactions",
            post(transaction_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SnapshotQuery {
    /// Evaluation date for status derivation; defaults to today.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    today: Option<NaiveDate>,
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(serde::de::Error::custom)
        })
        .transpose()
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<InventoryService<R>>>,
    Query(params): Query<SnapshotQuery>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    let today = params.today.unwrap_or_else(|| Local::now().date_naive());
    match service.snapshot(today) {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_handler<R>(
    State(service): State<Arc<InventoryService<R>>>,
    Json(draft): Json<ItemDraft>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    match service.add_item(draft) {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<InventoryService<R>>>,
    Path(id): Path<u64>,
    Json(draft): Json<ItemDraft>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    match service.update_item(id, draft) {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_handler<R>(
    State(service): State<Arc<InventoryService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    match service.remove_item(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transaction_handler<R>(
    State(service): State<Arc<InventoryService<R>>>,
    Path(id): Path<u64>,
    Json(transaction): Json<StockTransaction>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    match service.record_transaction(id, transaction) {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
