use axum::extract::rejection::{JsonRejection, PathRejection, StringRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{CreateTransaction, Transaction};
use crate::services::{csv_import_service, transaction_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/import", post(import_transactions))
        .route(
            "/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub imported: usize,
    pub ids: Vec<i64>,
}

fn path_id(path: Result<Path<i64>, PathRejection>, action: &str) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|e| {
        let e = AppError::from(e);
        log_failure(action, &e);
        e
    })
}

fn log_failure(action: &str, e: &AppError) {
    match e {
        AppError::Db(_) => error!("Failed to {}: {}", action, e),
        _ => warn!("Rejected {}: {}", action, e),
    }
}

pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    info!("GET /api/transactions - Listing transactions");
    let transactions = transaction_service::fetch_all(&state.pool)
        .await
        .map_err(|e| {
            log_failure("list transactions", &e);
            e
        })?;
    Ok(Json(transactions))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<CreateTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    info!("POST /api/transactions - Creating transaction");
    let Json(data) = payload.map_err(|e| {
        let e = AppError::from(e);
        log_failure("create transaction", &e);
        e
    })?;

    let id = transaction_service::create(&state.pool, data)
        .await
        .map_err(|e| {
            log_failure("create transaction", &e);
            e
        })?;

    info!("Created transaction {}", id);
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Transaction added successfully!".to_string(),
            id,
        }),
    ))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Transaction>, AppError> {
    let id = path_id(path, "fetch transaction")?;
    info!("GET /api/transactions/{} - Fetching transaction", id);
    let transaction = transaction_service::fetch_one(&state.pool, id)
        .await
        .map_err(|e| {
            log_failure(&format!("fetch transaction {}", id), &e);
            e
        })?;
    Ok(Json(transaction))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = path_id(path, "update transaction")?;
    info!("PUT /api/transactions/{} - Updating transaction", id);
    let action = format!("update transaction {}", id);
    let Json(data) = payload.map_err(|e| {
        let e = AppError::from(e);
        log_failure(&action, &e);
        e
    })?;

    transaction_service::update(&state.pool, id, data)
        .await
        .map_err(|e| {
            log_failure(&action, &e);
            e
        })?;

    Ok(Json(MessageResponse {
        message: format!("Transaction {} updated successfully!", id),
    }))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = path_id(path, "delete transaction")?;
    info!("DELETE /api/transactions/{} - Deleting transaction", id);
    transaction_service::delete(&state.pool, id)
        .await
        .map_err(|e| {
            log_failure(&format!("delete transaction {}", id), &e);
            e
        })?;

    Ok(Json(MessageResponse {
        message: format!("Transaction {} deleted successfully!", id),
    }))
}

pub async fn import_transactions(
    State(state): State<AppState>,
    body: Result<String, StringRejection>,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    let body = body.map_err(|e| {
        let e = AppError::from(e);
        log_failure("import transactions", &e);
        e
    })?;
    info!("POST /api/transactions/import - Importing CSV ({} bytes)", body.len());
    let ids = csv_import_service::import(&state.pool, &body)
        .await
        .map_err(|e| {
            log_failure("import transactions", &e);
            e
        })?;

    info!("Imported {} transactions", ids.len());
    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            message: "Transactions imported successfully!".to_string(),
            imported: ids.len(),
            ids,
        }),
    ))
}
