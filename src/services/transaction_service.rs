use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::debug;

use crate::db;
use crate::errors::AppError;
use crate::models::{
    column_for, external_for, CreateTransaction, FieldChange, FieldKind, FieldValue, Transaction,
};

pub async fn create(pool: &SqlitePool, input: CreateTransaction) -> Result<i64, AppError> {
    let new_transaction = input.into_new().map_err(|missing| {
        AppError::Validation(format!("Missing required field(s): {}", missing.join(", ")))
    })?;
    let id = db::transaction_queries::create(pool, &new_transaction).await?;
    Ok(id)
}

pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<Transaction>, AppError> {
    let transactions = db::transaction_queries::fetch_all(pool).await?;
    Ok(transactions)
}

pub async fn fetch_one(pool: &SqlitePool, id: i64) -> Result<Transaction, AppError> {
    db::transaction_queries::fetch_one(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn update(pool: &SqlitePool, id: i64, input: Value) -> Result<(), AppError> {
    let changes = resolve_changes(input)?;
    debug!(
        "Updating transaction {} fields: {:?}",
        id,
        changes
            .iter()
            .filter_map(|c| external_for(c.column).map(|f| f.external))
            .collect::<Vec<_>>()
    );
    match db::transaction_queries::update(pool, id, &changes).await? {
        0 => Err(not_found(id)),
        _ => Ok(()),
    }
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    match db::transaction_queries::delete(pool, id).await? {
        0 => Err(not_found(id)),
        _ => Ok(()),
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Transaction {} not found", id))
}

/// Turns a partial JSON object into column assignments using the mapping table.
/// Keys outside the table (including `id`) are rejected rather than ignored.
pub fn resolve_changes(input: Value) -> Result<Vec<FieldChange>, AppError> {
    let object: Map<String, Value> = match input {
        Value::Object(object) => object,
        _ => return Err(AppError::Validation("Request body must be a JSON object".into())),
    };

    let unknown: Vec<&str> = object
        .keys()
        .filter(|k| column_for(k).is_none())
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::Validation(format!(
            "Unknown or immutable field(s): {}",
            unknown.join(", ")
        )));
    }

    let mut changes = Vec::with_capacity(object.len());
    for (key, value) in &object {
        let Some(spec) = column_for(key) else { continue };
        let value = match (spec.kind, value) {
            (_, Value::Null) if spec.required => {
                return Err(AppError::Validation(format!("Field '{}' cannot be null", key)));
            }
            (FieldKind::Text, Value::Null) => FieldValue::Text(None),
            (FieldKind::Real, Value::Null) => FieldValue::Real(None),
            (FieldKind::Text, Value::String(s)) => FieldValue::Text(Some(s.clone())),
            (FieldKind::Real, Value::Number(n)) => match n.as_f64() {
                Some(v) => FieldValue::Real(Some(v)),
                None => return Err(AppError::Validation(format!("Field '{}' must be a number", key))),
            },
            (FieldKind::Text, _) => {
                return Err(AppError::Validation(format!("Field '{}' must be a string", key)));
            }
            (FieldKind::Real, _) => {
                return Err(AppError::Validation(format!("Field '{}' must be a number", key)));
            }
        };
        changes.push(FieldChange { column: spec.column, value });
    }
    Ok(changes)
}
