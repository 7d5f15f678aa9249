use sqlx::sqlite::SqliteQueryResult;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{FieldChange, FieldValue, NewTransaction, Transaction};

const SELECT_COLUMNS: &str = "SELECT id, company, type, quantity, price, amount_payable, date,
        initial_investment, transaction_source, initial_selling_amount, holding_type,
        investment, broker_commission, sebon_fee, dp_charge, total_commission,
        profit_before_tax, capital_gain_tax, net_profit_loss, net_profit_loss_percentage,
        amount_receivable, wacc
    FROM transactions";

pub async fn create_table(pool: &SqlitePool) -> Result<SqliteQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company TEXT NOT NULL,
            type TEXT NOT NULL,
            quantity REAL NOT NULL,
            price REAL NOT NULL,
            amount_payable REAL,
            date TEXT NOT NULL,
            initial_investment REAL,
            transaction_source TEXT,
            initial_selling_amount REAL,
            holding_type TEXT,
            investment REAL,
            broker_commission REAL,
            sebon_fee REAL,
            dp_charge REAL,
            total_commission REAL,
            profit_before_tax REAL,
            capital_gain_tax REAL,
            net_profit_loss REAL,
            net_profit_loss_percentage REAL,
            amount_receivable REAL,
            wacc REAL
        )
        "#,
    )
    .execute(pool)
    .await
}

pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))
        .fetch_all(pool)
        .await
}

pub async fn fetch_one(pool: &SqlitePool, id: i64) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM transactions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Inserts one row inside the caller's transaction and returns the new id.
pub async fn insert(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    input: &NewTransaction,
) -> Result<i64, sqlx::Error> {
    let extra = &input.extra;
    let id = sqlx::query(
        r#"
        INSERT INTO transactions
        (company, type, quantity, price, amount_payable, date,
         initial_investment, transaction_source, initial_selling_amount, holding_type,
         investment, broker_commission, sebon_fee, dp_charge, total_commission,
         profit_before_tax, capital_gain_tax, net_profit_loss, net_profit_loss_percentage,
         amount_receivable, wacc)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.company)
    .bind(&input.transaction_type)
    .bind(input.quantity)
    .bind(input.price)
    .bind(extra.amount_payable)
    .bind(&input.date)
    .bind(extra.initial_investment)
    .bind(&extra.transaction_source)
    .bind(extra.initial_selling_amount)
    .bind(&extra.holding_type)
    .bind(extra.investment)
    .bind(extra.broker_commission)
    .bind(extra.sebon_fee)
    .bind(extra.dp_charge)
    .bind(extra.total_commission)
    .bind(extra.profit_before_tax)
    .bind(extra.capital_gain_tax)
    .bind(extra.net_profit_loss)
    .bind(extra.net_profit_loss_percentage)
    .bind(extra.amount_receivable)
    .bind(extra.wacc)
    .execute(&mut **tx)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn create(pool: &SqlitePool, input: &NewTransaction) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let id = insert(&mut tx, input).await?;
    tx.commit().await?;
    Ok(id)
}

/// Inserts every row or none of them.
pub async fn create_many(pool: &SqlitePool, inputs: &[NewTransaction]) -> Result<Vec<i64>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(inputs.len());
    for input in inputs {
        ids.push(insert(&mut tx, input).await?);
    }
    tx.commit().await?;
    Ok(ids)
}

/// Applies the column changes to one row. Returns the number of rows touched,
/// so zero means the id is unknown and nothing was committed.
pub async fn update(pool: &SqlitePool, id: i64, changes: &[FieldChange]) -> Result<u64, sqlx::Error> {
    if changes.is_empty() {
        return Ok(u64::from(exists(pool, id).await?));
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE transactions SET ");
    let mut assignments = builder.separated(", ");
    for change in changes {
        // Column names come from the static mapping table, never from the request.
        assignments.push(change.column);
        assignments.push_unseparated(" = ");
        match &change.value {
            FieldValue::Text(v) => assignments.push_bind_unseparated(v.clone()),
            FieldValue::Real(v) => assignments.push_bind_unseparated(*v),
        };
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let mut tx = pool.begin().await?;
    let result = builder.build().execute(&mut *tx).await?;
    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(0);
    }
    tx.commit().await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(0);
    }
    tx.commit().await?;
    Ok(result.rows_affected())
}
