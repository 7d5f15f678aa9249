use csv::{ReaderBuilder, StringRecord, Trim};
use sqlx::SqlitePool;

use crate::db;
use crate::errors::AppError;
use crate::models::{CreateTransaction, NewTransaction};

const DEFAULT_SOURCE: &str = "Secondary";
const DEFAULT_SELL_HOLDING: &str = "Short Term";

/// Parses the upload format: a header row, then
/// `Company Symbol, Transaction Date, Type, Quantity, Price` by position.
/// The first bad row fails the whole file.
pub fn parse(content: &str) -> Result<Vec<NewTransaction>, AppError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        // Row numbers as a spreadsheet shows them: header is row 1.
        let row = index + 2;
        let record = record
            .map_err(|e| AppError::Validation(format!("Error parsing CSV: {}", e)))?;
        rows.push(parse_row(row, &record)?);
    }

    if rows.is_empty() {
        return Err(AppError::Validation("CSV file contains no transactions".into()));
    }
    Ok(rows)
}

fn parse_row(row: usize, record: &StringRecord) -> Result<NewTransaction, AppError> {
    if record.len() < 5 {
        return Err(AppError::Validation(format!("Row {} has insufficient data", row)));
    }

    let field = |i: usize| record.get(i).unwrap_or_default();
    let (company, date, kind, quantity, price) = (field(0), field(1), field(2), field(3), field(4));
    if [company, date, kind, quantity, price].iter().any(|v| v.is_empty()) {
        return Err(AppError::Validation(format!("Row {} has missing required fields", row)));
    }
    if kind != "Buy" && kind != "Sell" {
        return Err(AppError::Validation(format!("Row {} has invalid transaction type", row)));
    }

    let number = |v: &str| {
        v.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| AppError::Validation(format!("Row {} has an invalid number", row)))
    };
    let quantity = number(quantity)?;
    let price = number(price)?;

    let extra = CreateTransaction {
        transaction_source: Some(DEFAULT_SOURCE.to_string()),
        holding_type: (kind == "Sell").then(|| DEFAULT_SELL_HOLDING.to_string()),
        ..Default::default()
    };

    Ok(NewTransaction {
        company: company.to_string(),
        transaction_type: kind.to_string(),
        quantity,
        price,
        date: date.to_string(),
        extra,
    })
}

pub async fn import(pool: &SqlitePool, content: &str) -> Result<Vec<i64>, AppError> {
    let rows = parse(content)?;
    let ids = db::transaction_queries::create_many(pool, &rows).await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transaction_service;
    use crate::test_support::memory_pool;

    const HEADER: &str = "Company Symbol,Transaction Date,Type,Quantity,Price\n";

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(m) => m,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn parses_rows_with_defaults() {
        let content = format!("{HEADER} NABIL , 2024-01-01, Buy, 10, 500\n\nNICA,2024-02-01,Sell,5,720.5\n");
        let rows = parse(&content).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].company, "NABIL");
        assert_eq!(rows[0].extra.transaction_source.as_deref(), Some("Secondary"));
        assert_eq!(rows[0].extra.holding_type, None);
        assert_eq!(rows[1].price, 720.5);
        assert_eq!(rows[1].extra.holding_type.as_deref(), Some("Short Term"));
    }

    #[test]
    fn reports_row_numbers() {
        let short = format!("{HEADER}NABIL,2024-01-01,Buy,10,500\nNICA,2024-01-01,Buy\n");
        assert_eq!(message(parse(&short).unwrap_err()), "Row 3 has insufficient data");

        let missing = format!("{HEADER}NABIL,,Buy,10,500\n");
        assert_eq!(message(parse(&missing).unwrap_err()), "Row 2 has missing required fields");

        let kind = format!("{HEADER}NABIL,2024-01-01,Hold,10,500\n");
        assert_eq!(message(parse(&kind).unwrap_err()), "Row 2 has invalid transaction type");

        let number = format!("{HEADER}NABIL,2024-01-01,Buy,ten,500\n");
        assert_eq!(message(parse(&number).unwrap_err()), "Row 2 has an invalid number");

        let not_finite = format!("{HEADER}NABIL,2024-01-01,Buy,10,NaN\n");
        assert_eq!(message(parse(&not_finite).unwrap_err()), "Row 2 has an invalid number");
    }

    #[test]
    fn comma_only_row_is_missing_fields() {
        let content = format!("{HEADER}NABIL,2024-01-01,Buy,10,500\n,,,,\n");
        assert_eq!(message(parse(&content).unwrap_err()), "Row 3 has missing required fields");
    }

    #[test]
    fn header_only_is_rejected() {
        assert!(matches!(parse(HEADER), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn import_is_all_or_nothing() {
        let pool = memory_pool().await;

        let bad = format!("{HEADER}NABIL,2024-01-01,Buy,10,500\nNICA,2024-01-01,Swap,1,1\n");
        assert!(import(&pool, &bad).await.is_err());
        assert!(transaction_service::fetch_all(&pool).await.unwrap().is_empty());

        let good = format!("{HEADER}NABIL,2024-01-01,Buy,10,500\nNICA,2024-01-02,Sell,1,1\n");
        let ids = import(&pool, &good).await.unwrap();
        let stored = transaction_service::fetch_all(&pool).await.unwrap();
        assert_eq!(stored.iter().map(|t| t.id).collect::<Vec<_>>(), ids);
    }
}
