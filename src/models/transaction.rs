use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// One buy or sell event. Financial fields are caller-computed and stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub company: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub transaction_type: String,
    pub quantity: f64,
    pub price: f64,
    pub amount_payable: Option<f64>,
    pub date: String,
    pub initial_investment: Option<f64>,
    pub transaction_source: Option<String>,
    pub initial_selling_amount: Option<f64>,
    pub holding_type: Option<String>,
    pub investment: Option<f64>,
    pub broker_commission: Option<f64>,
    pub sebon_fee: Option<f64>,
    pub dp_charge: Option<f64>,
    pub total_commission: Option<f64>,
    pub profit_before_tax: Option<f64>,
    pub capital_gain_tax: Option<f64>,
    pub net_profit_loss: Option<f64>,
    pub net_profit_loss_percentage: Option<f64>,
    pub amount_receivable: Option<f64>,
    pub wacc: Option<f64>,
}

/// Create payload. Required fields are optional here so that the service can
/// report every missing one instead of failing on the first serde error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub company: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub amount_payable: Option<f64>,
    pub date: Option<String>,
    pub initial_investment: Option<f64>,
    pub transaction_source: Option<String>,
    pub initial_selling_amount: Option<f64>,
    pub holding_type: Option<String>,
    pub investment: Option<f64>,
    pub broker_commission: Option<f64>,
    pub sebon_fee: Option<f64>,
    pub dp_charge: Option<f64>,
    pub total_commission: Option<f64>,
    pub profit_before_tax: Option<f64>,
    pub capital_gain_tax: Option<f64>,
    pub net_profit_loss: Option<f64>,
    pub net_profit_loss_percentage: Option<f64>,
    pub amount_receivable: Option<f64>,
    pub wacc: Option<f64>,
}

/// A create payload whose required fields have been checked.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub company: String,
    pub transaction_type: String,
    pub quantity: f64,
    pub price: f64,
    pub date: String,
    pub extra: CreateTransaction,
}

impl CreateTransaction {
    /// External names of required fields that are absent or null.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.company.is_none() {
            missing.push("company");
        }
        if self.transaction_type.is_none() {
            missing.push("type");
        }
        if self.quantity.is_none() {
            missing.push("quantity");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        missing
    }

    pub fn into_new(self) -> Result<NewTransaction, Vec<&'static str>> {
        match (
            self.company.clone(),
            self.transaction_type.clone(),
            self.quantity,
            self.price,
            self.date.clone(),
        ) {
            (Some(company), Some(transaction_type), Some(quantity), Some(price), Some(date)) => {
                Ok(NewTransaction {
                    company,
                    transaction_type,
                    quantity,
                    price,
                    date,
                    extra: self,
                })
            }
            _ => Err(self.missing_required()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub external: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(external: &'static str, column: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec { external, column, kind, required }
}

/// Every mutable attribute, in column order. `id` is deliberately absent.
pub const TRANSACTION_FIELDS: &[FieldSpec] = &[
    field("company", "company", FieldKind::Text, true),
    field("type", "type", FieldKind::Text, true),
    field("quantity", "quantity", FieldKind::Real, true),
    field("price", "price", FieldKind::Real, true),
    field("amountPayable", "amount_payable", FieldKind::Real, false),
    field("date", "date", FieldKind::Text, true),
    field("initialInvestment", "initial_investment", FieldKind::Real, false),
    field("transactionSource", "transaction_source", FieldKind::Text, false),
    field("initialSellingAmount", "initial_selling_amount", FieldKind::Real, false),
    field("holdingType", "holding_type", FieldKind::Text, false),
    field("investment", "investment", FieldKind::Real, false),
    field("brokerCommission", "broker_commission", FieldKind::Real, false),
    field("sebonFee", "sebon_fee", FieldKind::Real, false),
    field("dpCharge", "dp_charge", FieldKind::Real, false),
    field("totalCommission", "total_commission", FieldKind::Real, false),
    field("profitBeforeTax", "profit_before_tax", FieldKind::Real, false),
    field("capitalGainTax", "capital_gain_tax", FieldKind::Real, false),
    field("netProfitLoss", "net_profit_loss", FieldKind::Real, false),
    field("netProfitLossPercentage", "net_profit_loss_percentage", FieldKind::Real, false),
    field("amountReceivable", "amount_receivable", FieldKind::Real, false),
    field("wacc", "wacc", FieldKind::Real, false),
];

pub fn column_for(external: &str) -> Option<&'static FieldSpec> {
    TRANSACTION_FIELDS.iter().find(|f| f.external == external)
}

pub fn external_for(column: &str) -> Option<&'static FieldSpec> {
    TRANSACTION_FIELDS.iter().find(|f| f.column == column)
}

/// A single column assignment resolved from a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Real(Option<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub column: &'static str,
    pub value: FieldValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction {
            id: 7,
            company: "NABIL".into(),
            transaction_type: "Buy".into(),
            quantity: 10.0,
            price: 500.0,
            amount_payable: Some(5042.75),
            date: "2024-01-01".into(),
            initial_investment: Some(5000.0),
            transaction_source: Some("Secondary".into()),
            initial_selling_amount: None,
            holding_type: None,
            investment: None,
            broker_commission: Some(18.0),
            sebon_fee: Some(0.75),
            dp_charge: Some(25.0),
            total_commission: Some(43.75),
            profit_before_tax: None,
            capital_gain_tax: None,
            net_profit_loss: None,
            net_profit_loss_percentage: None,
            amount_receivable: None,
            wacc: Some(504.275),
        }
    }

    #[test]
    fn serialized_keys_match_mapping_table() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        let mut expected: Vec<&str> = TRANSACTION_FIELDS.iter().map(|f| f.external).collect();
        expected.push("id");
        expected.sort();
        let mut actual: Vec<&str> = object.keys().map(String::as_str).collect();
        actual.sort();

        assert_eq!(actual, expected);
    }

    #[test]
    fn lookup_is_bidirectional() {
        for spec in TRANSACTION_FIELDS {
            assert_eq!(column_for(spec.external), Some(spec));
            assert_eq!(external_for(spec.column), Some(spec));
        }
        assert_eq!(column_for("amountPayable").unwrap().column, "amount_payable");
        assert_eq!(external_for("net_profit_loss_percentage").unwrap().external, "netProfitLossPercentage");
    }

    #[test]
    fn identity_is_not_mapped() {
        assert!(column_for("id").is_none());
        assert!(external_for("id").is_none());
        assert!(column_for("amount_payable").is_none());
    }

    #[test]
    fn create_payload_reports_all_missing_required_fields() {
        let payload: CreateTransaction =
            serde_json::from_value(serde_json::json!({ "type": "Buy", "quantity": 1, "price": 10 })).unwrap();
        assert_eq!(payload.into_new().unwrap_err(), vec!["company", "date"]);
    }

    #[test]
    fn create_payload_reads_camel_case_names() {
        let payload: CreateTransaction = serde_json::from_value(serde_json::json!({
            "company": "NABIL",
            "type": "Sell",
            "quantity": 5,
            "price": 600.5,
            "date": "2024-02-01",
            "capitalGainTax": 12.5,
            "holdingType": "Long Term"
        }))
        .unwrap();
        let new = payload.into_new().unwrap();
        assert_eq!(new.transaction_type, "Sell");
        assert_eq!(new.extra.capital_gain_tax, Some(12.5));
        assert_eq!(new.extra.holding_type.as_deref(), Some("Long Term"));
        assert_eq!(new.extra.wacc, None);
    }
}
