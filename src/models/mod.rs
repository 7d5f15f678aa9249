mod transaction;

pub use transaction::{
    column_for, external_for, CreateTransaction, FieldChange, FieldKind, FieldValue, NewTransaction,
    Transaction,
};
