pub(crate) mod health;
pub(crate) mod index;
pub(crate) mod transactions;
