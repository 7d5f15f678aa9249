pub mod csv_import_service;
pub mod transaction_service;
