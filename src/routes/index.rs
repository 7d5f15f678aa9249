use axum::Json;
use serde_json::{json, Value};
use tracing::info;

pub async fn status() -> Json<Value> {
    info!("GET / - Service status");
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
        "endpoints": {
            "list": "GET /api/transactions",
            "create": "POST /api/transactions",
            "import": "POST /api/transactions/import",
            "get": "GET /api/transactions/{id}",
            "update": "PUT /api/transactions/{id}",
            "delete": "DELETE /api/transactions/{id}",
            "health": "GET /health"
        }
    }))
}
