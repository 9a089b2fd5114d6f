//! HTTP слой: отдаёт готовый результат только на чтение

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::types::PcaPayload;

#[derive(Clone)]
pub struct AppState {
    payload: Arc<PcaPayload>,
    /// JSON сериализуется один раз; все клиенты получают одни и те же байты.
    payload_json: Bytes,
}

impl AppState {
    pub fn new(payload: PcaPayload) -> Result<Self, serde_json::Error> {
        let payload_json = Bytes::from(serde_json::to_vec(&payload)?);
        Ok(Self {
            payload: Arc::new(payload),
            payload_json,
        })
    }

    pub fn payload(&self) -> &PcaPayload {
        &self.payload
    }
}

pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    let app = Router::new()
        .route("/pca", get(pca))
        .route("/health", get(health));

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(cors).with_state(state)
}

async fn pca(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        state.payload_json.clone(),
    )
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "points": state.payload().points.len(),
    }))
}
