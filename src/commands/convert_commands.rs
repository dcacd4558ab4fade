//! Link conversion and health endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::ConversionService;
use crate::domain::conversion::ConversionError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConversionService>,
}

impl AppState {
    pub fn new(service: ConversionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Body of `POST /api/convert-link`
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_shorten")]
    pub shorten: bool,
}

const fn default_shorten() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub affiliate_tag: String,
}

impl IntoResponse for ConversionError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

/// Convert an Amazon link into a tagged, shortened affiliate link
pub async fn convert_link(
    State(state): State<AppState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected convert-link body: {}", rejection.body_text());
            return ConversionError::InvalidInput.into_response();
        }
    };

    info!("convert-link request (shorten: {})", request.shorten);
    match state.service.convert(&request.url, request.shorten).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            info!("convert-link rejected: {}", e);
            e.into_response()
        }
    }
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        affiliate_tag: state.service.affiliate_tag().to_string(),
    })
}
