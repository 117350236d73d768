use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

use super::AppState;
use crate::error::{ModerationError, Result};

#[derive(Debug, Deserialize)]
pub struct AnalyzeContentRequest {
    pub content_type: String,
    pub content: Value,
}

pub async fn analyze_content(
    state: web::Data<AppState>,
    payload: web::Json<AnalyzeContentRequest>,
) -> Result<HttpResponse> {
    let request = payload.into_inner();
    if request.content_type.trim().is_empty() {
        return Err(ModerationError::InvalidInput(
            "content_type must not be empty".to_string(),
        ));
    }

    let analysis = state
        .analyzer
        .analyze(&request.content_type, &request.content)
        .await?;
    Ok(HttpResponse::Ok().json(analysis))
}
