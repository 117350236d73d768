use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use super::{extract_user_id, parse_id, AppState};
use crate::error::Result;
use crate::models::{AddToQueueInput, QueueStatus, ReviewInput};

#[derive(Debug, Deserialize)]
pub struct ListQueueQuery {
    pub status: Option<QueueStatus>,
    pub limit: Option<i64>,
}

pub async fn add_to_queue(
    state: web::Data<AppState>,
    creator_id: web::Path<String>,
    payload: web::Json<AddToQueueInput>,
) -> Result<HttpResponse> {
    let creator_id = parse_id(&creator_id, "creator ID")?;
    let outcome = state
        .queue
        .add_to_queue(creator_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(outcome))
}

pub async fn list_queue(
    state: web::Data<AppState>,
    creator_id: web::Path<String>,
    query: web::Query<ListQueueQuery>,
) -> Result<HttpResponse> {
    let creator_id = parse_id(&creator_id, "creator ID")?;
    let items = state
        .queue
        .get_creator_queue(creator_id, query.status, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_item(
    state: web::Data<AppState>,
    item_id: web::Path<String>,
) -> Result<HttpResponse> {
    let item_id = parse_id(&item_id, "queue item ID")?;
    let item = state.queue.get_queue_item(item_id).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn get_item_actions(
    state: web::Data<AppState>,
    item_id: web::Path<String>,
) -> Result<HttpResponse> {
    let item_id = parse_id(&item_id, "queue item ID")?;
    let actions = state.queue.get_item_actions(item_id).await?;
    Ok(HttpResponse::Ok().json(actions))
}

/// Reviewer is the caller identified by `x-user-id`
pub async fn review_item(
    req: HttpRequest,
    state: web::Data<AppState>,
    item_id: web::Path<String>,
    payload: web::Json<ReviewInput>,
) -> Result<HttpResponse> {
    let reviewer_id = extract_user_id(&req)?;
    let item_id = parse_id(&item_id, "queue item ID")?;
    let outcome = state
        .queue
        .review_queue_item(item_id, reviewer_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Unexpired actions targeting a user
pub async fn get_user_actions(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = parse_id(&user_id, "user ID")?;
    let actions = state
        .actions
        .active_actions_for_user(user_id, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(actions))
}

pub async fn get_stats(
    state: web::Data<AppState>,
    creator_id: web::Path<String>,
) -> Result<HttpResponse> {
    let creator_id = parse_id(&creator_id, "creator ID")?;
    let stats = state.stats.get_moderation_stats(creator_id).await?;
    Ok(HttpResponse::Ok().json(stats))
}
