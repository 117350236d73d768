//! HTTP handlers over the moderation services

mod analysis;
mod queue;
mod rules;

use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::ModerationStore;
use crate::error::{ModerationError, Result};
use crate::services::{ActionExecutor, ContentAnalyzer, QueueService, RuleService, StatsService};

const USER_ID_HEADER: &str = "x-user-id";

/// Services shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub rules: RuleService,
    pub queue: QueueService,
    pub stats: StatsService,
    pub actions: ActionExecutor,
    pub analyzer: Arc<dyn ContentAnalyzer>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ModerationStore>,
        analyzer: Arc<dyn ContentAnalyzer>,
        default_queue_limit: i64,
    ) -> Self {
        Self {
            rules: RuleService::new(store.clone()),
            queue: QueueService::new(store.clone()).with_default_limit(default_queue_limit),
            stats: StatsService::new(store.clone()),
            actions: ActionExecutor::new(store),
            analyzer,
        }
    }
}

/// Register health, metrics and API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/health",
        web::get().to(|| async { HttpResponse::Ok().body("OK") }),
    )
    .route(
        "/ready",
        web::get().to(|| async { HttpResponse::Ok().body("READY") }),
    )
    .route("/metrics", web::get().to(metrics))
    .service(
        web::scope("/api/v1")
            .service(
                web::scope("/creators/{creator_id}")
                    .route("/rules", web::get().to(rules::list_rules))
                    .route("/rules", web::post().to(rules::create_rule))
                    .route("/queue", web::get().to(queue::list_queue))
                    .route("/queue", web::post().to(queue::add_to_queue))
                    .route("/stats", web::get().to(queue::get_stats)),
            )
            .service(
                web::scope("/rules")
                    .route("/{rule_id}", web::get().to(rules::get_rule))
                    .route("/{rule_id}", web::patch().to(rules::update_rule))
                    .route("/{rule_id}", web::delete().to(rules::deactivate_rule)),
            )
            .service(
                web::scope("/queue")
                    .route("/{item_id}", web::get().to(queue::get_item))
                    .route("/{item_id}/actions", web::get().to(queue::get_item_actions))
                    .route("/{item_id}/review", web::post().to(queue::review_item)),
            )
            .route(
                "/users/{user_id}/actions",
                web::get().to(queue::get_user_actions),
            )
            .route("/analyze", web::post().to(analysis::analyze_content)),
    );
}

async fn metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(crate::metrics::render())
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ModerationError::InvalidInput(format!("Invalid {}", what)))
}

fn extract_user_id(req: &HttpRequest) -> Result<Uuid> {
    let header_value = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| ModerationError::Unauthorized("Missing x-user-id header".into()))?;

    let value = header_value
        .to_str()
        .map_err(|_| ModerationError::Unauthorized("Invalid x-user-id header".into()))?;

    Uuid::parse_str(value)
        .map_err(|_| ModerationError::Unauthorized("Invalid x-user-id header value".into()))
}
