use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::{parse_id, AppState};
use crate::error::Result;
use crate::models::{CreateRuleInput, UpdateRuleInput};

#[derive(Debug, Deserialize)]
pub struct ListRulesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

pub async fn create_rule(
    state: web::Data<AppState>,
    creator_id: web::Path<String>,
    payload: web::Json<CreateRuleInput>,
) -> Result<HttpResponse> {
    let creator_id = parse_id(&creator_id, "creator ID")?;
    let rule = state
        .rules
        .create_rule(creator_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(rule))
}

pub async fn list_rules(
    state: web::Data<AppState>,
    creator_id: web::Path<String>,
    query: web::Query<ListRulesQuery>,
) -> Result<HttpResponse> {
    let creator_id = parse_id(&creator_id, "creator ID")?;
    let rules = state
        .rules
        .get_creator_rules(creator_id, query.include_inactive)
        .await?;
    Ok(HttpResponse::Ok().json(rules))
}

pub async fn get_rule(
    state: web::Data<AppState>,
    rule_id: web::Path<String>,
) -> Result<HttpResponse> {
    let rule_id = parse_id(&rule_id, "rule ID")?;
    let rule = state.rules.get_rule(rule_id).await?;
    Ok(HttpResponse::Ok().json(rule))
}

pub async fn update_rule(
    state: web::Data<AppState>,
    rule_id: web::Path<String>,
    payload: web::Json<UpdateRuleInput>,
) -> Result<HttpResponse> {
    let rule_id = parse_id(&rule_id, "rule ID")?;
    let rule = state
        .rules
        .update_rule(rule_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(rule))
}

/// Soft delete
pub async fn deactivate_rule(
    state: web::Data<AppState>,
    rule_id: web::Path<String>,
) -> Result<HttpResponse> {
    let rule_id = parse_id(&rule_id, "rule ID")?;
    state.rules.deactivate_rule(rule_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
