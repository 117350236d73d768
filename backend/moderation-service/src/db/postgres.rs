//! PostgreSQL backend

use super::ModerationStore;
use crate::error::Result;
use crate::models::{
    ModerationAction, ModerationQueueItem, ModerationRule, NewModerationAction, NewQueueItem,
    QueueStatus, ReviewUpdate, UpdateRuleInput,
};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

macro_rules! rule_columns {
    () => {
        "id, creator_id, name, description, rule_type, conditions, actions, severity, \
         precedence, is_active, is_auto_enforce, requires_human_review, \
         ai_confidence_threshold, trigger_count, created_at, updated_at"
    };
}

macro_rules! queue_columns {
    () => {
        "id, creator_id, content_type, content_id, content_data, reported_user_id, \
         reporter_user_id, triggered_rule_id, priority, ai_analysis, ai_confidence, \
         ai_recommendation, status, reviewed_by, reviewed_at, review_decision, \
         review_notes, actions_taken, created_at, updated_at"
    };
}

macro_rules! action_columns {
    () => {
        "id, queue_item_id, action_type, action_data, target_user_id, target_content_type, \
         target_content_id, executed_by, executor_user_id, duration_seconds, expires_at, \
         created_at"
    };
}

/// Database operations for moderation rules, queue and actions
pub struct PgModerationStore {
    pool: Arc<PgPool>,
}

impl PgModerationStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModerationStore for PgModerationStore {
    async fn insert_rule(&self, rule: &ModerationRule) -> Result<ModerationRule> {
        let stored = sqlx::query_as::<_, ModerationRule>(concat!(
            "INSERT INTO moderation_rules (",
            rule_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW(), NOW()) \
             RETURNING ",
            rule_columns!()
        ))
        .bind(rule.id)
        .bind(rule.creator_id)
        .bind(&rule.name)
        .bind(&rule.description)
        .bind(&rule.rule_type)
        .bind(Json(&rule.conditions))
        .bind(Json(&rule.actions))
        .bind(rule.severity)
        .bind(rule.precedence)
        .bind(rule.is_active)
        .bind(rule.is_auto_enforce)
        .bind(rule.requires_human_review)
        .bind(rule.ai_confidence_threshold)
        .bind(rule.trigger_count)
        .fetch_one(&*self.pool)
        .await?;

        Ok(stored)
    }

    async fn get_rule(&self, rule_id: Uuid) -> Result<Option<ModerationRule>> {
        let rule = sqlx::query_as::<_, ModerationRule>(concat!(
            "SELECT ",
            rule_columns!(),
            " FROM moderation_rules WHERE id = $1"
        ))
        .bind(rule_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(rule)
    }

    async fn list_rules(
        &self,
        creator_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<ModerationRule>> {
        let rules = sqlx::query_as::<_, ModerationRule>(concat!(
            "SELECT ",
            rule_columns!(),
            " FROM moderation_rules \
             WHERE creator_id = $1 AND ($2 OR is_active) \
             ORDER BY created_at DESC"
        ))
        .bind(creator_id)
        .bind(include_inactive)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rules)
    }

    async fn update_rule(
        &self,
        rule_id: Uuid,
        update: &UpdateRuleInput,
    ) -> Result<Option<ModerationRule>> {
        let rule = sqlx::query_as::<_, ModerationRule>(concat!(
            "UPDATE moderation_rules SET \
                name = COALESCE($2, name), \
                description = CASE WHEN $3::TEXT IS NULL THEN description \
                                   WHEN $3 = '' THEN NULL ELSE $3 END, \
                rule_type = COALESCE($4, rule_type), \
                conditions = COALESCE($5, conditions), \
                actions = COALESCE($6, actions), \
                severity = COALESCE($7, severity), \
                precedence = COALESCE($8, precedence), \
                is_active = COALESCE($9, is_active), \
                is_auto_enforce = COALESCE($10, is_auto_enforce), \
                requires_human_review = COALESCE($11, requires_human_review), \
                ai_confidence_threshold = COALESCE($12, ai_confidence_threshold), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING ",
            rule_columns!()
        ))
        .bind(rule_id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.rule_type)
        .bind(update.conditions.as_ref().map(Json))
        .bind(update.actions.as_ref().map(Json))
        .bind(update.severity)
        .bind(update.precedence)
        .bind(update.is_active)
        .bind(update.is_auto_enforce)
        .bind(update.requires_human_review)
        .bind(update.ai_confidence_threshold)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(rule)
    }

    async fn set_rule_active(&self, rule_id: Uuid, active: bool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE moderation_rules SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(rule_id)
        .bind(active)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_queue_item(&self, item: &NewQueueItem) -> Result<ModerationQueueItem> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, ModerationQueueItem>(concat!(
            "INSERT INTO moderation_queue ( \
                creator_id, content_type, content_id, content_data, reported_user_id, \
                reporter_user_id, triggered_rule_id, priority, ai_analysis, ai_confidence, \
                ai_recommendation, status, actions_taken, created_at, updated_at \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending', '[]'::JSONB, NOW(), NOW()) \
             RETURNING ",
            queue_columns!()
        ))
        .bind(item.creator_id)
        .bind(&item.content_type)
        .bind(&item.content_id)
        .bind(&item.content_data)
        .bind(item.reported_user_id)
        .bind(item.reporter_user_id)
        .bind(item.triggered_rule_id)
        .bind(item.priority)
        .bind(&item.ai_analysis)
        .bind(item.ai_confidence)
        .bind(&item.ai_recommendation)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(rule_id) = item.triggered_rule_id {
            sqlx::query(
                r#"
                UPDATE moderation_rules
                SET trigger_count = trigger_count + 1,
                    updated_at = NOW()
                WHERE id = $1 AND creator_id = $2
                "#,
            )
            .bind(rule_id)
            .bind(item.creator_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(inserted)
    }

    async fn get_queue_item(&self, item_id: Uuid) -> Result<Option<ModerationQueueItem>> {
        let item = sqlx::query_as::<_, ModerationQueueItem>(concat!(
            "SELECT ",
            queue_columns!(),
            " FROM moderation_queue WHERE id = $1"
        ))
        .bind(item_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(item)
    }

    async fn list_queue(
        &self,
        creator_id: Uuid,
        status: Option<QueueStatus>,
        limit: i64,
    ) -> Result<Vec<ModerationQueueItem>> {
        let items = sqlx::query_as::<_, ModerationQueueItem>(concat!(
            "SELECT ",
            queue_columns!(),
            " FROM moderation_queue \
             WHERE creator_id = $1 AND ($2::queue_status IS NULL OR status = $2) \
             ORDER BY priority DESC, created_at DESC \
             LIMIT $3"
        ))
        .bind(creator_id)
        .bind(status)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;

        Ok(items)
    }

    async fn list_all_queue_items(&self, creator_id: Uuid) -> Result<Vec<ModerationQueueItem>> {
        let items = sqlx::query_as::<_, ModerationQueueItem>(concat!(
            "SELECT ",
            queue_columns!(),
            " FROM moderation_queue WHERE creator_id = $1 ORDER BY created_at DESC"
        ))
        .bind(creator_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(items)
    }

    async fn apply_review(
        &self,
        item_id: Uuid,
        update: &ReviewUpdate,
    ) -> Result<Option<ModerationQueueItem>> {
        let item = sqlx::query_as::<_, ModerationQueueItem>(concat!(
            "UPDATE moderation_queue SET \
                status = $2, \
                reviewed_by = $3, \
                reviewed_at = $4, \
                review_decision = $5, \
                review_notes = $6, \
                actions_taken = $7, \
                updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING ",
            queue_columns!()
        ))
        .bind(item_id)
        .bind(update.status)
        .bind(&update.reviewed_by)
        .bind(update.reviewed_at)
        .bind(update.review_decision)
        .bind(&update.review_notes)
        .bind(Json(&update.actions_taken))
        .fetch_optional(&*self.pool)
        .await?;

        Ok(item)
    }

    async fn insert_action(&self, action: &NewModerationAction) -> Result<ModerationAction> {
        let stored = sqlx::query_as::<_, ModerationAction>(concat!(
            "INSERT INTO moderation_actions ( \
                queue_item_id, action_type, action_data, target_user_id, target_content_type, \
                target_content_id, executed_by, executor_user_id, duration_seconds, expires_at, \
                created_at \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW()) \
             RETURNING ",
            action_columns!()
        ))
        .bind(action.queue_item_id)
        .bind(&action.action_type)
        .bind(&action.action_data)
        .bind(action.target_user_id)
        .bind(&action.target_content_type)
        .bind(&action.target_content_id)
        .bind(action.executed_by)
        .bind(&action.executor_user_id)
        .bind(action.duration_seconds)
        .bind(action.expires_at)
        .fetch_one(&*self.pool)
        .await?;

        Ok(stored)
    }

    async fn list_actions_for_item(&self, item_id: Uuid) -> Result<Vec<ModerationAction>> {
        let actions = sqlx::query_as::<_, ModerationAction>(concat!(
            "SELECT ",
            action_columns!(),
            " FROM moderation_actions WHERE queue_item_id = $1 ORDER BY created_at ASC"
        ))
        .bind(item_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(actions)
    }

    async fn list_actions_for_user(&self, user_id: Uuid) -> Result<Vec<ModerationAction>> {
        let actions = sqlx::query_as::<_, ModerationAction>(concat!(
            "SELECT ",
            action_columns!(),
            " FROM moderation_actions WHERE target_user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(actions)
    }
}
