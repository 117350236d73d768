//! In-process backend, used by tests and by local runs without PostgreSQL

use super::ModerationStore;
use crate::error::Result;
use crate::models::{
    ModerationAction, ModerationQueueItem, ModerationRule, NewModerationAction, NewQueueItem,
    QueueStatus, ReviewUpdate, UpdateRuleInput,
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    // Insertion order; readers sort
    rules: Vec<ModerationRule>,
    queue: Vec<ModerationQueueItem>,
    actions: Vec<ModerationAction>,
}

/// Store keeping everything behind one lock, so multi-row writes are atomic
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; ties keep reverse insertion order
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut sorted: Vec<T> = rows.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    sorted
}

#[async_trait]
impl ModerationStore for InMemoryStore {
    async fn insert_rule(&self, rule: &ModerationRule) -> Result<ModerationRule> {
        let mut state = self.state.write().await;
        state.rules.push(rule.clone());
        Ok(rule.clone())
    }

    async fn get_rule(&self, rule_id: Uuid) -> Result<Option<ModerationRule>> {
        let state = self.state.read().await;
        Ok(state.rules.iter().find(|r| r.id == rule_id).cloned())
    }

    async fn list_rules(
        &self,
        creator_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<ModerationRule>> {
        let state = self.state.read().await;
        let rules: Vec<ModerationRule> = state
            .rules
            .iter()
            .filter(|r| r.creator_id == creator_id && (include_inactive || r.is_active))
            .cloned()
            .collect();
        Ok(newest_first(&rules, |r| r.created_at))
    }

    async fn update_rule(
        &self,
        rule_id: Uuid,
        update: &UpdateRuleInput,
    ) -> Result<Option<ModerationRule>> {
        let mut state = self.state.write().await;
        Ok(state.rules.iter_mut().find(|r| r.id == rule_id).map(|rule| {
            update.apply_to(rule);
            rule.clone()
        }))
    }

    async fn set_rule_active(&self, rule_id: Uuid, active: bool) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.rules.iter_mut().find(|r| r.id == rule_id) {
            Some(rule) => {
                rule.is_active = active;
                rule.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_queue_item(&self, item: &NewQueueItem) -> Result<ModerationQueueItem> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let inserted = ModerationQueueItem {
            id: Uuid::new_v4(),
            creator_id: item.creator_id,
            content_type: item.content_type.clone(),
            content_id: item.content_id.clone(),
            content_data: item.content_data.clone(),
            reported_user_id: item.reported_user_id,
            reporter_user_id: item.reporter_user_id,
            triggered_rule_id: item.triggered_rule_id,
            priority: item.priority,
            ai_analysis: item.ai_analysis.clone(),
            ai_confidence: item.ai_confidence,
            ai_recommendation: item.ai_recommendation.clone(),
            status: QueueStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_decision: None,
            review_notes: None,
            actions_taken: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        if let Some(rule_id) = item.triggered_rule_id {
            if let Some(rule) = state
                .rules
                .iter_mut()
                .find(|r| r.id == rule_id && r.creator_id == item.creator_id)
            {
                rule.trigger_count += 1;
                rule.updated_at = now;
            }
        }

        state.queue.push(inserted.clone());
        Ok(inserted)
    }

    async fn get_queue_item(&self, item_id: Uuid) -> Result<Option<ModerationQueueItem>> {
        let state = self.state.read().await;
        Ok(state.queue.iter().find(|i| i.id == item_id).cloned())
    }

    async fn list_queue(
        &self,
        creator_id: Uuid,
        status: Option<QueueStatus>,
        limit: i64,
    ) -> Result<Vec<ModerationQueueItem>> {
        let state = self.state.read().await;
        let items: Vec<ModerationQueueItem> = state
            .queue
            .iter()
            .filter(|i| i.creator_id == creator_id && status.map_or(true, |s| i.status == s))
            .cloned()
            .collect();

        let mut items = newest_first(&items, |i| i.created_at);
        items.sort_by(|a, b| b.priority.cmp(&a.priority));
        items.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(items)
    }

    async fn list_all_queue_items(&self, creator_id: Uuid) -> Result<Vec<ModerationQueueItem>> {
        let state = self.state.read().await;
        let items: Vec<ModerationQueueItem> = state
            .queue
            .iter()
            .filter(|i| i.creator_id == creator_id)
            .cloned()
            .collect();
        Ok(newest_first(&items, |i| i.created_at))
    }

    async fn apply_review(
        &self,
        item_id: Uuid,
        update: &ReviewUpdate,
    ) -> Result<Option<ModerationQueueItem>> {
        let mut state = self.state.write().await;
        Ok(state
            .queue
            .iter_mut()
            .find(|i| i.id == item_id && i.status == QueueStatus::Pending)
            .map(|item| {
                update.apply_to(item);
                item.clone()
            }))
    }

    async fn insert_action(&self, action: &NewModerationAction) -> Result<ModerationAction> {
        let mut state = self.state.write().await;
        let stored = ModerationAction {
            id: Uuid::new_v4(),
            queue_item_id: action.queue_item_id,
            action_type: action.action_type.clone(),
            action_data: action.action_data.clone(),
            target_user_id: action.target_user_id,
            target_content_type: action.target_content_type.clone(),
            target_content_id: action.target_content_id.clone(),
            executed_by: action.executed_by,
            executor_user_id: action.executor_user_id.clone(),
            duration_seconds: action.duration_seconds,
            expires_at: action.expires_at,
            created_at: Utc::now(),
        };
        state.actions.push(stored.clone());
        Ok(stored)
    }

    async fn list_actions_for_item(&self, item_id: Uuid) -> Result<Vec<ModerationAction>> {
        let state = self.state.read().await;
        Ok(state
            .actions
            .iter()
            .filter(|a| a.queue_item_id == item_id)
            .cloned()
            .collect())
    }

    async fn list_actions_for_user(&self, user_id: Uuid) -> Result<Vec<ModerationAction>> {
        let state = self.state.read().await;
        let actions: Vec<ModerationAction> = state
            .actions
            .iter()
            .filter(|a| a.target_user_id == Some(user_id))
            .cloned()
            .collect();
        Ok(newest_first(&actions, |a| a.created_at))
    }
}
