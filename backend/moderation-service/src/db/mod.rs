//! Persistence for rules, queue items and actions
//!
//! Services talk to a [`ModerationStore`]; `PgModerationStore` is the
//! production backend and `InMemoryStore` backs tests and local runs.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgModerationStore;

use crate::error::Result;
use crate::models::{
    ModerationAction, ModerationQueueItem, ModerationRule, NewModerationAction, NewQueueItem,
    QueueStatus, ReviewUpdate, UpdateRuleInput,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Storage operations used by the moderation services.
///
/// The store is the single source of truth; implementations keep no cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationStore: Send + Sync {
    /// Insert a fully-defaulted rule and return the stored row
    async fn insert_rule(&self, rule: &ModerationRule) -> Result<ModerationRule>;

    async fn get_rule(&self, rule_id: Uuid) -> Result<Option<ModerationRule>>;

    /// Rules of a creator, newest first
    async fn list_rules(
        &self,
        creator_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<ModerationRule>>;

    /// Merge provided fields; `None` when the rule does not exist
    async fn update_rule(
        &self,
        rule_id: Uuid,
        update: &UpdateRuleInput,
    ) -> Result<Option<ModerationRule>>;

    /// Returns false when the rule does not exist
    async fn set_rule_active(&self, rule_id: Uuid, active: bool) -> Result<bool>;

    /// Insert a queue row and, when `triggered_rule_id` is set, increment that
    /// rule's trigger count by one in the same atomic unit.
    async fn insert_queue_item(&self, item: &NewQueueItem) -> Result<ModerationQueueItem>;

    async fn get_queue_item(&self, item_id: Uuid) -> Result<Option<ModerationQueueItem>>;

    /// Queue ordered by priority then recency, optionally filtered by status
    async fn list_queue(
        &self,
        creator_id: Uuid,
        status: Option<QueueStatus>,
        limit: i64,
    ) -> Result<Vec<ModerationQueueItem>>;

    /// Full queue history of a creator, newest first
    async fn list_all_queue_items(&self, creator_id: Uuid) -> Result<Vec<ModerationQueueItem>>;

    /// Stamp a review on a pending item; `None` if the item is missing or no longer pending
    async fn apply_review(
        &self,
        item_id: Uuid,
        update: &ReviewUpdate,
    ) -> Result<Option<ModerationQueueItem>>;

    async fn insert_action(&self, action: &NewModerationAction) -> Result<ModerationAction>;

    /// Actions of a queue item, oldest first
    async fn list_actions_for_item(&self, item_id: Uuid) -> Result<Vec<ModerationAction>>;

    /// Actions targeting a user, newest first
    async fn list_actions_for_user(&self, user_id: Uuid) -> Result<Vec<ModerationAction>>;
}
