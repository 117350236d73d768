use crate::db::ModerationStore;
use crate::error::{ModerationError, Result};
use crate::metrics;
use crate::models::{
    find_applicable_rule, AddToQueueInput, Executor, ModerationAction, ModerationQueueItem,
    ModerationRule, NewQueueItem, QueueItemOutcome, QueueItemWithRule, QueueStatus,
    ReviewDecision, ReviewInput, ReviewUpdate, AUTO_REVIEW_NOTE, DEFAULT_PRIORITY,
    SYSTEM_EXECUTOR,
};
use crate::services::{ActionExecutor, RuleService};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_QUEUE_LIMIT: i64 = 50;

/// Flag ingestion, rule matching, auto-enforcement and human review
#[derive(Clone)]
pub struct QueueService {
    store: Arc<dyn ModerationStore>,
    rules: RuleService,
    executor: ActionExecutor,
    default_limit: i64,
}

impl QueueService {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self {
            rules: RuleService::new(store.clone()),
            executor: ActionExecutor::new(store.clone()),
            store,
            default_limit: DEFAULT_QUEUE_LIMIT,
        }
    }

    /// Page size used when a listing passes no positive limit
    pub fn with_default_limit(mut self, limit: i64) -> Self {
        if limit > 0 {
            self.default_limit = limit;
        }
        self
    }

    /// Queue a flagged item and return it in its final state, with the report
    /// of any auto actions.
    ///
    /// The first matching active rule (by precedence, then newest) sets the
    /// priority and has its trigger count incremented with the insert. When
    /// that rule auto-enforces and the AI confidence clears its threshold the
    /// item is approved by the system and the rule's auto actions run.
    pub async fn add_to_queue(
        &self,
        creator_id: Uuid,
        input: AddToQueueInput,
    ) -> Result<QueueItemOutcome> {
        input.validate()?;

        let rules = self.rules.get_creator_rules(creator_id, false).await?;
        let matched: Option<ModerationRule> =
            find_applicable_rule(&rules, &input.content_type, input.ai_analysis.as_ref()).cloned();

        let priority = input.priority.unwrap_or_else(|| {
            matched
                .as_ref()
                .map_or(DEFAULT_PRIORITY, |rule| rule.severity.priority())
        });
        let ai_confidence = input.ai_confidence;

        let new_item = NewQueueItem::new(
            creator_id,
            input,
            matched.as_ref().map(|rule| rule.id),
            priority,
        );
        let item = self
            .store
            .insert_queue_item(&new_item)
            .await
            .map_err(|e| ModerationError::store("add item to queue", e))?;

        metrics::record_queue_item(matched.is_some());
        tracing::info!(
            queue_item_id = %item.id,
            creator_id = %creator_id,
            content_type = %item.content_type,
            triggered_rule_id = ?item.triggered_rule_id,
            priority = item.priority,
            "Item added to moderation queue"
        );

        match matched {
            Some(rule) if rule.should_auto_enforce(ai_confidence) => {
                self.auto_enforce(item, &rule).await
            }
            _ => Ok(QueueItemOutcome::without_actions(item)),
        }
    }

    async fn auto_enforce(
        &self,
        item: ModerationQueueItem,
        rule: &ModerationRule,
    ) -> Result<QueueItemOutcome> {
        let update = ReviewUpdate {
            status: QueueStatus::Approved,
            reviewed_by: SYSTEM_EXECUTOR.to_string(),
            reviewed_at: Utc::now(),
            review_decision: ReviewDecision::Approved,
            review_notes: Some(AUTO_REVIEW_NOTE.to_string()),
            actions_taken: rule.actions.auto_actions.clone(),
        };

        let approved = self
            .store
            .apply_review(item.id, &update)
            .await
            .map_err(|e| ModerationError::store("auto-enforce queue item", e))?;

        if approved.is_none() {
            // Reviewed by someone else first; their decision stands
            tracing::info!(
                queue_item_id = %item.id,
                rule_id = %rule.id,
                "Queue item no longer pending, auto-enforcement skipped"
            );
            return Ok(QueueItemOutcome::without_actions(
                self.get_queue_item(item.id).await?,
            ));
        }

        let report = self
            .executor
            .execute_actions(item.id, &rule.actions.auto_actions, Executor::System)
            .await;

        metrics::record_auto_enforcement(rule.severity.as_str());
        tracing::info!(
            queue_item_id = %item.id,
            rule_id = %rule.id,
            confidence = ?item.ai_confidence,
            executed = report.executed.len(),
            failed = report.failed.len(),
            "Queue item auto-enforced"
        );

        Ok(QueueItemOutcome {
            item: self.get_queue_item(item.id).await?,
            actions: report,
        })
    }

    /// Queue of a creator ordered by priority then recency, each item with its rule
    pub async fn get_creator_queue(
        &self,
        creator_id: Uuid,
        status: Option<QueueStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<QueueItemWithRule>> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(self.default_limit);
        let items = self.store.list_queue(creator_id, status, limit).await?;

        let rules: HashMap<Uuid, ModerationRule> = if items
            .iter()
            .any(|item| item.triggered_rule_id.is_some())
        {
            self.rules
                .get_creator_rules(creator_id, true)
                .await?
                .into_iter()
                .map(|rule| (rule.id, rule))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(items
            .into_iter()
            .map(|item| {
                let triggered_rule = item
                    .triggered_rule_id
                    .and_then(|rule_id| rules.get(&rule_id).cloned());
                QueueItemWithRule {
                    item,
                    triggered_rule,
                }
            })
            .collect())
    }

    pub async fn get_queue_item(&self, queue_item_id: Uuid) -> Result<ModerationQueueItem> {
        self.store
            .get_queue_item(queue_item_id)
            .await?
            .ok_or_else(|| {
                ModerationError::NotFound(format!("Queue item {} not found", queue_item_id))
            })
    }

    pub async fn get_item_actions(&self, queue_item_id: Uuid) -> Result<Vec<ModerationAction>> {
        self.get_queue_item(queue_item_id).await?;
        self.store.list_actions_for_item(queue_item_id).await
    }

    /// Resolve a pending item. Rejections carrying actions execute them on
    /// behalf of the reviewer; their report is returned with the item.
    pub async fn review_queue_item(
        &self,
        queue_item_id: Uuid,
        reviewer_id: Uuid,
        review: ReviewInput,
    ) -> Result<QueueItemOutcome> {
        review
            .actions_taken
            .iter()
            .try_for_each(|spec| spec.validate())
            .map_err(ModerationError::InvalidInput)?;

        let current = self.get_queue_item(queue_item_id).await?;
        let next = review.decision.status();
        if !current.status.can_transition_to(next) {
            return Err(ModerationError::InvalidStatusTransition {
                from: current.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let update = ReviewUpdate {
            status: next,
            reviewed_by: reviewer_id.to_string(),
            reviewed_at: Utc::now(),
            review_decision: review.decision,
            review_notes: review.notes,
            actions_taken: review.actions_taken,
        };

        let reviewed = match self
            .store
            .apply_review(queue_item_id, &update)
            .await
            .map_err(|e| ModerationError::store("review queue item", e))?
        {
            Some(item) => item,
            None => {
                // Lost a race with another reviewer
                let latest = self.get_queue_item(queue_item_id).await?;
                return Err(ModerationError::InvalidStatusTransition {
                    from: latest.status.as_str().to_string(),
                    to: next.as_str().to_string(),
                });
            }
        };

        metrics::record_review(review.decision.as_str());
        tracing::info!(
            queue_item_id = %queue_item_id,
            reviewer_id = %reviewer_id,
            decision = %review.decision.as_str(),
            "Queue item reviewed"
        );

        if review.decision != ReviewDecision::Rejected || update.actions_taken.is_empty() {
            return Ok(QueueItemOutcome::without_actions(reviewed));
        }

        let report = self
            .executor
            .execute_actions(
                queue_item_id,
                &update.actions_taken,
                Executor::Human(reviewer_id),
            )
            .await;

        if !report.is_complete() {
            tracing::warn!(
                queue_item_id = %queue_item_id,
                failed = report.failed.len(),
                "Some review actions were not executed"
            );
        }

        Ok(QueueItemOutcome {
            item: reviewed,
            actions: report,
        })
    }
}
