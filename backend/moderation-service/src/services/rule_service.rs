use crate::db::ModerationStore;
use crate::error::{ModerationError, Result};
use crate::models::{CreateRuleInput, ModerationRule, UpdateRuleInput};
use std::sync::Arc;
use uuid::Uuid;

/// CRUD over creator-owned moderation rules. Rules are only ever soft-deleted.
#[derive(Clone)]
pub struct RuleService {
    store: Arc<dyn ModerationStore>,
}

impl RuleService {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    pub async fn create_rule(
        &self,
        creator_id: Uuid,
        input: CreateRuleInput,
    ) -> Result<ModerationRule> {
        input.check()?;

        let rule = ModerationRule::new(creator_id, input);
        let rule = self
            .store
            .insert_rule(&rule)
            .await
            .map_err(|e| ModerationError::store("create rule", e))?;

        tracing::info!(
            rule_id = %rule.id,
            creator_id = %creator_id,
            severity = %rule.severity.as_str(),
            auto_enforce = rule.is_auto_enforce,
            "Moderation rule created"
        );

        Ok(rule)
    }

    /// Rules of a creator, newest first
    pub async fn get_creator_rules(
        &self,
        creator_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<ModerationRule>> {
        self.store.list_rules(creator_id, include_inactive).await
    }

    pub async fn get_rule(&self, rule_id: Uuid) -> Result<ModerationRule> {
        self.store
            .get_rule(rule_id)
            .await?
            .ok_or_else(|| ModerationError::NotFound(format!("Rule {} not found", rule_id)))
    }

    pub async fn update_rule(
        &self,
        rule_id: Uuid,
        update: UpdateRuleInput,
    ) -> Result<ModerationRule> {
        update.check()?;

        if update.is_empty() {
            return self.get_rule(rule_id).await;
        }

        let rule = self
            .store
            .update_rule(rule_id, &update)
            .await
            .map_err(|e| ModerationError::store("update rule", e))?
            .ok_or_else(|| ModerationError::NotFound(format!("Rule {} not found", rule_id)))?;

        tracing::info!(rule_id = %rule_id, "Moderation rule updated");

        Ok(rule)
    }

    /// Soft delete; queue items that already reference the rule are untouched
    pub async fn deactivate_rule(&self, rule_id: Uuid) -> Result<()> {
        let found = self
            .store
            .set_rule_active(rule_id, false)
            .await
            .map_err(|e| ModerationError::store("deactivate rule", e))?;

        if !found {
            return Err(ModerationError::NotFound(format!(
                "Rule {} not found",
                rule_id
            )));
        }

        tracing::info!(rule_id = %rule_id, "Moderation rule deactivated");

        Ok(())
    }
}
