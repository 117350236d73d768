use crate::db::ModerationStore;
use crate::error::Result;
use crate::metrics;
use crate::models::{
    ActionExecutionReport, ActionSpec, Executor, FailedAction, ModerationAction,
    NewModerationAction,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Stores the consequences of a moderation decision, one row per action
#[derive(Clone)]
pub struct ActionExecutor {
    store: Arc<dyn ModerationStore>,
}

impl ActionExecutor {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    /// Execute every action in order. A failed action is recorded in the
    /// report and does not stop the remaining actions.
    pub async fn execute_actions(
        &self,
        queue_item_id: Uuid,
        actions: &[ActionSpec],
        executor: Executor,
    ) -> ActionExecutionReport {
        let mut report = ActionExecutionReport::default();
        let executed_by = executor.executed_by().as_str();

        for (index, spec) in actions.iter().enumerate() {
            let stored = match NewModerationAction::from_spec(
                queue_item_id,
                spec,
                executor,
                Utc::now(),
            ) {
                Ok(action) => self
                    .store
                    .insert_action(&action)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e),
            };

            match stored {
                Ok(stored) => {
                    tracing::info!(
                        action_id = %stored.id,
                        queue_item_id = %queue_item_id,
                        action_type = %stored.action_type,
                        executed_by = executed_by,
                        "Moderation action executed"
                    );
                    metrics::record_action(executed_by, true);
                    report.executed.push(stored);
                }
                Err(error) => {
                    tracing::warn!(
                        queue_item_id = %queue_item_id,
                        action_type = %spec.action_type,
                        error = %error,
                        "Moderation action failed"
                    );
                    metrics::record_action(executed_by, false);
                    report.failed.push(FailedAction {
                        index,
                        action_type: spec.action_type.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    /// Actions targeting a user that have not expired at `now`
    pub async fn active_actions_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ModerationAction>> {
        let actions = self.store.list_actions_for_user(user_id).await?;
        Ok(actions
            .into_iter()
            .filter(|action| action.is_active_at(now))
            .collect())
    }
}
