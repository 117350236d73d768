use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// Executor id recorded for system-driven actions and reviews
pub const SYSTEM_EXECUTOR: &str = "system";

/// Longest accepted action duration (100 years)
pub const MAX_ACTION_DURATION_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "action_executor", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExecutedBy {
    Human,
    System,
}

impl ExecutedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutedBy::Human => "human",
            ExecutedBy::System => "system",
        }
    }
}

/// Who executes a batch of actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executor {
    System,
    Human(Uuid),
}

impl Executor {
    pub fn executed_by(&self) -> ExecutedBy {
        match self {
            Executor::System => ExecutedBy::System,
            Executor::Human(_) => ExecutedBy::Human,
        }
    }

    pub fn user_id(&self) -> String {
        match self {
            Executor::System => SYSTEM_EXECUTOR.to_string(),
            Executor::Human(id) => id.to_string(),
        }
    }
}

/// One requested action, as carried by rules (`auto_actions`) and reviews (`actions_taken`).
///
/// Unrecognised keys are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_content_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionSpec {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            target_user_id: None,
            target_content_type: None,
            target_content_id: None,
            duration_seconds: None,
            extra: Map::new(),
        }
    }

    pub fn with_target_user(mut self, user_id: Uuid) -> Self {
        self.target_user_id = Some(user_id);
        self
    }

    pub fn with_duration(mut self, seconds: i64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.action_type.trim().is_empty() {
            return Err("action type must not be empty".to_string());
        }
        match self.duration_seconds {
            Some(d) if d < 0 => Err(format!(
                "action '{}' has a negative duration",
                self.action_type
            )),
            Some(d) if d > MAX_ACTION_DURATION_SECONDS => Err(format!(
                "action '{}' duration exceeds {} seconds",
                self.action_type, MAX_ACTION_DURATION_SECONDS
            )),
            _ => Ok(()),
        }
    }
}

/// Executed moderation action, immutable once stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModerationAction {
    pub id: Uuid,
    pub queue_item_id: Uuid,
    pub action_type: String,
    pub action_data: Value,
    pub target_user_id: Option<Uuid>,
    pub target_content_type: Option<String>,
    pub target_content_id: Option<String>,
    pub executed_by: ExecutedBy,
    pub executor_user_id: String,
    pub duration_seconds: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ModerationAction {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires_at| expires_at > now)
    }
}

/// Action row to insert
#[derive(Debug, Clone)]
pub struct NewModerationAction {
    pub queue_item_id: Uuid,
    pub action_type: String,
    pub action_data: Value,
    pub target_user_id: Option<Uuid>,
    pub target_content_type: Option<String>,
    pub target_content_id: Option<String>,
    pub executed_by: ExecutedBy,
    pub executor_user_id: String,
    pub duration_seconds: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewModerationAction {
    /// Fails when the expiry cannot be represented
    pub fn from_spec(
        queue_item_id: Uuid,
        spec: &ActionSpec,
        executor: Executor,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        let expires_at = match spec.duration_seconds {
            Some(seconds) => Some(
                Duration::try_seconds(seconds)
                    .and_then(|duration| now.checked_add_signed(duration))
                    .ok_or_else(|| {
                        format!(
                            "action '{}' duration of {} seconds is out of range",
                            spec.action_type, seconds
                        )
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            queue_item_id,
            action_type: spec.action_type.clone(),
            action_data: serde_json::to_value(spec).unwrap_or(Value::Null),
            target_user_id: spec.target_user_id,
            target_content_type: spec.target_content_type.clone(),
            target_content_id: spec.target_content_id.clone(),
            executed_by: executor.executed_by(),
            executor_user_id: executor.user_id(),
            duration_seconds: spec.duration_seconds,
            expires_at,
        })
    }
}

/// An action that could not be stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedAction {
    /// Position in the requested action list
    pub index: usize,
    pub action_type: String,
    pub error: String,
}

/// Outcome of executing a list of actions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionExecutionReport {
    pub executed: Vec<ModerationAction>,
    pub failed: Vec<FailedAction>,
}

impl ActionExecutionReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
