pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use db::{InMemoryStore, ModerationStore, PgModerationStore};
pub use error::{ModerationError, Result};
pub use models::{
    ActionExecutionReport, ActionSpec, AddToQueueInput, ContentAnalysis, CreateRuleInput,
    ModerationAction, ModerationQueueItem, ModerationRule, ModerationStats, QueueItemOutcome,
    QueueStatus,
    ReviewDecision, ReviewInput, RuleCondition, Severity, UpdateRuleInput,
};
pub use services::{
    ActionExecutor, ContentAnalyzer, QueueService, RandomAnalyzer, RemoteAnalyzer, RuleService,
    StatsService,
};
