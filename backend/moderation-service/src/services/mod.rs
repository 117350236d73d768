pub mod action_executor;
pub mod content_analyzer;
pub mod queue_service;
pub mod rule_service;
pub mod stats_service;

pub use action_executor::ActionExecutor;
pub use content_analyzer::{ContentAnalyzer, RandomAnalyzer, RemoteAnalyzer};
pub use queue_service::QueueService;
pub use rule_service::RuleService;
pub use stats_service::{compute_stats, StatsService};
