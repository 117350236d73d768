//! Integration Tests: Rule store, queue manager and stats
//!
//! Runs the services end to end against `InMemoryStore`.
//!
//! Coverage:
//! - Rule defaults, listing, soft delete
//! - Rule matching, priority derivation, trigger counting
//! - Auto-enforcement above and below the confidence threshold
//! - Human review transitions and review actions
//! - Stats on an empty creator

use moderation_service::models::{ExecutedBy, RuleActions, DEFAULT_PRIORITY};
use moderation_service::{
    ActionSpec, AddToQueueInput, CreateRuleInput, InMemoryStore, ModerationError,
    ModerationStore, QueueService, QueueStatus, ReviewDecision, ReviewInput, RuleCondition,
    RuleService, Severity, StatsService, UpdateRuleInput,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

struct Harness {
    rules: RuleService,
    queue: QueueService,
    stats: StatsService,
}

fn harness() -> Harness {
    let store: Arc<dyn ModerationStore> = Arc::new(InMemoryStore::new());
    Harness {
        rules: RuleService::new(store.clone()),
        queue: QueueService::new(store.clone()),
        stats: StatsService::new(store),
    }
}

fn content_type_rule(name: &str, content_type: &str) -> CreateRuleInput {
    CreateRuleInput {
        name: name.to_string(),
        rule_type: "content".to_string(),
        conditions: vec![RuleCondition::ContentType {
            content_type: content_type.to_string(),
        }],
        ..Default::default()
    }
}

fn flag(content_type: &str) -> AddToQueueInput {
    AddToQueueInput {
        content_type: content_type.to_string(),
        content_id: Uuid::new_v4().to_string(),
        content_data: Some(json!({ "text": "flagged text" })),
        reporter_user_id: Some(Uuid::new_v4()),
        ..Default::default()
    }
}

fn auto_rule(threshold: Option<f64>) -> CreateRuleInput {
    CreateRuleInput {
        is_auto_enforce: Some(true),
        ai_confidence_threshold: threshold,
        severity: Some(Severity::High),
        actions: RuleActions {
            auto_actions: vec![
                ActionSpec::new("remove_content"),
                ActionSpec::new("mute")
                    .with_target_user(Uuid::new_v4())
                    .with_duration(3600),
            ],
        },
        ..content_type_rule("auto", "comment")
    }
}

#[tokio::test]
async fn test_create_rule_defaults() {
    let h = harness();
    let creator = Uuid::new_v4();

    let rule = h
        .rules
        .create_rule(creator, content_type_rule("spam", "comment"))
        .await
        .unwrap();

    assert_eq!(rule.creator_id, creator);
    assert_eq!(rule.severity, Severity::Medium);
    assert!(rule.requires_human_review);
    assert_eq!(rule.ai_confidence_threshold, 0.85);
    assert!(rule.actions.auto_actions.is_empty());
    assert!(rule.is_active);
}

#[tokio::test]
async fn test_rules_listing_and_soft_delete() {
    let h = harness();
    let creator = Uuid::new_v4();

    let rule = h
        .rules
        .create_rule(creator, content_type_rule("spam", "comment"))
        .await
        .unwrap();

    let rules = h.rules.get_creator_rules(creator, false).await.unwrap();
    assert_eq!(rules.iter().filter(|r| r.id == rule.id).count(), 1);

    h.rules.deactivate_rule(rule.id).await.unwrap();

    let active = h.rules.get_creator_rules(creator, false).await.unwrap();
    assert!(active.iter().all(|r| r.id != rule.id));

    let all = h.rules.get_creator_rules(creator, true).await.unwrap();
    assert_eq!(all.iter().filter(|r| r.id == rule.id).count(), 1);
    assert!(!all[0].is_active);
}

#[tokio::test]
async fn test_rules_listed_newest_first() {
    let h = harness();
    let creator = Uuid::new_v4();

    let first = h
        .rules
        .create_rule(creator, content_type_rule("first", "post"))
        .await
        .unwrap();
    let second = h
        .rules
        .create_rule(creator, content_type_rule("second", "post"))
        .await
        .unwrap();

    let rules = h.rules.get_creator_rules(creator, false).await.unwrap();
    let ids: Vec<Uuid> = rules.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_update_rule_is_partial() {
    let h = harness();
    let creator = Uuid::new_v4();

    let rule = h
        .rules
        .create_rule(
            creator,
            CreateRuleInput {
                description: Some("original".to_string()),
                ..content_type_rule("spam", "comment")
            },
        )
        .await
        .unwrap();

    let updated = h
        .rules
        .update_rule(
            rule.id,
            UpdateRuleInput {
                severity: Some(Severity::Critical),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.severity, Severity::Critical);
    assert_eq!(updated.name, "spam");
    assert_eq!(updated.description.as_deref(), Some("original"));

    let cleared = h
        .rules
        .update_rule(
            rule.id,
            UpdateRuleInput {
                description: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.description.is_none());

    let missing = h
        .rules
        .update_rule(
            Uuid::new_v4(),
            UpdateRuleInput {
                name: Some("x".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(missing, Err(ModerationError::NotFound(_))));
}

#[tokio::test]
async fn test_unmatched_item_gets_default_priority() {
    let h = harness();
    let creator = Uuid::new_v4();
    h.rules
        .create_rule(creator, content_type_rule("comments", "comment"))
        .await
        .unwrap();

    let item = h.queue.add_to_queue(creator, flag("post")).await.unwrap().item;

    assert!(item.triggered_rule_id.is_none());
    assert_eq!(item.priority, DEFAULT_PRIORITY);
    assert_eq!(item.status, QueueStatus::Pending);
}

#[tokio::test]
async fn test_matching_rule_sets_priority_and_counts_trigger() {
    let h = harness();
    let creator = Uuid::new_v4();
    let rule = h
        .rules
        .create_rule(
            creator,
            CreateRuleInput {
                severity: Some(Severity::Critical),
                ..content_type_rule("comments", "comment")
            },
        )
        .await
        .unwrap();

    let item = h.queue.add_to_queue(creator, flag("comment")).await.unwrap().item;

    assert_eq!(item.triggered_rule_id, Some(rule.id));
    assert_eq!(item.priority, 10);
    assert_eq!(h.rules.get_rule(rule.id).await.unwrap().trigger_count, 1);

    h.queue.add_to_queue(creator, flag("comment")).await.unwrap();
    assert_eq!(h.rules.get_rule(rule.id).await.unwrap().trigger_count, 2);
}

#[tokio::test]
async fn test_explicit_priority_overrides_severity() {
    let h = harness();
    let creator = Uuid::new_v4();
    h.rules
        .create_rule(
            creator,
            CreateRuleInput {
                severity: Some(Severity::Critical),
                ..content_type_rule("comments", "comment")
            },
        )
        .await
        .unwrap();

    let item = h
        .queue
        .add_to_queue(
            creator,
            AddToQueueInput {
                priority: Some(1),
                ..flag("comment")
            },
        )
        .await
        .unwrap()
        .item;
    assert_eq!(item.priority, 1);
}

#[tokio::test]
async fn test_other_creators_rules_never_match() {
    let h = harness();
    let owner = Uuid::new_v4();
    let rule = h
        .rules
        .create_rule(owner, content_type_rule("comments", "comment"))
        .await
        .unwrap();

    let item = h
        .queue
        .add_to_queue(Uuid::new_v4(), flag("comment"))
        .await
        .unwrap()
        .item;

    assert!(item.triggered_rule_id.is_none());
    assert_eq!(h.rules.get_rule(rule.id).await.unwrap().trigger_count, 0);
}

#[tokio::test]
async fn test_newest_rule_shadows_older_one() {
    let h = harness();
    let creator = Uuid::new_v4();
    let older = h
        .rules
        .create_rule(creator, content_type_rule("older", "comment"))
        .await
        .unwrap();
    let newer = h
        .rules
        .create_rule(creator, content_type_rule("newer", "comment"))
        .await
        .unwrap();

    let item = h.queue.add_to_queue(creator, flag("comment")).await.unwrap().item;
    assert_eq!(item.triggered_rule_id, Some(newer.id));
    assert_eq!(h.rules.get_rule(older.id).await.unwrap().trigger_count, 0);

    h.rules
        .update_rule(
            older.id,
            UpdateRuleInput {
                precedence: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let item = h.queue.add_to_queue(creator, flag("comment")).await.unwrap().item;
    assert_eq!(item.triggered_rule_id, Some(older.id));
}

#[tokio::test]
async fn test_toxicity_condition_matches_analysis() {
    let h = harness();
    let creator = Uuid::new_v4();
    let rule = h
        .rules
        .create_rule(
            creator,
            CreateRuleInput {
                name: "toxic".to_string(),
                rule_type: "toxicity".to_string(),
                conditions: vec![RuleCondition::Toxicity {
                    threshold: Some(0.7),
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let calm = h
        .queue
        .add_to_queue(
            creator,
            AddToQueueInput {
                ai_analysis: Some(json!({ "toxicity_score": 0.3 })),
                ..flag("post")
            },
        )
        .await
        .unwrap()
        .item;
    assert!(calm.triggered_rule_id.is_none());

    let toxic = h
        .queue
        .add_to_queue(
            creator,
            AddToQueueInput {
                ai_analysis: Some(json!({ "toxicity_score": 0.9 })),
                ..flag("post")
            },
        )
        .await
        .unwrap()
        .item;
    assert_eq!(toxic.triggered_rule_id, Some(rule.id));
}

#[tokio::test]
async fn test_auto_enforce_above_threshold() {
    let h = harness();
    let creator = Uuid::new_v4();
    let rule = h.rules.create_rule(creator, auto_rule(None)).await.unwrap();

    let item = h
        .queue
        .add_to_queue(
            creator,
            AddToQueueInput {
                ai_confidence: Some(0.9),
                ..flag("comment")
            },
        )
        .await
        .unwrap()
        .item;

    assert_eq!(item.status, QueueStatus::Approved);
    assert_eq!(item.review_decision, Some(ReviewDecision::Approved));
    assert_eq!(item.reviewed_by.as_deref(), Some("system"));
    assert_eq!(
        item.review_notes.as_deref(),
        Some("Auto-executed by AI moderation")
    );
    assert!(item.reviewed_at.is_some());
    assert_eq!(item.actions_taken, rule.actions.auto_actions);

    let actions = h.queue.get_item_actions(item.id).await.unwrap();
    assert_eq!(actions.len(), rule.actions.auto_actions.len());
    assert!(actions
        .iter()
        .all(|a| a.executed_by == ExecutedBy::System && a.executor_user_id == "system"));

    let mute = actions.iter().find(|a| a.action_type == "mute").unwrap();
    assert!(mute.expires_at.is_some());
}

#[tokio::test]
async fn test_no_auto_enforce_below_threshold() {
    let h = harness();
    let creator = Uuid::new_v4();
    h.rules
        .create_rule(creator, auto_rule(Some(0.85)))
        .await
        .unwrap();

    let item = h
        .queue
        .add_to_queue(
            creator,
            AddToQueueInput {
                ai_confidence: Some(0.5),
                ..flag("comment")
            },
        )
        .await
        .unwrap()
        .item;

    assert_eq!(item.status, QueueStatus::Pending);
    assert!(item.review_decision.is_none());
    assert!(h.queue.get_item_actions(item.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_review_escalation() {
    let h = harness();
    let creator = Uuid::new_v4();
    let reviewer = Uuid::new_v4();
    let item = h.queue.add_to_queue(creator, flag("post")).await.unwrap().item;

    let reviewed = h
        .queue
        .review_queue_item(
            item.id,
            reviewer,
            ReviewInput {
                decision: ReviewDecision::Escalated,
                notes: Some("needs a second look".to_string()),
                actions_taken: Vec::new(),
            },
        )
        .await
        .unwrap()
        .item;

    assert_eq!(reviewed.status, QueueStatus::Escalated);
    assert_eq!(reviewed.reviewed_by, Some(reviewer.to_string()));
    assert_eq!(reviewed.review_notes.as_deref(), Some("needs a second look"));
    assert!(reviewed.reviewed_at.is_some());
}

#[tokio::test]
async fn test_rejection_executes_human_actions() {
    let h = harness();
    let creator = Uuid::new_v4();
    let reviewer = Uuid::new_v4();
    let item = h.queue.add_to_queue(creator, flag("post")).await.unwrap().item;

    let actions = vec![
        ActionSpec::new("remove_content"),
        ActionSpec::new("warn").with_target_user(Uuid::new_v4()),
        ActionSpec::new("mute").with_duration(600),
    ];

    let outcome = h
        .queue
        .review_queue_item(
            item.id,
            reviewer,
            ReviewInput {
                decision: ReviewDecision::Rejected,
                notes: None,
                actions_taken: actions.clone(),
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.item.status, QueueStatus::Rejected);
    assert_eq!(outcome.item.actions_taken, actions);
    assert!(outcome.actions.is_complete());
    assert_eq!(outcome.actions.executed.len(), 3);

    let executed = h.queue.get_item_actions(item.id).await.unwrap();
    assert_eq!(executed.len(), 3);
    assert!(executed.iter().all(|a| a.executed_by == ExecutedBy::Human
        && a.executor_user_id == reviewer.to_string()));
}

#[tokio::test]
async fn test_approval_does_not_execute_actions() {
    let h = harness();
    let item = h
        .queue
        .add_to_queue(Uuid::new_v4(), flag("post"))
        .await
        .unwrap()
        .item;

    let outcome = h
        .queue
        .review_queue_item(
            item.id,
            Uuid::new_v4(),
            ReviewInput {
                decision: ReviewDecision::Approved,
                notes: None,
                actions_taken: vec![ActionSpec::new("remove_content")],
            },
        )
        .await
        .unwrap();

    assert!(outcome.actions.executed.is_empty());
    assert!(h.queue.get_item_actions(item.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_item_is_reviewed_only_once() {
    let h = harness();
    let item = h
        .queue
        .add_to_queue(Uuid::new_v4(), flag("post"))
        .await
        .unwrap()
        .item;

    let review = ReviewInput {
        decision: ReviewDecision::Approved,
        notes: None,
        actions_taken: Vec::new(),
    };
    h.queue
        .review_queue_item(item.id, Uuid::new_v4(), review.clone())
        .await
        .unwrap();

    let second = h
        .queue
        .review_queue_item(item.id, Uuid::new_v4(), review)
        .await;
    assert!(matches!(
        second,
        Err(ModerationError::InvalidStatusTransition { .. })
    ));
}

#[tokio::test]
async fn test_queue_ordering_and_status_filter() {
    let h = harness();
    let creator = Uuid::new_v4();
    let rule = h
        .rules
        .create_rule(
            creator,
            CreateRuleInput {
                severity: Some(Severity::High),
                ..content_type_rule("comments", "comment")
            },
        )
        .await
        .unwrap();

    let post = h.queue.add_to_queue(creator, flag("post")).await.unwrap().item;
    let comment = h.queue.add_to_queue(creator, flag("comment")).await.unwrap().item;

    let queue = h.queue.get_creator_queue(creator, None, None).await.unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0].item.id, comment.id);
    assert_eq!(
        queue[0].triggered_rule.as_ref().map(|r| r.id),
        Some(rule.id)
    );
    assert_eq!(queue[1].item.id, post.id);
    assert!(queue[1].triggered_rule.is_none());

    h.queue
        .review_queue_item(
            post.id,
            Uuid::new_v4(),
            ReviewInput {
                decision: ReviewDecision::Approved,
                notes: None,
                actions_taken: Vec::new(),
            },
        )
        .await
        .unwrap();

    let pending = h
        .queue
        .get_creator_queue(creator, Some(QueueStatus::Pending), None)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].item.id, comment.id);
}

#[tokio::test]
async fn test_stats_for_empty_creator() {
    let h = harness();
    let stats = h.stats.get_moderation_stats(Uuid::new_v4()).await.unwrap();

    assert_eq!(stats.average_review_time, 0.0);
    assert_eq!(stats.accuracy_rate, 0.0);
    assert_eq!(stats.pending_items, 0);
    assert_eq!(stats.total_rules, 0);
}

#[tokio::test]
async fn test_stats_reflect_queue() {
    let h = harness();
    let creator = Uuid::new_v4();
    let rule = h
        .rules
        .create_rule(creator, content_type_rule("comments", "comment"))
        .await
        .unwrap();

    h.queue.add_to_queue(creator, flag("comment")).await.unwrap();
    let reviewed = h
        .queue
        .add_to_queue(
            creator,
            AddToQueueInput {
                ai_recommendation: Some("rejected".to_string()),
                ..flag("post")
            },
        )
        .await
        .unwrap()
        .item;
    h.queue
        .review_queue_item(
            reviewed.id,
            Uuid::new_v4(),
            ReviewInput {
                decision: ReviewDecision::Rejected,
                notes: None,
                actions_taken: Vec::new(),
            },
        )
        .await
        .unwrap();

    let stats = h.stats.get_moderation_stats(creator).await.unwrap();
    assert_eq!(stats.total_items, 2);
    assert_eq!(stats.pending_items, 1);
    assert_eq!(stats.reviewed_today, 1);
    assert_eq!(stats.accuracy_rate, 1.0);
    assert_eq!(stats.top_rules[0].id, rule.id);
    assert_eq!(stats.top_rules[0].trigger_count, 1);
    assert_eq!(stats.recent_activity.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_flags_count_every_trigger() {
    let h = harness();
    let creator = Uuid::new_v4();
    let rule = h
        .rules
        .create_rule(creator, content_type_rule("comments", "comment"))
        .await
        .unwrap();

    let flags = 32;
    let handles: Vec<_> = (0..flags)
        .map(|_| {
            let queue = h.queue.clone();
            tokio::spawn(async move { queue.add_to_queue(creator, flag("comment")).await })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.item.triggered_rule_id, Some(rule.id));
    }

    assert_eq!(
        h.rules.get_rule(rule.id).await.unwrap().trigger_count,
        flags as i64
    );
}

#[tokio::test]
async fn test_review_with_oversized_duration_is_rejected_before_writing() {
    let h = harness();
    let item = h
        .queue
        .add_to_queue(Uuid::new_v4(), flag("post"))
        .await
        .unwrap()
        .item;

    let result = h
        .queue
        .review_queue_item(
            item.id,
            Uuid::new_v4(),
            ReviewInput {
                decision: ReviewDecision::Rejected,
                notes: None,
                actions_taken: vec![ActionSpec::new("mute").with_duration(1_000_000_000_000_000)],
            },
        )
        .await;
    assert!(matches!(result, Err(ModerationError::InvalidInput(_))));

    let unchanged = h.queue.get_queue_item(item.id).await.unwrap();
    assert_eq!(unchanged.status, QueueStatus::Pending);
    assert!(h.queue.get_item_actions(item.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rule_with_oversized_auto_action_duration_is_rejected() {
    let h = harness();
    let mut input = auto_rule(None);
    input.actions.auto_actions = vec![ActionSpec::new("mute").with_duration(i64::MAX)];

    let result = h.rules.create_rule(Uuid::new_v4(), input).await;
    assert!(matches!(result, Err(ModerationError::InvalidInput(_))));
}
