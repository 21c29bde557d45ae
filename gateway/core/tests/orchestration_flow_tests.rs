// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! End-to-end chat orchestration tests over the full in-process stack:
//! intent classification, the four-step delegation plan, budget blocking,
//! skill suggestions, quick actions, and the seeded default thread.

use std::sync::Arc;

use aegis_gateway_core::application::{
    BudgetService, ChatService, CheckpointService, CsoOrchestrationEngine, TelemetryHub,
    CONTROLLER_AGENT_ID, DEFAULT_THREAD_ID,
};
use aegis_gateway_core::domain::budget::BudgetConfigInput;
use aegis_gateway_core::domain::chat::{ChatMessageKind, QuickAction};
use aegis_gateway_core::domain::repository::Repository;
use aegis_gateway_core::domain::task::TaskStatus;
use aegis_gateway_core::domain::vault::{VaultEntry, VaultEntryKind};
use aegis_gateway_core::infrastructure::{EventBus, InMemoryRepository, InMemoryVault};
use chrono::Utc;
use pretty_assertions::assert_eq;
use uuid::Uuid;

struct Stack {
    chat: ChatService,
    repository: Arc<InMemoryRepository>,
    budget: Arc<BudgetService>,
    telemetry: Arc<TelemetryHub>,
}

async fn stack_with_vault(vault: InMemoryVault) -> Stack {
    let repository = Arc::new(InMemoryRepository::new());
    let bus = EventBus::new(256);
    let engine = Arc::new(CsoOrchestrationEngine::new());
    let budget = Arc::new(BudgetService::new(repository.clone(), bus.clone()));
    let checkpoints = Arc::new(CheckpointService::new(repository.clone(), bus.clone()));
    let telemetry = Arc::new(TelemetryHub::new(repository.clone()));
    let chat = ChatService::new(
        repository.clone(),
        engine,
        budget.clone(),
        checkpoints,
        telemetry.clone(),
        Arc::new(vault),
    )
    .await
    .unwrap();
    Stack {
        chat,
        repository,
        budget,
        telemetry,
    }
}

async fn stack() -> Stack {
    stack_with_vault(InMemoryVault::new()).await
}

#[tokio::test]
async fn boot_seeds_the_default_thread() {
    let stack = stack().await;
    let threads = stack.chat.list_threads().await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].id, DEFAULT_THREAD_ID);

    let messages = stack.chat.list_messages(DEFAULT_THREAD_ID).await.unwrap();
    assert!(messages
        .iter()
        .any(|m| m.content == "Swarm online. Ask the CSO anything."));
}

#[tokio::test]
async fn non_delegation_intent_gets_a_direct_reply() {
    let stack = stack().await;
    let emitted = stack
        .chat
        .send_message(DEFAULT_THREAD_ID, "hello there", "user")
        .await
        .unwrap();
    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[0].kind, ChatMessageKind::User);
    assert_eq!(emitted[1].kind, ChatMessageKind::Cso);
    assert_eq!(emitted[1].parent_message_id, Some(emitted[0].id));
    assert!(emitted[1].content.contains("delegate"));
    assert!(stack.repository.list_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn direct_reply_mentions_recalled_vault_context() {
    let vault = InMemoryVault::with_entries(vec![VaultEntry {
        id: Uuid::new_v4(),
        kind: VaultEntryKind::Kb,
        title: "quarterly numbers".to_string(),
        content: "revenue tables".to_string(),
        tags: vec!["finance".to_string()],
        importance_score: 9.0,
        created_at: Utc::now(),
    }]);
    let stack = stack_with_vault(vault).await;
    let emitted = stack
        .chat
        .send_message(DEFAULT_THREAD_ID, "how were the quarterly numbers?", "user")
        .await
        .unwrap();
    assert!(emitted[1].content.contains("1 relevant vault entry"));
}

#[tokio::test]
async fn delegation_intent_produces_a_four_step_plan() {
    let stack = stack().await;
    let emitted = stack
        .chat
        .send_message(DEFAULT_THREAD_ID, "Build a launch roadmap for Q4", "user")
        .await
        .unwrap();

    // user, plan, four agent updates, closing.
    assert_eq!(emitted.len(), 7);
    assert_eq!(emitted[1].kind, ChatMessageKind::Delegation);
    assert!(emitted[1].content.starts_with("### CSO Plan"));
    assert!(emitted[1].content.contains("Goal: Build a launch roadmap for Q4"));
    assert_eq!(emitted[1].metadata.as_ref().unwrap()["steps"].as_array().unwrap().len(), 4);
    for update in &emitted[2..6] {
        assert_eq!(update.kind, ChatMessageKind::AgentUpdate);
        assert!(update.content.starts_with("Started: "));
        assert_eq!(update.parent_message_id, Some(emitted[1].id));
    }
    assert_eq!(emitted[6].kind, ChatMessageKind::Cso);

    let tasks = stack.repository.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 4);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Assigned));
    let mut assignees: Vec<String> = tasks
        .iter()
        .filter_map(|t| t.assignee_agent_id.clone())
        .collect();
    assignees.sort();
    assert_eq!(
        assignees,
        vec!["agent_cso", "agent_data", "agent_research", "agent_review"]
    );

    // The intent was checkpointed against the thread before planning.
    let step_count = stack
        .repository
        .count_checkpoints(DEFAULT_THREAD_ID)
        .await
        .unwrap();
    assert_eq!(step_count, 1);
}

#[tokio::test]
async fn research_keywords_add_a_skill_suggestion() {
    let stack = stack().await;
    let emitted = stack
        .chat
        .send_message(DEFAULT_THREAD_ID, "Research the latest market trends", "user")
        .await
        .unwrap();

    // user, plan, four updates, suggestion, closing.
    assert_eq!(emitted.len(), 8);
    let suggestion = &emitted[6];
    assert_eq!(suggestion.kind, ChatMessageKind::SkillSuggestion);
    assert_eq!(suggestion.metadata.as_ref().unwrap()["slug"], "tavily-search");
}

#[tokio::test]
async fn suggestion_also_fires_on_direct_replies() {
    let stack = stack().await;
    let emitted = stack
        .chat
        .send_message(DEFAULT_THREAD_ID, "anything new in my inbox?", "user")
        .await
        .unwrap();
    assert_eq!(emitted.len(), 3);
    assert_eq!(emitted[2].kind, ChatMessageKind::SkillSuggestion);
    assert_eq!(emitted[2].metadata.as_ref().unwrap()["slug"], "gog");
}

#[tokio::test]
async fn budget_block_is_terminal_for_the_intent() {
    let stack = stack().await;
    stack
        .budget
        .configure(BudgetConfigInput {
            agent_id: CONTROLLER_AGENT_ID.to_string(),
            token_limit: 0,
            cost_limit_usd: 0.0,
            hard_kill: true,
        })
        .await
        .unwrap();

    let emitted = stack
        .chat
        .send_message(DEFAULT_THREAD_ID, "Build a launch roadmap", "user")
        .await
        .unwrap();
    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[1].kind, ChatMessageKind::Cso);
    assert!(emitted[1].content.contains("Delegation is paused"));

    // No checkpoint, no plan, no tasks.
    assert_eq!(
        stack
            .repository
            .count_checkpoints(DEFAULT_THREAD_ID)
            .await
            .unwrap(),
        0
    );
    assert!(stack.repository.list_tasks().await.unwrap().is_empty());

    let recent = stack.telemetry.list_since(None, 10);
    assert!(recent
        .iter()
        .any(|e| e.message == "intent blocked by budget guardrail"));
}

#[tokio::test]
async fn status_command_replies_with_the_summary() {
    let stack = stack().await;
    let emitted = stack
        .chat
        .send_message(DEFAULT_THREAD_ID, "/status", "user")
        .await
        .unwrap();
    assert_eq!(emitted.len(), 2);
    assert!(emitted[1].content.starts_with("Swarm status:"));
    assert!(emitted[1].content.contains("0 agents online"));
}

#[tokio::test]
async fn quick_actions_route_through_send_message() {
    let stack = stack().await;

    let status = stack
        .chat
        .run_quick_action(DEFAULT_THREAD_ID, QuickAction::StatusReport)
        .await
        .unwrap();
    assert!(status[1].content.starts_with("Swarm status:"));

    let delegated = stack
        .chat
        .run_quick_action(DEFAULT_THREAD_ID, QuickAction::DelegateTask)
        .await
        .unwrap();
    assert!(delegated.iter().any(|m| m.kind == ChatMessageKind::Delegation));

    let briefing = stack
        .chat
        .run_quick_action(DEFAULT_THREAD_ID, QuickAction::MorningBriefing)
        .await
        .unwrap();
    assert_eq!(briefing.len(), 2);
    assert_eq!(briefing[1].kind, ChatMessageKind::Cso);
}

#[tokio::test]
async fn every_emitted_message_is_persisted() {
    let stack = stack().await;
    let emitted = stack
        .chat
        .send_message(DEFAULT_THREAD_ID, "Ship the onboarding revamp", "user")
        .await
        .unwrap();
    let persisted = stack
        .repository
        .list_chat_messages(DEFAULT_THREAD_ID)
        .await
        .unwrap();
    // Seeded system message plus everything emitted here.
    assert_eq!(persisted.len(), emitted.len() + 1);
    for message in &emitted {
        assert!(persisted.iter().any(|p| p.id == message.id));
    }
}
