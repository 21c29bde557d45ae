// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Budget metering tests: configure, soft warnings, hard-kill refusal,
//! global precedence, and the pre-flight `can_run` gate.

use std::sync::Arc;

use aegis_gateway_core::application::BudgetService;
use aegis_gateway_core::domain::agent::{AgentRecord, AgentStatus};
use aegis_gateway_core::domain::budget::{BudgetConfigInput, UsageReport, GLOBAL_BUDGET_ID};
use aegis_gateway_core::domain::events::GatewayPayload;
use aegis_gateway_core::domain::repository::Repository;
use aegis_gateway_core::infrastructure::{EventBus, InMemoryRepository};
use chrono::Utc;
use pretty_assertions::assert_eq;

fn service() -> (BudgetService, Arc<InMemoryRepository>, EventBus) {
    let repository = Arc::new(InMemoryRepository::new());
    let bus = EventBus::new(64);
    let service = BudgetService::new(repository.clone(), bus.clone());
    (service, repository, bus)
}

fn config(agent_id: &str, token_limit: u64, cost_limit_usd: f64, hard_kill: bool) -> BudgetConfigInput {
    BudgetConfigInput {
        agent_id: agent_id.to_string(),
        token_limit,
        cost_limit_usd,
        hard_kill,
    }
}

fn usage(agent_id: &str, tokens: u64, cost_usd: f64) -> UsageReport {
    UsageReport {
        agent_id: agent_id.to_string(),
        model: "sonnet-large".to_string(),
        prompt_tokens: tokens / 2,
        completion_tokens: tokens - tokens / 2,
        cost_usd,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn unconfigured_agent_gets_baseline_limits() {
    let (service, _repository, _bus) = service();
    let decision = service.register_usage(usage("agent_x", 1_000, 0.5)).await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.budget.token_limit, 100_000);
    assert_eq!(decision.budget.cost_limit_usd, 40.0);
    assert_eq!(decision.budget.current_tokens, 1_000);
}

#[tokio::test]
async fn configure_emits_event_and_audit() {
    let (service, repository, bus) = service();
    let mut rx = bus.subscribe();

    let updated = service
        .configure(config("agent_x", 100, 10.0, false))
        .await
        .unwrap();
    assert_eq!(updated.token_limit, 100);
    assert!(!updated.hard_kill);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.kind(), "budget.configured");
    assert!(event.request_id.is_some());

    let logs = repository.list_audit_logs(10).await.unwrap();
    assert_eq!(logs[0].category, "budget");
    assert_eq!(logs[0].action, "configure");
    assert_eq!(logs[0].actor, "user");
}

#[tokio::test]
async fn reaching_exact_token_limit_without_hard_kill_warns_but_allows() {
    let (service, repository, bus) = service();
    service
        .configure(config("agent_x", 100, 1_000.0, false))
        .await
        .unwrap();
    let mut rx = bus.subscribe();

    let decision = service.register_usage(usage("agent_x", 100, 0.1)).await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.reason, None);
    assert!(decision.budget.is_exceeded());

    let event = rx.try_recv().unwrap();
    assert_eq!(event.kind(), "budget.warning");
    match event.payload {
        GatewayPayload::BudgetWarning { agent_id, reason } => {
            assert_eq!(agent_id, "agent_x");
            assert!(reason.contains("Agent"));
        }
        other => panic!("unexpected payload: {other:?}"),
    }
    let logs = repository.list_audit_logs(10).await.unwrap();
    assert_eq!(logs[0].action, "warning");
}

#[tokio::test]
async fn hard_kill_refuses_once_cost_limit_is_crossed() {
    let (service, repository, bus) = service();
    service
        .configure(config("agent_x", 1_000_000, 100.0, true))
        .await
        .unwrap();
    let mut rx = bus.subscribe();

    let first = service.register_usage(usage("agent_x", 10, 60.0)).await.unwrap();
    assert!(first.allowed);
    assert_eq!(first.reason, None);
    assert!(matches!(rx.try_recv(), Err(_)));

    let second = service.register_usage(usage("agent_x", 10, 60.0)).await.unwrap();
    assert!(!second.allowed);
    assert_eq!(second.reason.as_deref(), Some("Agent budget limit reached."));
    assert_eq!(second.budget.current_cost_usd, 120.0);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.kind(), "budget.hard_kill");
    let logs = repository.list_audit_logs(10).await.unwrap();
    assert_eq!(logs[0].action, "hard_kill");
    assert_eq!(logs[0].actor, "system");
}

#[tokio::test]
async fn global_exceedance_takes_precedence_in_reason() {
    let (service, _repository, _bus) = service();
    service
        .configure(config(GLOBAL_BUDGET_ID, 50, 10_000.0, true))
        .await
        .unwrap();

    let decision = service.register_usage(usage("agent_x", 60, 0.1)).await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("Global budget limit reached."));
}

#[tokio::test]
async fn soft_global_exceedance_still_allows() {
    let (service, _repository, bus) = service();
    service
        .configure(config(GLOBAL_BUDGET_ID, 50, 10_000.0, false))
        .await
        .unwrap();
    let mut rx = bus.subscribe();

    let decision = service.register_usage(usage("agent_x", 60, 0.1)).await.unwrap();
    assert!(decision.allowed);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.kind(), "budget.warning");
    match event.payload {
        GatewayPayload::BudgetWarning { reason, .. } => {
            assert!(reason.contains("Global"));
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[tokio::test]
async fn can_run_blocks_only_hard_kill_budgets() {
    let (service, _repository, _bus) = service();

    // Soft-exceeded agent still runs.
    service
        .configure(config("agent_soft", 10, 1_000.0, false))
        .await
        .unwrap();
    service.register_usage(usage("agent_soft", 20, 0.1)).await.unwrap();
    assert!(service.can_run("agent_soft").await.unwrap().allowed);

    // Hard-killed agent is blocked with the agent-scoped reason.
    service
        .configure(config("agent_hard", 10, 1_000.0, true))
        .await
        .unwrap();
    service.register_usage(usage("agent_hard", 20, 0.1)).await.unwrap();
    let decision = service.can_run("agent_hard").await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("Agent hard kill active."));
}

#[tokio::test]
async fn can_run_reports_global_hard_kill_first() {
    let (service, _repository, _bus) = service();
    service
        .configure(config(GLOBAL_BUDGET_ID, 10, 10_000.0, true))
        .await
        .unwrap();
    service
        .configure(config("agent_x", 10, 1_000.0, true))
        .await
        .unwrap();
    service.register_usage(usage("agent_x", 20, 0.1)).await.unwrap();

    let decision = service.can_run("agent_x").await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("Global hard kill active."));
}

#[tokio::test]
async fn usage_rolls_up_into_agent_and_global_rows() {
    let (service, repository, _bus) = service();
    service.register_usage(usage("agent_a", 1_000, 1.0)).await.unwrap();
    service.register_usage(usage("agent_b", 2_000, 2.0)).await.unwrap();

    let global = repository.get_budget(GLOBAL_BUDGET_ID).await.unwrap();
    assert_eq!(global.current_tokens, 3_000);
    assert_eq!(global.current_cost_usd, 3.0);

    let agent_a = repository.get_budget("agent_a").await.unwrap();
    assert_eq!(agent_a.current_tokens, 1_000);
}

#[tokio::test]
async fn list_returns_global_row_plus_one_per_agent() {
    let repository = Arc::new(InMemoryRepository::with_agents(vec![
        AgentRecord {
            id: "agent_a".to_string(),
            name: "Researcher".to_string(),
            status: AgentStatus::Online,
        },
        AgentRecord {
            id: "agent_b".to_string(),
            name: "Builder".to_string(),
            status: AgentStatus::Idle,
        },
    ]));
    let service = BudgetService::new(repository, EventBus::new(8));

    let overview = service.list().await.unwrap();
    assert_eq!(overview.global.agent_id, GLOBAL_BUDGET_ID);
    assert_eq!(overview.global.token_limit, 500_000);
    assert_eq!(overview.agents.len(), 2);
    assert!(overview.agents.iter().all(|b| b.token_limit == 100_000));
}
