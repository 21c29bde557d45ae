// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Budget Service — Metering and Hard-Kill Gating
//!
//! Applies usage deltas to the named agent's budget row and the `"global"`
//! row, then decides: hard-kill refusal, soft warning, or proceed. Both rows
//! are updated before any decision is taken, so the hard-kill check never
//! acts on a partially-applied global state. Global exceedance takes
//! precedence in the reported reason.

use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::audit::AuditLog;
use crate::domain::budget::{
    AgentBudget, BudgetConfigInput, RunDecision, UsageDecision, UsageReport, GLOBAL_BUDGET_ID,
};
use crate::domain::error::GatewayError;
use crate::domain::events::{GatewayEvent, GatewayPayload};
use crate::domain::repository::Repository;
use crate::infrastructure::event_bus::EventBus;

pub struct BudgetService {
    repository: Arc<dyn Repository>,
    events: EventBus,
}

/// The global row plus one row per known agent, for the budgets panel.
#[derive(Debug, Clone)]
pub struct BudgetOverview {
    pub global: AgentBudget,
    pub agents: Vec<AgentBudget>,
}

impl BudgetService {
    pub fn new(repository: Arc<dyn Repository>, events: EventBus) -> Self {
        Self { repository, events }
    }

    pub async fn list(&self) -> Result<BudgetOverview, GatewayError> {
        let global = self.repository.get_budget(GLOBAL_BUDGET_ID).await?;
        let mut agents = Vec::new();
        for agent in self.repository.list_agents().await? {
            agents.push(self.repository.get_budget(&agent.id).await?);
        }
        Ok(BudgetOverview { global, agents })
    }

    /// Upsert limits and the hard-kill flag for an agent (or `"global"`).
    pub async fn configure(&self, input: BudgetConfigInput) -> Result<AgentBudget, GatewayError> {
        let updated = self.repository.set_budget(input.clone()).await?;
        self.repository
            .add_audit_log(AuditLog::new(
                "budget",
                "configure",
                "user",
                json!({
                    "agentId": input.agent_id,
                    "tokenLimit": input.token_limit,
                    "costLimitUsd": input.cost_limit_usd,
                    "hardKill": input.hard_kill,
                }),
            ))
            .await?;
        self.events
            .publish(GatewayEvent::with_request_id(GatewayPayload::BudgetConfigured {
                agent_id: input.agent_id.clone(),
            }));
        info!(agent_id = %input.agent_id, "budget configured");
        Ok(updated)
    }

    /// Meter one usage report. Applies the delta to the agent row and the
    /// global row, persists the report, then decides.
    pub async fn register_usage(&self, report: UsageReport) -> Result<UsageDecision, GatewayError> {
        let agent_budget = self
            .repository
            .apply_usage_to_budget(
                &report.agent_id,
                report.prompt_tokens,
                report.completion_tokens,
                report.cost_usd,
            )
            .await?;
        let global_budget = self
            .repository
            .apply_usage_to_budget(
                GLOBAL_BUDGET_ID,
                report.prompt_tokens,
                report.completion_tokens,
                report.cost_usd,
            )
            .await?;
        self.repository.add_usage_report(report.clone()).await?;

        let agent_exceeded = agent_budget.is_exceeded();
        let global_exceeded = global_budget.is_exceeded();

        if (agent_exceeded && agent_budget.hard_kill) || (global_exceeded && global_budget.hard_kill) {
            let reason = if global_exceeded {
                "Global budget limit reached."
            } else {
                "Agent budget limit reached."
            };
            warn!(agent_id = %report.agent_id, reason, "budget hard kill");
            self.repository
                .add_audit_log(AuditLog::new(
                    "budget",
                    "hard_kill",
                    "system",
                    json!({ "agentId": report.agent_id, "reason": reason }),
                ))
                .await?;
            self.events
                .publish(GatewayEvent::with_request_id(GatewayPayload::BudgetHardKill {
                    agent_id: report.agent_id.clone(),
                    reason: reason.to_string(),
                }));
            return Ok(UsageDecision {
                allowed: false,
                reason: Some(reason.to_string()),
                budget: agent_budget,
            });
        }

        if agent_exceeded || global_exceeded {
            let reason = if global_exceeded {
                "Global budget threshold exceeded."
            } else {
                "Agent budget threshold exceeded."
            };
            self.repository
                .add_audit_log(AuditLog::new(
                    "budget",
                    "warning",
                    "system",
                    json!({ "agentId": report.agent_id, "reason": reason }),
                ))
                .await?;
            self.events
                .publish(GatewayEvent::with_request_id(GatewayPayload::BudgetWarning {
                    agent_id: report.agent_id.clone(),
                    reason: reason.to_string(),
                }));
        }

        Ok(UsageDecision {
            allowed: true,
            reason: None,
            budget: agent_budget,
        })
    }

    /// Pre-flight gate before starting new work for an agent. Blocks only
    /// when an exceeded budget also has hard-kill enabled.
    pub async fn can_run(&self, agent_id: &str) -> Result<RunDecision, GatewayError> {
        let budget = self.repository.get_budget(agent_id).await?;
        let global = self.repository.get_budget(GLOBAL_BUDGET_ID).await?;
        let blocked_agent = budget.is_exceeded() && budget.hard_kill;
        let blocked_global = global.is_exceeded() && global.hard_kill;
        if blocked_agent || blocked_global {
            let reason = if blocked_global {
                "Global hard kill active."
            } else {
                "Agent hard kill active."
            };
            return Ok(RunDecision {
                allowed: false,
                reason: Some(reason.to_string()),
            });
        }
        Ok(RunDecision {
            allowed: true,
            reason: None,
        })
    }
}
