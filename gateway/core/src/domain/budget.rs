// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Budget Aggregate
//!
//! Per-agent token/cost metering rows plus the synthetic `"global"` row.
//! Current usage is monotonically non-decreasing within a budget period;
//! period reset lives outside the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Agent id of the synthetic budget row that meters the whole swarm.
pub const GLOBAL_BUDGET_ID: &str = "global";

/// Token/cost limits and accumulated usage for one agent (or `"global"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentBudget {
    pub agent_id: String,
    pub token_limit: u64,
    pub cost_limit_usd: f64,
    pub current_tokens: u64,
    pub current_cost_usd: f64,
    pub hard_kill: bool,
    pub updated_at: DateTime<Utc>,
}

impl AgentBudget {
    /// Baseline row used when no budget was ever configured for an agent.
    pub fn baseline(agent_id: &str) -> Self {
        let global = agent_id == GLOBAL_BUDGET_ID;
        Self {
            agent_id: agent_id.to_string(),
            token_limit: if global { 500_000 } else { 100_000 },
            cost_limit_usd: if global { 250.0 } else { 40.0 },
            current_tokens: 0,
            current_cost_usd: 0.0,
            hard_kill: false,
            updated_at: Utc::now(),
        }
    }

    /// A budget is exceeded once either metered dimension reaches its limit.
    pub fn is_exceeded(&self) -> bool {
        self.current_tokens >= self.token_limit || self.current_cost_usd >= self.cost_limit_usd
    }
}

/// One model-invocation usage sample reported by an agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub agent_id: String,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cost_usd: f64,
    pub timestamp: DateTime<Utc>,
}

/// Limits/hard-kill upsert input for [`crate::application::BudgetService::configure`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetConfigInput {
    pub agent_id: String,
    pub token_limit: u64,
    pub cost_limit_usd: f64,
    pub hard_kill: bool,
}

/// Outcome of registering a usage report. `allowed == false` only when a
/// hard-kill budget was exceeded; soft exceedance is a warning event plus
/// `allowed == true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub budget: AgentBudget,
}

/// Pre-flight gate result for starting new work on behalf of an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
