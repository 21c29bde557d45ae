// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Directory Records
//!
//! The gateway's view of the agents it coordinates. Agent ids are stable
//! strings assigned at provisioning time (`agent_research`, `agent_cso`, ...)
//! so budget rows, delegation rules, and chat authors can reference them
//! without a lookup.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Online,
    Busy,
    Idle,
    Error,
    Degraded,
    Offline,
}

impl AgentStatus {
    /// Counts toward `active_agents` in the telemetry snapshot.
    pub fn is_active(self) -> bool {
        matches!(self, AgentStatus::Online | AgentStatus::Busy)
    }

    /// Counts toward `error_agents` and degrades the gateway status.
    pub fn is_errored(self) -> bool {
        matches!(self, AgentStatus::Error | AgentStatus::Degraded)
    }
}

/// Directory entry for one subordinate agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub status: AgentStatus,
}
