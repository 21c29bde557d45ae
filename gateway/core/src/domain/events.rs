// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gateway Event Envelope
//!
//! Every lifecycle signal the core emits travels as a [`GatewayEvent`]: a
//! small envelope around a closed, tagged [`GatewayPayload`] union covering
//! the full event taxonomy. The union replaces a free-form payload map so the
//! compiler enforces coverage whenever the taxonomy grows.
//!
//! On the wire the envelope keeps the dashboard's historical shape:
//! `{ "type": "...", "timestamp": ..., "requestId"?, "instanceId"?, "payload": ... }`.
//! A missing inbound timestamp is defaulted to now at deserialization, which
//! is the normalization point guarding the UI and orchestration layers from
//! upstream drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::checkpoint::CheckpointId;
use crate::domain::instance::InstanceHealth;

/// Envelope for one emitted or inbound gateway event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(flatten)]
    pub payload: GatewayPayload,
}

impl GatewayEvent {
    /// Envelope stamped now, with no correlation ids.
    pub fn new(payload: GatewayPayload) -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: None,
            instance_id: None,
            payload,
        }
    }

    /// Envelope stamped now and tagged with a fresh request id.
    pub fn with_request_id(payload: GatewayPayload) -> Self {
        Self {
            request_id: Some(Uuid::new_v4()),
            ..Self::new(payload)
        }
    }

    /// Envelope stamped now and attributed to a remote instance.
    pub fn for_instance(instance_id: &str, payload: GatewayPayload) -> Self {
        Self {
            instance_id: Some(instance_id.to_string()),
            ..Self::new(payload)
        }
    }

    /// The wire-level event type string, e.g. `"instance.ready"`.
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}

/// Command forwarded to a remote instance through the event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayCommand {
    pub name: String,
    pub request_id: Uuid,
    pub payload: serde_json::Value,
}

/// Closed union over the gateway event taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum GatewayPayload {
    #[serde(rename = "instance.ready", rename_all = "camelCase")]
    InstanceReady {
        version: String,
        capabilities: Vec<String>,
    },
    #[serde(rename = "instance.heartbeat")]
    InstanceHeartbeat(InstanceHealth),
    #[serde(rename = "instance.disconnected", rename_all = "camelCase")]
    InstanceDisconnected { reason: String, reconnect_in_ms: u64 },
    #[serde(rename = "gateway.command.sent")]
    CommandSent(GatewayCommand),
    #[serde(rename = "budget.configured", rename_all = "camelCase")]
    BudgetConfigured { agent_id: String },
    #[serde(rename = "budget.warning", rename_all = "camelCase")]
    BudgetWarning { agent_id: String, reason: String },
    #[serde(rename = "budget.hard_kill", rename_all = "camelCase")]
    BudgetHardKill { agent_id: String, reason: String },
    #[serde(rename = "swarm.checkpoint", rename_all = "camelCase")]
    SwarmCheckpoint {
        swarm_id: String,
        checkpoint_id: CheckpointId,
        step: u64,
    },
    #[serde(rename = "swarm.rewind", rename_all = "camelCase")]
    SwarmRewind {
        swarm_id: String,
        checkpoint_id: CheckpointId,
    },
    /// Emitted by the shell when the marketplace client reloads installed
    /// skills; carried here so subscribers get compile-time coverage.
    #[serde(rename = "skills.reload", rename_all = "camelCase")]
    SkillsReload { count: usize },
}

impl GatewayPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayPayload::InstanceReady { .. } => "instance.ready",
            GatewayPayload::InstanceHeartbeat(_) => "instance.heartbeat",
            GatewayPayload::InstanceDisconnected { .. } => "instance.disconnected",
            GatewayPayload::CommandSent(_) => "gateway.command.sent",
            GatewayPayload::BudgetConfigured { .. } => "budget.configured",
            GatewayPayload::BudgetWarning { .. } => "budget.warning",
            GatewayPayload::BudgetHardKill { .. } => "budget.hard_kill",
            GatewayPayload::SwarmCheckpoint { .. } => "swarm.checkpoint",
            GatewayPayload::SwarmRewind { .. } => "swarm.rewind",
            GatewayPayload::SkillsReload { .. } => "skills.reload",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_with_type_tag() {
        let event = GatewayEvent::with_request_id(GatewayPayload::BudgetWarning {
            agent_id: "agent_x".to_string(),
            reason: "Agent budget threshold exceeded.".to_string(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "budget.warning");
        assert_eq!(json["payload"]["agentId"], "agent_x");

        let back: GatewayEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), "budget.warning");
    }

    #[test]
    fn missing_timestamp_defaults_to_now() {
        let raw = serde_json::json!({
            "type": "instance.disconnected",
            "payload": { "reason": "socket closed", "reconnectInMs": 2000 }
        });
        let event: GatewayEvent = serde_json::from_value(raw).unwrap();
        assert!(event.timestamp <= Utc::now());
        assert!(event.request_id.is_none());
    }
}
