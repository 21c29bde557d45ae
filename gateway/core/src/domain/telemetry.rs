// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Telemetry Types
//!
//! Operational events held in the [`crate::application::TelemetryHub`] ring
//! and the derived operator snapshot rendered by the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse event classification used for dashboard filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryCategory {
    Lifecycle,
    Gateway,
    Agent,
    Vault,
    Error,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetrySeverity {
    Info,
    Warning,
    Critical,
}

/// One operational event.
///
/// Ids are strings rather than UUIDs: live ring events carry a fresh UUID,
/// while entries synthesized from the audit log at read time are prefixed
/// `audit-` so the two spaces never collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub id: String,
    pub category: TelemetryCategory,
    pub severity: TelemetrySeverity,
    pub source: String,
    pub message: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Input for [`crate::application::TelemetryHub::record`]; severity defaults
/// to `Info`, `created_at` to now, and `metadata` to an empty object.
#[derive(Debug, Clone)]
pub struct TelemetryInput {
    pub category: TelemetryCategory,
    pub severity: Option<TelemetrySeverity>,
    pub source: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Point-in-time operational summary for the dashboard header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub heartbeat: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub gateway_status: GatewayStatus,
    pub active_agents: usize,
    pub total_agents: usize,
    pub error_agents: usize,
    pub pending_approvals: usize,
    pub spend_today_usd: f64,
    pub vault_used_gb: f64,
    pub vault_capacity_gb: f64,
    pub vault_usage_pct: f64,
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStatus {
    Ok,
    Degraded,
}

/// Serialization target for [`crate::application::TelemetryHub::export_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}
