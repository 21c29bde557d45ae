// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Telemetry Hub
//!
//! Capped ring of operational events with live fan-out, replay-by-last-seen
//! id, and a merged read view over the audit trail.
//!
//! The ring holds the newest [`TELEMETRY_RING_MAX`] events; older entries
//! are silently evicted, which is the system's only backpressure mechanism.
//! Replay via [`TelemetryHub::list_since`] is therefore at-most-once with a
//! possible gap: when the requested id was evicted (or never existed) the
//! hub falls back to the most recent window with no out-of-band signal.
//! Durable history comes from the audit-log collaborator and is merged in at
//! read time only — never written back into the ring.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::audit::AuditLog;
use crate::domain::error::GatewayError;
use crate::domain::repository::Repository;
use crate::domain::telemetry::{
    ExportFormat, GatewayStatus, TelemetryCategory, TelemetryEvent, TelemetryInput,
    TelemetrySeverity, TelemetrySnapshot,
};

/// Fixed ring capacity. Exceeding it evicts the oldest entries (FIFO).
pub const TELEMETRY_RING_MAX: usize = 2000;

const VAULT_CAPACITY_GB: f64 = 128.0;

pub struct TelemetryHub {
    repository: Arc<dyn Repository>,
    ring: Mutex<VecDeque<TelemetryEvent>>,
    live: broadcast::Sender<TelemetryEvent>,
}

impl TelemetryHub {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        let (live, _) = broadcast::channel(TELEMETRY_RING_MAX);
        Self {
            repository,
            ring: Mutex::new(VecDeque::with_capacity(TELEMETRY_RING_MAX)),
            live,
        }
    }

    /// Record one event: assign an id, default severity to `Info`, timestamp
    /// to now, and metadata to an empty object, append to the ring (evicting
    /// from the front past capacity), and notify all live subscribers.
    pub fn record(&self, input: TelemetryInput) -> TelemetryEvent {
        let event = TelemetryEvent {
            id: Uuid::new_v4().to_string(),
            category: input.category,
            severity: input.severity.unwrap_or(TelemetrySeverity::Info),
            source: input.source,
            message: input.message,
            metadata: input.metadata.unwrap_or_else(|| serde_json::json!({})),
            created_at: input.created_at.unwrap_or_else(Utc::now),
        };
        {
            let mut ring = self.ring.lock();
            ring.push_back(event.clone());
            while ring.len() > TELEMETRY_RING_MAX {
                ring.pop_front();
            }
        }
        let _ = self.live.send(event.clone());
        event
    }

    /// Subscribe to live events. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryEvent> {
        self.live.subscribe()
    }

    /// Events recorded after `last_event_id`'s insertion, capped to `limit`.
    ///
    /// When the id is `None` or no longer in the ring (evicted or never
    /// existed) this falls back to the most recent `limit` events. Callers
    /// must treat resumption as at-most-once with a possible gap.
    pub fn list_since(&self, last_event_id: Option<&str>, limit: usize) -> Vec<TelemetryEvent> {
        let ring = self.ring.lock();
        let recent = |ring: &VecDeque<TelemetryEvent>| {
            let skip = ring.len().saturating_sub(limit);
            ring.iter().skip(skip).cloned().collect::<Vec<_>>()
        };
        let Some(wanted) = last_event_id else {
            return recent(&ring);
        };
        let Some(idx) = ring.iter().position(|event| event.id == wanted) else {
            return recent(&ring);
        };
        let after: Vec<TelemetryEvent> = ring.iter().skip(idx + 1).cloned().collect();
        let skip = after.len().saturating_sub(limit);
        after.into_iter().skip(skip).collect()
    }

    /// Merged view: the live ring (newest first) plus a derived view
    /// synthesized from the audit trail, sorted by creation time descending
    /// and truncated to `limit`.
    pub async fn list_events(
        &self,
        limit: usize,
        category: Option<TelemetryCategory>,
    ) -> Result<Vec<TelemetryEvent>, GatewayError> {
        let mut merged: Vec<TelemetryEvent> = {
            let ring = self.ring.lock();
            ring.iter()
                .rev()
                .filter(|event| category.is_none_or(|wanted| event.category == wanted))
                .cloned()
                .collect()
        };
        let audit_window = limit.saturating_mul(3);
        for log in self.repository.list_audit_logs(audit_window).await? {
            let event = Self::from_audit(&log);
            if category.is_none_or(|wanted| event.category == wanted) {
                merged.push(event);
            }
        }
        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        merged.truncate(limit);
        Ok(merged)
    }

    /// Serialize the merged view to JSON or RFC4180-style CSV.
    pub async fn export_events(
        &self,
        format: ExportFormat,
        limit: usize,
    ) -> Result<String, GatewayError> {
        let rows = self.list_events(limit, None).await?;
        match format {
            ExportFormat::Json => serde_json::to_string_pretty(&rows)
                .map_err(GatewayError::MalformedEvent),
            ExportFormat::Csv => {
                let esc = |value: &str| format!("\"{}\"", value.replace('"', "\"\""));
                let mut out = String::from("createdAt,category,severity,source,message,metadata");
                for row in rows {
                    out.push('\n');
                    out.push_str(&[
                        esc(&row.created_at.to_rfc3339()),
                        esc(category_str(row.category)),
                        esc(severity_str(row.severity)),
                        esc(&row.source),
                        esc(&row.message),
                        esc(&row.metadata.to_string()),
                    ]
                    .join(","));
                }
                Ok(out)
            }
        }
    }

    /// Point-in-time operational summary for the dashboard header.
    pub async fn snapshot(
        &self,
        started_at: DateTime<Utc>,
    ) -> Result<TelemetrySnapshot, GatewayError> {
        let now = Utc::now();
        let uptime_seconds = (now - started_at).num_seconds().max(0) as u64;
        let agents = self.repository.list_agents().await?;
        let active_agents = agents.iter().filter(|a| a.status.is_active()).count();
        let error_agents = agents.iter().filter(|a| a.status.is_errored()).count();
        let pending_approvals = self
            .repository
            .list_permissions()
            .await?
            .iter()
            .filter(|grant| !grant.granted)
            .count();
        let summary = self.repository.swarm_summary().await?;
        let vault = self.repository.vault_summary(VAULT_CAPACITY_GB).await?;
        let vault_usage_pct = if vault.capacity_gb > 0.0 {
            ((vault.used_gb / vault.capacity_gb) * 1000.0).round() / 10.0
        } else {
            0.0
        };

        let mut alerts = Vec::new();
        if vault_usage_pct >= 85.0 {
            alerts.push(format!(
                "Vault at {vault_usage_pct}% used: consider pruning low-importance entries."
            ));
        }
        if error_agents > 0 {
            alerts.push(format!("{error_agents} agent(s) in error/degraded state."));
        }
        if pending_approvals > 0 {
            alerts.push(format!("{pending_approvals} pending permission approval(s)."));
        }

        Ok(TelemetrySnapshot {
            heartbeat: now,
            uptime_seconds,
            gateway_status: if error_agents > 0 {
                GatewayStatus::Degraded
            } else {
                GatewayStatus::Ok
            },
            active_agents,
            total_agents: agents.len(),
            error_agents,
            pending_approvals,
            spend_today_usd: (summary.spend_today_usd * 10_000.0).round() / 10_000.0,
            vault_used_gb: vault.used_gb,
            vault_capacity_gb: vault.capacity_gb,
            vault_usage_pct,
            alerts,
        })
    }

    /// Synthesize a telemetry view of one audit entry. `vault`/`agent`
    /// categories pass through, everything else maps to `system`; red-phone
    /// actions surface as critical and vault prunes as warnings.
    fn from_audit(log: &AuditLog) -> TelemetryEvent {
        let category = match log.category.as_str() {
            "vault" => TelemetryCategory::Vault,
            "agent" => TelemetryCategory::Agent,
            _ => TelemetryCategory::System,
        };
        let severity = if log.category == "system" && log.action.contains("red_phone") {
            TelemetrySeverity::Critical
        } else if log.category == "vault" && log.action.contains("prune") {
            TelemetrySeverity::Warning
        } else {
            TelemetrySeverity::Info
        };
        TelemetryEvent {
            id: format!("audit-{}", log.id),
            category,
            severity,
            source: format!("audit.{}", log.category),
            message: format!("{}.{}", log.category, log.action),
            metadata: log.metadata.clone(),
            created_at: log.created_at,
        }
    }
}

fn category_str(category: TelemetryCategory) -> &'static str {
    match category {
        TelemetryCategory::Lifecycle => "lifecycle",
        TelemetryCategory::Gateway => "gateway",
        TelemetryCategory::Agent => "agent",
        TelemetryCategory::Vault => "vault",
        TelemetryCategory::Error => "error",
        TelemetryCategory::System => "system",
    }
}

fn severity_str(severity: TelemetrySeverity) -> &'static str {
    match severity {
        TelemetrySeverity::Info => "info",
        TelemetrySeverity::Warning => "warning",
        TelemetrySeverity::Critical => "critical",
    }
}
