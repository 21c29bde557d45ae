// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Checkpoint Log
//!
//! Append-only, per-swarm sequential snapshot log. Step numbers are assigned
//! as `count(existing) + 1`; [`CheckpointService::create`] holds a gate
//! across the count-and-append pair so steps stay contiguous under
//! concurrent callers. Rewind is a lookup, never a truncation — anything
//! recorded after the rewound step remains in the log, and new activity
//! after a rewind appends as new steps.

use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::audit::AuditLog;
use crate::domain::checkpoint::{CheckpointId, CheckpointRecord};
use crate::domain::error::GatewayError;
use crate::domain::events::{GatewayEvent, GatewayPayload};
use crate::domain::repository::Repository;
use crate::infrastructure::event_bus::EventBus;

pub struct CheckpointService {
    repository: Arc<dyn Repository>,
    events: EventBus,
    create_gate: Mutex<()>,
}

impl CheckpointService {
    pub fn new(repository: Arc<dyn Repository>, events: EventBus) -> Self {
        Self {
            repository,
            events,
            create_gate: Mutex::new(()),
        }
    }

    /// Append the next checkpoint for a swarm. Blank prompt snapshots are
    /// trimmed away rather than stored as empty strings.
    pub async fn create(
        &self,
        swarm_id: &str,
        prompt_snapshot: Option<&str>,
        state: Option<serde_json::Value>,
    ) -> Result<CheckpointRecord, GatewayError> {
        let _gate = self.create_gate.lock().await;
        let step = self.repository.count_checkpoints(swarm_id).await? + 1;
        let record = CheckpointRecord {
            id: CheckpointId::new(),
            swarm_id: swarm_id.to_string(),
            step,
            state_json: state.unwrap_or_else(|| json!({})).to_string(),
            prompt_snapshot: prompt_snapshot
                .map(str::trim)
                .filter(|snapshot| !snapshot.is_empty())
                .map(str::to_string),
            created_at: chrono::Utc::now(),
        };
        self.repository.add_checkpoint(record.clone()).await?;
        self.repository
            .add_audit_log(AuditLog::new(
                "checkpoint",
                "create",
                "system",
                json!({ "swarmId": swarm_id, "checkpointId": record.id.to_string(), "step": step }),
            ))
            .await?;
        self.events
            .publish(GatewayEvent::with_request_id(GatewayPayload::SwarmCheckpoint {
                swarm_id: swarm_id.to_string(),
                checkpoint_id: record.id,
                step,
            }));
        Ok(record)
    }

    /// Newest checkpoints first, bounded by `limit`.
    pub async fn list(
        &self,
        swarm_id: &str,
        limit: usize,
    ) -> Result<Vec<CheckpointRecord>, GatewayError> {
        Ok(self.repository.list_checkpoints(swarm_id, limit).await?)
    }

    /// Look a checkpoint up by id across the swarm's full history. The
    /// record is returned unchanged; callers decide what rewinding means
    /// operationally (e.g. re-issuing a message as if from that point).
    pub async fn rewind(
        &self,
        swarm_id: &str,
        checkpoint_id: CheckpointId,
    ) -> Result<CheckpointRecord, GatewayError> {
        let checkpoint = self
            .repository
            .list_checkpoints(swarm_id, usize::MAX)
            .await?
            .into_iter()
            .find(|record| record.id == checkpoint_id)
            .ok_or_else(|| GatewayError::NotFound(format!("checkpoint not found: {checkpoint_id}")))?;
        self.repository
            .add_audit_log(AuditLog::new(
                "checkpoint",
                "rewind",
                "user",
                json!({ "swarmId": swarm_id, "checkpointId": checkpoint_id.to_string() }),
            ))
            .await?;
        self.events
            .publish(GatewayEvent::with_request_id(GatewayPayload::SwarmRewind {
                swarm_id: swarm_id.to_string(),
                checkpoint_id,
            }));
        info!(swarm_id, %checkpoint_id, step = checkpoint.step, "rewind issued");
        Ok(checkpoint)
    }
}
