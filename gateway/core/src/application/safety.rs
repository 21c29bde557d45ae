// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Safety Workflow — Capability Grant Lifecycle
//!
//! Request/approve/deny flow for dangerous capabilities, with an audit entry
//! for every move. The pending set is owned by the workflow instance and
//! rehydrated once at boot via [`SafetyWorkflow::restore_pending`], so a
//! process restart does not silently lose outstanding approval requests.
//!
//! A grant id is decidable exactly once: approve/deny remove it from the
//! pending set, and deciding an unknown id fails.

use dashmap::DashMap;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::domain::audit::AuditLog;
use crate::domain::error::GatewayError;
use crate::domain::permission::{GrantId, PermissionGrant};
use crate::domain::repository::Repository;

pub struct SafetyWorkflow {
    repository: Arc<dyn Repository>,
    pending: DashMap<GrantId, PermissionGrant>,
}

impl SafetyWorkflow {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self {
            repository,
            pending: DashMap::new(),
        }
    }

    /// Create a pending grant for one capability and audit the request.
    pub async fn request_capability(
        &self,
        agent_id: &str,
        capability: &str,
    ) -> Result<PermissionGrant, GatewayError> {
        let grant = PermissionGrant::pending(agent_id, capability);
        self.pending.insert(grant.id, grant.clone());
        self.repository.add_permission(grant.clone()).await?;
        self.repository
            .add_audit_log(AuditLog::new(
                "permissions",
                "request",
                "system",
                json!({ "agentId": agent_id, "capability": capability }),
            ))
            .await?;
        Ok(grant)
    }

    /// Batch form of [`request_capability`](Self::request_capability). When
    /// request metadata is supplied, one `request_context` audit entry is
    /// written per grant so the approval modal can show provenance.
    pub async fn request_capabilities(
        &self,
        agent_id: &str,
        capabilities: &[String],
        metadata: Option<&Map<String, Value>>,
    ) -> Result<Vec<PermissionGrant>, GatewayError> {
        let mut grants = Vec::with_capacity(capabilities.len());
        for capability in capabilities {
            let grant = self.request_capability(agent_id, capability).await?;
            if let Some(context) = metadata {
                let mut enriched = context.clone();
                enriched.insert("grantId".to_string(), json!(grant.id.to_string()));
                self.repository
                    .add_audit_log(AuditLog::new(
                        "permissions",
                        "request_context",
                        "system",
                        Value::Object(enriched),
                    ))
                    .await?;
            }
            grants.push(grant);
        }
        Ok(grants)
    }

    /// Approve a pending grant; persists it with `granted = true`.
    pub async fn approve(&self, grant_id: GrantId) -> Result<PermissionGrant, GatewayError> {
        let (_, mut grant) = self
            .pending
            .remove(&grant_id)
            .ok_or_else(|| GatewayError::NotFound(format!("missing permission request {grant_id}")))?;
        grant.granted = true;
        self.repository.add_permission(grant.clone()).await?;
        self.repository
            .add_audit_log(AuditLog::new(
                "permissions",
                "approve",
                "user",
                json!({ "grantId": grant_id.to_string() }),
            ))
            .await?;
        info!(%grant_id, capability = %grant.capability, "capability approved");
        Ok(grant)
    }

    /// Deny a pending grant; persists it with `granted = false` so the
    /// explicit refusal is on record.
    pub async fn deny(&self, grant_id: GrantId) -> Result<PermissionGrant, GatewayError> {
        let (_, grant) = self
            .pending
            .remove(&grant_id)
            .ok_or_else(|| GatewayError::NotFound(format!("missing permission request {grant_id}")))?;
        self.repository.add_permission(grant.clone()).await?;
        self.repository
            .add_audit_log(AuditLog::new(
                "permissions",
                "deny",
                "user",
                json!({ "grantId": grant_id.to_string() }),
            ))
            .await?;
        info!(%grant_id, capability = %grant.capability, "capability denied");
        Ok(grant)
    }

    /// Snapshot of the live pending set, optionally filtered by agent.
    pub fn list_pending(&self, agent_id: Option<&str>) -> Vec<PermissionGrant> {
        self.pending
            .iter()
            .filter(|entry| agent_id.is_none_or(|id| entry.agent_id == id))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Replace the entire pending set from persisted undecided grants.
    /// Called once at boot.
    pub fn restore_pending(&self, grants: Vec<PermissionGrant>) {
        self.pending.clear();
        for grant in grants {
            self.pending.insert(grant.id, grant);
        }
    }

    pub async fn list_audit_logs(&self, limit: usize) -> Result<Vec<AuditLog>, GatewayError> {
        Ok(self.repository.list_audit_logs(limit).await?)
    }
}
