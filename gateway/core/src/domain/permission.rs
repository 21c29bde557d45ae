// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Permission Grants
//!
//! A [`PermissionGrant`] gates an agent's access to a dangerous capability.
//! Grants start pending (`granted == false`, awaiting decision), and are
//! decided exactly once: approved (`granted == true`) or explicitly denied
//! (`granted == false`, no longer pending).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a [`PermissionGrant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantId(pub Uuid);

impl GrantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GrantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GrantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Capability request/approval record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    pub id: GrantId,
    pub agent_id: String,
    pub capability: String,
    pub granted: bool,
    pub created_at: DateTime<Utc>,
}

impl PermissionGrant {
    /// A fresh pending grant awaiting an operator decision.
    pub fn pending(agent_id: &str, capability: &str) -> Self {
        Self {
            id: GrantId::new(),
            agent_id: agent_id.to_string(),
            capability: capability.to_string(),
            granted: false,
            created_at: Utc::now(),
        }
    }
}
