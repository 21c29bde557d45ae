// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Audit Trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One append-only audit entry. Budget changes, permission decisions, and
/// checkpoint activity all land here; the telemetry hub merges this trail
/// into its derived event view at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub category: String,
    pub action: String,
    pub actor: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(category: &str, action: &str, actor: &str, metadata: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.to_string(),
            action: action.to_string(),
            actor: actor.to_string(),
            metadata,
            created_at: Utc::now(),
        }
    }
}
