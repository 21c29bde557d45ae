// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Checkpoint Records
//!
//! Immutable, sequentially-numbered snapshots of orchestration state per
//! swarm. Rewind is a read, never a truncation: history after the rewound
//! step stays intact and new activity appends as new steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a [`CheckpointRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckpointId(pub Uuid);

impl CheckpointId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CheckpointId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One append-only snapshot in a swarm's checkpoint log.
///
/// `step` is 1-based, unique, and strictly increasing per `swarm_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointRecord {
    pub id: CheckpointId,
    pub swarm_id: String,
    pub step: u64,
    pub state_json: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_snapshot: Option<String>,
    pub created_at: DateTime<Utc>,
}
