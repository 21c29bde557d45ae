// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Remote Instance Types
//!
//! Configuration and transient liveness state for the remote agent runtimes
//! the gateway monitors and commands. Health is rebuilt from a fresh
//! `connect_all()` on process start, never loaded from disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Boot-time registry entry for one remote agent-runtime instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceConfig {
    pub id: String,
    pub name: String,
}

/// Transient liveness record per instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceHealth {
    pub connected: bool,
    pub last_heartbeat_at: Option<DateTime<Utc>>,
    pub latency_ms: Option<u64>,
    pub error_rate_pct: u8,
}

impl InstanceHealth {
    /// Fresh record seeded by `connect_all`.
    pub fn connected() -> Self {
        Self {
            connected: true,
            last_heartbeat_at: None,
            latency_ms: None,
            error_rate_pct: 0,
        }
    }
}
