// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Vault Collaborator Types
//!
//! The long-term content store lives outside the core; the gateway only
//! issues the single best-effort recall call and renders storage summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultEntryKind {
    Kb,
    Archive,
    File,
}

/// One recalled memory/knowledge entry. Importance is scored 0–10.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: VaultEntryKind,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub importance_score: f64,
    pub created_at: DateTime<Utc>,
}

/// Storage accounting for the snapshot's vault gauge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultSummary {
    pub used_gb: f64,
    pub capacity_gb: f64,
    pub archived_items: usize,
    pub file_items: usize,
    pub knowledge_items: usize,
}
