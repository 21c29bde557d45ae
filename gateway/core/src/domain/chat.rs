// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Swarm Chat Types
//!
//! The narrated conversation surface between the operator and the CSO (the
//! top-level orchestrating agent). Every orchestration outcome — plans,
//! per-step progress, skill suggestions, budget blocks — is rendered as a
//! chat message so the dashboard needs no second feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A conversation thread with the CSO.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatThread {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMessageKind {
    User,
    Cso,
    System,
    Delegation,
    AgentUpdate,
    SkillSuggestion,
}

/// One message in a swarm chat thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmChatMessage {
    pub id: Uuid,
    pub thread_id: String,
    #[serde(rename = "type")]
    pub kind: ChatMessageKind,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// One step of the fixed delegation plan the CSO synthesizes for an intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationPlanStep {
    pub id: Uuid,
    pub task: String,
    pub agent_id: String,
    pub status: String,
}

/// Marketplace skill the CSO proposes installing to unblock an intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSuggestion {
    pub slug: String,
    pub name: String,
    pub reason: String,
    pub target_agent_id: String,
    pub permissions: Vec<String>,
}

/// Aggregate swarm counters rendered in `/status` replies and the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmSummary {
    pub online_agents: usize,
    pub active_tasks: usize,
    pub spend_today_usd: f64,
    pub heartbeat: DateTime<Utc>,
}

/// Quick actions the dashboard offers as one-click chat templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    MorningBriefing,
    StatusReport,
    SuggestSkills,
    DelegateTask,
}
