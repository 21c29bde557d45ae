// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Persistence Contract
//!
//! Single repository seam serializing all durable gateway state: agents,
//! budgets, usage reports, permission grants, checkpoints, audit logs,
//! tasks, and chat threads/messages. Interface defined here in the domain
//! layer, implemented in `crate::infrastructure::repositories`.
//!
//! Calls are assumed fast and local; a failing backend surfaces a
//! [`RepositoryError`] which callers propagate untouched — the core keeps no
//! shadow state to fall back on.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::agent::AgentRecord;
use crate::domain::audit::AuditLog;
use crate::domain::budget::{AgentBudget, BudgetConfigInput, UsageReport};
use crate::domain::chat::{ChatThread, SwarmChatMessage, SwarmSummary};
use crate::domain::checkpoint::CheckpointRecord;
use crate::domain::permission::PermissionGrant;
use crate::domain::task::{Task, TaskId};
use crate::domain::vault::VaultSummary;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Storage backend for all gateway aggregates.
///
/// Ordering contracts the services rely on:
/// - `list_checkpoints` and `list_audit_logs` return the newest window first.
/// - `get_budget` materializes a baseline row on first read so budget math
///   never observes a missing row.
/// - `apply_usage_to_budget` folds the delta in and returns the updated row.
#[async_trait]
pub trait Repository: Send + Sync {
    // Agent directory
    async fn list_agents(&self) -> Result<Vec<AgentRecord>, RepositoryError>;
    async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentRecord>, RepositoryError>;
    async fn upsert_agent(&self, agent: AgentRecord) -> Result<(), RepositoryError>;

    // Budgets & usage
    async fn get_budget(&self, agent_id: &str) -> Result<AgentBudget, RepositoryError>;
    async fn set_budget(&self, input: BudgetConfigInput) -> Result<AgentBudget, RepositoryError>;
    async fn apply_usage_to_budget(
        &self,
        agent_id: &str,
        prompt_tokens: u64,
        completion_tokens: u64,
        cost_usd: f64,
    ) -> Result<AgentBudget, RepositoryError>;
    async fn add_usage_report(&self, report: UsageReport) -> Result<(), RepositoryError>;

    // Permission grants
    async fn add_permission(&self, grant: PermissionGrant) -> Result<(), RepositoryError>;
    async fn list_permissions(&self) -> Result<Vec<PermissionGrant>, RepositoryError>;

    // Checkpoints
    async fn add_checkpoint(&self, record: CheckpointRecord) -> Result<(), RepositoryError>;
    async fn list_checkpoints(
        &self,
        swarm_id: &str,
        limit: usize,
    ) -> Result<Vec<CheckpointRecord>, RepositoryError>;
    async fn count_checkpoints(&self, swarm_id: &str) -> Result<u64, RepositoryError>;

    // Audit trail
    async fn add_audit_log(&self, log: AuditLog) -> Result<(), RepositoryError>;
    async fn list_audit_logs(&self, limit: usize) -> Result<Vec<AuditLog>, RepositoryError>;

    // Tasks
    async fn upsert_task(&self, task: Task) -> Result<(), RepositoryError>;
    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, RepositoryError>;
    async fn list_tasks(&self) -> Result<Vec<Task>, RepositoryError>;

    // Chat
    async fn upsert_chat_thread(&self, thread: ChatThread) -> Result<(), RepositoryError>;
    async fn list_chat_threads(&self) -> Result<Vec<ChatThread>, RepositoryError>;
    async fn append_chat_message(&self, message: SwarmChatMessage) -> Result<(), RepositoryError>;
    async fn list_chat_messages(
        &self,
        thread_id: &str,
    ) -> Result<Vec<SwarmChatMessage>, RepositoryError>;

    // Derived summaries
    async fn swarm_summary(&self) -> Result<SwarmSummary, RepositoryError>;
    async fn vault_summary(&self, capacity_gb: f64) -> Result<VaultSummary, RepositoryError>;
}
