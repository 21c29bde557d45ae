// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # In-Memory Repository
//!
//! Development/test implementation of the [`Repository`] contract. One mutex
//! over the whole state serializes writes, which is what the budget math and
//! checkpoint step counting rely on.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::domain::agent::AgentRecord;
use crate::domain::audit::AuditLog;
use crate::domain::budget::{AgentBudget, BudgetConfigInput, UsageReport};
use crate::domain::chat::{ChatThread, SwarmChatMessage, SwarmSummary};
use crate::domain::checkpoint::CheckpointRecord;
use crate::domain::permission::PermissionGrant;
use crate::domain::repository::{Repository, RepositoryError};
use crate::domain::task::{Task, TaskId, TaskStatus};
use crate::domain::vault::{VaultEntry, VaultEntryKind, VaultSummary};

#[derive(Default)]
struct State {
    agents: Vec<AgentRecord>,
    budgets: HashMap<String, AgentBudget>,
    usage_reports: Vec<UsageReport>,
    permissions: Vec<PermissionGrant>,
    checkpoints: Vec<CheckpointRecord>,
    audit_logs: Vec<AuditLog>,
    tasks: HashMap<TaskId, Task>,
    threads: Vec<ChatThread>,
    messages: Vec<SwarmChatMessage>,
    vault_entries: Vec<VaultEntry>,
}

/// All gateway aggregates behind a single process-local mutex.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the agent directory, e.g. at boot from provisioning config.
    pub fn with_agents(agents: Vec<AgentRecord>) -> Self {
        let repo = Self::new();
        repo.state.lock().agents = agents;
        repo
    }

    /// Seed vault entries so `vault_summary` has something to account for.
    pub fn seed_vault_entries(&self, entries: Vec<VaultEntry>) {
        self.state.lock().vault_entries = entries;
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_agents(&self) -> Result<Vec<AgentRecord>, RepositoryError> {
        Ok(self.state.lock().agents.clone())
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentRecord>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .agents
            .iter()
            .find(|agent| agent.id == agent_id)
            .cloned())
    }

    async fn upsert_agent(&self, agent: AgentRecord) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        match state.agents.iter_mut().find(|item| item.id == agent.id) {
            Some(existing) => *existing = agent,
            None => state.agents.push(agent),
        }
        Ok(())
    }

    async fn get_budget(&self, agent_id: &str) -> Result<AgentBudget, RepositoryError> {
        let mut state = self.state.lock();
        let budget = state
            .budgets
            .entry(agent_id.to_string())
            .or_insert_with(|| AgentBudget::baseline(agent_id));
        Ok(budget.clone())
    }

    async fn set_budget(&self, input: BudgetConfigInput) -> Result<AgentBudget, RepositoryError> {
        let mut state = self.state.lock();
        let budget = state
            .budgets
            .entry(input.agent_id.clone())
            .or_insert_with(|| AgentBudget::baseline(&input.agent_id));
        budget.token_limit = input.token_limit;
        budget.cost_limit_usd = input.cost_limit_usd;
        budget.hard_kill = input.hard_kill;
        budget.updated_at = Utc::now();
        Ok(budget.clone())
    }

    async fn apply_usage_to_budget(
        &self,
        agent_id: &str,
        prompt_tokens: u64,
        completion_tokens: u64,
        cost_usd: f64,
    ) -> Result<AgentBudget, RepositoryError> {
        let mut state = self.state.lock();
        let budget = state
            .budgets
            .entry(agent_id.to_string())
            .or_insert_with(|| AgentBudget::baseline(agent_id));
        budget.current_tokens += prompt_tokens + completion_tokens;
        budget.current_cost_usd += cost_usd;
        budget.updated_at = Utc::now();
        Ok(budget.clone())
    }

    async fn add_usage_report(&self, report: UsageReport) -> Result<(), RepositoryError> {
        self.state.lock().usage_reports.push(report);
        Ok(())
    }

    async fn add_permission(&self, grant: PermissionGrant) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        match state.permissions.iter_mut().find(|item| item.id == grant.id) {
            Some(existing) => *existing = grant,
            None => state.permissions.push(grant),
        }
        Ok(())
    }

    async fn list_permissions(&self) -> Result<Vec<PermissionGrant>, RepositoryError> {
        Ok(self.state.lock().permissions.clone())
    }

    async fn add_checkpoint(&self, record: CheckpointRecord) -> Result<(), RepositoryError> {
        self.state.lock().checkpoints.push(record);
        Ok(())
    }

    async fn list_checkpoints(
        &self,
        swarm_id: &str,
        limit: usize,
    ) -> Result<Vec<CheckpointRecord>, RepositoryError> {
        let state = self.state.lock();
        let mut matching: Vec<CheckpointRecord> = state
            .checkpoints
            .iter()
            .filter(|item| item.swarm_id == swarm_id)
            .cloned()
            .collect();
        let keep = matching.len().saturating_sub(limit);
        matching.drain(..keep);
        matching.reverse();
        Ok(matching)
    }

    async fn count_checkpoints(&self, swarm_id: &str) -> Result<u64, RepositoryError> {
        Ok(self
            .state
            .lock()
            .checkpoints
            .iter()
            .filter(|item| item.swarm_id == swarm_id)
            .count() as u64)
    }

    async fn add_audit_log(&self, log: AuditLog) -> Result<(), RepositoryError> {
        self.state.lock().audit_logs.push(log);
        Ok(())
    }

    async fn list_audit_logs(&self, limit: usize) -> Result<Vec<AuditLog>, RepositoryError> {
        let state = self.state.lock();
        let mut logs: Vec<AuditLog> = state.audit_logs.clone();
        let keep = logs.len().saturating_sub(limit);
        logs.drain(..keep);
        logs.reverse();
        Ok(logs)
    }

    async fn upsert_task(&self, task: Task) -> Result<(), RepositoryError> {
        self.state.lock().tasks.insert(task.id, task);
        Ok(())
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        Ok(self.state.lock().tasks.get(&id).cloned())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, RepositoryError> {
        Ok(self.state.lock().tasks.values().cloned().collect())
    }

    async fn upsert_chat_thread(&self, thread: ChatThread) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        match state.threads.iter_mut().find(|item| item.id == thread.id) {
            Some(existing) => *existing = thread,
            None => state.threads.push(thread),
        }
        Ok(())
    }

    async fn list_chat_threads(&self) -> Result<Vec<ChatThread>, RepositoryError> {
        Ok(self.state.lock().threads.clone())
    }

    async fn append_chat_message(&self, message: SwarmChatMessage) -> Result<(), RepositoryError> {
        self.state.lock().messages.push(message);
        Ok(())
    }

    async fn list_chat_messages(
        &self,
        thread_id: &str,
    ) -> Result<Vec<SwarmChatMessage>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .messages
            .iter()
            .filter(|message| message.thread_id == thread_id)
            .cloned()
            .collect())
    }

    async fn swarm_summary(&self) -> Result<SwarmSummary, RepositoryError> {
        let state = self.state.lock();
        let today = Utc::now().date_naive();
        let online_agents = state
            .agents
            .iter()
            .filter(|agent| agent.status.is_active())
            .count();
        let active_tasks = state
            .tasks
            .values()
            .filter(|task| !matches!(task.status, TaskStatus::Done | TaskStatus::Failed))
            .count();
        let spend_today_usd = state
            .usage_reports
            .iter()
            .filter(|report| report.timestamp.date_naive() == today)
            .map(|report| report.cost_usd)
            .sum();
        Ok(SwarmSummary {
            online_agents,
            active_tasks,
            spend_today_usd,
            heartbeat: Utc::now(),
        })
    }

    async fn vault_summary(&self, capacity_gb: f64) -> Result<VaultSummary, RepositoryError> {
        let state = self.state.lock();
        let count = |kind: VaultEntryKind| {
            state
                .vault_entries
                .iter()
                .filter(|entry| entry.kind == kind)
                .count()
        };
        let archived_items = count(VaultEntryKind::Archive);
        let file_items = count(VaultEntryKind::File);
        let knowledge_items = count(VaultEntryKind::Kb);
        // Flat per-entry footprint estimates; real accounting comes from the
        // vault collaborator's storage stats.
        let used_gb = archived_items as f64 * 0.006
            + file_items as f64 * 0.02
            + knowledge_items as f64 * 0.004;
        Ok(VaultSummary {
            used_gb: (used_gb * 1000.0).round() / 1000.0,
            capacity_gb,
            archived_items,
            file_items,
            knowledge_items,
        })
    }
}
