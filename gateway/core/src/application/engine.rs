// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # CSO Orchestration Engine
//!
//! Pure domain logic for the task state machine, delegation-rule lookup,
//! retry backoff, dead-letter queue, and manual-intervention flags. The
//! engine publishes nothing and persists nothing; the chat service and the
//! shell drive it and own the side effects.
//!
//! All interior maps are owned by the engine instance — nothing here is a
//! process-global — so two engines in one test binary never share state.

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::warn;

use crate::domain::error::GatewayError;
use crate::domain::task::{DelegationRule, RetryState, Task, TaskId, TaskIntent, TaskStatus};

/// Rule key acting as the fallback for unmapped task types.
pub const DEFAULT_RULE_KEY: &str = "default";

/// Retry delay cap, in seconds.
const RETRY_CAP_SECS: u64 = 30;

#[derive(Default)]
pub struct CsoOrchestrationEngine {
    rules: DashMap<String, DelegationRule>,
    retries: DashMap<TaskId, RetryState>,
    dead_letter: Mutex<Vec<TaskIntent>>,
    manual_interventions: DashMap<TaskId, String>,
}

impl CsoOrchestrationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a delegation rule. Called once per task type at boot;
    /// rules are read-only at request time.
    pub fn register_rule(&self, rule: DelegationRule) {
        self.rules.insert(rule.task_type.clone(), rule);
    }

    /// Build a task in `Inbox` from a decomposed intent.
    pub fn create_task(&self, intent: &TaskIntent) -> Task {
        let now = Utc::now();
        Task {
            id: intent.id,
            title: intent.title.clone(),
            description: intent.description.clone(),
            status: TaskStatus::Inbox,
            priority: intent.priority,
            assignee_agent_id: None,
            parent_task_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Same as [`create_task`](Self::create_task), stamped with the parent id.
    pub fn create_sub_task(&self, parent: &Task, intent: &TaskIntent) -> Task {
        Task {
            parent_task_id: Some(parent.id),
            ..self.create_task(intent)
        }
    }

    /// Delegate under the `"default"` rule, optionally overriding the assignee.
    pub fn delegate(&self, task: &Task, override_agent_id: Option<&str>) -> Result<Task, GatewayError> {
        self.delegate_by_type(task, DEFAULT_RULE_KEY, override_agent_id)
    }

    /// Resolve the assignee as: explicit override, else the rule for
    /// `task_type`, else the `"default"` rule. The task becomes `Assigned`.
    pub fn delegate_by_type(
        &self,
        task: &Task,
        task_type: &str,
        override_agent_id: Option<&str>,
    ) -> Result<Task, GatewayError> {
        let rule_agent = self
            .rules
            .get(task_type)
            .or_else(|| self.rules.get(DEFAULT_RULE_KEY))
            .map(|rule| rule.default_agent_id.clone());
        let assignee = override_agent_id
            .map(str::to_string)
            .or(rule_agent)
            .ok_or_else(|| {
                warn!(task_type, "no delegation target configured");
                GatewayError::Configuration("no delegation target configured".to_string())
            })?;
        Ok(Task {
            assignee_agent_id: Some(assignee),
            status: TaskStatus::Assigned,
            updated_at: Utc::now(),
            ..task.clone()
        })
    }

    /// Move a task along a legal edge of the status table. Illegal moves are
    /// surfaced and never auto-corrected.
    pub fn transition(&self, task: &Task, next: TaskStatus) -> Result<Task, GatewayError> {
        if !task.status.can_transition_to(next) {
            return Err(GatewayError::InvalidTransition {
                from: task.status,
                to: next,
            });
        }
        Ok(Task {
            status: next,
            updated_at: Utc::now(),
            ..task.clone()
        })
    }

    /// Bump the attempt counter for a task and return the capped exponential
    /// retry delay in seconds (`min(2^attempts, 30)`). The engine never
    /// schedules the retry itself; the caller acts on the returned delay.
    pub fn schedule_retry(&self, task_id: TaskId, error: &str) -> u64 {
        let mut state = self.retries.entry(task_id).or_default();
        state.attempts += 1;
        state.last_error = Some(error.to_string());
        2u64.checked_pow(state.attempts)
            .map_or(RETRY_CAP_SECS, |delay| delay.min(RETRY_CAP_SECS))
    }

    /// Attempts recorded so far for a task.
    pub fn retry_attempts(&self, task_id: TaskId) -> u32 {
        self.retries
            .get(&task_id)
            .map(|state| state.attempts)
            .unwrap_or(0)
    }

    /// Append an exhausted intent to the dead-letter queue. Calling twice for
    /// the same task appends twice; de-duplication is the caller's concern.
    pub fn send_to_dead_letter(&self, intent: TaskIntent) {
        self.dead_letter.lock().push(intent);
    }

    pub fn dead_letter_queue(&self) -> Vec<TaskIntent> {
        self.dead_letter.lock().clone()
    }

    /// Mark a task as requiring operator action before it may auto-progress.
    /// Last write wins.
    pub fn flag_manual_intervention(&self, task_id: TaskId, reason: &str) {
        self.manual_interventions.insert(task_id, reason.to_string());
    }

    pub fn manual_intervention_reason(&self, task_id: TaskId) -> Option<String> {
        self.manual_interventions
            .get(&task_id)
            .map(|reason| reason.clone())
    }
}
