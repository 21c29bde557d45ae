// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Task Aggregate
//!
//! Defines the delegated-work unit owned by the orchestration engine:
//!
//! - [`Task`] — aggregate root for one delegated unit of work.
//! - [`TaskStatus`] — closed lifecycle enum with an explicit legality table.
//! - [`TaskIntent`] — the pre-task request produced by intent decomposition.
//! - [`DelegationRule`] — boot-time routing entry keyed by task type.
//!
//! # Invariants
//!
//! - Status moves only along edges returned by [`TaskStatus::allowed_transitions`].
//! - Tasks are never deleted by the core; archival is an external-store concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Generate a new random `TaskId`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Task lifecycle states. `Done` is terminal; `Failed` is recoverable back to
/// `Assigned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Inbox,
    Assigned,
    InProgress,
    Review,
    Done,
    Failed,
}

impl TaskStatus {
    /// All six states, in declaration order. Used by exhaustive legality tests.
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Inbox,
        TaskStatus::Assigned,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
        TaskStatus::Failed,
    ];

    /// The legality table for status moves.
    pub fn allowed_transitions(self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::Inbox => &[TaskStatus::Assigned, TaskStatus::Failed],
            TaskStatus::Assigned => &[TaskStatus::InProgress, TaskStatus::Failed],
            TaskStatus::InProgress => &[TaskStatus::Review, TaskStatus::Failed],
            TaskStatus::Review => &[TaskStatus::Done, TaskStatus::InProgress, TaskStatus::Failed],
            TaskStatus::Done => &[],
            TaskStatus::Failed => &[TaskStatus::Assigned],
        }
    }

    /// Whether moving from `self` to `next` is a legal edge.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

/// Scheduling priority attached to a task at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Normal,
    High,
}

/// One delegated unit of work tracked by the orchestration engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_agent_id: Option<String>,
    pub parent_task_id: Option<TaskId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A decomposed operator intent, ready to become a [`Task`].
///
/// Also the unit held on the dead-letter queue once retries are exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIntent {
    pub id: TaskId,
    pub title: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: TaskPriority,
}

/// Routing entry mapping a task type to its default assignee.
///
/// Registered once at boot and read-only at request time. A rule keyed
/// `"default"` is the fallback for unmapped types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationRule {
    pub task_type: String,
    pub default_agent_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub override_agent_ids: Vec<String>,
}

/// In-memory retry bookkeeping per task. Grows monotonically until the task
/// is abandoned to the dead-letter queue.
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    pub attempts: u32,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_is_terminal() {
        assert!(TaskStatus::Done.allowed_transitions().is_empty());
    }

    #[test]
    fn failed_recovers_to_assigned_only() {
        assert_eq!(
            TaskStatus::Failed.allowed_transitions(),
            &[TaskStatus::Assigned]
        );
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
