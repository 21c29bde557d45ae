// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Chat Service — Orchestration Composition Root
//!
//! Where the control plane's pieces are exercised together. Each operator
//! intent is budget-gated, checkpointed, classified, and either answered
//! directly or decomposed into a fixed four-step delegation plan whose tasks
//! are created and delegated through the orchestration engine. Progress is
//! narrated back as chat messages so the dashboard needs no second feed.
//!
//! Failure semantics: a budget block is terminal for the intent (no partial
//! delegation). A delegation failure means no rule resolves — that is a
//! configuration error and propagates rather than retrying.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use regex::Regex;
use serde_json::json;
use std::sync::Arc;
use std::sync::OnceLock;
use tracing::info;
use uuid::Uuid;

use crate::application::budget::BudgetService;
use crate::application::checkpoint::CheckpointService;
use crate::application::engine::CsoOrchestrationEngine;
use crate::application::telemetry::TelemetryHub;
use crate::domain::chat::{
    ChatMessageKind, ChatThread, DelegationPlanStep, QuickAction, SkillSuggestion,
    SwarmChatMessage, SwarmSummary,
};
use crate::domain::error::GatewayError;
use crate::domain::repository::Repository;
use crate::domain::task::{TaskId, TaskIntent, TaskPriority};
use crate::domain::telemetry::{TelemetryCategory, TelemetryInput, TelemetrySeverity};
use crate::infrastructure::vault::VaultRecall;

/// Thread seeded at boot for the operator's command conversation.
pub const DEFAULT_THREAD_ID: &str = "thread_cso_default";

/// Agent id of the top-level orchestrating agent; budget gate runs against it.
pub const CONTROLLER_AGENT_ID: &str = "agent_cso";

/// Minimum gap between ambient heartbeat messages in a thread.
const PULSE_INTERVAL_SECS: i64 = 20;

fn delegation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(plan|build|ship|research|analy|debug|implement|campaign|strategy|delegate)")
            .expect("delegation pattern is valid")
    })
}

pub struct ChatService {
    repository: Arc<dyn Repository>,
    engine: Arc<CsoOrchestrationEngine>,
    budget: Arc<BudgetService>,
    checkpoints: Arc<CheckpointService>,
    telemetry: Arc<TelemetryHub>,
    vault: Arc<dyn VaultRecall>,
    last_pulse_at: Mutex<Option<DateTime<Utc>>>,
}

impl ChatService {
    /// Build the service and seed the default thread on first boot.
    pub async fn new(
        repository: Arc<dyn Repository>,
        engine: Arc<CsoOrchestrationEngine>,
        budget: Arc<BudgetService>,
        checkpoints: Arc<CheckpointService>,
        telemetry: Arc<TelemetryHub>,
        vault: Arc<dyn VaultRecall>,
    ) -> Result<Self, GatewayError> {
        let service = Self {
            repository,
            engine,
            budget,
            checkpoints,
            telemetry,
            vault,
            last_pulse_at: Mutex::new(None),
        };
        if service.repository.list_chat_threads().await?.is_empty() {
            let now = Utc::now();
            service
                .repository
                .upsert_chat_thread(ChatThread {
                    id: DEFAULT_THREAD_ID.to_string(),
                    title: "CSO Command Chat".to_string(),
                    created_at: now,
                    updated_at: now,
                })
                .await?;
            service
                .repository
                .append_chat_message(message(
                    DEFAULT_THREAD_ID,
                    ChatMessageKind::System,
                    "system",
                    "Swarm online. Ask the CSO anything.",
                    None,
                    None,
                ))
                .await?;
        }
        Ok(service)
    }

    pub async fn list_threads(&self) -> Result<Vec<ChatThread>, GatewayError> {
        Ok(self.repository.list_chat_threads().await?)
    }

    pub async fn get_summary(&self) -> Result<SwarmSummary, GatewayError> {
        Ok(self.repository.swarm_summary().await?)
    }

    /// Messages in a thread, with an ambient heartbeat appended at most once
    /// per pulse interval so an idle dashboard still sees the swarm breathe.
    pub async fn list_messages(
        &self,
        thread_id: &str,
    ) -> Result<Vec<SwarmChatMessage>, GatewayError> {
        self.maybe_pulse(thread_id).await?;
        Ok(self.repository.list_chat_messages(thread_id).await?)
    }

    /// Handle one operator intent end to end. Returns every message emitted
    /// for it, in order.
    pub async fn send_message(
        &self,
        thread_id: &str,
        content: &str,
        user_id: &str,
    ) -> Result<Vec<SwarmChatMessage>, GatewayError> {
        let mut emitted = Vec::new();
        let user_message = message(thread_id, ChatMessageKind::User, user_id, content, None, None);
        self.repository.append_chat_message(user_message.clone()).await?;
        emitted.push(user_message.clone());

        // Budget gate first: a blocked controller means no checkpoint, no
        // plan, no partial delegation.
        let decision = self.budget.can_run(CONTROLLER_AGENT_ID).await?;
        if !decision.allowed {
            let reason = decision.reason.unwrap_or_else(|| "Budget limit reached.".to_string());
            self.telemetry.record(TelemetryInput {
                category: TelemetryCategory::Gateway,
                severity: Some(TelemetrySeverity::Warning),
                source: "chat".to_string(),
                message: "intent blocked by budget guardrail".to_string(),
                metadata: Some(json!({ "threadId": thread_id, "reason": reason })),
                created_at: None,
            });
            let blocked = message(
                thread_id,
                ChatMessageKind::Cso,
                "CSO",
                &format!("{reason} Delegation is paused until budgets are reconfigured."),
                Some(user_message.id),
                None,
            );
            self.repository.append_chat_message(blocked.clone()).await?;
            emitted.push(blocked);
            return Ok(emitted);
        }

        self.checkpoints
            .create(thread_id, Some(content), Some(json!({ "intent": content, "userId": user_id })))
            .await?;
        self.telemetry.record(TelemetryInput {
            category: TelemetryCategory::Gateway,
            severity: None,
            source: "chat".to_string(),
            message: "intent received".to_string(),
            metadata: Some(json!({ "threadId": thread_id, "userId": user_id })),
            created_at: None,
        });

        if content.trim().eq_ignore_ascii_case("/status") {
            let summary = self.get_summary().await?;
            let status = message(
                thread_id,
                ChatMessageKind::Cso,
                "CSO",
                &format!(
                    "Swarm status: {} agents online, {} active tasks, ${:.2} spend today.",
                    summary.online_agents, summary.active_tasks, summary.spend_today_usd
                ),
                Some(user_message.id),
                None,
            );
            self.repository.append_chat_message(status.clone()).await?;
            emitted.push(status);
            return Ok(emitted);
        }

        if !delegation_pattern().is_match(content) {
            let mut reply = String::from(
                "I can help directly, or delegate to specialists. If you want swarm \
                 execution, say: 'delegate this' or describe a goal with constraints.",
            );
            let recalled = self.vault.recall_for_context(content, 3, 7.0).await?;
            if !recalled.is_empty() {
                reply.push_str(&format!(
                    " I am holding {} relevant vault entr{} as context.",
                    recalled.len(),
                    if recalled.len() == 1 { "y" } else { "ies" }
                ));
            }
            let direct = message(
                thread_id,
                ChatMessageKind::Cso,
                "CSO",
                &reply,
                Some(user_message.id),
                None,
            );
            self.repository.append_chat_message(direct.clone()).await?;
            emitted.push(direct);
            if let Some(suggestion) = maybe_suggestion(content) {
                emitted.push(self.push_suggestion(thread_id, user_message.id, suggestion).await?);
            }
            return Ok(emitted);
        }

        let steps = delegation_steps();
        let plan = message(
            thread_id,
            ChatMessageKind::Delegation,
            "CSO",
            &markdown_plan(content, &steps),
            Some(user_message.id),
            Some(json!({ "steps": steps })),
        );
        self.repository.append_chat_message(plan.clone()).await?;
        emitted.push(plan.clone());

        for step in &steps {
            let intent = TaskIntent {
                id: TaskId::new(),
                title: step.task.clone(),
                task_type: "default".to_string(),
                description: Some(content.to_string()),
                priority: TaskPriority::Normal,
            };
            let task = self.engine.create_task(&intent);
            let delegated = self.engine.delegate(&task, Some(&step.agent_id))?;
            self.repository.upsert_task(delegated).await?;

            let update = message(
                thread_id,
                ChatMessageKind::AgentUpdate,
                &format!("@{}", step.agent_id),
                &format!("Started: {}", step.task),
                Some(plan.id),
                Some(json!({ "status": "in_progress" })),
            );
            self.repository.append_chat_message(update.clone()).await?;
            emitted.push(update);
        }
        info!(thread_id, steps = steps.len(), "delegation plan dispatched");

        if let Some(suggestion) = maybe_suggestion(content) {
            emitted.push(self.push_suggestion(thread_id, user_message.id, suggestion).await?);
        }

        let closing = message(
            thread_id,
            ChatMessageKind::Cso,
            "CSO",
            "Delegation in motion. I will stream major milestones and raise blockers proactively.",
            Some(user_message.id),
            None,
        );
        self.repository.append_chat_message(closing.clone()).await?;
        emitted.push(closing);
        Ok(emitted)
    }

    /// One-click chat templates offered by the dashboard.
    pub async fn run_quick_action(
        &self,
        thread_id: &str,
        action: QuickAction,
    ) -> Result<Vec<SwarmChatMessage>, GatewayError> {
        let template = match action {
            QuickAction::MorningBriefing => {
                "Morning briefing: summarize priorities, risks, and immediate next actions."
            }
            QuickAction::StatusReport => "/status",
            QuickAction::SuggestSkills => {
                "Suggest skills that would improve swarm throughput this week."
            }
            QuickAction::DelegateTask => {
                "Delegate a fresh strategic task across the swarm with a clear execution plan."
            }
        };
        self.send_message(thread_id, template, "user").await
    }

    async fn push_suggestion(
        &self,
        thread_id: &str,
        parent_message_id: Uuid,
        suggestion: SkillSuggestion,
    ) -> Result<SwarmChatMessage, GatewayError> {
        let suggestion_message = message(
            thread_id,
            ChatMessageKind::SkillSuggestion,
            "CSO",
            &format!("{}: {}", suggestion.name, suggestion.reason),
            Some(parent_message_id),
            Some(serde_json::to_value(&suggestion)?),
        );
        self.repository
            .append_chat_message(suggestion_message.clone())
            .await?;
        Ok(suggestion_message)
    }

    async fn maybe_pulse(&self, thread_id: &str) -> Result<(), GatewayError> {
        let now = Utc::now();
        {
            let mut last = self.last_pulse_at.lock();
            match *last {
                Some(at) if (now - at).num_seconds() < PULSE_INTERVAL_SECS => return Ok(()),
                _ => *last = Some(now),
            }
        }
        self.repository
            .append_chat_message(message(
                thread_id,
                ChatMessageKind::System,
                "system",
                "Heartbeat: swarm synced and listening.",
                None,
                None,
            ))
            .await?;
        Ok(())
    }
}

fn message(
    thread_id: &str,
    kind: ChatMessageKind,
    author: &str,
    content: &str,
    parent_message_id: Option<Uuid>,
    metadata: Option<serde_json::Value>,
) -> SwarmChatMessage {
    SwarmChatMessage {
        id: Uuid::new_v4(),
        thread_id: thread_id.to_string(),
        kind,
        author: author.to_string(),
        content: content.to_string(),
        created_at: Utc::now(),
        parent_message_id,
        metadata,
    }
}

/// The fixed four-step plan the CSO synthesizes for every delegated intent:
/// clarify scope, gather external context, synthesize, review.
fn delegation_steps() -> Vec<DelegationPlanStep> {
    let step = |task: &str, agent_id: &str| DelegationPlanStep {
        id: Uuid::new_v4(),
        task: task.to_string(),
        agent_id: agent_id.to_string(),
        status: "assigned".to_string(),
    };
    vec![
        step("Clarify scope and success criteria", CONTROLLER_AGENT_ID),
        step("Gather external context and references", "agent_research"),
        step("Synthesize findings into actionable output", "agent_data"),
        step("Polish final response and QA", "agent_review"),
    ]
}

fn markdown_plan(goal: &str, steps: &[DelegationPlanStep]) -> String {
    let mut lines = vec!["### CSO Plan".to_string(), format!("Goal: {goal}"), String::new()];
    for (index, step) in steps.iter().enumerate() {
        lines.push(format!("{}. {} -> @{}", index + 1, step.task, step.agent_id));
    }
    lines.join("\n")
}

fn maybe_suggestion(content: &str) -> Option<SkillSuggestion> {
    let lowered = content.to_lowercase();
    if ["research", "market", "latest"].iter().any(|kw| lowered.contains(kw)) {
        return Some(SkillSuggestion {
            slug: "tavily-search".to_string(),
            name: "Tavily Web Search".to_string(),
            reason: "Fresh external data would unblock research quality and speed.".to_string(),
            target_agent_id: "agent_research".to_string(),
            permissions: vec!["network.http".to_string(), "filesystem.read".to_string()],
        });
    }
    if ["email", "inbox", "outreach"].iter().any(|kw| lowered.contains(kw)) {
        return Some(SkillSuggestion {
            slug: "gog".to_string(),
            name: "Gog".to_string(),
            reason: "Email automation is needed for reliable outbound and inbox workflows."
                .to_string(),
            target_agent_id: CONTROLLER_AGENT_ID.to_string(),
            permissions: vec![
                "gmail.read".to_string(),
                "gmail.send".to_string(),
                "network.http".to_string(),
            ],
        });
    }
    None
}
