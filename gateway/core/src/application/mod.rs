// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gateway Application Layer
//!
//! The stateful services composing the control plane. Leaf-first:
//! [`CsoOrchestrationEngine`] is pure domain logic, the metering/workflow/log
//! services each own their state plus a repository handle, and
//! [`ChatService`] is the composition root where they are exercised together.

pub mod budget;
pub mod chat;
pub mod checkpoint;
pub mod connection;
pub mod engine;
pub mod safety;
pub mod telemetry;

pub use budget::BudgetService;
pub use chat::{ChatService, CONTROLLER_AGENT_ID, DEFAULT_THREAD_ID};
pub use checkpoint::CheckpointService;
pub use connection::ConnectionManager;
pub use engine::CsoOrchestrationEngine;
pub use safety::SafetyWorkflow;
pub use telemetry::{TelemetryHub, TELEMETRY_RING_MAX};
