// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gateway Domain Layer
//!
//! Pure types and persistence contracts. No I/O dependencies.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`task`] | `Task`, `TaskStatus`, `TaskIntent`, `DelegationRule` |
//! | [`budget`] | `AgentBudget`, `UsageReport`, `UsageDecision` |
//! | [`permission`] | `PermissionGrant`, `GrantId` |
//! | [`checkpoint`] | `CheckpointRecord`, `CheckpointId` |
//! | [`telemetry`] | `TelemetryEvent`, `TelemetrySnapshot` |
//! | [`instance`] | `InstanceConfig`, `InstanceHealth` |
//! | [`agent`] | `AgentRecord`, `AgentStatus` |
//! | [`chat`] | `SwarmChatMessage`, `DelegationPlanStep`, `SkillSuggestion` |
//! | [`vault`] | `VaultEntry`, `VaultSummary` |
//! | [`audit`] | `AuditLog` |
//! | [`events`] | `GatewayEvent`, `GatewayPayload`, `GatewayCommand` |
//! | [`repository`] | `Repository`, `RepositoryError` |
//! | [`error`] | `GatewayError` |

pub mod agent;
pub mod audit;
pub mod budget;
pub mod chat;
pub mod checkpoint;
pub mod error;
pub mod events;
pub mod instance;
pub mod permission;
pub mod repository;
pub mod task;
pub mod telemetry;
pub mod vault;

pub use agent::*;
pub use audit::*;
pub use budget::*;
pub use chat::*;
pub use checkpoint::*;
pub use error::*;
pub use events::*;
pub use instance::*;
pub use permission::*;
pub use repository::*;
pub use task::*;
pub use telemetry::*;
pub use vault::*;
