// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `aegis-gateway-core` — Swarm Control-Plane Gateway
//!
//! The always-on coordination kernel behind the AEGIS operator console. It
//! accepts operator intents, decomposes them into delegated tasks, routes
//! them to subordinate agents, meters token/cost budgets, gates dangerous
//! capabilities behind an approval workflow, records replayable checkpoints,
//! and feeds the live observability stream consumed by the dashboard.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | Tasks, budgets, grants, checkpoints, telemetry, event envelope, repository contracts |
//! | [`application`] | Application | Orchestration engine, budget service, safety workflow, checkpoint log, telemetry hub, connection manager, chat service |
//! | [`infrastructure`] | Infrastructure | Event bus, in-memory repository, vault/secret-store/model-router collaborators |
//!
//! ## Scope Notes
//!
//! The HTTP/SSE shell, the dashboard, the marketplace client, and the durable
//! content vault are external collaborators. This crate exposes the service
//! surface they call and the [`domain::Repository`] seam they persist through;
//! it owns no sockets and no wire framing. It is a single authoritative
//! process, not a cluster — one logical worker multiplexes all core calls.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
