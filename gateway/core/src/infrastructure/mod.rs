// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gateway Infrastructure Layer
//!
//! Concrete collaborators behind the domain seams: the in-process event bus,
//! the in-memory repository used for development and tests, and the vault,
//! secret-store, and model-router adapters.

pub mod event_bus;
pub mod repositories;
pub mod router;
pub mod secrets;
pub mod vault;

pub use event_bus::{EventBus, EventBusError, EventReceiver};
pub use repositories::InMemoryRepository;
pub use router::{ModelBinding, ModelProvider, ModelRouter, RouteResult, StaticModelRouter};
pub use secrets::{InMemorySecretStore, SecretRef, SecretStore};
pub use vault::{InMemoryVault, VaultRecall};
