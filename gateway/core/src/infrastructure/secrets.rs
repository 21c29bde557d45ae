// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Secret Store Seam
//!
//! The core never reads plaintext secrets itself; it passes opaque
//! [`SecretRef`]s around and resolves them only at the integration boundary.

use dashmap::DashMap;
use uuid::Uuid;

/// Opaque handle to a stored secret. The embedded scope prefix exists for
/// operator-facing listings only; it reveals nothing about the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretRef(pub String);

impl std::fmt::Display for SecretRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

pub trait SecretStore: Send + Sync {
    /// Store a secret under a scope and return an opaque reference to it.
    fn put(&self, scope: &str, value: &str) -> SecretRef;

    /// Resolve a reference; `None` when it was never issued or was revoked.
    fn get(&self, secret_ref: &SecretRef) -> Option<String>;
}

/// Process-local store. Adapter hook for the v1 migration; an OS
/// keychain-backed implementation replaces the internals.
#[derive(Default)]
pub struct InMemorySecretStore {
    values: DashMap<String, String>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for InMemorySecretStore {
    fn put(&self, scope: &str, value: &str) -> SecretRef {
        let key = format!("{scope}:{}", Uuid::new_v4());
        self.values.insert(key.clone(), value.to_string());
        SecretRef(key)
    }

    fn get(&self, secret_ref: &SecretRef) -> Option<String> {
        self.values.get(&secret_ref.0).map(|value| value.clone())
    }
}
