// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Vault Recall Collaborator
//!
//! Best-effort context recall against the long-term content store. The store
//! itself is an external service; the core only depends on this one call and
//! treats an empty result as valid.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::repository::RepositoryError;
use crate::domain::vault::{VaultEntry, VaultEntryKind};

/// Recall seam used by the chat service to enrich narration.
#[async_trait]
pub trait VaultRecall: Send + Sync {
    /// Return up to `limit` entries relevant to `query`, dropping anything
    /// scored below `min_importance` (0–10 scale).
    async fn recall_for_context(
        &self,
        query: &str,
        limit: usize,
        min_importance: f64,
    ) -> Result<Vec<VaultEntry>, RepositoryError>;
}

/// Process-local vault used for development and tests.
///
/// Ranking mirrors the production store: importance dominates, knowledge-base
/// entries outrank archives, and a title/tag match adds a fixed boost.
#[derive(Default)]
pub struct InMemoryVault {
    entries: Mutex<Vec<VaultEntry>>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<VaultEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn insert(&self, entry: VaultEntry) {
        self.entries.lock().push(entry);
    }
}

#[async_trait]
impl VaultRecall for InMemoryVault {
    async fn recall_for_context(
        &self,
        query: &str,
        limit: usize,
        min_importance: f64,
    ) -> Result<Vec<VaultEntry>, RepositoryError> {
        let lowered = query.trim().to_lowercase();
        let entries = self.entries.lock();
        let mut scored: Vec<(f64, VaultEntry)> = entries
            .iter()
            .filter(|entry| entry.importance_score >= min_importance)
            .map(|entry| {
                let mut score = entry.importance_score * 10.0;
                match entry.kind {
                    VaultEntryKind::Kb => score += 12.0,
                    VaultEntryKind::Archive => score += 6.0,
                    VaultEntryKind::File => {}
                }
                let title_hit = entry.title.to_lowercase().contains(&lowered);
                let tag_hit = entry
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&lowered));
                if !lowered.is_empty() && (title_hit || tag_hit) {
                    score += 8.0;
                }
                (score, entry.clone())
            })
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, entry)| entry)
            .collect())
    }
}
