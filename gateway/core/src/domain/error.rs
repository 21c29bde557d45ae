// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gateway Error Taxonomy
//!
//! Every fallible core operation returns a typed [`GatewayError`] with enough
//! context to render a specific operator-facing message. There are no silent
//! fallbacks: persistence failures propagate as-is, illegal state moves are
//! surfaced and never auto-corrected, and missing delegation configuration is
//! fatal to the operation rather than retried.

use thiserror::Error;

use crate::domain::repository::RepositoryError;
use crate::domain::task::TaskStatus;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Task status move not permitted by the legality table.
    #[error("invalid transition {from:?} -> {to:?}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// Unknown agent/grant/checkpoint/instance id. Surfaced, no retry.
    #[error("not found: {0}")]
    NotFound(String),

    /// No delegation rule resolves, or the intent classifier was handed an
    /// unusable setup. Fatal to the operation, logged, not retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Inbound envelope could not be normalized into the typed taxonomy.
    #[error("malformed gateway event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}
