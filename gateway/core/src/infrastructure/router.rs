// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Model Routing Seam
//!
//! Resolves an agent id to a concrete model/provider pair. Actual model
//! invocation lives behind this seam in the routing service; the core only
//! needs resolution so delegation can be priced and narrated.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelProvider {
    Local,
    Anthropic,
    Google,
    Xai,
    Openai,
}

/// Per-agent binding: a primary model plus an ordered fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelBinding {
    pub agent_id: String,
    pub primary: String,
    pub fallback_chain: Vec<String>,
    pub provider: ModelProvider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub model: String,
    pub provider: ModelProvider,
}

pub trait ModelRouter: Send + Sync {
    /// Resolve the first available model for an agent, walking the fallback
    /// chain past models currently marked unavailable.
    fn route(&self, agent_id: &str) -> Result<RouteResult, GatewayError>;
}

/// Routing table owned by the composition root; bindings are set at boot and
/// availability flips as providers degrade.
#[derive(Default)]
pub struct StaticModelRouter {
    bindings: DashMap<String, ModelBinding>,
    unavailable: parking_lot::Mutex<HashSet<String>>,
}

impl StaticModelRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_binding(&self, binding: ModelBinding) {
        self.bindings.insert(binding.agent_id.clone(), binding);
    }

    pub fn mark_unavailable(&self, model: &str) {
        self.unavailable.lock().insert(model.to_string());
    }

    pub fn clear_unavailable(&self, model: &str) {
        self.unavailable.lock().remove(model);
    }
}

impl ModelRouter for StaticModelRouter {
    fn route(&self, agent_id: &str) -> Result<RouteResult, GatewayError> {
        let binding = self
            .bindings
            .get(agent_id)
            .ok_or_else(|| GatewayError::NotFound(format!("no model binding for agent {agent_id}")))?;
        let unavailable = self.unavailable.lock();
        let selected = std::iter::once(&binding.primary)
            .chain(binding.fallback_chain.iter())
            .find(|model| !unavailable.contains(model.as_str()))
            .ok_or_else(|| {
                GatewayError::Configuration(format!("no available model for agent {agent_id}"))
            })?;
        Ok(RouteResult {
            model: selected.clone(),
            provider: binding.provider,
        })
    }
}
