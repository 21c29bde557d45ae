// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Connection Manager — Remote Instance Health
//!
//! Tracks liveness of each remote agent-runtime instance, computes reconnect
//! backoff, and detects heartbeat staleness. Both timing policies are
//! pull-based: an external scheduler invokes the timeout sweep, and
//! [`ConnectionManager::mark_disconnected`] returns the backoff for the
//! caller to act on — the core never self-schedules a retry.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use tracing::{info, warn};

use crate::domain::error::GatewayError;
use crate::domain::events::{GatewayCommand, GatewayEvent, GatewayPayload};
use crate::domain::instance::{InstanceConfig, InstanceHealth};
use crate::infrastructure::event_bus::EventBus;

/// A connected instance with no heartbeat for this long is considered stale.
const HEARTBEAT_TIMEOUT_SECS: i64 = 30;

/// Reconnect backoff: floor, cap, and jitter ceiling, in milliseconds.
const BACKOFF_BASE_MS: u64 = 1000;
const BACKOFF_CAP_MS: u64 = 30_000;
const BACKOFF_JITTER_MS: u64 = 250;

struct InstanceState {
    retries: u32,
    next_reconnect_ms: u64,
    health: InstanceHealth,
}

pub struct ConnectionManager {
    events: EventBus,
    registry: Vec<InstanceConfig>,
    states: DashMap<String, InstanceState>,
}

impl ConnectionManager {
    pub fn new(events: EventBus, registry: Vec<InstanceConfig>) -> Self {
        Self {
            events,
            registry,
            states: DashMap::new(),
        }
    }

    /// The configured instance registry.
    pub fn discover_instances(&self) -> &[InstanceConfig] {
        &self.registry
    }

    /// Seed one fresh health record per configured instance and announce
    /// each as ready. Health is never loaded from disk; every process start
    /// begins here.
    pub fn connect_all(&self) {
        for config in &self.registry {
            self.states.insert(
                config.id.clone(),
                InstanceState {
                    retries: 0,
                    next_reconnect_ms: BACKOFF_BASE_MS,
                    health: InstanceHealth::connected(),
                },
            );
            self.events.publish(GatewayEvent::for_instance(
                &config.id,
                GatewayPayload::InstanceReady {
                    version: "mvp".to_string(),
                    capabilities: vec!["delegation".to_string(), "streaming".to_string()],
                },
            ));
            info!(instance_id = %config.id, "instance ready");
        }
    }

    /// Refresh liveness from an inbound heartbeat; resets retry bookkeeping.
    pub fn publish_heartbeat(&self, instance_id: &str, latency_ms: u64) {
        let Some(mut state) = self.states.get_mut(instance_id) else {
            return;
        };
        state.health.last_heartbeat_at = Some(Utc::now());
        state.health.latency_ms = Some(latency_ms);
        state.health.connected = true;
        state.retries = 0;
        state.next_reconnect_ms = BACKOFF_BASE_MS;
        let health = state.health.clone();
        drop(state);
        self.events.publish(GatewayEvent::for_instance(
            instance_id,
            GatewayPayload::InstanceHeartbeat(health),
        ));
    }

    /// Forward a command to a remote instance through the event stream.
    pub fn send_command(&self, command: GatewayCommand) {
        let mut event = GatewayEvent::new(GatewayPayload::CommandSent(command.clone()));
        event.request_id = Some(command.request_id);
        self.events.publish(event);
    }

    /// Record a disconnect: bump retries, raise the error rate (by 5, capped
    /// at 100), and compute the next reconnect backoff. Returns the backoff
    /// in milliseconds; the caller schedules the actual retry. Unknown ids
    /// return 0.
    pub fn mark_disconnected(&self, instance_id: &str, reason: &str) -> u64 {
        let Some(mut state) = self.states.get_mut(instance_id) else {
            return 0;
        };
        state.health.connected = false;
        state.retries += 1;
        state.health.error_rate_pct = state.health.error_rate_pct.saturating_add(5).min(100);
        state.next_reconnect_ms = compute_backoff_ms(state.retries);
        let reconnect_in_ms = state.next_reconnect_ms;
        drop(state);
        warn!(instance_id, reason, reconnect_in_ms, "instance disconnected");
        self.events.publish(GatewayEvent::for_instance(
            instance_id,
            GatewayPayload::InstanceDisconnected {
                reason: reason.to_string(),
                reconnect_in_ms,
            },
        ));
        reconnect_in_ms
    }

    /// Sweep all connected instances whose last heartbeat is older than 30s,
    /// mark each disconnected, and return the newly-offline ids. Must be
    /// invoked periodically by an external scheduler.
    pub fn detect_heartbeat_timeout(&self, now: DateTime<Utc>) -> Vec<String> {
        let stale: Vec<String> = self
            .states
            .iter()
            .filter(|entry| {
                let health = &entry.health;
                match health.last_heartbeat_at {
                    Some(at) if health.connected => {
                        now - at > Duration::seconds(HEARTBEAT_TIMEOUT_SECS)
                    }
                    _ => false,
                }
            })
            .map(|entry| entry.key().clone())
            .collect();
        for instance_id in &stale {
            self.mark_disconnected(instance_id, "heartbeat_timeout");
        }
        stale
    }

    pub fn get_health(&self, instance_id: &str) -> Option<InstanceHealth> {
        self.states
            .get(instance_id)
            .map(|state| state.health.clone())
    }

    /// Stable normalization point for inbound envelopes: parses raw JSON
    /// into the typed taxonomy, defaulting a missing timestamp to now and
    /// dropping absent optional fields, so the UI and orchestration layers
    /// never see upstream drift.
    pub fn normalize_inbound(&self, raw: serde_json::Value) -> Result<GatewayEvent, GatewayError> {
        Ok(serde_json::from_value(raw)?)
    }
}

fn compute_backoff_ms(retries: u32) -> u64 {
    let base = 2u64
        .checked_pow(retries)
        .and_then(|factor| factor.checked_mul(BACKOFF_BASE_MS))
        .map_or(BACKOFF_CAP_MS, |ms| ms.min(BACKOFF_CAP_MS));
    base + rand::thread_rng().gen_range(0..BACKOFF_JITTER_MS)
}
