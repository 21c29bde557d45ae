// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Event Bus — In-Process Pub/Sub for Gateway Events
//!
//! Fan-out of [`GatewayEvent`]s over a tokio broadcast channel. The shell
//! subscribes for SSE fan-out; tests subscribe to assert on emissions.
//!
//! ## Delivery semantics
//!
//! Handler isolation is by channel, not by inline callback: every subscriber
//! owns an independent receiver, so one slow or panicking consumer can never
//! block delivery to the others, and the event is never dropped for them. A
//! receiver that falls more than `capacity` events behind observes
//! [`EventBusError::Lagged`] and continues from the oldest retained event.
//! `publish` with no live subscribers is a no-op.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::events::GatewayEvent;

/// Event bus for publishing and subscribing to gateway events.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<GatewayEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity. Capacity
    /// bounds how many events a lagging receiver may fall behind before
    /// older events are dropped for it.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Event bus with the default capacity (1000).
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: GatewayEvent) {
        debug!(kind = event.kind(), "publishing gateway event");
        let receiver_count = self.sender.send(event).unwrap_or(0);
        if receiver_count == 0 {
            debug!("no subscribers listening to event");
        }
    }

    /// Subscribe to all gateway events.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
            instance_filter: None,
        }
    }

    /// Subscribe to events attributed to a single remote instance.
    pub fn subscribe_instance(&self, instance_id: &str) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
            instance_filter: Some(instance_id.to_string()),
        }
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Receiver half of a subscription, optionally filtered by instance id.
pub struct EventReceiver {
    receiver: broadcast::Receiver<GatewayEvent>,
    instance_filter: Option<String>,
}

impl EventReceiver {
    /// Receive the next matching event, waiting until one is available.
    pub async fn recv(&mut self) -> Result<GatewayEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(|e| match e {
                broadcast::error::RecvError::Closed => EventBusError::Closed,
                broadcast::error::RecvError::Lagged(n) => {
                    warn!("event receiver lagged by {} events", n);
                    EventBusError::Lagged(n)
                }
            })?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Try to receive the next matching event without waiting.
    pub fn try_recv(&mut self) -> Result<GatewayEvent, EventBusError> {
        loop {
            let event = self.receiver.try_recv().map_err(|e| match e {
                broadcast::error::TryRecvError::Empty => EventBusError::Empty,
                broadcast::error::TryRecvError::Closed => EventBusError::Closed,
                broadcast::error::TryRecvError::Lagged(n) => {
                    warn!("event receiver lagged by {} events", n);
                    EventBusError::Lagged(n)
                }
            })?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    fn matches(&self, event: &GatewayEvent) -> bool {
        match &self.instance_filter {
            Some(wanted) => event.instance_id.as_deref() == Some(wanted.as_str()),
            None => true,
        }
    }
}

/// Errors that can occur when receiving events.
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}
