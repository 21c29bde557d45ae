// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Connection manager tests: connect/ready announcements, heartbeat refresh,
//! reconnect backoff with jitter, error-rate accounting, the staleness sweep,
//! and inbound envelope normalization.

use aegis_gateway_core::application::ConnectionManager;
use aegis_gateway_core::domain::error::GatewayError;
use aegis_gateway_core::domain::events::GatewayPayload;
use aegis_gateway_core::domain::instance::InstanceConfig;
use aegis_gateway_core::domain::events::GatewayCommand;
use aegis_gateway_core::infrastructure::EventBus;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

fn instance(id: &str) -> InstanceConfig {
    InstanceConfig {
        id: id.to_string(),
        name: format!("Instance {id}"),
    }
}

fn manager(ids: &[&str]) -> (ConnectionManager, EventBus) {
    let bus = EventBus::new(64);
    let registry = ids.iter().copied().map(instance).collect();
    (ConnectionManager::new(bus.clone(), registry), bus)
}

#[tokio::test]
async fn connect_all_announces_every_instance_ready() {
    let (manager, bus) = manager(&["inst_a", "inst_b"]);
    let mut rx = bus.subscribe();
    manager.connect_all();

    for expected in ["inst_a", "inst_b"] {
        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind(), "instance.ready");
        assert_eq!(event.instance_id.as_deref(), Some(expected));
        match event.payload {
            GatewayPayload::InstanceReady { capabilities, .. } => {
                assert!(capabilities.contains(&"delegation".to_string()));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    let health = manager.get_health("inst_a").unwrap();
    assert!(health.connected);
    assert_eq!(health.error_rate_pct, 0);
    assert_eq!(health.last_heartbeat_at, None);
}

#[tokio::test]
async fn heartbeat_refreshes_health_and_emits() {
    let (manager, bus) = manager(&["inst_a"]);
    manager.connect_all();
    let mut rx = bus.subscribe();

    manager.publish_heartbeat("inst_a", 42);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.kind(), "instance.heartbeat");
    let health = manager.get_health("inst_a").unwrap();
    assert!(health.connected);
    assert!(health.last_heartbeat_at.is_some());
    assert_eq!(health.latency_ms, Some(42));
}

#[tokio::test]
async fn backoff_doubles_per_retry_and_resets_on_heartbeat() {
    let (manager, _bus) = manager(&["inst_a"]);
    manager.connect_all();

    let first = manager.mark_disconnected("inst_a", "socket closed");
    assert!((2000..2250).contains(&first));
    let second = manager.mark_disconnected("inst_a", "socket closed");
    assert!((4000..4250).contains(&second));

    manager.publish_heartbeat("inst_a", 10);

    let after_reset = manager.mark_disconnected("inst_a", "socket closed");
    assert!((2000..2250).contains(&after_reset));
}

#[tokio::test]
async fn backoff_caps_at_thirty_seconds() {
    let (manager, _bus) = manager(&["inst_a"]);
    manager.connect_all();
    let mut last = 0;
    for _ in 0..12 {
        last = manager.mark_disconnected("inst_a", "flapping");
    }
    assert!((30_000..30_250).contains(&last));
}

#[tokio::test]
async fn error_rate_climbs_by_five_and_caps_at_hundred() {
    let (manager, _bus) = manager(&["inst_a"]);
    manager.connect_all();
    for _ in 0..3 {
        manager.mark_disconnected("inst_a", "boom");
    }
    assert_eq!(manager.get_health("inst_a").unwrap().error_rate_pct, 15);
    for _ in 0..25 {
        manager.mark_disconnected("inst_a", "boom");
    }
    assert_eq!(manager.get_health("inst_a").unwrap().error_rate_pct, 100);
}

#[tokio::test]
async fn unknown_instance_disconnect_is_a_noop() {
    let (manager, bus) = manager(&["inst_a"]);
    manager.connect_all();
    let mut rx = bus.subscribe();
    assert_eq!(manager.mark_disconnected("inst_ghost", "boom"), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn disconnect_emits_reason_and_backoff() {
    let (manager, bus) = manager(&["inst_a"]);
    manager.connect_all();
    let mut rx = bus.subscribe();

    let backoff = manager.mark_disconnected("inst_a", "socket closed");

    let event = rx.try_recv().unwrap();
    assert_eq!(event.kind(), "instance.disconnected");
    match event.payload {
        GatewayPayload::InstanceDisconnected { reason, reconnect_in_ms } => {
            assert_eq!(reason, "socket closed");
            assert_eq!(reconnect_in_ms, backoff);
        }
        other => panic!("unexpected payload: {other:?}"),
    }
    assert!(!manager.get_health("inst_a").unwrap().connected);
}

#[tokio::test]
async fn stale_heartbeats_are_swept_offline() {
    let (manager, _bus) = manager(&["inst_a", "inst_b", "inst_c"]);
    manager.connect_all();
    manager.publish_heartbeat("inst_a", 5);
    manager.publish_heartbeat("inst_b", 5);
    // inst_c never heartbeats: connected but not yet accountable.

    let fresh = manager.detect_heartbeat_timeout(Utc::now());
    assert!(fresh.is_empty());

    let later = Utc::now() + Duration::seconds(31);
    let mut stale = manager.detect_heartbeat_timeout(later);
    stale.sort();
    assert_eq!(stale, vec!["inst_a".to_string(), "inst_b".to_string()]);
    assert!(!manager.get_health("inst_a").unwrap().connected);

    // Already-offline instances are not re-reported.
    let again = manager.detect_heartbeat_timeout(later + Duration::seconds(31));
    assert!(again.is_empty());
}

#[tokio::test]
async fn send_command_carries_the_request_id() {
    let (manager, bus) = manager(&[]);
    let mut rx = bus.subscribe();
    let request_id = Uuid::new_v4();
    manager.send_command(GatewayCommand {
        name: "skills.reload".to_string(),
        request_id,
        payload: json!({ "force": true }),
    });

    let event = rx.try_recv().unwrap();
    assert_eq!(event.kind(), "gateway.command.sent");
    assert_eq!(event.request_id, Some(request_id));
    match event.payload {
        GatewayPayload::CommandSent(command) => assert_eq!(command.name, "skills.reload"),
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[tokio::test]
async fn normalize_inbound_defaults_missing_fields() {
    let (manager, _bus) = manager(&[]);
    let event = manager
        .normalize_inbound(json!({
            "type": "instance.disconnected",
            "payload": { "reason": "socket closed", "reconnectInMs": 2000 }
        }))
        .unwrap();
    assert_eq!(event.kind(), "instance.disconnected");
    assert!(event.request_id.is_none());
    assert!(event.timestamp <= Utc::now());
}

#[tokio::test]
async fn normalize_inbound_rejects_unknown_event_types() {
    let (manager, _bus) = manager(&[]);
    let result = manager.normalize_inbound(json!({ "type": "not.a.thing", "payload": {} }));
    assert!(matches!(result, Err(GatewayError::MalformedEvent(_))));
}

#[tokio::test]
async fn registry_is_exposed_for_discovery() {
    let (manager, _bus) = manager(&["inst_a", "inst_b"]);
    let ids: Vec<&str> = manager.discover_instances().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["inst_a", "inst_b"]);
}
