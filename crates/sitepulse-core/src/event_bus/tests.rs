use super::*;
use chrono::{TimeZone, Utc};

fn progress_envelope(revision: u64) -> Envelope {
    Envelope::with_meta(SiteEvent::progress(revision as u8), revision)
}

#[tokio::test]
async fn test_publish_subscribe() {
    let bus = EventBus::new();
    let mut sub = bus.subscribe("site-1");

    let delivered = bus.publish("site-1", progress_envelope(1));
    assert_eq!(delivered, 1);

    let envelope = sub.recv().await.unwrap();
    assert_eq!(envelope.revision, 1);
    assert_eq!(envelope.event, SiteEvent::progress(1));
}

#[tokio::test]
async fn test_multiple_subscribers() {
    let bus = EventBus::new();
    let mut sub1 = bus.subscribe("run");
    let mut sub2 = bus.subscribe("run");

    assert_eq!(bus.subscriber_count("run"), 2);
    assert_ne!(sub1.id(), sub2.id());

    for revision in 1..=3 {
        assert_eq!(bus.publish("run", progress_envelope(revision)), 2);
    }

    for sub in [&mut sub1, &mut sub2] {
        for expected in 1..=3 {
            assert_eq!(sub.recv().await.unwrap().revision, expected);
        }
        assert!(sub.try_recv().is_none());
    }
}

#[test]
fn test_publish_no_subscribers() {
    let bus = EventBus::new();
    assert_eq!(bus.publish("nobody", progress_envelope(1)), 0);
    assert_eq!(bus.channel_count(), 0);
}

#[tokio::test]
async fn test_channels_are_isolated() {
    let bus = EventBus::new();
    let mut a = bus.subscribe("a");
    let mut b = bus.subscribe("b");

    bus.publish("a", progress_envelope(1));

    assert_eq!(a.recv().await.unwrap().revision, 1);
    assert!(b.try_recv().is_none());
}

#[tokio::test]
async fn test_event_ordering() {
    let bus = EventBus::new();
    let mut sub = bus.subscribe("run");

    for revision in 1..=50 {
        bus.publish("run", progress_envelope(revision));
    }

    for expected in 1..=50 {
        assert_eq!(sub.recv().await.unwrap().revision, expected);
    }
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery_and_removes_channel() {
    let bus = EventBus::new();
    let mut first = bus.subscribe("run");
    let second = bus.subscribe("run");

    assert!(bus.unsubscribe(&first));
    assert_eq!(bus.subscriber_count("run"), 1);

    bus.publish("run", progress_envelope(1));
    assert!(first.recv().await.is_none());

    assert!(bus.unsubscribe(&second));
    assert_eq!(bus.channel_count(), 0);

    // Unknown queue is a no-op
    assert!(!bus.unsubscribe(&second));
}

#[test]
fn test_dropped_subscription_leaves_directory() {
    let bus = EventBus::new();
    let keep = bus.subscribe("shared");
    for i in 0..1000 {
        let sub = bus.subscribe(&format!("site-{}", i));
        drop(sub);
    }
    let extra = bus.subscribe("shared");
    drop(extra);

    assert_eq!(bus.channel_count(), 1);
    assert_eq!(bus.subscriber_count("shared"), 1);
    assert_eq!(bus.publish("shared", progress_envelope(1)), 1);

    // Dropping after an explicit unsubscribe is a no-op
    assert!(bus.unsubscribe(&keep));
    drop(keep);
    assert_eq!(bus.channel_count(), 0);
}

#[test]
fn test_subscription_outliving_bus() {
    let bus = EventBus::new();
    let mut sub = bus.subscribe("run");
    drop(bus);
    assert!(sub.try_recv().is_none());
}

#[tokio::test]
async fn test_concurrent_publishers_keep_per_publisher_order() {
    let bus = std::sync::Arc::new(EventBus::new());
    let mut sub = bus.subscribe("run");

    let mut handles = Vec::new();
    for publisher in 0..4u8 {
        let bus = bus.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25u64 {
                let event = SiteEvent::category(format!("p{}", publisher), Vec::new(), 20);
                bus.publish("run", Envelope::with_meta(event, i));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut last_seen = std::collections::HashMap::new();
    let mut total = 0;
    while let Some(envelope) = sub.try_recv() {
        if let SiteEvent::Category { category, .. } = &envelope.event {
            if let Some(prev) = last_seen.insert(category.clone(), envelope.revision) {
                assert!(envelope.revision > prev);
            }
        }
        total += 1;
    }
    assert_eq!(total, 100);
}

#[test]
fn test_publish_with_meta_returns_next_revision() {
    let bus = EventBus::new();
    let mut sub = bus.subscribe("run");

    let next = bus.publish_with_meta("run", SiteEvent::status(RunState::InProgress), 7);
    assert_eq!(next, 8);

    let envelope = sub.try_recv().unwrap();
    assert_eq!(envelope.revision, 7);
    assert!(envelope.verify());
}

#[test]
fn test_event_serialization() {
    let event = SiteEvent::category(
        "accessibility",
        vec![serde_json::json!({"id": "a11y-1", "severity": "high"})],
        20,
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"type\":\"category\""));
    assert!(json.contains("\"state\":\"in_progress\""));
    assert!(json.contains("\"category\":\"accessibility\""));

    let status = serde_json::to_value(SiteEvent::status(RunState::Connecting)).unwrap();
    assert_eq!(
        status,
        serde_json::json!({"type": "status", "state": "connecting"})
    );
}

#[test]
fn test_envelope_shape() {
    let timestamp = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let envelope = Envelope::at(
        SiteEvent::Summary {
            state: RunState::InProgress,
            message: "done".to_string(),
            progress: 99,
            platform: Some(Platform::WordPress),
        },
        4,
        timestamp,
    );

    let value = serde_json::to_value(&envelope).unwrap();
    assert_eq!(value["type"], "summary");
    assert_eq!(value["platform"], "wordpress");
    assert_eq!(value["revision"], 4);
    assert_eq!(value["hash"].as_str().unwrap().len(), HASH_LEN);
    assert!(value.get("category").is_none());
}

#[test]
fn test_envelope_hash_roundtrip() {
    let envelope = Envelope::with_meta(
        SiteEvent::category(
            "performance",
            vec![serde_json::json!({"title": "Large hero image", "severity": "medium"})],
            35,
        ),
        3,
    );
    assert!(envelope.verify());

    let wire = serde_json::to_string(&envelope).unwrap();
    let parsed: Envelope = serde_json::from_str(&wire).unwrap();
    assert_eq!(parsed, envelope);
    assert_eq!(parsed.compute_hash(), envelope.hash);
}

#[test]
fn test_envelope_hash_detects_tampering() {
    let mut envelope = Envelope::with_meta(SiteEvent::progress(50), 2);
    envelope.revision = 3;
    assert!(!envelope.verify());

    let mut envelope = Envelope::with_meta(SiteEvent::progress(50), 2);
    envelope.event = SiteEvent::progress(51);
    assert!(!envelope.verify());
}

#[test]
fn test_hash_is_deterministic_for_fixed_time() {
    let timestamp = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    let a = Envelope::at(SiteEvent::error("boom"), 1, timestamp);
    let b = Envelope::at(SiteEvent::error("boom"), 1, timestamp);
    assert_eq!(a.hash, b.hash);

    let c = Envelope::at(SiteEvent::error("boom"), 2, timestamp);
    assert_ne!(a.hash, c.hash);
}

#[test]
fn test_terminal_states() {
    assert!(RunState::Completed.is_terminal());
    assert!(RunState::ErrorsFound.is_terminal());
    assert!(!RunState::InProgress.is_terminal());
    assert!(SiteEvent::status(RunState::Completed).is_terminal_status());
    assert!(!SiteEvent::error("x").is_terminal_status());
    assert_eq!("WordPress".parse::<Platform>().unwrap(), Platform::WordPress);
    assert!("drupal".parse::<Platform>().is_err());

    // CLI and JSON accept the same spellings
    assert_eq!("wp".parse::<Platform>().unwrap(), Platform::WordPress);
    let platform: Platform = serde_json::from_str("\"wp\"").unwrap();
    assert_eq!(platform, Platform::WordPress);
}
