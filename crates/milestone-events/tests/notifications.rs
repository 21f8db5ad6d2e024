//! Change notification count and order across the public registry API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};

use milestone_events::{DEFAULT_NAMESPACE, EventRecord, EventRegistry, Snapshot};

/// Subscribe a recorder and return the shared record list.
fn listen(registry: &mut EventRegistry) -> Arc<Mutex<Vec<EventRecord>>> {
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&records);
    registry.subscribe(move |record: &EventRecord| {
        sink.lock().unwrap().push(record.clone());
    });
    records
}

fn save_three(registry: &mut EventRegistry) {
    registry.save("event1", DEFAULT_NAMESPACE);
    registry.save("event2", "firstNamespace");
    registry.save("event3", "secondNamespace");
}

fn saved_three() -> Vec<EventRecord> {
    vec![
        EventRecord::new("event1", "", 1),
        EventRecord::new("event2", "firstNamespace", 1),
        EventRecord::new("event3", "secondNamespace", 1),
    ]
}

#[test]
fn single_save_notifies_once() {
    let mut registry = EventRegistry::new();
    let records = listen(&mut registry);

    registry.save("testData", DEFAULT_NAMESPACE);

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "testData");
    assert_eq!(records[0].namespace, "");
    assert_eq!(records[0].value, 1);
}

#[test]
fn saves_across_namespaces_notify_in_order() {
    let mut registry = EventRegistry::new();
    let records = listen(&mut registry);

    save_three(&mut registry);

    assert_eq!(*records.lock().unwrap(), saved_three());
}

#[test]
fn clear_namespace_adds_one_zero_record() {
    let mut registry = EventRegistry::new();
    let records = listen(&mut registry);

    save_three(&mut registry);
    assert!(registry.clear_namespace("secondNamespace"));

    let mut expected = saved_three();
    expected.push(EventRecord::new("event3", "secondNamespace", 0));
    assert_eq!(*records.lock().unwrap(), expected);
}

#[test]
fn clear_all_adds_one_zero_record_per_key() {
    let mut registry = EventRegistry::new();
    let records = listen(&mut registry);

    save_three(&mut registry);
    registry.clear_all();

    let mut expected = saved_three();
    expected.extend([
        EventRecord::new("event1", "", 0),
        EventRecord::new("event2", "firstNamespace", 0),
        EventRecord::new("event3", "secondNamespace", 0),
    ]);
    assert_eq!(*records.lock().unwrap(), expected);
}

#[test]
fn every_apply_operation_notifies_new_value() {
    let mut registry = EventRegistry::new();
    let records = listen(&mut registry);

    registry.save("k", "ns");
    registry.add_to("k", 5, "ns");
    registry.remove_from("k", 10, "ns");
    registry.set_value("k", 69, "ns");

    let values: Vec<i64> = records.lock().unwrap().iter().map(|r| r.value).collect();
    assert_eq!(values, vec![1, 6, -4, 69]);
}

#[test]
fn queries_notify_nobody() {
    let mut registry = EventRegistry::new();
    save_three(&mut registry);
    let records = listen(&mut registry);

    let _ = registry.get("event1", DEFAULT_NAMESPACE);
    let _ = registry.has_value("event2", "firstNamespace");
    let _ = registry.export_snapshot();

    assert!(records.lock().unwrap().is_empty());
}

#[test]
fn import_notifies_each_imported_value_in_order() {
    let mut registry = EventRegistry::new();
    registry.save("stale", "old");
    let records = listen(&mut registry);

    let snapshot: Snapshot = serde_json::from_str(
        r#"{
            "": { "event1": 2 },
            "firstNamespace": { "event2": 1 },
            "secondNamespace": { "event3": 1, "event4": -7 }
        }"#,
    )
    .unwrap();
    registry.import_snapshot(snapshot);

    assert_eq!(
        *records.lock().unwrap(),
        vec![
            EventRecord::new("event1", "", 2),
            EventRecord::new("event2", "firstNamespace", 1),
            EventRecord::new("event3", "secondNamespace", 1),
            EventRecord::new("event4", "secondNamespace", -7),
        ]
    );
}

#[test]
fn every_subscriber_sees_every_record_in_registration_order() {
    let mut registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    for label in ["hud", "achievements"] {
        let sink = Arc::clone(&log);
        registry.subscribe(move |record: &EventRecord| {
            sink.lock().unwrap().push(format!("{label}:{}", record));
        });
    }

    registry.save("door_opened", DEFAULT_NAMESPACE);
    registry.add_to("coins", 3, "shop");

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "hud:door_opened = 1",
            "achievements:door_opened = 1",
            "hud:shop/coins = 3",
            "achievements:shop/coins = 3",
        ]
    );
}

#[test]
fn export_import_round_trip_is_exact() {
    let mut registry = EventRegistry::new();
    save_three(&mut registry);
    registry.save("event1", DEFAULT_NAMESPACE);
    registry.set_value("zero", 0, "firstNamespace");

    let json = serde_json::to_string(&registry.export_snapshot()).unwrap();
    let mut restored = EventRegistry::new();
    restored.import_snapshot(serde_json::from_str(&json).unwrap());

    assert_eq!(restored.export_snapshot(), registry.export_snapshot());
    assert_eq!(restored.get("event1", DEFAULT_NAMESPACE), 2);
    assert!(!restored.has_value("zero", "firstNamespace"));
    assert!(restored.contains_namespace("firstNamespace"));
}
