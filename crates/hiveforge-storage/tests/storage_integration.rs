// hiveforge-storage/tests/storage_integration.rs
// ============================================================================
// Module: Storage Integration Tests
// Description: End-to-end exercise of AkashicRecord, HiveStore, and Honeycomb.
// ============================================================================
//! ## Overview
//! Exercises the vault layout (§6.3) across all three stores together,
//! the way a real run would touch them.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::collections::BTreeMap;

use hiveforge_core::Actor;
use hiveforge_core::ColonyId;
use hiveforge_core::Episode;
use hiveforge_core::EpisodeId;
use hiveforge_core::Event;
use hiveforge_core::EventId;
use hiveforge_core::EventType;
use hiveforge_core::HiveId;
use hiveforge_core::KpiScores;
use hiveforge_core::Outcome;
use hiveforge_core::Payload;
use hiveforge_core::RunId;
use hiveforge_core::Timestamp;
use hiveforge_storage::AkashicRecord;
use hiveforge_storage::HiveStore;
use hiveforge_storage::HoneycombStore;

fn blank_event(event_type: EventType, run_id: Option<&str>, hive_id: Option<&str>) -> Event {
    Event {
        id: EventId::new(""),
        event_type,
        timestamp: Timestamp::new(time::OffsetDateTime::now_utc()),
        run_id: run_id.map(RunId::new),
        hive_id: hive_id.map(HiveId::new),
        colony_id: None,
        task_id: None,
        worker_id: None,
        actor: Actor::system(),
        payload: Payload::new(),
        prev_hash: None,
        parents: Vec::new(),
        hash: String::new(),
    }
}

#[test]
fn vault_layout_separates_runs_hives_and_honeycomb() {
    let vault = tempfile::tempdir().expect("tempdir");

    let ar = AkashicRecord::open(vault.path()).expect("open ar");
    ar.append(blank_event(EventType::RunStarted, Some("run-1"), None)).expect("append run started");
    ar.append(blank_event(EventType::TaskCreated, Some("run-1"), None)).expect("append task created");
    ar.append(blank_event(EventType::RunCompleted, Some("run-1"), None)).expect("append run completed");

    let hives = HiveStore::open(vault.path()).expect("open hives");
    hives.append(blank_event(EventType::HiveCreated, None, Some("hive-1"))).expect("append hive created");

    let honeycomb = HoneycombStore::open(vault.path()).expect("open honeycomb");
    honeycomb
        .record(&Episode {
            episode_id: EpisodeId::new("ep-1"),
            run_id: RunId::new("run-1"),
            colony_id: ColonyId::new("colony-1"),
            template_used: Some("balanced".to_string()),
            task_features: BTreeMap::new(),
            outcome: Outcome::Success,
            duration_seconds: 30.0,
            token_count: 500,
            failure_class: None,
            kpi_scores: KpiScores::default(),
            parent_episode_ids: Vec::new(),
            goal: "ship the feature".to_string(),
            metadata: BTreeMap::new(),
        })
        .expect("record episode");

    assert!(vault.path().join("run-1").join("events.jsonl").exists());
    assert!(vault.path().join("hives").join("hive-1").join("events.jsonl").exists());
    assert!(vault.path().join("honeycomb").join("colony-1.jsonl").exists());
    assert!(vault.path().join("honeycomb").join("_all.jsonl").exists());

    let run_events = ar.replay("run-1").expect("replay run");
    assert_eq!(run_events.len(), 3);
    ar.verify_chain("run-1").expect("chain verifies");

    let hive_events = hives.replay("hive-1").expect("replay hive");
    assert_eq!(hive_events.len(), 1);

    let colony_episodes = honeycomb.replay_colony("colony-1").expect("replay colony");
    assert_eq!(colony_episodes.len(), 1);
    assert_eq!(honeycomb.replay_all().expect("replay all").len(), 1);
}

#[test]
fn concurrent_runs_append_independently() {
    let vault = tempfile::tempdir().expect("tempdir");
    let ar = AkashicRecord::open(vault.path()).expect("open ar");

    let handles: Vec<_> = (0 .. 4)
        .map(|i| {
            let vault_path = vault.path().to_path_buf();
            std::thread::spawn(move || {
                let ar = AkashicRecord::open(&vault_path).expect("open ar in thread");
                let run_id = format!("run-{i}");
                for _ in 0 .. 10 {
                    ar.append(blank_event(EventType::TaskProgressed, Some(&run_id), None))
                        .expect("append from thread");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread join");
    }

    for i in 0 .. 4 {
        let run_id = format!("run-{i}");
        assert_eq!(ar.count_events(&run_id).expect("count"), 10);
        ar.verify_chain(&run_id).expect("chain verifies");
    }
    let mut runs = ar.list_runs().expect("list runs");
    runs.sort();
    assert_eq!(runs, vec!["run-0", "run-1", "run-2", "run-3"]);
}
