use super::*;
use chrono::TimeZone;
use tempfile::tempdir;
use vh_core::{CommitmentState, DesireClass, FrictionClass, Horizon};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap()
}

fn commitment(id: &str, label: &str) -> Commitment {
    Commitment {
        id: CommitmentId::new(id),
        label: label.to_string(),
        state: CommitmentState::Candidate,
        priority: 0,
        horizon: Horizon::Week,
        desire_class: DesireClass::Unknown,
        friction_class: FrictionClass::Unknown,
        source: "test".to_string(),
        last_advanced_at: None,
        evidence: Vec::new(),
        created_at: Some(now()),
        state_history: Vec::new(),
        advancement_signals: Vec::new(),
        outcome_pattern: None,
        drift_snapshots: None,
        desire_class_rationale: None,
    }
}

#[test]
fn load_absent_store_returns_empty_with_version_one() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path());
    let store = CommitmentStore::load(&vault, now()).unwrap();
    assert_eq!(store.version, 1);
    assert!(store.commitments.is_empty());
}

#[test]
fn load_tolerates_legacy_file_missing_history_fields() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path());
    let legacy = r#"{
        "version": 1,
        "commitments": [
            {
                "id": "ship-the-thing",
                "label": "Ship the thing",
                "state": "active",
                "priority": 1,
                "horizon": "week",
                "source": "human"
            }
        ],
        "lastEvaluatedAt": "2026-01-01T00:00:00Z"
    }"#;
    vault.write_atomic(&vault.commitments_path(), legacy).unwrap();

    let store = CommitmentStore::load(&vault, now()).unwrap();
    let c = &store.commitments[0];
    assert!(c.state_history.is_empty());
    assert!(c.advancement_signals.is_empty());
    assert_eq!(c.desire_class, DesireClass::Unknown);
    assert_eq!(c.friction_class, FrictionClass::Unknown);
}

#[test]
fn write_atomic_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path());
    let mut store = CommitmentStoreFile::empty(now());
    store.commitments.push(commitment("ship-the-thing", "Ship the thing"));

    CommitmentStore::write_atomic(&vault, &store).unwrap();
    let reloaded = CommitmentStore::load(&vault, now()).unwrap();

    assert_eq!(reloaded.commitments.len(), 1);
    assert_eq!(reloaded.commitments[0].id, CommitmentId::new("ship-the-thing"));
}

#[test]
fn with_commitment_lock_persists_mutation() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path());

    CommitmentStore::with_commitment_lock(&vault, now(), |store| {
        store.commitments.push(commitment("write-the-spec", "Write the spec"));
        Ok(())
    })
    .unwrap();

    let reloaded = CommitmentStore::load(&vault, now()).unwrap();
    assert_eq!(reloaded.commitments.len(), 1);
}

#[test]
fn derive_id_slugifies_label_with_no_collision() {
    let id = CommitmentStore::derive_id("Ship the Thing!", &[]);
    assert_eq!(id.as_str(), "ship-the-thing");
}

#[test]
fn derive_id_suffixes_on_collision_deterministically() {
    let existing = vec![commitment("ship-the-thing", "Ship the thing")];
    let id = CommitmentStore::derive_id("Ship the thing", &existing);
    assert_eq!(id.as_str(), "ship-the-thing-2");

    let existing_two = vec![
        commitment("ship-the-thing", "Ship the thing"),
        commitment("ship-the-thing-2", "Ship the thing"),
    ];
    let id2 = CommitmentStore::derive_id("Ship the thing", &existing_two);
    assert_eq!(id2.as_str(), "ship-the-thing-3");
}

#[test]
fn derive_id_is_stable_across_repeated_calls() {
    let existing = vec![commitment("ship-the-thing", "Ship the thing")];
    let a = CommitmentStore::derive_id("Ship the thing", &existing);
    let b = CommitmentStore::derive_id("Ship the thing", &existing);
    assert_eq!(a, b);
}
