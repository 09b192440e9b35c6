use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use myvoice_core::{LifecycleState, ProfileSource, StoreConfig};
use myvoice_sync::testing::{ManualClock, ScriptedRunner};
use myvoice_sync::{
    ProfileStore, SaveOutcome, SaveStage, StoreError, SyncOutcome, STALENESS_THRESHOLD,
};
use tempfile::TempDir;

const URL: &str = "https://example/repo";

struct Harness {
    _home: TempDir,
    mirror: PathBuf,
    runner: ScriptedRunner,
    clock: ManualClock,
    store: ProfileStore<ScriptedRunner, ManualClock>,
}

fn harness(source: ProfileSource) -> Harness {
    let home = TempDir::new().expect("tempdir");
    let mirror = home.path().join(".amplifier/my-voice/profiles");
    let runner = ScriptedRunner::new();
    let clock = ManualClock::new();
    let store = ProfileStore::with_parts(
        StoreConfig::new(source, &mirror),
        runner.clone(),
        clock.clone(),
    );
    Harness {
        _home: home,
        mirror,
        runner,
        clock,
        store,
    }
}

fn remote() -> Harness {
    harness(ProfileSource::Remote(URL.to_string()))
}

fn seed_profile(mirror: &Path, name: &str, content: &str) {
    let dir = mirror.join("profiles").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("VOICE_PROFILE.md"), content).unwrap();
}

#[test]
fn unconfigured_store_refuses_and_touches_nothing() {
    let mut h = harness(ProfileSource::Unconfigured);

    assert_eq!(h.store.lifecycle_state(), LifecycleState::Unconfigured);
    assert!(matches!(h.store.read("default"), Err(StoreError::NotConfigured)));
    assert!(matches!(
        h.store.write("default", "x", true),
        Err(StoreError::NotConfigured)
    ));
    assert!(matches!(h.store.sync(true), Err(StoreError::NotConfigured)));
    assert!(matches!(h.store.save(None), Err(StoreError::NotConfigured)));

    assert!(!h.mirror.exists());
    assert!(h.runner.calls().is_empty());
}

#[test]
fn local_write_read_save_without_subprocesses() {
    let mut h = harness(ProfileSource::Local);
    assert_eq!(h.store.lifecycle_state(), LifecycleState::ConfiguredNoProfile);

    let written = h.store.write("default", "# My voice\n", true).unwrap();
    assert!(matches!(written.save, Some(Ok(SaveOutcome::SavedLocally))));
    assert_eq!(
        written.path,
        h.mirror.join("profiles/default/VOICE_PROFILE.md")
    );

    let doc = h.store.read("default").unwrap();
    assert_eq!(doc.content, "# My voice\n");

    assert_eq!(h.store.save(Some("anything")).unwrap(), SaveOutcome::SavedLocally);
    assert_eq!(h.store.sync(false).unwrap(), SyncOutcome::NoSyncNeeded);
    assert_eq!(h.store.lifecycle_state(), LifecycleState::Ready);
    assert!(!h.store.is_stale());
    assert!(h.runner.calls().is_empty());
}

#[test]
fn first_remote_read_clones_once_and_finds_no_profile() {
    let mut h = remote();
    assert_eq!(h.store.lifecycle_state(), LifecycleState::ConfiguredNeedsClone);

    let err = h.store.read("default").unwrap_err();
    assert!(matches!(err, StoreError::ProfileNotFound { .. }), "got: {err}");

    let calls = h.runner.calls();
    assert_eq!(calls.len(), 1, "clone only; fresh after clone so no pull");
    assert_eq!(calls[0].subcommand(), "clone");
    assert_eq!(calls[0].args[1], URL);
    assert_eq!(h.store.lifecycle_state(), LifecycleState::ConfiguredNoProfile);
}

#[test]
fn staleness_window_gates_pulls_on_read() {
    let mut h = remote();
    fs::create_dir_all(h.mirror.join(".git")).unwrap();
    seed_profile(&h.mirror, "default", "v1");

    // Fresh process: unset cursor is stale, so the first read pulls.
    h.store.read("default").unwrap();
    assert_eq!(h.runner.count("pull"), 1);

    h.clock.advance(Duration::from_secs(120));
    h.store.read("default").unwrap();
    assert_eq!(h.runner.count("pull"), 1, "within window, no pull");

    h.clock.advance(STALENESS_THRESHOLD);
    h.store.read("default").unwrap();
    assert_eq!(h.runner.count("pull"), 2, "past window, pulls again");
}

#[test]
fn forced_sync_pulls_even_when_fresh() {
    let mut h = remote();
    fs::create_dir_all(h.mirror.join(".git")).unwrap();

    h.store.sync(false).unwrap();
    assert_eq!(h.store.sync(false).unwrap(), SyncOutcome::AlreadyFresh);
    assert!(matches!(h.store.sync(true).unwrap(), SyncOutcome::Pulled { .. }));
    assert_eq!(h.runner.count("pull"), 2);
}

#[test]
fn conflict_on_read_serves_local_copy_with_warning() {
    let mut h = remote();
    fs::create_dir_all(h.mirror.join(".git")).unwrap();
    seed_profile(&h.mirror, "default", "local edits");
    h.runner
        .fail("pull", "CONFLICT (content): Merge conflict in profiles/default/VOICE_PROFILE.md");

    let doc = h.store.read("default").unwrap();
    assert_eq!(doc.content, "local edits");
    let warning = doc.sync_warning.expect("warning");
    assert!(warning.contains("conflict"), "{warning}");
    assert!(h.store.is_stale(), "failed pull leaves cursor unset");
}

#[test]
fn remote_write_pushes_and_refreshes_cursor() {
    let mut h = remote();
    fs::create_dir_all(h.mirror.join(".git")).unwrap();
    h.runner.ok("status", "?? profiles/default/VOICE_PROFILE.md\n");

    let written = h.store.write("default", "hello", true).unwrap();
    assert!(matches!(written.save, Some(Ok(SaveOutcome::Pushed { .. }))));
    assert_eq!(h.runner.subcommands(), vec!["status", "add", "commit", "push"]);
    assert!(!h.store.is_stale());

    // The push counts as a sync: an immediate read does not pull.
    h.store.read("default").unwrap();
    assert_eq!(h.runner.count("pull"), 0);
}

#[test]
fn rejected_push_keeps_content_on_disk() {
    let mut h = remote();
    fs::create_dir_all(h.mirror.join(".git")).unwrap();
    h.runner.ok("status", " M profiles/default/VOICE_PROFILE.md\n");
    h.runner.fail("push", "! [rejected] main -> main (fetch first)");

    let written = h.store.write("default", "draft", true).unwrap();
    match written.save_error() {
        Some(StoreError::SaveFailed { stage, detail }) => {
            assert_eq!(*stage, SaveStage::Push);
            assert!(detail.contains("rejected"));
        }
        other => panic!("expected push failure, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&written.path).unwrap(), "draft");
}

#[test]
fn clean_tree_save_is_nothing_to_save() {
    let mut h = remote();
    fs::create_dir_all(h.mirror.join(".git")).unwrap();

    assert_eq!(h.store.save(None).unwrap(), SaveOutcome::NothingToSave);
    assert_eq!(h.runner.subcommands(), vec!["status"]);
}

#[test]
fn timed_out_pull_does_not_wedge_the_store() {
    let mut h = remote();
    fs::create_dir_all(h.mirror.join(".git")).unwrap();
    seed_profile(&h.mirror, "default", "still here");
    h.runner.time_out("pull");

    let doc = h.store.read("default").unwrap();
    assert!(doc.sync_warning.unwrap().contains("timed out"));

    // The next call proceeds normally.
    assert!(matches!(h.store.sync(true).unwrap(), SyncOutcome::Pulled { .. }));
}

#[test]
fn clone_into_occupied_directory_is_refused() {
    let mut h = remote();
    seed_profile(&h.mirror, "default", "unversioned");

    let err = h.store.sync(false).unwrap_err();
    assert!(matches!(err, StoreError::MirrorOccupied { .. }), "got: {err}");
    assert_eq!(h.runner.count("clone"), 0);
    assert_eq!(
        fs::read_to_string(h.mirror.join("profiles/default/VOICE_PROFILE.md")).unwrap(),
        "unversioned"
    );
}
