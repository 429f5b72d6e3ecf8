use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use PixelVault::{create_claim_file, Claim, ClaimStore, StoreBuilder, StoreError};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("pvtest-ro-{prefix}-{pid}-{t}-{id}.bin"))
}

fn seeded_file(prefix: &str) -> PathBuf {
    let path = unique_path(prefix);
    create_claim_file(&path).expect("create claim file");
    let mut store = StoreBuilder::from_default().open(&path).expect("open writer");
    store.save_claim(2, 3, "moe", "hey", 9.0).expect("save");
    store.close().expect("close writer");
    path
}

fn open_ro(path: &PathBuf) -> Result<ClaimStore, StoreError> {
    StoreBuilder::from_default().read_only(true).open(path)
}

#[test]
fn reads_work_and_saves_are_rejected() {
    let path = seeded_file("reads");
    let mut store = open_ro(&path).expect("open read-only");
    assert!(store.config().read_only);

    assert_eq!(store.get_claim(2, 3), Some(Claim::new("moe", "hey", 9.0)));
    assert!(store.tweet_exists("moe"));

    for res in [
        store.save_claim(0, 0, "barney", "burp", 1.0),
        store.save_claim_memory_only(0, 0, "barney", "burp", 1.0),
    ] {
        match res {
            Err(StoreError::ReadOnly(p)) => assert_eq!(p, path),
            other => panic!("expected ReadOnly, got {other:?}"),
        }
    }
    assert!(store.get_claim(0, 0).is_none());
    assert!(!store.tweet_exists("barney"));
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn close_does_not_rewrite_the_file() {
    let path = seeded_file("nowrite");
    let before = fs::metadata(&path).expect("stat").modified().expect("mtime");
    std::thread::sleep(std::time::Duration::from_millis(20));

    let store = open_ro(&path).expect("open read-only");
    store.close().expect("close");
    let dropped = open_ro(&path).expect("open read-only");
    drop(dropped);

    let after = fs::metadata(&path).expect("stat").modified().expect("mtime");
    assert_eq!(before, after);
    fs::remove_file(&path).ok();
}

#[test]
fn readers_share_writers_exclude() {
    let path = seeded_file("locks");

    let r1 = open_ro(&path).expect("first reader");
    let r2 = open_ro(&path).expect("second reader");
    match StoreBuilder::from_default().open(&path) {
        Err(StoreError::Locked(_)) => {}
        Err(e) => panic!("expected Locked, got {e}"),
        Ok(_) => panic!("writer opened next to readers"),
    }
    r1.close().expect("close");
    r2.close().expect("close");

    let w = StoreBuilder::from_default().open(&path).expect("writer");
    match open_ro(&path) {
        Err(StoreError::Locked(_)) => {}
        Err(e) => panic!("expected Locked, got {e}"),
        Ok(_) => panic!("reader opened next to a writer"),
    }
    w.close().expect("close");
    fs::remove_file(&path).ok();
}

#[cfg(unix)]
#[test]
fn opens_a_file_without_write_permission() {
    use std::os::unix::fs::PermissionsExt;

    let path = seeded_file("perm");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).expect("chmod");

    let store = open_ro(&path).expect("open read-only");
    assert!(store.tweet_exists("moe"));
    store.close().expect("close");

    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).ok();
    fs::remove_file(&path).ok();
}
