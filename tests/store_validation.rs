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
    std::env::temp_dir().join(format!("pvtest-{prefix}-{pid}-{t}-{id}.bin"))
}

fn fresh_store(prefix: &str) -> (PathBuf, ClaimStore) {
    let path = unique_path(prefix);
    create_claim_file(&path).expect("create claim file");
    let store = StoreBuilder::from_default()
        .open(&path)
        .expect("open claim store");
    (path, store)
}

const TAX_QUOTE: &str = "Benjamin Franklin\u{2019}s maxim about the inevitability of taxes is so \
familiar that it has the ring of a cliche. But it suggests a profound truth: Taxes are a certainty \
we dread almost as much as death. \u{2013} Steve Forbes, Flat Tax Revolution, Regnery 2005 ";

#[test]
fn invalid_saves_are_rejected_without_mutation() {
    let (path, mut store) = fresh_store("invalid");

    let err = store
        .save_claim(0, 0, "burthawk101", "hello world", -1.0)
        .expect_err("negative id");
    assert!(matches!(err, StoreError::InvalidId(_)), "{err}");

    let long_user = "asdf".repeat(15) + "as"; // 62 B
    let err = store
        .save_claim(0, 0, &long_user, "hello world", 23.0)
        .expect_err("long username");
    assert!(matches!(err, StoreError::UsernameTooLong { len: 62 }), "{err}");

    let long_content = TAX_QUOTE.repeat(3);
    assert!(long_content.len() > 560);
    let err = store
        .save_claim(0, 0, "lisa", &long_content, 23.0)
        .expect_err("long content");
    assert!(matches!(err, StoreError::ContentTooLong { .. }), "{err}");

    let err = store
        .save_claim(-1, 0, "burthawk101", "hello world", 2344.0)
        .expect_err("bad coordinates");
    assert!(matches!(err, StoreError::InvalidCoordinates { x: -1, y: 0 }), "{err}");

    for e in [StoreError::InvalidId(-1.0), StoreError::InvalidCoordinates { x: 0, y: -1 }] {
        assert!(e.is_validation());
    }

    assert!(store.get_claim(0, 0).is_none());
    assert!(!store.tweet_exists("burthawk101"));
    assert!(!store.tweet_exists("lisa"));
    assert_eq!(store.claim_count(), 0);
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn non_finite_ids_are_rejected() {
    let (path, mut store) = fresh_store("nan");
    for id in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = store.save_claim(1, 1, "nelson", "ha-ha", id).expect_err("bad id");
        assert!(matches!(err, StoreError::InvalidId(_)), "{err}");
    }
    store.save_claim(1, 1, "nelson", "ha-ha", 0.0).expect("id 0 is valid");
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn validation_order_reports_first_violation() {
    let (path, mut store) = fresh_store("order");
    let long_user = "u".repeat(61);
    let long_content = "c".repeat(561);

    let err = store
        .save_claim(640, 0, &long_user, &long_content, -5.0)
        .expect_err("all invalid");
    assert!(matches!(err, StoreError::InvalidCoordinates { .. }), "{err}");

    let err = store
        .save_claim(0, 0, &long_user, &long_content, -5.0)
        .expect_err("user/content/id invalid");
    assert!(matches!(err, StoreError::UsernameTooLong { len: 61 }), "{err}");

    let err = store
        .save_claim(0, 0, "moe", &long_content, -5.0)
        .expect_err("content/id invalid");
    assert!(matches!(err, StoreError::ContentTooLong { len: 561 }), "{err}");

    store.save_claim(2, 2, "moe", "hey", 1.0).expect("save moe");
    let err = store
        .save_claim(3, 3, "moe", "again", -1.0)
        .expect_err("bad id beats duplicate");
    assert!(matches!(err, StoreError::InvalidId(_)), "{err}");
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn limits_are_inclusive() {
    let (path, mut store) = fresh_store("limits");
    let user = "u".repeat(60);
    let content = "\u{00e9}".repeat(280); // 2 B each
    store.save_claim(7, 8, &user, &content, 1.0).expect("exactly at limits");
    assert_eq!(store.get_claim(7, 8), Some(Claim::new(user, content, 1.0)));
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn duplicate_username_is_rejected() {
    let (path, mut store) = fresh_store("dup");
    store.save_claim(0, 0, "bart", "first", 1.0).expect("first save");
    let err = store
        .save_claim(10, 10, "bart", "second", 2.0)
        .expect_err("duplicate");
    assert!(matches!(err, StoreError::DuplicateUsername(ref u) if u == "bart"), "{err}");
    assert!(store.get_claim(10, 10).is_none());
    assert_eq!(store.get_claim(0, 0).expect("first").content, "first");
    store.close().expect("close");

    // the index is rebuilt from slots on open
    let mut store = StoreBuilder::from_default().open(&path).expect("reopen");
    let err = store
        .save_claim(20, 20, "bart", "third", 3.0)
        .expect_err("duplicate after reopen");
    assert!(matches!(err, StoreError::DuplicateUsername(_)), "{err}");
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn coordinate_overwrite_releases_previous_username() {
    let (path, mut store) = fresh_store("overwrite");
    store.save_claim(4, 4, "milhouse", "everything's coming up", 1.0).expect("save");
    store.save_claim(4, 4, "nelson", "ha-ha", 2.0).expect("overwrite");

    assert_eq!(store.get_claim(4, 4), Some(Claim::new("nelson", "ha-ha", 2.0)));
    assert!(store.tweet_exists("nelson"));
    assert!(!store.tweet_exists("milhouse"));
    store.close().expect("close");

    let store = StoreBuilder::from_default().open(&path).expect("reopen");
    assert!(!store.tweet_exists("milhouse"));
    assert!(store.tweet_exists("nelson"));
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn second_open_on_locked_file_fails() {
    let (path, store) = fresh_store("locked");
    match StoreBuilder::from_default().open(&path) {
        Err(StoreError::Locked(p)) => assert_eq!(p, path),
        Err(e) => panic!("expected Locked, got {e}"),
        Ok(_) => panic!("expected Locked, second store opened"),
    }
    store.close().expect("close");

    let store = StoreBuilder::from_default()
        .open(&path)
        .expect("open after close");
    store.close().expect("close");
    fs::remove_file(&path).ok();
}
