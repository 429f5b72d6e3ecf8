use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use PixelVault::consts::{CLAIM_FILE_SIZE, GRID_HEIGHT, GRID_WIDTH, SLOT_SIZE};
use PixelVault::slot::{to_byte_offset, to_index};
use PixelVault::util::write_at;
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

fn reopen(path: &PathBuf) -> ClaimStore {
    StoreBuilder::from_default().open(path).expect("reopen claim store")
}

fn burt() -> Claim {
    Claim::new("burthawk101", "hello world", 12345.0)
}

#[test]
fn open_missing_file() {
    let path = unique_path("missing");
    match ClaimStore::open(&path) {
        Err(StoreError::NotFound(p)) => assert_eq!(p, path),
        Err(e) => panic!("expected NotFound, got {e}"),
        Ok(_) => panic!("expected NotFound, store opened"),
    }
}

#[test]
fn open_invalid_size() {
    let path = unique_path("badsize");
    fs::write(&path, "blahblahblah").expect("write 12 bytes");
    match ClaimStore::open(&path) {
        Err(StoreError::InvalidSize { actual, expected }) => {
            assert_eq!(actual, 12);
            assert_eq!(expected, CLAIM_FILE_SIZE);
        }
        Err(e) => panic!("expected InvalidSize, got {e}"),
        Ok(_) => panic!("expected InvalidSize, store opened"),
    }
    fs::remove_file(&path).ok();
}

#[test]
fn write_then_read_from_buffer() {
    let (path, mut store) = fresh_store("rw");
    let c = burt();
    store
        .save_claim(0, 0, &c.username, &c.content, c.id)
        .expect("save");
    assert_eq!(store.get_claim(0, 0), Some(c));
    assert!(store.get_claim(1, 0).is_none());
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn read_outside_grid_is_none() {
    let (path, mut store) = fresh_store("bounds");
    let c = burt();
    store
        .save_claim(0, 0, &c.username, &c.content, c.id)
        .expect("save");
    assert!(store.get_claim(-1, -1).is_none());
    assert!(store.get_claim(10_000_000, 10_000_000).is_none());
    assert!(store.get_claim(GRID_WIDTH as i64, 0).is_none());
    assert!(store.get_claim(0, GRID_HEIGHT as i64).is_none());
    assert!(store.get_claim(i64::MIN, i64::MAX).is_none());
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn buffer_length_matches_expected() {
    let (path, mut store) = fresh_store("len");
    assert_eq!(ClaimStore::expected_file_buffer_len(), 628 * 640 * 480);
    let c = burt();
    store
        .save_claim(0, 0, &c.username, &c.content, c.id)
        .expect("save");
    assert_eq!(store.file_buffer_len(), ClaimStore::expected_file_buffer_len());
    store.close().expect("close");
    assert_eq!(fs::metadata(&path).expect("stat").len(), CLAIM_FILE_SIZE);
    fs::remove_file(&path).ok();
}

#[test]
fn fresh_store_is_empty_everywhere() {
    let (path, store) = fresh_store("empty");
    for y in 0..GRID_HEIGHT as i64 {
        for x in 0..GRID_WIDTH as i64 {
            assert!(store.get_claim(x, y).is_none(), "({x}, {y}) should be empty");
        }
    }
    assert_eq!(store.claim_count(), 0);
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn boundary_slots_survive_reopen() {
    let (path, mut store) = fresh_store("corners");
    let first = Claim::new("first", "top left", 1.0);
    let last = Claim::new("last", "bottom right", 2.0);
    store
        .save_claim(0, 0, &first.username, &first.content, first.id)
        .expect("save first");
    store
        .save_claim(639, 479, &last.username, &last.content, last.id)
        .expect("save last");
    assert_eq!(store.get_claim(0, 0), Some(first.clone()));
    assert_eq!(store.get_claim(639, 479), Some(last.clone()));
    store.close().expect("close");

    let store = reopen(&path);
    assert_eq!(store.get_claim(0, 0), Some(first));
    assert_eq!(store.get_claim(639, 479), Some(last));
    assert!(store.get_claim(638, 479).is_none());
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn close_and_reopen_roundtrip() {
    let (path, mut store) = fresh_store("reopen");
    let c = burt();
    store
        .save_claim(0, 0, &c.username, &c.content, c.id)
        .expect("save");
    store.close().expect("close");

    let store = reopen(&path);
    assert_eq!(store.get_claim(0, 0), Some(c));
    assert!(store.tweet_exists("burthawk101"));
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn five_claims_reopen_and_username_index() {
    let (path, mut store) = fresh_store("five");
    let entries = [
        ((0i64, 0i64), Claim::new("bart", "eat my shorts", 1.0)),
        ((100, 0), Claim::new("lisa", "if anyone wants me, I'll be in my room", 2.0)),
        ((0, 100), Claim::new("homer", "d'oh", 3.0)),
        ((320, 240), Claim::new("marge", "hmmmm", 4.0)),
        ((639, 479), Claim::new("maggie", "\u{1f37c}", 5.0)),
    ];
    for ((x, y), c) in &entries {
        store
            .save_claim(*x, *y, &c.username, &c.content, c.id)
            .expect("save");
    }
    store.close().expect("close");

    let store = reopen(&path);
    for ((x, y), c) in &entries {
        assert_eq!(store.get_claim(*x, *y).as_ref(), Some(c), "claim at ({x}, {y})");
        assert!(store.tweet_exists(&c.username), "{} in index", c.username);
    }
    assert!(!store.tweet_exists("krusty"));
    assert_eq!(store.claim_count(), entries.len());
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn returned_claims_are_copies() {
    let (path, mut store) = fresh_store("copies");
    store.save_claim(5, 5, "ned", "okily dokily", 9.0).expect("save");
    let mut got = store.get_claim(5, 5).expect("claim");
    got.content.push_str(" mutated");
    assert_eq!(store.get_claim(5, 5).expect("claim").content, "okily dokily");
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn raw_slot_is_the_stored_bytes() {
    let (path, mut store) = fresh_store("raw");
    store
        .save_claim(6, 0, "lisa", "before\0after", 3.0)
        .expect("save");

    let raw = store.raw_slot(6, 0).expect("in bounds");
    assert_eq!(&raw[..12], b"before\0after");
    assert_eq!(&raw[560..564], b"lisa");
    assert_eq!(&raw[620..628], &3.0f64.to_le_bytes());
    // the decoded view stops at the NUL
    assert_eq!(store.get_claim(6, 0).expect("claim").content, "before");

    assert_eq!(store.raw_slot(7, 0), Some([0u8; SLOT_SIZE]));
    assert!(store.raw_slot(640, 0).is_none());
    assert!(store.raw_slot(0, -1).is_none());
    store.close().expect("close");
    fs::remove_file(&path).ok();
}

#[test]
fn raw_slot_shows_bytes_hidden_behind_an_empty_decode() {
    let path = unique_path("stray");
    create_claim_file(&path).expect("create claim file");
    {
        let mut f = fs::OpenOptions::new().write(true).open(&path).expect("open rw");
        let off = to_byte_offset(to_index(5, 1).expect("in bounds")) as u64;
        // content starts with NUL, so every field decodes empty
        write_at(&mut f, off, &[0, b'x', b'y']).expect("write stray bytes");
    }

    let store = reopen(&path);
    assert!(store.get_claim(5, 1).is_none());
    let raw = store.raw_slot(5, 1).expect("in bounds");
    assert_eq!(&raw[..3], &[0, b'x', b'y']);
    assert!(raw[3..].iter().all(|&b| b == 0));
    store.close().expect("close");
    fs::remove_file(&path).ok();
}
