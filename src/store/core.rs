//! store/core: ClaimStore struct and plain accessors.

use std::path::{Path, PathBuf};

use log::warn;

use crate::config::{StoreBuilder, StoreConfig};
use crate::consts::CLAIM_FILE_SIZE;
use crate::flush::{FlushQueue, SharedBuffer, SharedFile};
use crate::util::read;

use super::index::UsernameIndex;

/// Whether a save schedules a disk flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveMode {
    Persist,
    /// Update buffer and index only (bulk loading). Reaches disk with the next
    /// flush or on close.
    MemoryOnly,
}

/// Disk-backed 640x480 grid of claim slots.
///
/// Reads are served from memory. Saves mutate memory synchronously and leave the
/// disk write to a background queue; `close` is the only point where disk and
/// memory are guaranteed equal.
pub struct ClaimStore {
    pub(crate) path: PathBuf,
    pub(crate) cfg: StoreConfig,
    pub(crate) buffer: SharedBuffer,
    pub(crate) file: SharedFile,
    pub(crate) index: UsernameIndex,
    pub(crate) flusher: FlushQueue,
    pub(crate) locked: bool,
    pub(crate) closed: bool,
}

impl ClaimStore {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    /// Length of the in-memory mirror of the claim file.
    pub fn file_buffer_len(&self) -> usize {
        read(&self.buffer).len()
    }

    /// Always 628 * 640 * 480.
    pub fn expected_file_buffer_len() -> usize {
        CLAIM_FILE_SIZE as usize
    }

    /// Number of usernames currently holding a claim.
    pub fn claim_count(&self) -> usize {
        self.index.len()
    }

    /// Block until every flush scheduled so far has been written.
    pub fn wait_for_flush(&self) {
        self.flusher.wait_idle();
    }

    /// True while a flush runs or is queued.
    pub fn flush_pending(&self) -> bool {
        !self.flusher.is_idle()
    }

    pub fn flushes_completed(&self) -> u64 {
        self.flusher.completed()
    }

    /// Latest background flush failure, if any. Cleared by this call.
    pub fn take_flush_error(&self) -> Option<String> {
        self.flusher.take_error()
    }
}

impl Drop for ClaimStore {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.shutdown_and_write() {
            warn!("claim store {} dropped without close, final write failed: {}", self.path.display(), e);
        }
    }
}
