//! store/open: open a claim file with config and lock.
//!
//! Startup failures: NotFound (no file), InvalidSize (length != 628*640*480),
//! Locked (another store holds the file, only with lock_file on), Io.
//!
//! Writers take an exclusive lock, read-only stores a shared one, so any number
//! of readers may coexist but never alongside a writer.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use fs2::FileExt;
use log::info;

use crate::config::{StoreBuilder, StoreConfig};
use crate::consts::CLAIM_FILE_SIZE;
use crate::error::{StoreError, StoreResult};
use crate::flush::FlushQueue;
use crate::util::read_at;

use super::core::ClaimStore;
use super::index::UsernameIndex;

impl ClaimStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_with_config(path, StoreConfig::from_env())
    }

    pub fn open_with_config(path: &Path, cfg: StoreConfig) -> StoreResult<Self> {
        let meta = match std::fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(StoreError::NotFound(path.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        check_size(meta.len())?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(!cfg.read_only)
            .open(path)?;

        if cfg.lock_file {
            let locked = if cfg.read_only {
                FileExt::try_lock_shared(&file)
            } else {
                FileExt::try_lock_exclusive(&file)
            };
            if let Err(e) = locked {
                if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                    return Err(StoreError::Locked(path.to_path_buf()));
                }
                return Err(e.into());
            }
            // size may have changed between stat and lock
            check_size(file.metadata()?.len())?;
        }

        let mut buffer = vec![0u8; CLAIM_FILE_SIZE as usize];
        read_at(&mut file, 0, &mut buffer)?;
        let index = UsernameIndex::rebuild(&buffer);

        info!(
            "opened claim file {} ({} claims indexed, {})",
            path.display(),
            index.len(),
            cfg
        );

        let buffer = Arc::new(RwLock::new(buffer));
        let file = Arc::new(Mutex::new(file));
        let flusher = FlushQueue::start(
            buffer.clone(),
            file.clone(),
            cfg.flush_mode,
            cfg.data_fsync,
        )?;

        Ok(Self {
            path: path.to_path_buf(),
            locked: cfg.lock_file,
            cfg,
            buffer,
            file,
            index,
            flusher,
            closed: false,
        })
    }
}

fn check_size(actual: u64) -> StoreResult<()> {
    if actual != CLAIM_FILE_SIZE {
        return Err(StoreError::InvalidSize {
            actual,
            expected: CLAIM_FILE_SIZE,
        });
    }
    Ok(())
}

impl StoreBuilder {
    /// Finish the builder and open the store.
    pub fn open(self, path: &Path) -> StoreResult<ClaimStore> {
        ClaimStore::open_with_config(path, self.build())
    }
}
