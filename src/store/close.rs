//! store/close: stop the flush queue, write the full buffer, release the file.

use fs2::FileExt;
use log::{debug, info, warn};

use crate::error::StoreResult;
use crate::metrics::record_close_full_write;
use crate::util::{lock, read, write_at};

use super::core::ClaimStore;

impl ClaimStore {
    /// Synchronously persist the whole buffer and release the file.
    /// A read-only store only releases the file.
    /// Consumes the store; the lock and handle are gone when this returns.
    pub fn close(mut self) -> StoreResult<()> {
        self.shutdown_and_write()
    }

    pub(crate) fn shutdown_and_write(&mut self) -> StoreResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // waits for an in-flight flush; anything still queued is covered below
        self.flusher.shutdown();

        if self.cfg.read_only {
            self.unlock();
            debug!("released read-only claim file {}", self.path.display());
            return Ok(());
        }

        let res = {
            let buf = read(&self.buffer);
            let mut f = lock(&self.file);
            write_at(&mut f, 0, &buf).and_then(|_| {
                if self.cfg.data_fsync {
                    f.sync_all()
                } else {
                    Ok(())
                }
            })
        };

        self.unlock();

        res?;
        record_close_full_write();
        info!("closed claim file {} ({} claims)", self.path.display(), self.index.len());
        Ok(())
    }

    fn unlock(&self) {
        if !self.locked {
            return;
        }
        let f = lock(&self.file);
        if let Err(e) = FileExt::unlock(&*f) {
            warn!("unlock {}: {}", self.path.display(), e);
        }
    }
}
