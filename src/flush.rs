//! flush: background persistence queue for the in-memory claim buffer.
//!
//! One worker thread per open store. Saves mark work (a dirty slot or "full") and
//! notify; the worker takes everything pending in one go and writes it while no
//! other flush runs. Saves that arrive during a flush coalesce into the next one.
//!
//! Every flush reads the *current* buffer, so only "at least one flush starts after
//! the last save" matters for durability, not which snapshot an earlier flush saw.
//!
//! Flush errors never reach the saving caller: they are logged, counted, and the
//! latest one is parked for `take_error()`.

use std::collections::BTreeSet;
use std::fs::File;
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread::JoinHandle;

use log::{debug, error};

use crate::config::FlushMode;
use crate::consts::SLOT_SIZE;
use crate::metrics::{record_flush, record_flush_error};
use crate::slot::to_byte_offset;
use crate::util::{lock, read, write_at};

pub(crate) type SharedBuffer = Arc<RwLock<Vec<u8>>>;
pub(crate) type SharedFile = Arc<Mutex<File>>;

/// pending work + worker status, guarded by FlushInner::state.
#[derive(Debug, Default)]
struct FlushState {
    flushing: bool,
    full: bool,
    dirty: BTreeSet<usize>,
    shutdown: bool,
    completed: u64,
}

impl FlushState {
    #[inline]
    fn has_pending(&self) -> bool {
        self.full || !self.dirty.is_empty()
    }
}

struct FlushInner {
    state: Mutex<FlushState>,
    cv: Condvar,
    buffer: SharedBuffer,
    file: SharedFile,
    mode: FlushMode,
    fsync: bool,
    last_error: Mutex<Option<String>>,
}

pub(crate) struct FlushQueue {
    inner: Arc<FlushInner>,
    worker: Option<JoinHandle<()>>,
}

impl FlushQueue {
    pub(crate) fn start(
        buffer: SharedBuffer,
        file: SharedFile,
        mode: FlushMode,
        fsync: bool,
    ) -> std::io::Result<Self> {
        let inner = Arc::new(FlushInner {
            state: Mutex::new(FlushState::default()),
            cv: Condvar::new(),
            buffer,
            file,
            mode,
            fsync,
            last_error: Mutex::new(None),
        });
        let worker_inner = inner.clone();
        let worker = std::thread::Builder::new()
            .name("pixelvault-flush".into())
            .spawn(move || run_worker(worker_inner))?;
        Ok(Self {
            inner,
            worker: Some(worker),
        })
    }

    /// Schedule a flush covering `slot`. Never blocks on I/O.
    pub(crate) fn enqueue(&self, slot: usize) {
        let mut st = lock(&self.inner.state);
        if st.shutdown {
            return;
        }
        match self.inner.mode {
            FlushMode::Full => st.full = true,
            FlushMode::Slots => {
                st.dirty.insert(slot);
            }
        }
        self.inner.cv.notify_all();
    }

    /// Block until no flush is running and nothing is pending.
    pub(crate) fn wait_idle(&self) {
        let mut st = lock(&self.inner.state);
        while st.flushing || (st.has_pending() && !st.shutdown) {
            st = self
                .inner
                .cv
                .wait(st)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        let st = lock(&self.inner.state);
        !st.flushing && !st.has_pending()
    }

    pub(crate) fn completed(&self) -> u64 {
        lock(&self.inner.state).completed
    }

    pub(crate) fn take_error(&self) -> Option<String> {
        lock(&self.inner.last_error).take()
    }

    /// Stop the worker after its in-flight flush. Pending work is dropped: the
    /// caller follows up with a full write of the buffer.
    pub(crate) fn shutdown(&mut self) {
        {
            let mut st = lock(&self.inner.state);
            st.shutdown = true;
            self.inner.cv.notify_all();
        }
        if let Some(h) = self.worker.take() {
            if h.join().is_err() {
                error!("flush worker panicked");
            }
        }
        let mut st = lock(&self.inner.state);
        st.full = false;
        st.dirty.clear();
        self.inner.cv.notify_all();
    }
}

impl Drop for FlushQueue {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.shutdown();
        }
    }
}

fn run_worker(inner: Arc<FlushInner>) {
    // reused across full flushes
    let mut snapshot: Vec<u8> = Vec::new();

    loop {
        let (full, dirty) = {
            let mut st = lock(&inner.state);
            while !st.has_pending() && !st.shutdown {
                st = inner
                    .cv
                    .wait(st)
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
            }
            if st.shutdown {
                break;
            }
            st.flushing = true;
            (std::mem::take(&mut st.full), std::mem::take(&mut st.dirty))
        };

        let res = if full {
            flush_full(&inner, &mut snapshot)
        } else {
            flush_slots(&inner, &dirty)
        };

        match res {
            Ok((slots, bytes)) => {
                record_flush(slots, bytes);
                debug!("flush done: {} slot(s), {} B", slots, bytes);
            }
            Err(e) => {
                record_flush_error();
                error!("background flush failed: {}", e);
                *lock(&inner.last_error) = Some(e.to_string());
            }
        }

        let mut st = lock(&inner.state);
        st.flushing = false;
        st.completed += 1;
        inner.cv.notify_all();
    }
}

/// Copy the whole buffer, then write it at offset 0. Saves only wait for the copy.
fn flush_full(inner: &FlushInner, snapshot: &mut Vec<u8>) -> std::io::Result<(u64, u64)> {
    {
        let buf = read(&inner.buffer);
        snapshot.clear();
        snapshot.extend_from_slice(&buf);
    }
    let mut f = lock(&inner.file);
    write_at(&mut f, 0, snapshot)?;
    if inner.fsync {
        f.sync_data()?;
    }
    Ok((0, snapshot.len() as u64))
}

fn flush_slots(inner: &FlushInner, dirty: &BTreeSet<usize>) -> std::io::Result<(u64, u64)> {
    let mut copies: Vec<(u64, [u8; SLOT_SIZE])> = Vec::with_capacity(dirty.len());
    {
        let buf = read(&inner.buffer);
        for &idx in dirty {
            let off = to_byte_offset(idx);
            let mut slot = [0u8; SLOT_SIZE];
            slot.copy_from_slice(&buf[off..off + SLOT_SIZE]);
            copies.push((off as u64, slot));
        }
    }
    let mut f = lock(&inner.file);
    for (off, slot) in &copies {
        write_at(&mut f, *off, slot)?;
    }
    if inner.fsync {
        f.sync_data()?;
    }
    Ok((copies.len() as u64, (copies.len() * SLOT_SIZE) as u64))
}
