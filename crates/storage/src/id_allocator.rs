//! Buffered, windowed `u64` ID allocator (spec §4.2).

use crate::RawMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tstore_core::Result;

const DEFAULT_WINDOW: u64 = 100;

struct AllocatorState {
    next_to_serve: u64,
    window_end: u64,
}

/// Produces a strictly increasing `u64` stream, persisting reservations in
/// windows of `window_size` so a crash skips at most `window_size - 1`
/// IDs rather than requiring a fsync per allocation.
pub struct IdAllocator {
    raw_map: Arc<dyn RawMap>,
    path: String,
    window_size: u64,
    state: Mutex<AllocatorState>,
}

impl IdAllocator {
    /// Open (or create) an allocator persisting its reservation window to
    /// `path` in `raw_map`.
    pub fn open(raw_map: Arc<dyn RawMap>, path: impl Into<String>, window_size: u64) -> Result<Self> {
        let path = path.into();
        let persisted_next = read_next(&raw_map, &path)?.unwrap_or(0);
        Ok(IdAllocator {
            raw_map,
            path,
            window_size: window_size.max(1),
            state: Mutex::new(AllocatorState {
                next_to_serve: persisted_next,
                window_end: persisted_next,
            }),
        })
    }

    /// Open an allocator with the default window size.
    pub fn open_default(raw_map: Arc<dyn RawMap>, path: impl Into<String>) -> Result<Self> {
        Self::open(raw_map, path, DEFAULT_WINDOW)
    }

    /// Produce the next ID in the stream. No ID is ever produced twice;
    /// up to `window_size - 1` IDs may be skipped across a crash.
    pub fn next_id(&self) -> Result<u64> {
        let mut state = self.state.lock();
        if state.next_to_serve >= state.window_end {
            let new_window_end = state.next_to_serve + self.window_size;
            write_next(&self.raw_map, &self.path, new_window_end)?;
            state.window_end = new_window_end;
        }

        let id = state.next_to_serve;
        state.next_to_serve += 1;
        Ok(id)
    }
}

fn read_next(raw_map: &Arc<dyn RawMap>, path: &str) -> Result<Option<u64>> {
    match raw_map.get(path)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

fn write_next(raw_map: &Arc<dyn RawMap>, path: &str, next: u64) -> Result<()> {
    raw_map.set(path, serde_json::to_vec(&next)?)
}
