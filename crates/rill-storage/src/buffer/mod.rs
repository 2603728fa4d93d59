//! Buffer pool for RillDB.
//!
//! The buffer pool manages a fixed-size pool of in-memory page frames,
//! mediating between on-disk pages and the access methods above:
//!
//! - **Page caching**: resident pages are served without disk I/O
//! - **Pin/unpin**: reference counting keeps frames in place while used
//! - **Dirty tracking**: modified pages are written back before reuse
//! - **Eviction policy**: LRU-K selects victims among unpinned frames
//! - **Page guards**: RAII handles tie pin lifetime (and the page latch)
//!   to scope
//!
//! # Architecture
//!
//! ```text
//! +----------------------------------------------------------------+
//! |                      BufferPoolManager                         |
//! |  +----------------------------------------------------------+  |
//! |  |   pool latch: page table, free list, id allocator        |  |
//! |  +----------------------------------------------------------+  |
//! |                              |                                 |
//! |                              v                                 |
//! |  +----------------------------------------------------------+  |
//! |  |                    Frame Array                           |  |
//! |  |  +---------+ +---------+ +---------+     +---------+     |  |
//! |  |  | Frame 0 | | Frame 1 | | Frame 2 | ... | Frame N |     |  |
//! |  |  | page_id | | page_id | | page_id |     | page_id |     |  |
//! |  |  | data[]  | | data[]  | | data[]  |     | data[]  |     |  |
//! |  |  | dirty   | | dirty   | | dirty   |     | dirty   |     |  |
//! |  |  | pin_cnt | | pin_cnt | | pin_cnt |     | pin_cnt |     |  |
//! |  |  +---------+ +---------+ +---------+     +---------+     |  |
//! |  +----------------------------------------------------------+  |
//! |                              |                                 |
//! |                              v                                 |
//! |  +----------------------------------------------------------+  |
//! |  |            LRU-K Replacer (eviction candidates)          |  |
//! |  +----------------------------------------------------------+  |
//! +----------------------------------------------------------------+
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rill_storage::buffer::{BufferPoolConfig, BufferPoolManager};
//! use rill_storage::disk::{DiskManager, OpenOptions};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BufferPoolConfig::new(64);
//!     let disk = DiskManager::open("data.db", OpenOptions::for_create(), config.page_size)?;
//!     let pool = BufferPoolManager::new(config, Arc::new(disk))?;
//!
//!     let (page_id, mut guard) = pool.new_page_guarded()?.expect("pool full");
//!     guard.data_mut()[..5].copy_from_slice(b"hello");
//!     // Page is unpinned (dirty) when the guard is dropped
//!     drop(guard);
//!
//!     let read = pool.fetch_page_read(page_id)?.expect("pool full");
//!     assert_eq!(&read.data()[..5], b"hello");
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod eviction;
mod frame;
mod latch;
mod pool;

pub use config::BufferPoolConfig;
pub use error::{BufferError, BufferResult};
pub use eviction::{AccessType, LruKReplacer};
pub use frame::{Frame, FrameId};
pub use latch::{BasicPageGuard, ReadPageGuard, WritePageGuard};
pub use pool::BufferPoolManager;

/// Statistics for buffer pool monitoring.
#[derive(Debug, Clone, Default)]
pub struct BufferPoolStats {
    /// Total number of page fetches.
    pub fetches: u64,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (required disk read).
    pub misses: u64,
    /// Number of pages evicted.
    pub evictions: u64,
    /// Number of dirty pages flushed.
    pub flushes: u64,
    /// Current number of pinned frames.
    pub pinned_frames: usize,
    /// Current number of dirty frames.
    pub dirty_frames: usize,
}

impl BufferPoolStats {
    /// Returns the cache hit ratio (0.0 to 1.0).
    pub fn hit_ratio(&self) -> f64 {
        if self.fetches == 0 {
            0.0
        } else {
            self.hits as f64 / self.fetches as f64
        }
    }
}
