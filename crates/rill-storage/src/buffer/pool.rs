//! Buffer pool manager.
//!
//! The pool owns a fixed array of frames, maps resident pages to frames,
//! pins pages for callers, and writes dirty pages back before their frame
//! is reused.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rill_common::types::PageId;
use tracing::{debug, trace};

use super::config::BufferPoolConfig;
use super::error::{BufferError, BufferResult};
use super::eviction::{AccessType, LruKReplacer};
use super::frame::{Frame, FrameId};
use super::latch::{BasicPageGuard, ReadPageGuard, WritePageGuard};
use super::BufferPoolStats;
use crate::disk::DiskManager;

/// State behind the pool latch.
///
/// Every public operation holds this lock for its full duration, disk I/O
/// included. Frame metadata is atomic but is only mutated under this lock;
/// the per-frame payload latches are independent of it.
struct PoolState {
    /// Page table: maps resident pages to their frames.
    page_table: HashMap<PageId, FrameId>,
    /// Unassigned frames, FIFO order of release.
    free_list: VecDeque<FrameId>,
    /// Next page id to allocate. Ids are never reused.
    next_page_id: PageId,
}

/// The buffer pool manager.
///
/// Mediates between fixed-size on-disk pages and in-memory frames:
///
/// - `new_page` / `fetch_page` pin a page into a frame, evicting with
///   LRU-K when the free list is empty
/// - `unpin_page` releases a pin and publishes dirty intent
/// - `flush_page` / `flush_all_pages` write payloads back to disk
/// - `delete_page` frees a frame and disposes of the page id
///
/// The guarded variants (`new_page_guarded`, `fetch_page_basic`,
/// `fetch_page_read`, `fetch_page_write`) wrap the pin in an RAII guard.
pub struct BufferPoolManager {
    /// Configuration.
    config: BufferPoolConfig,
    /// Array of buffer frames, allocated at construction.
    frames: Vec<Arc<Frame>>,
    /// The pool latch.
    state: Mutex<PoolState>,
    /// LRU-K replacer. Lock order: pool latch, then replacer latch.
    replacer: Mutex<LruKReplacer>,
    /// Disk manager for page I/O.
    disk: Arc<DiskManager>,
    /// Fetch counter for statistics.
    fetch_count: AtomicU64,
    /// Hit counter for statistics.
    hit_count: AtomicU64,
    /// Miss counter for statistics.
    miss_count: AtomicU64,
    /// Eviction counter for statistics.
    eviction_count: AtomicU64,
    /// Flush counter for statistics.
    flush_count: AtomicU64,
}

impl BufferPoolManager {
    /// Creates a buffer pool over `disk` with the given configuration.
    pub fn new(config: BufferPoolConfig, disk: Arc<DiskManager>) -> BufferResult<Self> {
        config
            .validate()
            .map_err(|e| BufferError::config(e.to_string()))?;
        if disk.page_size() != config.page_size {
            return Err(BufferError::config(format!(
                "disk manager page size {} does not match pool page size {}",
                disk.page_size(),
                config.page_size
            )));
        }

        let num_frames = config.num_frames;
        let frames: Vec<Arc<Frame>> = (0..num_frames)
            .map(|i| Arc::new(Frame::new(FrameId::new(i), config.page_size)))
            .collect();

        // Initially, every frame is in the free list
        let free_list: VecDeque<FrameId> = (0..num_frames).map(FrameId::new).collect();

        debug!(num_frames, page_size = config.page_size, "created buffer pool");

        Ok(Self {
            replacer: Mutex::new(LruKReplacer::new(num_frames, config.replacer_k)),
            config,
            frames,
            state: Mutex::new(PoolState {
                page_table: HashMap::with_capacity(num_frames),
                free_list,
                next_page_id: PageId::new(0),
            }),
            disk,
            fetch_count: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
            eviction_count: AtomicU64::new(0),
            flush_count: AtomicU64::new(0),
        })
    }

    /// Allocates a fresh page and pins it into a frame.
    ///
    /// The payload is zeroed, the dirty bit cleared, and the pin count set
    /// to one; the caller owns that pin until `unpin_page`. Returns
    /// `Ok(None)` only when no frame is free and none is evictable.
    pub fn new_page(&self) -> BufferResult<Option<(PageId, Arc<Frame>)>> {
        let mut state = self.state.lock();

        let Some(frame_id) = self.acquire_frame(&mut state)? else {
            return Ok(None);
        };
        let page_id = Self::allocate_page(&mut state);

        let frame = &self.frames[frame_id.index()];
        frame.write_data().fill(0);
        frame.set_page_id(page_id);
        frame.set_dirty(false);
        frame.pin();
        state.page_table.insert(page_id, frame_id);

        let mut replacer = self.replacer.lock();
        replacer
            .record_access(frame_id, AccessType::Unknown)
            .expect("frame id from pool is in range");
        replacer
            .set_evictable(frame_id, false)
            .expect("frame id from pool is in range");

        Ok(Some((page_id, Arc::clone(frame))))
    }

    /// Fetches `page_id` into the pool and pins it.
    ///
    /// A resident page is pinned in place; otherwise a frame is acquired
    /// (free list first, then eviction) and the payload is read from disk.
    /// Returns `Ok(None)` only when the page is not resident and no frame
    /// can be obtained.
    pub fn fetch_page(
        &self,
        page_id: PageId,
        access_type: AccessType,
    ) -> BufferResult<Option<Arc<Frame>>> {
        let mut state = self.state.lock();
        self.fetch_count.fetch_add(1, Ordering::Relaxed);

        if let Some(&frame_id) = state.page_table.get(&page_id) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            let frame = &self.frames[frame_id.index()];
            frame.pin();
            let mut replacer = self.replacer.lock();
            replacer
                .record_access(frame_id, access_type)
                .expect("frame id from page table is in range");
            replacer
                .set_evictable(frame_id, false)
                .expect("frame id from page table is in range");
            return Ok(Some(Arc::clone(frame)));
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let Some(frame_id) = self.acquire_frame(&mut state)? else {
            return Ok(None);
        };

        let frame = &self.frames[frame_id.index()];
        {
            let mut data = frame.write_data();
            if let Err(e) = self.disk.read_page(page_id, &mut data) {
                // The frame was never mapped; hand it back before failing
                drop(data);
                frame.reset();
                state.free_list.push_front(frame_id);
                return Err(e.into());
            }
        }

        frame.set_page_id(page_id);
        frame.set_dirty(false);
        frame.pin();
        state.page_table.insert(page_id, frame_id);

        let mut replacer = self.replacer.lock();
        replacer
            .record_access(frame_id, access_type)
            .expect("frame id from pool is in range");
        replacer
            .set_evictable(frame_id, false)
            .expect("frame id from pool is in range");

        Ok(Some(Arc::clone(frame)))
    }

    /// Releases one pin on `page_id`, ORing in the caller's dirty intent.
    ///
    /// Returns false, with no state change, when the page is not resident
    /// or its pin count is already zero. When the last pin is released the
    /// frame becomes evictable.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool, _access_type: AccessType) -> bool {
        let state = self.state.lock();

        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return false;
        };
        let frame = &self.frames[frame_id.index()];
        if frame.pin_count() == 0 {
            return false;
        }

        if is_dirty {
            frame.set_dirty(true);
        }
        if frame.unpin() == 0 {
            self.replacer
                .lock()
                .set_evictable(frame_id, true)
                .expect("frame id from page table is in range");
        }

        true
    }

    /// Writes `page_id`'s payload to disk and clears its dirty bit.
    ///
    /// Flushes regardless of pin count and dirtiness; returns `Ok(false)`
    /// when the page is not resident.
    pub fn flush_page(&self, page_id: PageId) -> BufferResult<bool> {
        let state = self.state.lock();

        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return Ok(false);
        };
        let frame = &self.frames[frame_id.index()];
        self.disk.write_page(page_id, &frame.read_data())?;
        frame.set_dirty(false);
        self.flush_count.fetch_add(1, Ordering::Relaxed);
        trace!(%page_id, frame_id = frame_id.index(), "flushed page");

        Ok(true)
    }

    /// Flushes every resident page.
    pub fn flush_all_pages(&self) -> BufferResult<()> {
        let state = self.state.lock();

        for (&page_id, &frame_id) in &state.page_table {
            let frame = &self.frames[frame_id.index()];
            self.disk.write_page(page_id, &frame.read_data())?;
            frame.set_dirty(false);
            self.flush_count.fetch_add(1, Ordering::Relaxed);
        }

        Ok(())
    }

    /// Removes `page_id` from the pool and disposes of the identifier.
    ///
    /// A non-resident page is a successful no-op. A pinned page cannot be
    /// deleted (`Ok(false)`). The freed frame is zeroed and returned to
    /// the free list; the id is never reissued.
    pub fn delete_page(&self, page_id: PageId) -> BufferResult<bool> {
        let mut state = self.state.lock();

        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return Ok(true);
        };
        let frame = &self.frames[frame_id.index()];
        if frame.is_pinned() {
            return Ok(false);
        }

        self.replacer.lock().remove(frame_id)?;
        state.page_table.remove(&page_id);
        frame.reset();
        state.free_list.push_back(frame_id);
        trace!(%page_id, frame_id = frame_id.index(), "deleted page");

        Ok(true)
    }

    /// Allocates a fresh page and wraps the pin in a basic guard.
    pub fn new_page_guarded(&self) -> BufferResult<Option<(PageId, BasicPageGuard<'_>)>> {
        Ok(self
            .new_page()?
            .map(|(page_id, frame)| (page_id, BasicPageGuard::new(self, frame, page_id))))
    }

    /// Fetches `page_id` and wraps the pin in a basic guard.
    pub fn fetch_page_basic(&self, page_id: PageId) -> BufferResult<Option<BasicPageGuard<'_>>> {
        Ok(self
            .fetch_page(page_id, AccessType::Unknown)?
            .map(|frame| BasicPageGuard::new(self, frame, page_id)))
    }

    /// Fetches `page_id` and takes its page latch in shared mode.
    ///
    /// Blocks until any exclusive holder releases the latch.
    pub fn fetch_page_read(&self, page_id: PageId) -> BufferResult<Option<ReadPageGuard<'_>>> {
        Ok(self
            .fetch_page(page_id, AccessType::Unknown)?
            .map(|frame| ReadPageGuard::new(BasicPageGuard::new(self, frame, page_id))))
    }

    /// Fetches `page_id` and takes its page latch in exclusive mode.
    ///
    /// Blocks until all other holders release the latch. The guard implies
    /// dirty intent on drop.
    pub fn fetch_page_write(&self, page_id: PageId) -> BufferResult<Option<WritePageGuard<'_>>> {
        Ok(self
            .fetch_page(page_id, AccessType::Unknown)?
            .map(|frame| WritePageGuard::new(BasicPageGuard::new(self, frame, page_id))))
    }

    /// Returns the pin count of a resident page.
    pub fn get_pin_count(&self, page_id: PageId) -> Option<u32> {
        let state = self.state.lock();
        state
            .page_table
            .get(&page_id)
            .map(|frame_id| self.frames[frame_id.index()].pin_count())
    }

    /// Returns true if a page is resident in the pool.
    pub fn contains(&self, page_id: PageId) -> bool {
        self.state.lock().page_table.contains_key(&page_id)
    }

    /// Returns the number of frames in the pool.
    pub fn num_frames(&self) -> usize {
        self.config.num_frames
    }

    /// Returns the page size.
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Returns the number of evictable frames.
    pub fn replacer_size(&self) -> usize {
        self.replacer.lock().size()
    }

    /// Returns statistics about the buffer pool.
    pub fn stats(&self) -> BufferPoolStats {
        let mut pinned = 0;
        let mut dirty = 0;

        for frame in &self.frames {
            if frame.is_pinned() {
                pinned += 1;
            }
            if frame.is_dirty() {
                dirty += 1;
            }
        }

        BufferPoolStats {
            fetches: self.fetch_count.load(Ordering::Relaxed),
            hits: self.hit_count.load(Ordering::Relaxed),
            misses: self.miss_count.load(Ordering::Relaxed),
            evictions: self.eviction_count.load(Ordering::Relaxed),
            flushes: self.flush_count.load(Ordering::Relaxed),
            pinned_frames: pinned,
            dirty_frames: dirty,
        }
    }

    // -------------------------------------------------------------------------
    // Private helpers
    // -------------------------------------------------------------------------

    /// Hands out the next page id. Strictly increasing, never reused.
    fn allocate_page(state: &mut PoolState) -> PageId {
        let page_id = state.next_page_id;
        state.next_page_id = page_id.next();
        page_id
    }

    /// Obtains a frame for a new resident page: free list first, then
    /// eviction.
    ///
    /// An evicted frame is flushed if dirty before its page-table entry is
    /// erased, then reset for reuse. `Ok(None)` means the pool is full and
    /// nothing is evictable.
    fn acquire_frame(&self, state: &mut PoolState) -> BufferResult<Option<FrameId>> {
        if let Some(frame_id) = state.free_list.pop_front() {
            return Ok(Some(frame_id));
        }

        let Some(frame_id) = self.replacer.lock().evict() else {
            return Ok(None);
        };
        let frame = &self.frames[frame_id.index()];
        let old_page_id = frame.page_id();

        // If the write-back fails the frame is left mapped and intact;
        // disk failures are fatal to the caller.
        if frame.is_dirty() {
            self.disk.write_page(old_page_id, &frame.read_data())?;
            self.flush_count.fetch_add(1, Ordering::Relaxed);
        }

        state.page_table.remove(&old_page_id);
        frame.reset();
        self.eviction_count.fetch_add(1, Ordering::Relaxed);
        trace!(
            page_id = %old_page_id,
            frame_id = frame_id.index(),
            "evicted page"
        );

        Ok(Some(frame_id))
    }
}

impl std::fmt::Debug for BufferPoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPoolManager")
            .field("num_frames", &self.config.num_frames)
            .field("page_size", &self.config.page_size)
            .field("pages_resident", &self.state.lock().page_table.len())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::OpenOptions;
    use rand::Rng;
    use rill_common::constants::DEFAULT_PAGE_SIZE;
    use tempfile::tempdir;

    fn create_pool(dir: &tempfile::TempDir, num_frames: usize) -> BufferPoolManager {
        let config = BufferPoolConfig::new(num_frames);
        let disk = DiskManager::open(
            dir.path().join("test.db"),
            OpenOptions::for_create(),
            config.page_size,
        )
        .unwrap();
        BufferPoolManager::new(config, Arc::new(disk)).unwrap()
    }

    fn unpin(pool: &BufferPoolManager, page_id: PageId, dirty: bool) -> bool {
        pool.unpin_page(page_id, dirty, AccessType::Unknown)
    }

    fn fetch(pool: &BufferPoolManager, page_id: PageId) -> Option<Arc<Frame>> {
        pool.fetch_page(page_id, AccessType::Unknown).unwrap()
    }

    #[test]
    fn test_pool_creation() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 16);
        assert_eq!(pool.num_frames(), 16);
        assert_eq!(pool.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(pool.replacer_size(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempdir().unwrap();
        let disk = DiskManager::open(
            dir.path().join("test.db"),
            OpenOptions::for_create(),
            DEFAULT_PAGE_SIZE,
        )
        .unwrap();

        let result = BufferPoolManager::new(BufferPoolConfig::new(0), Arc::new(disk));
        assert!(matches!(result, Err(BufferError::Config { .. })));
    }

    #[test]
    fn test_page_size_mismatch_rejected() {
        let dir = tempdir().unwrap();
        let disk = DiskManager::open(
            dir.path().join("test.db"),
            OpenOptions::for_create(),
            8192,
        )
        .unwrap();

        let result = BufferPoolManager::new(BufferPoolConfig::new(4), Arc::new(disk));
        assert!(matches!(result, Err(BufferError::Config { .. })));
    }

    #[test]
    fn test_basic_fetch() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 3);

        let (p0, frame) = pool.new_page().unwrap().unwrap();
        assert!(frame.read_data().iter().all(|&b| b == 0));
        frame.write_data()[0..5].copy_from_slice(b"hello");

        assert!(unpin(&pool, p0, true));

        let frame = fetch(&pool, p0).expect("page is resident");
        assert_eq!(&frame.read_data()[0..5], b"hello");
        // Dirty bit is preserved until flushed
        assert!(frame.is_dirty());
        assert!(unpin(&pool, p0, false));

        assert!(pool.flush_page(p0).unwrap());
        assert_eq!(pool.stats().dirty_frames, 0);
    }

    #[test]
    fn test_eviction_writes_back_dirty() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 3);

        let mut pages = Vec::new();
        for i in 0..3u8 {
            let (pid, frame) = pool.new_page().unwrap().unwrap();
            frame.write_data().fill(i + 1);
            pages.push(pid);
            assert!(unpin(&pool, pid, true));
        }

        // The pool is full; a fourth page forces exactly one eviction,
        // flushing the victim as a side effect
        let (p3, _frame) = pool.new_page().unwrap().expect("eviction possible");
        assert_eq!(pool.stats().evictions, 1);
        assert_eq!(pool.stats().flushes, 1);
        assert!(unpin(&pool, p3, false));

        // Each original page still reads back with its own bytes
        for (i, &pid) in pages.iter().enumerate() {
            let frame = fetch(&pool, pid).expect("fetchable");
            assert!(frame.read_data().iter().all(|&b| b == i as u8 + 1));
            assert!(unpin(&pool, pid, false));
        }
    }

    #[test]
    fn test_lru_k_eviction_order() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 3);

        // Single access each: all infinite distance, LRU on first access
        let (p0, _) = pool.new_page().unwrap().unwrap();
        let (p1, _) = pool.new_page().unwrap().unwrap();
        let (p2, _) = pool.new_page().unwrap().unwrap();
        for pid in [p0, p1, p2] {
            assert!(unpin(&pool, pid, false));
        }

        // p0 has the oldest access, so it goes first
        let (p3, _) = pool.new_page().unwrap().unwrap();
        assert!(!pool.contains(p0));
        assert!(pool.contains(p1));
        assert!(pool.contains(p2));
        assert!(unpin(&pool, p3, false));

        // A second access promotes p1 over p2
        let f1 = fetch(&pool, p1).unwrap();
        assert!(unpin(&pool, p1, false));
        drop(f1);

        let (_p4, _) = pool.new_page().unwrap().unwrap();
        assert!(pool.contains(p1));
        assert!(!pool.contains(p2));
    }

    #[test]
    fn test_pool_exhausted_by_pins() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 3);

        let (p0, _) = pool.new_page().unwrap().unwrap();
        let (_p1, _) = pool.new_page().unwrap().unwrap();
        let (_p2, _) = pool.new_page().unwrap().unwrap();

        // Everything pinned: no frame free, nothing evictable
        assert!(pool.new_page().unwrap().is_none());
        assert!(fetch(&pool, PageId::new(99)).is_none());

        assert!(unpin(&pool, p0, false));
        let (p3, _) = pool.new_page().unwrap().expect("frame reclaimed");
        assert!(!pool.contains(p0));
        assert!(pool.contains(p3));
    }

    #[test]
    fn test_unpin_errors() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 3);

        assert!(!unpin(&pool, PageId::new(42), false));

        let (p0, _) = pool.new_page().unwrap().unwrap();
        assert!(unpin(&pool, p0, false));
        assert!(!unpin(&pool, p0, false));
        assert_eq!(pool.get_pin_count(p0), Some(0));
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 3);

        let (p0, _) = pool.new_page().unwrap().unwrap();
        assert!(!pool.delete_page(p0).unwrap()); // pinned

        assert!(unpin(&pool, p0, false));
        assert!(pool.delete_page(p0).unwrap());
        assert!(!pool.contains(p0));
        assert_eq!(pool.replacer_size(), 0);

        // Deleting a non-resident page is a no-op
        assert!(pool.delete_page(p0).unwrap());

        // The identifier is not reused
        let (p1, _) = pool.new_page().unwrap().unwrap();
        assert_ne!(p1, p0);
        assert!(unpin(&pool, p1, false));

        // A fetch of the deleted id reads from disk (never written: zeroes)
        let frame = fetch(&pool, p0).expect("fetchable");
        assert!(frame.read_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_flush_idempotent() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 3);

        assert!(!pool.flush_page(PageId::new(7)).unwrap());

        let (p0, frame) = pool.new_page().unwrap().unwrap();
        frame.write_data()[0] = 0xCD;
        assert!(unpin(&pool, p0, true));

        assert!(pool.flush_page(p0).unwrap());
        let stats = pool.stats();
        assert!(pool.flush_page(p0).unwrap());
        let stats2 = pool.stats();

        assert_eq!(stats.dirty_frames, 0);
        assert_eq!(stats2.dirty_frames, 0);
        assert_eq!(stats2.flushes, stats.flushes + 1);
    }

    #[test]
    fn test_flush_all_pages() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 4);

        for i in 0..3u8 {
            let (pid, frame) = pool.new_page().unwrap().unwrap();
            frame.write_data().fill(i);
            assert!(unpin(&pool, pid, true));
        }
        assert_eq!(pool.stats().dirty_frames, 3);

        pool.flush_all_pages().unwrap();
        assert_eq!(pool.stats().dirty_frames, 0);
        assert_eq!(pool.stats().flushes, 3);
    }

    #[test]
    fn test_round_trip_law() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 3);
        let mut rng = rand::thread_rng();

        let pattern: Vec<u8> = (0..DEFAULT_PAGE_SIZE).map(|_| rng.gen()).collect();

        let (target, frame) = pool.new_page().unwrap().unwrap();
        frame.write_data().copy_from_slice(&pattern);
        assert!(unpin(&pool, target, true));

        // Fill the pool to force the target out
        for _ in 0..3 {
            let (pid, _) = pool.new_page().unwrap().unwrap();
            assert!(unpin(&pool, pid, false));
        }
        assert!(!pool.contains(target));

        let frame = fetch(&pool, target).expect("fetchable");
        assert_eq!(&frame.read_data()[..], &pattern[..]);
    }

    #[test]
    fn test_new_page_zeroed_after_reuse() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 1);

        let (p0, frame) = pool.new_page().unwrap().unwrap();
        frame.write_data().fill(0xFF);
        assert!(unpin(&pool, p0, true));

        // The single frame is evicted and reused; the new payload is zeroed
        let (_p1, frame) = pool.new_page().unwrap().unwrap();
        assert!(frame.read_data().iter().all(|&b| b == 0));
        assert!(!frame.is_dirty());
    }

    #[test]
    fn test_page_ids_monotonic() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 4);

        let mut last = None;
        for _ in 0..8 {
            let (pid, _) = pool.new_page().unwrap().unwrap();
            if let Some(prev) = last {
                assert!(pid > prev);
            }
            last = Some(pid);
            assert!(unpin(&pool, pid, false));
            // Deleting does not make the allocator reissue the id
            assert!(pool.delete_page(pid).unwrap());
        }
    }

    #[test]
    fn test_fetch_hit_stats() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 4);

        let (p0, _) = pool.new_page().unwrap().unwrap();
        assert!(unpin(&pool, p0, false));

        let _ = fetch(&pool, p0).unwrap();
        assert!(unpin(&pool, p0, false));

        let stats = pool.stats();
        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_residency_invariants() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir, 4);

        let mut resident = Vec::new();
        for _ in 0..6 {
            let (pid, _) = pool.new_page().unwrap().unwrap();
            assert!(unpin(&pool, pid, false));
            resident.push(pid);
        }

        // Pool of 4 holds the last 4 pages; the first 2 were evicted
        let live: Vec<_> = resident.iter().filter(|p| pool.contains(**p)).collect();
        assert_eq!(live.len(), 4);

        // Every resident page is unpinned, so the replacer tracks all 4
        assert_eq!(pool.replacer_size(), 4);
        assert_eq!(pool.stats().pinned_frames, 0);

        // A resident page's frame reports the same page id
        for &&pid in &live {
            let frame = fetch(&pool, pid).unwrap();
            assert_eq!(frame.page_id(), pid);
            assert!(unpin(&pool, pid, false));
        }
    }

    #[test]
    fn test_concurrent_fetch_unpin() {
        let dir = tempdir().unwrap();
        let pool = Arc::new(create_pool(&dir, 8));

        // Preload 16 pages, each tagged with its index
        let mut pages = Vec::new();
        for i in 0..16u8 {
            let (pid, frame) = pool.new_page().unwrap().unwrap();
            frame.write_data().fill(i);
            assert!(unpin(&pool, pid, true));
            pages.push(pid);
        }
        let pages = Arc::new(pages);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let pool = Arc::clone(&pool);
                let pages = Arc::clone(&pages);
                std::thread::spawn(move || {
                    for i in 0..50usize {
                        let idx = (t * 13 + i * 7) % pages.len();
                        let guard = pool.fetch_page_basic(pages[idx]).unwrap();
                        if let Some(guard) = guard {
                            assert!(guard.data().iter().all(|&b| b == idx as u8));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.stats().pinned_frames, 0);
        pool.flush_all_pages().unwrap();

        // Everything still reads back intact
        for (i, &pid) in pages.iter().enumerate() {
            let frame = fetch(&pool, pid).unwrap();
            assert!(frame.read_data().iter().all(|&b| b == i as u8));
            assert!(unpin(&pool, pid, false));
        }
    }
}
