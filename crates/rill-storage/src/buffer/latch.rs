//! Page guards (basic / read / write) for safe scoped access.
//!
//! A guard holds exactly one pin on its frame for its whole lifetime and
//! releases it on drop, publishing any accumulated dirty intent through
//! the pool. The read and write variants additionally hold the frame's
//! payload latch, so the bytes they expose cannot change (read) or be
//! observed mid-update (write) while the guard lives.
//!
//! Move semantics give the contract for free: a moved-from guard is gone,
//! overwriting a guard drops the previous one first, and a guard can be
//! dropped at most once.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::RawRwLock;
use rill_common::types::PageId;

use super::eviction::AccessType;
use super::frame::{Frame, FrameId};
use super::pool::BufferPoolManager;

/// Scoped pin on a page, without a payload latch.
///
/// Data access through a basic guard takes the payload latch transiently
/// per call; use [`ReadPageGuard`] / [`WritePageGuard`] to hold it.
pub struct BasicPageGuard<'a> {
    pool: &'a BufferPoolManager,
    frame: Arc<Frame>,
    page_id: PageId,
    /// Dirty intent accumulated by `data_mut` / `mark_dirty`, published
    /// at unpin time.
    dirty: bool,
}

impl<'a> BasicPageGuard<'a> {
    pub(crate) fn new(pool: &'a BufferPoolManager, frame: Arc<Frame>, page_id: PageId) -> Self {
        Self {
            pool,
            frame,
            page_id,
            dirty: false,
        }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Returns the frame ID.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame.frame_id()
    }

    /// Returns a reference to the page data.
    #[inline]
    pub fn data(&self) -> impl Deref<Target = [u8]> + '_ {
        PageDataRef {
            guard: self.frame.read_data(),
        }
    }

    /// Returns a mutable reference to the page data and records dirty
    /// intent.
    #[inline]
    pub fn data_mut(&mut self) -> impl DerefMut<Target = [u8]> + '_ {
        self.dirty = true;
        PageDataMut {
            guard: self.frame.write_data(),
        }
    }

    /// Records dirty intent without touching the data.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns true if this guard will unpin with dirty intent.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn frame(&self) -> &Arc<Frame> {
        &self.frame
    }
}

impl Drop for BasicPageGuard<'_> {
    fn drop(&mut self) {
        self.pool
            .unpin_page(self.page_id, self.dirty, AccessType::Unknown);
    }
}

impl std::fmt::Debug for BasicPageGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicPageGuard")
            .field("page_id", &self.page_id)
            .field("frame_id", &self.frame.frame_id())
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// Helper struct to provide Deref for page data.
struct PageDataRef<'a> {
    guard: parking_lot::RwLockReadGuard<'a, Box<[u8]>>,
}

impl Deref for PageDataRef<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Helper struct to provide DerefMut for page data.
struct PageDataMut<'a> {
    guard: parking_lot::RwLockWriteGuard<'a, Box<[u8]>>,
}

impl Deref for PageDataMut<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for PageDataMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

/// Scoped pin holding the page latch in shared mode.
///
/// While this guard lives the payload cannot be modified. Drop releases
/// the latch first, then the pin.
pub struct ReadPageGuard<'a> {
    // Field order matters: the latch must be released before the unpin
    // the basic guard performs on drop.
    data: ArcRwLockReadGuard<RawRwLock, Box<[u8]>>,
    basic: BasicPageGuard<'a>,
}

impl<'a> ReadPageGuard<'a> {
    pub(crate) fn new(basic: BasicPageGuard<'a>) -> Self {
        let data = basic.frame().read_data_owned();
        Self { data, basic }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.basic.page_id()
    }

    /// Returns the frame ID.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.basic.frame_id()
    }

    /// Returns the page data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for ReadPageGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadPageGuard")
            .field("page_id", &self.basic.page_id())
            .field("frame_id", &self.basic.frame_id())
            .finish()
    }
}

/// Scoped pin holding the page latch in exclusive mode.
///
/// Construction records dirty intent: dropping a write guard always
/// unpins dirty. Drop releases the latch first, then the pin.
pub struct WritePageGuard<'a> {
    // Field order matters: the latch must be released before the unpin
    // the basic guard performs on drop.
    data: ArcRwLockWriteGuard<RawRwLock, Box<[u8]>>,
    basic: BasicPageGuard<'a>,
}

impl<'a> WritePageGuard<'a> {
    pub(crate) fn new(mut basic: BasicPageGuard<'a>) -> Self {
        basic.mark_dirty();
        let data = basic.frame().write_data_owned();
        Self { data, basic }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.basic.page_id()
    }

    /// Returns the frame ID.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.basic.frame_id()
    }

    /// Returns the page data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the page data mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl std::fmt::Debug for WritePageGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WritePageGuard")
            .field("page_id", &self.basic.page_id())
            .field("frame_id", &self.basic.frame_id())
            .finish()
    }
}
