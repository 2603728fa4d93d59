//! Buffer frame - a slot in the buffer pool that holds a page.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::{RawRwLock, RwLock};
use rill_common::types::PageId;

/// Frame identifier - index into the buffer pool's frame array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub usize);

impl FrameId {
    /// Invalid frame ID.
    pub const INVALID: Self = Self(usize::MAX);

    /// Creates a new frame ID.
    #[inline]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Checks if this is a valid frame ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != usize::MAX
    }
}

impl From<usize> for FrameId {
    fn from(id: usize) -> Self {
        Self::new(id)
    }
}

impl From<FrameId> for usize {
    fn from(id: FrameId) -> Self {
        id.0
    }
}

/// A buffer frame holds a single page in memory.
///
/// Each frame has:
/// - A payload buffer for the page contents, behind its own reader/writer
///   latch (held by read/write page guards)
/// - Metadata (page_id, dirty flag, pin count)
///
/// The metadata uses atomics, but the pool only mutates it while holding
/// its own latch; the payload latch is independent and is the only lock a
/// page guard holds across its lifetime.
pub struct Frame {
    /// Frame ID (index in the frame array).
    frame_id: FrameId,
    /// Page payload, guarded by the page latch.
    data: Arc<RwLock<Box<[u8]>>>,
    /// Page ID stored in this frame (INVALID if free).
    page_id: AtomicU64,
    /// Pin count (number of in-flight operations and live guards).
    pin_count: AtomicU32,
    /// Whether the payload differs from the on-disk contents.
    dirty: AtomicBool,
}

impl Frame {
    /// Creates a new empty buffer frame.
    pub fn new(frame_id: FrameId, page_size: usize) -> Self {
        Self {
            frame_id,
            data: Arc::new(RwLock::new(vec![0u8; page_size].into_boxed_slice())),
            page_id: AtomicU64::new(PageId::INVALID.as_u64()),
            pin_count: AtomicU32::new(0),
            dirty: AtomicBool::new(false),
        }
    }

    /// Returns the frame ID.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Returns the page ID stored in this frame.
    #[inline]
    pub fn page_id(&self) -> PageId {
        PageId::new(self.page_id.load(Ordering::Acquire))
    }

    /// Sets the page ID for this frame.
    #[inline]
    pub(crate) fn set_page_id(&self, page_id: PageId) {
        self.page_id.store(page_id.as_u64(), Ordering::Release);
    }

    /// Returns true if this frame is free (no page assigned).
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.page_id().is_valid()
    }

    /// Returns the current pin count.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Acquire)
    }

    /// Increments the pin count and returns the new value.
    #[inline]
    pub(crate) fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Decrements the pin count and returns the new value.
    ///
    /// The pool checks for a zero count before calling this.
    #[inline]
    pub(crate) fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(old > 0, "unpinned frame with pin_count = 0");
        old - 1
    }

    /// Returns true if the frame is pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    /// Returns true if the frame is dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Marks the frame as dirty or clean.
    #[inline]
    pub(crate) fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Release);
    }

    /// Returns a transient read lock on the page payload.
    #[inline]
    pub fn read_data(&self) -> parking_lot::RwLockReadGuard<'_, Box<[u8]>> {
        self.data.read()
    }

    /// Returns a transient write lock on the page payload.
    #[inline]
    pub fn write_data(&self) -> parking_lot::RwLockWriteGuard<'_, Box<[u8]>> {
        self.data.write()
    }

    /// Acquires the page latch in shared mode, returning an owned guard.
    ///
    /// Used by read page guards, which hold the latch for their lifetime.
    #[inline]
    pub(crate) fn read_data_owned(&self) -> ArcRwLockReadGuard<RawRwLock, Box<[u8]>> {
        self.data.read_arc()
    }

    /// Acquires the page latch in exclusive mode, returning an owned guard.
    ///
    /// Used by write page guards, which hold the latch for their lifetime.
    #[inline]
    pub(crate) fn write_data_owned(&self) -> ArcRwLockWriteGuard<RawRwLock, Box<[u8]>> {
        self.data.write_arc()
    }

    /// Resets the frame to the empty state and zeroes the payload.
    pub(crate) fn reset(&self) {
        self.page_id
            .store(PageId::INVALID.as_u64(), Ordering::Release);
        self.pin_count.store(0, Ordering::Release);
        self.dirty.store(false, Ordering::Release);
        self.data.write().fill(0);
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("frame_id", &self.frame_id)
            .field("page_id", &self.page_id())
            .field("pin_count", &self.pin_count())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(FrameId::new(0), 4096);
        assert_eq!(frame.frame_id().index(), 0);
        assert!(!frame.page_id().is_valid());
        assert!(frame.is_empty());
        assert_eq!(frame.pin_count(), 0);
        assert!(!frame.is_dirty());
        assert_eq!(frame.read_data().len(), 4096);
    }

    #[test]
    fn test_pin_unpin() {
        let frame = Frame::new(FrameId::new(0), 4096);
        assert!(!frame.is_pinned());

        assert_eq!(frame.pin(), 1);
        assert!(frame.is_pinned());
        assert_eq!(frame.pin(), 2);

        assert_eq!(frame.unpin(), 1);
        assert!(frame.is_pinned());
        assert_eq!(frame.unpin(), 0);
        assert!(!frame.is_pinned());
    }

    #[test]
    fn test_dirty_flag() {
        let frame = Frame::new(FrameId::new(0), 4096);
        assert!(!frame.is_dirty());

        frame.set_dirty(true);
        assert!(frame.is_dirty());

        frame.set_dirty(false);
        assert!(!frame.is_dirty());
    }

    #[test]
    fn test_page_id() {
        let frame = Frame::new(FrameId::new(0), 4096);
        assert!(frame.is_empty());

        frame.set_page_id(PageId::new(42));
        assert!(!frame.is_empty());
        assert_eq!(frame.page_id(), PageId::new(42));
    }

    #[test]
    fn test_data_access() {
        let frame = Frame::new(FrameId::new(0), 4096);

        {
            let mut data = frame.write_data();
            data[0..4].copy_from_slice(&[1, 2, 3, 4]);
        }

        {
            let data = frame.read_data();
            assert_eq!(&data[0..4], &[1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_owned_guards() {
        let frame = Frame::new(FrameId::new(0), 4096);

        {
            let mut data = frame.write_data_owned();
            data[0] = 9;
        }

        let r1 = frame.read_data_owned();
        let r2 = frame.read_data_owned();
        assert_eq!(r1[0], 9);
        assert_eq!(r2[0], 9);
    }

    #[test]
    fn test_reset() {
        let frame = Frame::new(FrameId::new(0), 4096);
        frame.set_page_id(PageId::new(42));
        frame.pin();
        frame.set_dirty(true);
        frame.write_data()[0] = 0xFF;

        frame.reset();

        assert!(frame.is_empty());
        assert_eq!(frame.pin_count(), 0);
        assert!(!frame.is_dirty());
        assert!(frame.read_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_frame_id() {
        assert!(!FrameId::INVALID.is_valid());
        assert!(FrameId::new(0).is_valid());
        assert_eq!(FrameId::new(42).index(), 42);
        assert_eq!(usize::from(FrameId::new(7)), 7);
        assert_eq!(FrameId::from(7usize), FrameId::new(7));
    }
}
