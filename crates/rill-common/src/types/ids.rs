//! Core identifier types for RillDB.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page identifier - names one fixed-size page of the data file.
///
/// The buffer pool hands these out from a monotone counter (see
/// [`PageId::next`]); an id, once allocated, is never reused within a
/// process lifetime. The all-ones value is reserved as a sentinel for
/// frames that hold no page.
///
/// # Example
///
/// ```rust
/// use rill_common::types::PageId;
///
/// let page = PageId::new(41);
/// assert_eq!(page.next(), PageId::new(42));
/// assert_eq!(page.byte_offset(4096), 41 * 4096);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PageId(u64);

impl PageId {
    /// Sentinel for an uninitialized or absent page.
    pub const INVALID: Self = Self(u64::MAX);

    /// Creates a `PageId` from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the id the allocator hands out after this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// True unless this is the sentinel.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }

    /// Byte offset of this page in a file of `page_size`-byte pages.
    #[inline]
    #[must_use]
    pub const fn byte_offset(self, page_size: usize) -> u64 {
        self.0 * page_size as u64
    }
}

impl fmt::Debug for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "PageId({})", self.0)
        } else {
            f.write_str("PageId(INVALID)")
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PageId {
    #[inline]
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<PageId> for u64 {
    #[inline]
    fn from(id: PageId) -> Self {
        id.0
    }
}
