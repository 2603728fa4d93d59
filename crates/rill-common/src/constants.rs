//! System-wide constants for RillDB.

// =============================================================================
// Page and Memory Constants
// =============================================================================

/// Default page size in bytes (4 KB).
///
/// Matches the typical filesystem block size and the alignment direct I/O
/// requires.
pub const DEFAULT_PAGE_SIZE: usize = 4 * 1024;

/// Minimum page size in bytes (512 B).
pub const MIN_PAGE_SIZE: usize = 512;

/// Maximum page size in bytes (64 KB).
pub const MAX_PAGE_SIZE: usize = 64 * 1024;

// =============================================================================
// Buffer Pool Constants
// =============================================================================

/// Default number of frames in the buffer pool.
pub const DEFAULT_POOL_SIZE: usize = 128;

/// Default K for the LRU-K replacement policy.
pub const DEFAULT_REPLACER_K: usize = 2;

/// Minimum buffer pool memory (1 MB).
pub const MIN_BUFFER_POOL_SIZE: usize = 1024 * 1024;

/// Default buffer pool memory (512 KB worth of 4 KB frames).
pub const DEFAULT_BUFFER_POOL_SIZE: usize = DEFAULT_POOL_SIZE * DEFAULT_PAGE_SIZE;
