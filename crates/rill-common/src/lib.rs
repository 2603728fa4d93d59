//! # rill-common
//!
//! Common types and constants for RillDB.
//!
//! This crate provides the foundational types shared across the storage
//! engine:
//!
//! - **Types**: core identifiers such as [`types::PageId`]
//! - **Constants**: system-wide constants and limits
//!
//! ## Example
//!
//! ```rust
//! use rill_common::types::PageId;
//!
//! let page_id = PageId::new(42);
//! assert!(page_id.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use types::PageId;
