//! Core types for RillDB.

mod ids;

pub use ids::PageId;
