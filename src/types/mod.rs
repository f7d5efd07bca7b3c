//! This module defines the small, strongly-typed value types shared by the
//! decoder stages.
//!
//! It currently includes `ChunkTime`, the compact millisecond timestamp used in
//! the chunk header, and the helpers that turn nanosecond entry timestamps into
//! standard instants.

pub mod chunk_time;

// Re-export the main type(s) for easier access.
pub use chunk_time::{nanos_to_datetime, ChunkTime};
