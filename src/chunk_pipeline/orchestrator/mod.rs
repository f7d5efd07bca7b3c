// In: src/chunk_pipeline/orchestrator/mod.rs

mod core;

pub use self::core::{decode_body, decode_chunk};
