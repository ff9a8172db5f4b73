//! Memoization primitives for the generation pipeline: content-hash keys,
//! per-file and per-pair memo caches, and cooperative generation tokens.
//!
//! The pipeline is an explicit task graph over these pieces: plain hash
//! maps revalidated by content key, no special runtime. Given any subset of
//! changed inputs, only values transitively dependent on them recompute;
//! everything else is served from the memos.

pub mod cache;
pub mod cancel;
pub mod key;

pub use cache::{CacheStats, FileCache, JoinMemo};
pub use cancel::{Cancelled, GenerationCounter, GenerationToken};
pub use key::ContentKey;
