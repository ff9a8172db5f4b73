use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// A generation pass was invalidated while running. Nothing from the pass
/// is kept; the next pass starts from the new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("generation pass cancelled")]
pub struct Cancelled;

/// Process-wide generation counter. Bumping it cancels every token handed
/// out for earlier generations.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidates all outstanding tokens and opens the next generation.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    /// Token for the current generation, checked at per-item boundaries.
    pub fn token(&self) -> GenerationToken {
        GenerationToken {
            current: Arc::clone(&self.current),
            generation: self.current.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationToken {
    current: Arc<AtomicU64>,
    generation: u64,
}

impl GenerationToken {
    pub fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.generation
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() { Err(Cancelled) } else { Ok(()) }
    }
}
