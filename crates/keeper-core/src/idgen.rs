//! Injectable record id generation.
//!
//! The core never generates ids itself; callers supply them with each `Add`.
//! Wall-clock timestamps collide under rapid creation, so id generation is a
//! constructor dependency rather than a hardcoded clock read.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of caller-side record ids.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh id, unique for the lifetime of this generator.
    fn next_id(&self) -> String;
}

/// UUID v4 generator for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Monotonic counter generator, deterministic for tests.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    next: AtomicU64,
}

impl SequenceGenerator {
    /// Starts counting from `start`.
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequenceGenerator {
    fn next_id(&self) -> String {
        self.next.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_is_unique() {
        let generator = UuidGenerator;
        assert_ne!(generator.next_id(), generator.next_id());
    }

    #[test]
    fn test_sequence_generator_is_monotonic() {
        let generator = SequenceGenerator::starting_at(1);
        assert_eq!(generator.next_id(), "1");
        assert_eq!(generator.next_id(), "2");
        assert_eq!(generator.next_id(), "3");
    }
}
