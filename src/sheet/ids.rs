//! Sheet id generation.

use uuid::Uuid;

/// Trait for generating sheet ids, unique for the process lifetime.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

/// Id generator backed by random v4 UUIDs.
#[derive(Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids = UuidIdGenerator;
        assert_ne!(ids.new_id(), ids.new_id());
    }
}
