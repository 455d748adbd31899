//! Cache keys for stored artifacts.

use crate::seed::update_field;
use blake3::Hasher;

const CACHE_DOMAIN: &[u8] = b"casegen:cache:v1";

/// Digest over labeled fields. Absent fields are hashed as absent, so adding a
/// solution or visualizer later changes the key.
pub struct CacheKeyBuilder {
    hasher: Hasher,
}

impl CacheKeyBuilder {
    pub fn new() -> Self {
        let mut hasher = Hasher::new();
        hasher.update(CACHE_DOMAIN);
        Self { hasher }
    }

    pub fn field(mut self, label: &str, value: &str) -> Self {
        update_field(&mut self.hasher, label.as_bytes());
        self.hasher.update(&[1]);
        update_field(&mut self.hasher, value.as_bytes());
        self
    }

    pub fn optional(mut self, label: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.field(label, value),
            None => {
                update_field(&mut self.hasher, label.as_bytes());
                self.hasher.update(&[0]);
                self
            }
        }
    }

    pub fn finish(self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}

impl Default for CacheKeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
