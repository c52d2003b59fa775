//! Ingestion Service Configuration

use crate::store::CacheConfig;

/// Tuning for the sharded ingest workers and the cache layer
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Number of shard workers; per-patient order holds within a shard
    pub shards: usize,
    /// Bounded queue depth per shard worker
    pub queue_capacity: usize,
    /// Latest-value cache prefix and TTL
    pub cache: CacheConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            shards: 4,
            queue_capacity: 4096,
            cache: CacheConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = IngestConfig::default();
        assert!(config.shards > 0);
        assert!(config.queue_capacity > 0);
        assert_eq!(config.cache.prefix, "vitals:");
    }
}
