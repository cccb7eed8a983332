//! Snowflake ID Generator
//!
//! Time-ordered unique IDs for servers, channels, and invites. Message ids
//! are a database sequence instead, since they double as the history cursor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Custom epoch (2020-01-01T00:00:00.000Z)
const EPOCH_MS: u64 = 1577836800000;

/// Snowflake ID generator
pub struct SnowflakeGenerator {
    machine_id: u64,
    node_id: u64,
    /// Millisecond timestamp in the high bits, 12-bit sequence in the low.
    /// A single word so timestamp rollover and sequence reset commit
    /// together.
    state: AtomicU64,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(machine_id: u64, node_id: u64) -> Self {
        Self {
            machine_id: machine_id & 0x1F, // 5 bits
            node_id: node_id & 0x1F,       // 5 bits
            state: AtomicU64::new(0),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let now = self.current_timestamp();
        let mut current = self.state.load(Ordering::SeqCst);

        loop {
            let last = current >> 12;
            // Within the same millisecond (or after a clock step back)
            // the increment bumps the sequence; a full sequence carries
            // into the timestamp bits, which stays unique and ordered.
            let next = if now > last { now << 12 } else { current + 1 };

            match self
                .state
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => {
                    let timestamp = next >> 12;
                    let sequence = next & 0xFFF;
                    return (((timestamp - EPOCH_MS) << 22)
                        | (self.machine_id << 17)
                        | (self.node_id << 12)
                        | sequence) as i64;
                }
                Err(actual) => current = actual,
            }
        }
    }

    fn current_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis() as u64
    }
}

/// Extract the creation timestamp (ms since Unix epoch) from a snowflake
pub fn extract_timestamp(snowflake: i64) -> u64 {
    ((snowflake as u64) >> 22) + EPOCH_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique() {
        let gen = SnowflakeGenerator::new(1, 1);
        let id1 = gen.generate();
        let id2 = gen.generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_same_millisecond_burst_is_unique() {
        let gen = SnowflakeGenerator::new(1, 1);
        let ids: Vec<i64> = (0..256).map(|_| gen.generate()).collect();
        let unique: std::collections::HashSet<i64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_burst_is_strictly_increasing() {
        let gen = SnowflakeGenerator::new(1, 1);
        let ids: Vec<i64> = (0..256).map(|_| gen.generate()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ids_are_time_ordered_across_millis() {
        let gen = SnowflakeGenerator::new(1, 1);
        let first = gen.generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = gen.generate();
        assert!(second > first);
    }

    #[test]
    fn test_extract_timestamp() {
        let gen = SnowflakeGenerator::new(1, 1);
        let id = gen.generate();
        let ts = extract_timestamp(id);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        assert!(ts <= now);
        assert!(ts > now - 1000);
    }
}
