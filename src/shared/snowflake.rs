//! Snowflake ID Generator
//!
//! Time-ordered 64-bit ids for poems, comments, likes, collections and
//! notifications. Ids are generated in the application so that both storage
//! backends share one id scheme.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Default epoch (2024-01-01T00:00:00.000Z)
pub const DEFAULT_EPOCH: u64 = 1704067200000;

const MACHINE_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;

/// Snowflake ID generator
pub struct SnowflakeGenerator {
    epoch: u64,
    machine_id: u64,
    state: Mutex<GeneratorState>,
}

#[derive(Default)]
struct GeneratorState {
    last_timestamp: u64,
    sequence: u64,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(machine_id: u64, epoch: u64) -> Self {
        Self {
            epoch,
            machine_id: machine_id & ((1 << MACHINE_BITS) - 1),
            state: Mutex::new(GeneratorState::default()),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let mut state = self.state.lock();
        let mut timestamp = current_timestamp().max(state.last_timestamp);

        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & MAX_SEQUENCE;
            if state.sequence == 0 {
                // Sequence exhausted for this millisecond; borrow the next one.
                timestamp += 1;
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = timestamp;

        let id = (timestamp.saturating_sub(self.epoch) << (MACHINE_BITS + SEQUENCE_BITS))
            | (self.machine_id << SEQUENCE_BITS)
            | state.sequence;

        id as i64
    }

    /// Extract the creation timestamp (unix millis) from an id.
    pub fn extract_timestamp(&self, snowflake: i64) -> u64 {
        ((snowflake as u64) >> (MACHINE_BITS + SEQUENCE_BITS)) + self.epoch
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(1, DEFAULT_EPOCH)
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
