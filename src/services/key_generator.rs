//! Random short-key generation
//!
//! The existence check and the caller's subsequent write are two separate
//! store round trips. Two concurrent requests can draw the same free key and
//! the second write wins; with 48^6 possible keys this is accepted rather
//! than guarded.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{KvLinkError, Result};
use crate::storage::KvStore;
use crate::utils::generate_random_code;

pub struct KeyGenerator {
    store: Arc<dyn KvStore>,
    length: usize,
    max_attempts: u32,
}

impl KeyGenerator {
    pub fn new(store: Arc<dyn KvStore>, length: usize, max_attempts: u32) -> Self {
        Self {
            store,
            length,
            max_attempts,
        }
    }

    /// 生成一个当前未被占用的 key
    ///
    /// 超过 `max_attempts` 次冲突后返回 [`KvLinkError::KeyGenerationExhausted`]。
    pub async fn generate(&self) -> Result<String> {
        for attempt in 1..=self.max_attempts {
            let candidate = generate_random_code(self.length);
            let occupied = self
                .store
                .get(&candidate)
                .await
                .map_err(KvLinkError::from_read)?;

            if occupied.is_none() {
                return Ok(candidate);
            }
            debug!("Key collision on attempt {}: {}", attempt, candidate);
        }

        warn!(
            "Key generation exhausted after {} attempts (length {})",
            self.max_attempts, self.length
        );
        Err(KvLinkError::KeyGenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}
