//! services/client/src/adapters/tokenizer.rs
//!
//! The card tokenization widget lives outside this program; this adapter
//! hands out a prime configured ahead of time (the sandbox test prime by default).
//! It implements the `CardTokenizer` port from the `core` crate.

use async_trait::async_trait;
use day_trip_core::ports::{CardTokenizer, PortError, PortResult};

#[derive(Clone)]
pub struct StaticPrimeTokenizer {
    prime: String,
}

impl StaticPrimeTokenizer {
    pub fn new(prime: String) -> Self {
        Self { prime }
    }
}

#[async_trait]
impl CardTokenizer for StaticPrimeTokenizer {
    async fn get_prime(&self) -> PortResult<String> {
        if self.prime.trim().is_empty() {
            return Err(PortError::Rejected(
                "Card details are incomplete".to_string(),
            ));
        }
        Ok(self.prime.clone())
    }
}
