use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
/// Timed waits used while a page settles. Short pauses get a little jitter so
/// scroll steps do not land on an exact cadence; long waits are exact.
pub struct BehavioralEngine {
    jitter_ms: u64,
}

impl Default for BehavioralEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BehavioralEngine {
    pub fn new() -> Self {
        Self { jitter_ms: 250 }
    }

    /// Sleep for a random duration between `min` and `max` milliseconds.
    pub async fn random_delay(&self, min: u64, max: u64) {
        let ms = if max > min {
            OsRng.gen_range(min..=max)
        } else {
            min
        };
        sleep(Duration::from_millis(ms)).await;
    }

    /// Short pause between interactions, `base_ms` plus up to the jitter budget.
    pub async fn pause(&self, base_ms: u64) {
        self.random_delay(base_ms, base_ms + self.jitter_ms).await;
    }

    /// Fixed wait with no jitter.
    pub async fn wait(&self, ms: u64) {
        sleep(Duration::from_millis(ms)).await;
    }
}
