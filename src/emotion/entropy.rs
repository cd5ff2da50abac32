use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Source of uniform randomness for the classifier
pub trait EntropySource: Send + Sync {
    /// Uniform draw in `[0, 1)`
    fn draw(&self) -> f64;
}

/// Thread-local RNG; the production default
#[derive(Debug, Default)]
pub struct ThreadEntropy;

impl EntropySource for ThreadEntropy {
    fn draw(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible stream from a fixed seed
#[derive(Debug)]
pub struct SeededEntropy {
    rng: Mutex<StdRng>,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn draw(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.random::<f64>(),
            // A poisoned lock still holds a usable RNG
            Err(poisoned) => poisoned.into_inner().random::<f64>(),
        }
    }
}

/// Replays a fixed list of values, wrapping around at the end.
///
/// Values are clamped into `[0, 1)` so callers can script edge cases.
#[derive(Debug)]
pub struct SequenceEntropy {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl SequenceEntropy {
    pub fn new(values: Vec<f64>) -> Self {
        let values = if values.is_empty() { vec![0.0] } else { values };
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl EntropySource for SequenceEntropy {
    fn draw(&self) -> f64 {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
        self.values[index].clamp(0.0, 1.0 - f64::EPSILON)
    }
}
