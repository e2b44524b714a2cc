use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Random selection strategy over a candidate set
///
/// Candidate sets are fetched in a single query and handed to a picker, so the
/// engine never has to trust a candidate id across two round trips. Tests swap
/// in a seeded or fixed picker to make the state machine deterministic.
pub trait Picker: Send + Sync {
    /// Returns an index in `0..len`, or `None` when `len == 0`
    fn pick_index(&self, len: usize) -> Option<usize>;
}

/// Picks one element of `items`, taking ownership of it
pub fn pick_owned<T>(picker: &dyn Picker, mut items: Vec<T>) -> Option<T> {
    let index = picker.pick_index(items.len())?;
    // Order of the rest does not matter, so avoid shifting
    (index < items.len()).then(|| items.swap_remove(index))
}

/// Uniform choice backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl Picker for RandomPicker {
    fn pick_index(&self, len: usize) -> Option<usize> {
        (len > 0).then(|| rand::thread_rng().gen_range(0..len))
    }
}

/// Uniform choice from a seeded RNG, reproducible across runs
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Picker for SeededPicker {
    fn pick_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        Some(rng.gen_range(0..len))
    }
}

/// Always picks the first candidate
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPicker;

impl Picker for FirstPicker {
    fn pick_index(&self, len: usize) -> Option<usize> {
        (len > 0).then_some(0)
    }
}
