//! ## Pacing Module
//! How long the simulated activities take: travelling to the restaurant, eating, cooking.
//! None of these touch shared state, they only put the calling actor to sleep.
//!
//! ## The structs includes:
//! - **RandomPacer**: bounded random delays from one generator shared by all actors, optionally seeded.
//! - **ScriptedPacer**: fixed delays, for arrival orders that have to be reproducible.

use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait Pacer: Send + Sync {
    fn travel(&self, client: usize) -> Duration;
    fn eat(&self, client: usize) -> Duration;
    fn cook(&self) -> Duration;
}

//----------------------------------------------RandomPacer
pub struct RandomPacer {
    max_travel: Duration,
    max_eat: Duration,
    max_cook: Duration,
    rng: Mutex<StdRng>,
}

impl RandomPacer {
    /// new
    /// Random delays up to the given bounds.
    ///
    /// # Arguments:
    ///
    /// * `max_travel`, `max_eat`, `max_cook` - Duration - upper bounds of each activity.
    /// * `seed` - Option<u64> - fixed seed, or None to seed from entropy.
    ///
    /// # Returns:
    ///
    /// Returns -RandomPacer-
    ///
    pub fn new(max_travel: Duration, max_eat: Duration, max_cook: Duration, seed: Option<u64>) -> RandomPacer {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomPacer { max_travel, max_eat, max_cook, rng: Mutex::new(rng) }
    }

    // Every activity takes at least `floor` so a zero bound still yields the thread.
    fn draw(&self, max: Duration, floor: Duration) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let micros = max.as_micros() as u64;
        let extra = if micros == 0 { 0 } else { rng.gen_range(0..=micros) };
        floor + Duration::from_micros(extra)
    }
}

impl Pacer for RandomPacer {
    fn travel(&self, _client: usize) -> Duration {
        self.draw(self.max_travel, Duration::from_millis(1))
    }

    fn eat(&self, _client: usize) -> Duration {
        self.draw(self.max_eat, Duration::from_millis(1))
    }

    fn cook(&self) -> Duration {
        self.draw(self.max_cook, Duration::from_micros(100))
    }
}

//----------------------------------------------ScriptedPacer
#[derive(Debug, Clone, Default)]
pub struct ScriptedPacer {
    pub travel: Vec<Duration>,
    pub eat: Vec<Duration>,
    pub cook: Duration,
}

impl ScriptedPacer {
    /// Client `i` travels `travel_ms[i]` milliseconds. Eating and cooking take no time.
    pub fn with_travel_ms(travel_ms: &[u64]) -> ScriptedPacer {
        ScriptedPacer {
            travel: travel_ms.iter().map(|ms| Duration::from_millis(*ms)).collect(),
            ..ScriptedPacer::default()
        }
    }
}

impl Pacer for ScriptedPacer {
    fn travel(&self, client: usize) -> Duration {
        self.travel.get(client).copied().unwrap_or_default()
    }

    fn eat(&self, client: usize) -> Duration {
        self.eat.get(client).copied().unwrap_or_default()
    }

    fn cook(&self) -> Duration {
        self.cook
    }
}

//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_delays_stay_in_bounds() {
        let pacer = RandomPacer::new(
            Duration::from_millis(10),
            Duration::from_millis(5),
            Duration::from_millis(2),
            Some(42),
        );
        for client in 0..50 {
            let travel = pacer.travel(client);
            assert!(travel >= Duration::from_millis(1) && travel <= Duration::from_millis(11));
            assert!(pacer.eat(client) <= Duration::from_millis(6));
        }
        assert!(pacer.cook() >= Duration::from_micros(100));
    }

    #[test]
    fn test_same_seed_same_delays() {
        let bound = Duration::from_secs(1);
        let a = RandomPacer::new(bound, bound, bound, Some(7));
        let b = RandomPacer::new(bound, bound, bound, Some(7));
        let draws_a: Vec<_> = (0..5).map(|i| a.travel(i)).collect();
        let draws_b: Vec<_> = (0..5).map(|i| b.travel(i)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_scripted_defaults_to_zero() {
        let pacer = ScriptedPacer::with_travel_ms(&[30, 0]);
        assert_eq!(pacer.travel(0), Duration::from_millis(30));
        assert_eq!(pacer.travel(5), Duration::ZERO);
        assert_eq!(pacer.eat(0), Duration::ZERO);
    }
}
