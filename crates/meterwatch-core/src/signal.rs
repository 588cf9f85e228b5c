use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sample::Sample;

/// Seeded demo signal: `base + sin(i / period) * amplitude + noise`.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    rng: StdRng,
    start: f64,
    index: u64,
    pub base: f64,
    pub amplitude: f64,
    pub period: f64,
    /// Upper bound of the uniform noise added to each reading.
    pub noise: f64,
    pub step_secs: f64,
}

impl SignalGenerator {
    pub fn new(seed: u64, start: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            start,
            index: 0,
            base: 50.0,
            amplitude: 30.0,
            period: 5.0,
            noise: 5.0,
            step_secs: 1.0,
        }
    }

    pub fn with_step(mut self, step_secs: f64) -> Self {
        self.step_secs = step_secs;
        self
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn next_sample(&mut self) -> Sample {
        let i = self.index as f64;
        self.index += 1;
        let jitter = if self.noise > 0.0 {
            self.rng.gen_range(0.0..self.noise)
        } else {
            0.0
        };
        let value = self.base + (i / self.period).sin() * self.amplitude + jitter;
        Sample::new(self.start + i * self.step_secs, value)
    }
}

impl Iterator for SignalGenerator {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        Some(self.next_sample())
    }
}
