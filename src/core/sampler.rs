//! Random draws behind a seam so tests can script them

use std::collections::VecDeque;

/// Source of uniform samples in [0, 1)
pub trait Sampler: Send + Sync {
    fn sample(&mut self) -> f64;
}

/// Thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSampler;

impl Sampler for RandomSampler {
    fn sample(&mut self) -> f64 {
        rand::random::<f64>()
    }
}

/// Replays a fixed sequence, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedSampler {
    script: Vec<f64>,
    queue: VecDeque<f64>,
}

impl ScriptedSampler {
    /// Values are clamped into [0, 1)
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let script: Vec<f64> = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self {
            queue: script.iter().copied().collect(),
            script,
        }
    }
}

impl Sampler for ScriptedSampler {
    fn sample(&mut self) -> f64 {
        if self.queue.is_empty() {
            self.queue.extend(self.script.iter().copied());
        }
        self.queue.pop_front().unwrap_or(0.0)
    }
}

/// Map a sample onto the inclusive integer range [min, max]
pub fn sample_in_range(sample: f64, min: u8, max: u8) -> u8 {
    let span = max.saturating_sub(min) as f64 + 1.0;
    let offset = (sample * span).floor() as u8;
    min.saturating_add(offset).min(max)
}

/// Bernoulli trial with success probability `p`
pub fn sample_bernoulli(sample: f64, p: f64) -> bool {
    sample < p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_sampler_cycles() {
        let mut s = ScriptedSampler::new([0.1, 0.2]);
        let drawn: Vec<f64> = (0..5).map(|_| s.sample()).collect();
        assert_eq!(drawn, vec![0.1, 0.2, 0.1, 0.2, 0.1]);
    }

    #[test]
    fn test_empty_script_yields_zero() {
        let mut s = ScriptedSampler::new(Vec::<f64>::new());
        assert_eq!(s.sample(), 0.0);
    }

    #[test]
    fn test_range_endpoints() {
        assert_eq!(sample_in_range(0.0, 70, 99), 70);
        assert_eq!(sample_in_range(0.999_999, 70, 99), 99);
        assert_eq!(sample_in_range(0.5, 70, 99), 85);
        assert_eq!(sample_in_range(0.7, 5, 5), 5);
    }

    #[test]
    fn test_random_sampler_in_unit_interval() {
        let mut s = RandomSampler;
        for _ in 0..1000 {
            let v = s.sample();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_bernoulli_edges() {
        assert!(sample_bernoulli(0.0, 0.9));
        assert!(sample_bernoulli(0.89, 0.9));
        assert!(!sample_bernoulli(0.9, 0.9));
        assert!(!sample_bernoulli(0.0, 0.0));
    }
}
