use statrs::statistics::Statistics;
use std::{fmt::Display, time::Duration};

const KILO: u64 = 1 << 10;
const MEGA: u64 = 1 << 20;
const GIGA: u64 = 1 << 30;

/// Memory footprint of a filter, displayed in the largest fitting unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(u64);

impl ByteSize {
    /// Size needed to hold `bits`, rounded up to the next byte
    #[inline(always)]
    pub fn from_bits(bits: u64) -> Self {
        Self(bits.div_ceil(8))
    }

    #[inline(always)]
    pub fn in_bytes(&self) -> u64 {
        self.0
    }

    #[inline(always)]
    fn unit(&self) -> (u64, &'static str) {
        match self.0 {
            b if b < KILO => (1, "B"),
            b if b < MEGA => (KILO, "KB"),
            b if b < GIGA => (MEGA, "MB"),
            _ => (GIGA, "GB"),
        }
    }
}

impl Display for ByteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (div, unit) = self.unit();
        write!(f, "{:.1}{}", self.0 as f64 / div as f64, unit)
    }
}

/// Runs `f` `run` times and returns its mean duration, ignoring runs
/// further than 3 standard deviations from the mean.
pub fn benchmark<F: FnMut()>(mut f: F, run: u32) -> Duration {
    let mut times = Vec::with_capacity(run as usize);
    for _ in 0..run.max(1) {
        let start_time = std::time::Instant::now();
        f();
        times.push(start_time.elapsed().as_secs_f64())
    }

    if times.len() == 1 {
        return Duration::from_secs_f64(times[0]);
    }

    let mean = times.as_slice().mean();
    let threshold = 3.0 * times.as_slice().std_dev();

    times.retain(|&x| (x - mean).abs() <= threshold);
    // identical runs may all be dropped because of rounding on the mean
    if times.is_empty() {
        return Duration::from_secs_f64(mean);
    }
    Duration::from_secs_f64(times.mean())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_byte_size() {
        assert_eq!(ByteSize::from_bits(0).in_bytes(), 0);
        assert_eq!(ByteSize::from_bits(1).in_bytes(), 1);
        assert_eq!(ByteSize::from_bits(16).in_bytes(), 2);
        assert_eq!(ByteSize::from_bits(512 * 8).to_string(), "512.0B");
        assert_eq!(ByteSize::from_bits(1536 * 8).to_string(), "1.5KB");
        assert_eq!(ByteSize::from_bits(3 * MEGA * 8).to_string(), "3.0MB");
        assert_eq!(ByteSize::from_bits(80 * GIGA).to_string(), "10.0GB");
    }

    #[test]
    fn test_benchmark() {
        let mut calls = 0;
        benchmark(|| calls += 1, 10);
        assert_eq!(calls, 10);

        let mut calls = 0;
        benchmark(|| calls += 1, 0);
        assert_eq!(calls, 1);
    }
}
