// Run parameters and their command-line form:
//
//    spsc_feed_bench [rate_per_sec] [duration_secs] [capacity_exp]

use crate::backoff::BackoffPolicy;
use crate::error::ConfigError;
use crate::generator::DEFAULT_SEED;
use std::time::Duration;

pub const MAX_RATE: u64 = 50_000_000;
pub const MIN_DURATION_SECS: u64 = 1;
pub const MAX_DURATION_SECS: u64 = 3_600;
pub const MAX_CAPACITY_EXP: u32 = 26;
/// Upper bound on stored latency samples (8 bytes each).
pub const MAX_SAMPLES: usize = 4 << 20;

pub const USAGE: &str = "\
usage: spsc_feed_bench [rate_per_sec] [duration_secs] [capacity_exp]

  rate_per_sec   records/second the producer aims for, 0 = unlimited
                 (0..=50000000, default 500000)
  duration_secs  run length in seconds (1..=3600, default 5)
  capacity_exp   ring capacity is 2^capacity_exp (0..=26, default 16)

RUST_LOG sets log verbosity (default: info).";

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
   pub rate_per_sec    : u64,
   pub duration_secs   : u64,
   pub capacity_exp    : u32,
   pub producer_backoff: BackoffPolicy,
   pub consumer_backoff: BackoffPolicy,
   pub seed            : u64,
}

impl Default for BenchConfig {
   fn default() -> Self {
      Self {
         rate_per_sec    : 500_000,
         duration_secs   : 5,
         capacity_exp    : 16,
         producer_backoff: BackoffPolicy::PRODUCER_DEFAULT,
         consumer_backoff: BackoffPolicy::CONSUMER_DEFAULT,
         seed            : DEFAULT_SEED,
      }
   }
}

impl BenchConfig {
   /// Parse positional arguments (program name already stripped).
   pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
   where
      I: IntoIterator<Item = S>,
      S: AsRef<str>,
   {
      let mut cfg = Self::default();
      let mut args = args.into_iter();

      let mut next = || -> Result<Option<String>, ConfigError> {
         match args.next() {
            Some(a) if matches!(a.as_ref(), "-h" | "--help") => Err(ConfigError::HelpRequested),
            Some(a) => Ok(Some(a.as_ref().to_owned())),
            None => Ok(None),
         }
      };

      if let Some(v) = next()? {
         cfg.rate_per_sec = parse_in_range("rate_per_sec", &v, 0, MAX_RATE)?;
      }
      if let Some(v) = next()? {
         cfg.duration_secs =
            parse_in_range("duration_secs", &v, MIN_DURATION_SECS, MAX_DURATION_SECS)?;
      }
      if let Some(v) = next()? {
         cfg.capacity_exp = parse_in_range("capacity_exp", &v, 0, MAX_CAPACITY_EXP as u64)? as u32;
      }
      if let Some(extra) = next()? {
         return Err(ConfigError::UnexpectedArgument(extra));
      }
      Ok(cfg)
   }

   pub fn capacity(&self) -> usize {
      1usize << self.capacity_exp
   }

   pub fn duration(&self) -> Duration {
      Duration::from_secs(self.duration_secs)
   }

   /// Latency samples to keep: half the records the run should produce.
   pub fn sample_cap(&self) -> usize {
      if self.rate_per_sec == 0 {
         return MAX_SAMPLES;
      }
      let half = self.rate_per_sec.saturating_mul(self.duration_secs) / 2;
      usize::try_from(half).unwrap_or(MAX_SAMPLES).min(MAX_SAMPLES)
   }
}

fn parse_in_range(name: &'static str, value: &str, min: u64, max: u64) -> Result<u64, ConfigError> {
   let n: u64 = value
      .trim()
      .parse()
      .map_err(|_| ConfigError::NotANumber { name, value: value.to_owned() })?;
   if n < min || n > max {
      return Err(ConfigError::OutOfRange { name, value: n, min, max });
   }
   Ok(n)
}
