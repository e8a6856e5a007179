// Synthetic feed: record factory and rate pacing for the producer.

use crate::clock::monotonic_ns;
use crate::record::Record;
use crate::shutdown::ShutdownToken;
use rand::{distributions::Uniform, rngs::StdRng, Rng, SeedableRng};
use std::{thread, time::Duration};

pub const DEFAULT_SEED: u64 = 12345;

/// Deterministic (for a given seed) stream of records with increasing `seq`.
pub struct RecordGenerator {
   next_seq  : u64,
   rng       : StdRng,
   instrument: Uniform<u32>,
   quantity  : Uniform<u32>,
   price     : Uniform<f64>,
}

impl RecordGenerator {
   pub fn new(seed: u64) -> Self {
      Self {
         next_seq  : 1,
         rng       : StdRng::seed_from_u64(seed),
         instrument: Uniform::new_inclusive(1, 1000),
         quantity  : Uniform::new_inclusive(1, 1000),
         price     : Uniform::new(100.0, 200.0),
      }
   }

   /// Build the next record, stamped with the current monotonic time.
   #[inline]
   pub fn next_record(&mut self) -> Record {
      let seq = self.next_seq;
      self.next_seq += 1;
      Record {
         seq,
         sent_at_ns   : monotonic_ns(),
         instrument_id: self.rng.sample(self.instrument),
         quantity     : self.rng.sample(self.quantity),
         price        : self.rng.sample(self.price),
      }
   }

   /// Sequence number the next record will carry.
   pub fn peek_seq(&self) -> u64 {
      self.next_seq
   }
}

impl Default for RecordGenerator {
   fn default() -> Self {
      Self::new(DEFAULT_SEED)
   }
}

/// Paces the producer to a target records/second. `0` means unlimited.
///
/// Pacing runs against a deadline that advances one period per record. The
/// producer only sleeps once it is more than [`SLEEP_THRESHOLD`] ahead of the
/// deadline; time lost oversleeping stays as credit (at most [`MAX_BURST`])
/// and is spent by emitting back-to-back.
#[derive(Debug)]
pub struct RateLimiter {
   period_ns: u64,
   burst_ns : u64,
   deadline : u64,
}

/// Lead over the deadline below which no sleep is attempted.
pub const SLEEP_THRESHOLD: Duration = Duration::from_micros(50);
/// Most lag that can be caught up in a burst.
pub const MAX_BURST: Duration = Duration::from_millis(1);
/// Longest single nap; the shutdown token is re-checked between naps.
pub const MAX_NAP: Duration = Duration::from_millis(10);

impl RateLimiter {
   pub fn new(per_sec: u64) -> Self {
      let period_ns = if per_sec == 0 { 0 } else { (1_000_000_000 / per_sec).max(1) };
      Self {
         period_ns,
         burst_ns: (MAX_BURST.as_nanos() as u64).max(period_ns),
         deadline: 0,
      }
   }

   pub fn unlimited() -> Self {
      Self::new(0)
   }

   pub fn period(&self) -> Duration {
      Duration::from_nanos(self.period_ns)
   }

   /// Call once per emitted record. Returns early if `token` is cancelled.
   pub fn pace(&mut self, token: &ShutdownToken) {
      if self.period_ns == 0 {
         return;
      }
      let now = monotonic_ns();
      if self.deadline == 0 {
         self.deadline = now;
      }
      self.deadline += self.period_ns;
      if self.deadline + self.burst_ns < now {
         self.deadline = now - self.burst_ns;
      }

      let threshold = SLEEP_THRESHOLD.as_nanos() as u64;
      loop {
         if token.is_cancelled() {
            return;
         }
         let now = monotonic_ns();
         if self.deadline <= now + threshold {
            return;
         }
         thread::sleep(Duration::from_nanos(self.deadline - now).min(MAX_NAP));
      }
   }
}
