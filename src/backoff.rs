// What a loop does when the ring says "not now".

use crossbeam::utils::Backoff;
use std::{thread, time::Duration};

/// Retry/idle policy for the producer (ring full) and the consumer (ring
/// empty). The ring itself never waits; this is the only backpressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
   /// Sleep a fixed duration between attempts.
   Sleep(Duration),
   /// `thread::yield_now()` between attempts.
   Yield,
   /// Busy-spin with a CPU relax hint.
   Spin,
   /// Spin, then yield, with exponentially growing steps
   /// (`crossbeam::utils::Backoff`). Resets after every success.
   Exponential,
}

impl BackoffPolicy {
   /// Producer default: 1µs nap when the ring is full.
   pub const PRODUCER_DEFAULT: Self = BackoffPolicy::Sleep(Duration::from_micros(1));
   /// Consumer default: give the core away when the ring is empty.
   pub const CONSUMER_DEFAULT: Self = BackoffPolicy::Yield;

   pub fn waiter(self) -> Waiter {
      Waiter { policy: self, backoff: Backoff::new() }
   }
}

/// Per-loop state for a [`BackoffPolicy`].
pub struct Waiter {
   policy : BackoffPolicy,
   backoff: Backoff,
}

impl Waiter {
   /// One failed attempt.
   #[inline]
   pub fn wait(&self) {
      match self.policy {
         BackoffPolicy::Sleep(d) => thread::sleep(d),
         BackoffPolicy::Yield => thread::yield_now(),
         BackoffPolicy::Spin => std::hint::spin_loop(),
         BackoffPolicy::Exponential => self.backoff.snooze(),
      }
   }

   /// An attempt succeeded.
   #[inline]
   pub fn reset(&self) {
      if let BackoffPolicy::Exponential = self.policy {
         self.backoff.reset();
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use std::time::Instant;

   #[test]
   fn sleep_policy_actually_sleeps() {
      let w = BackoffPolicy::Sleep(Duration::from_millis(2)).waiter();
      let start = Instant::now();
      w.wait();
      assert!(start.elapsed() >= Duration::from_millis(2));
   }

   #[test]
   fn exponential_resets() {
      let w = BackoffPolicy::Exponential.waiter();
      for _ in 0..20 {
         w.wait();
      }
      assert!(w.backoff.is_completed());
      w.reset();
      assert!(!w.backoff.is_completed());
   }
}
