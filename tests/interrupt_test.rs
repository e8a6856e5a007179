// spsc_feed_bench/tests/interrupt_test.rs
//
// Own test binary: SIGINT latches a process-wide flag, which would stop any
// other harness run sharing the process.

use nix::sys::signal::{raise, Signal};
use spsc_feed_bench::harness;
use spsc_feed_bench::shutdown::{install_interrupt_handler, interrupt_requested};
use spsc_feed_bench::{BenchConfig, ShutdownToken};

use std::time::{Duration, Instant};

#[test]
fn test_sigint_stops_the_run() {
   install_interrupt_handler().unwrap();
   assert!(!interrupt_requested());

   raise(Signal::SIGINT).unwrap();
   assert!(interrupt_requested(), "handler did not latch SIGINT");

   let cfg = BenchConfig { rate_per_sec: 1_000, duration_secs: 60, capacity_exp: 8, ..BenchConfig::default() };
   let token = ShutdownToken::new();
   let start = Instant::now();
   let summary = harness::run(&cfg, &token).unwrap();

   assert!(token.is_cancelled());
   assert!(start.elapsed() < Duration::from_secs(2), "run took {:?}", start.elapsed());
   assert_eq!(
      summary.producer.produced,
      summary.consumer.consumed + summary.in_flight_at_shutdown as u64
   );
}
