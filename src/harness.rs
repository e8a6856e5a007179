// One benchmark run: ring + producer thread + consumer thread, watched from
// the calling thread.

use crate::config::BenchConfig;
use crate::error::HarnessError;
use crate::generator::{RateLimiter, RecordGenerator};
use crate::pipeline::{run_consumer, run_producer, ConsumerStats, ProducerStats};
use crate::record::Record;
use crate::shutdown::{interrupt_requested, ShutdownToken};
use crate::spsc::ring_buffer;
use crate::stats::{LatencyAggregator, LatencyReport};
use std::{
   fmt,
   thread::{self, JoinHandle},
   time::{Duration, Instant},
};
use tracing::{info, warn};

const POLL: Duration = Duration::from_millis(50);
const REPORT_EVERY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RunSummary {
   pub producer: ProducerStats,
   pub consumer: ConsumerStats,
   pub latency: LatencyReport,
   /// Latency samples not stored because the cap was reached.
   pub samples_dropped: u64,
   /// Records still buffered when both loops stopped. They are discarded.
   pub in_flight_at_shutdown: usize,
   pub elapsed: Duration,
}

/// Run the benchmark described by `cfg`. Returns early if `token` is
/// cancelled or SIGINT arrives. Once the threads are up, `token` is always
/// cancelled before returning.
pub fn run(cfg: &BenchConfig, token: &ShutdownToken) -> Result<RunSummary, HarnessError> {
   // no thread is started unless the ring exists
   let (mut tx, mut rx) = ring_buffer::<Record>(cfg.capacity())?;
   let monitor = tx.monitor();

   info!(
      rate_per_sec = cfg.rate_per_sec,
      duration_secs = cfg.duration_secs,
      capacity = monitor.capacity(),
      "starting run"
   );

   let mut generator = RecordGenerator::new(cfg.seed);
   let mut limiter = RateLimiter::new(cfg.rate_per_sec);
   let producer_backoff = cfg.producer_backoff;
   let prod_token = token.clone();
   let producer = thread::Builder::new()
      .name("producer".into())
      .spawn(move || {
         run_producer(&mut tx, &mut generator, &mut limiter, producer_backoff, &prod_token)
      })
      .map_err(|source| HarnessError::Spawn { name: "producer", source })?;

   let mut latencies = LatencyAggregator::with_cap(cfg.sample_cap());
   let consumer_backoff = cfg.consumer_backoff;
   let cons_token = token.clone();
   let consumer = thread::Builder::new()
      .name("consumer".into())
      .spawn(move || {
         // ticks stop here; downstream delivery is out of scope
         let stats = run_consumer(&mut rx, consumer_backoff, &cons_token, &mut latencies, |_| {});
         (stats, latencies)
      });
   let consumer = match consumer {
      Ok(handle) => handle,
      Err(source) => {
         token.cancel();
         let _ = producer.join();
         return Err(HarnessError::Spawn { name: "consumer", source });
      }
   };

   let start = Instant::now();
   let deadline = start + cfg.duration();
   let mut next_report = start + REPORT_EVERY;
   let mut tick = 0u64;

   while !token.is_cancelled() {
      let now = Instant::now();
      if now >= deadline {
         break;
      }
      if interrupt_requested() {
         warn!("interrupted, stopping");
         break;
      }
      if now >= next_report {
         tick += 1;
         next_report += REPORT_EVERY;
         info!(t = tick, queue_approx = monitor.approximate_size(), "progress");
      }
      thread::sleep(POLL.min(deadline - now).min(next_report.saturating_duration_since(now)));
   }

   token.cancel();
   let (producer, (consumer, latencies)) = join_both(producer, consumer)?;
   let elapsed = start.elapsed();

   let in_flight_at_shutdown = monitor.approximate_size();
   if latencies.dropped() > 0 {
      warn!(dropped = latencies.dropped(), "latency sample cap reached");
   }
   info!(
      produced = producer.produced,
      consumed = consumer.consumed,
      in_flight = in_flight_at_shutdown,
      samples = latencies.len(),
      "run finished"
   );

   Ok(RunSummary {
      producer,
      consumer,
      latency: latencies.report(),
      samples_dropped: latencies.dropped(),
      in_flight_at_shutdown,
      elapsed,
   })
}

// Both threads are always joined, so a panic on one side never leaves the
// other detached.
fn join_both<P, C>(
   producer: JoinHandle<P>,
   consumer: JoinHandle<C>,
) -> Result<(P, C), HarnessError> {
   let producer = producer.join();
   let consumer = consumer.join();
   let producer = producer.map_err(|_| HarnessError::WorkerPanicked("producer"))?;
   let consumer = consumer.map_err(|_| HarnessError::WorkerPanicked("consumer"))?;
   Ok((producer, consumer))
}

impl fmt::Display for RunSummary {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      writeln!(f, "Finished in {:.2}s.", self.elapsed.as_secs_f64())?;
      writeln!(
         f,
         "Produced {} ({} full-queue retries{}), consumed {} ({} sequence gaps).",
         self.producer.produced,
         self.producer.full_retries,
         if self.producer.abandoned { ", 1 abandoned at shutdown" } else { "" },
         self.consumer.consumed,
         self.consumer.seq_gaps,
      )?;
      writeln!(f, "Dropped in flight at shutdown: {}", self.in_flight_at_shutdown)?;
      writeln!(
         f,
         "Collected {} samples ({} over the cap, not stored).",
         self.latency.samples, self.samples_dropped,
      )?;
      write!(f, "{}", self.latency)
   }
}
