// Producer and consumer loops. Each owns exactly one end of the ring and
// runs until the shared token is cancelled.
//
// Neither loop drains on shutdown: whatever is still buffered, or a record
// the producer was retrying, is dropped.

use crate::backoff::BackoffPolicy;
use crate::clock::monotonic_ns;
use crate::generator::{RateLimiter, RecordGenerator};
use crate::record::{Record, Tick};
use crate::shutdown::ShutdownToken;
use crate::stats::LatencyAggregator;
use crate::{Sink, Source};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
   /// Records accepted by the ring.
   pub produced: u64,
   /// Pushes that found the ring full.
   pub full_retries: u64,
   /// A record was built but abandoned at shutdown.
   pub abandoned: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
   pub consumed: u64,
   /// Pops that found the ring empty.
   pub empty_polls: u64,
   /// `seq` of the last record popped, 0 if none.
   pub last_seq: u64,
   /// Times a popped `seq` was not `last_seq + 1`.
   pub seq_gaps: u64,
}

/// Generate records into `sink` until `token` is cancelled.
pub fn run_producer<S: Sink<Record>>(
   sink: &mut S,
   generator: &mut RecordGenerator,
   limiter: &mut RateLimiter,
   policy: BackoffPolicy,
   token: &ShutdownToken,
) -> ProducerStats {
   let waiter = policy.waiter();
   let mut stats = ProducerStats::default();

   'outer: while !token.is_cancelled() {
      let rec = generator.next_record();
      while sink.push(rec).is_err() {
         stats.full_retries += 1;
         if token.is_cancelled() {
            stats.abandoned = true;
            break 'outer;
         }
         waiter.wait();
      }
      waiter.reset();
      stats.produced += 1;
      limiter.pace(token);
   }

   debug!(
      produced = stats.produced,
      full_retries = stats.full_retries,
      abandoned = stats.abandoned,
      "producer stopped"
   );
   stats
}

/// Drain `source` until `token` is cancelled, stamping each record, storing
/// its latency and handing the parsed [`Tick`] to `on_tick`.
pub fn run_consumer<S, F>(
   source: &mut S,
   policy: BackoffPolicy,
   token: &ShutdownToken,
   latencies: &mut LatencyAggregator,
   mut on_tick: F,
) -> ConsumerStats
where
   S: Source<Record>,
   F: FnMut(&Tick),
{
   let waiter = policy.waiter();
   let mut stats = ConsumerStats::default();

   while !token.is_cancelled() {
      let rec = match source.pop() {
         Ok(rec) => rec,
         Err(_) => {
            stats.empty_polls += 1;
            waiter.wait();
            continue;
         }
      };
      waiter.reset();

      let tick = Tick::parse(&rec, monotonic_ns());
      latencies.record_latency(tick.latency_ns());

      if stats.last_seq != 0 && tick.seq != stats.last_seq + 1 {
         stats.seq_gaps += 1;
      }
      stats.last_seq = tick.seq;
      stats.consumed += 1;

      on_tick(&tick);
   }

   debug!(
      consumed = stats.consumed,
      empty_polls = stats.empty_polls,
      last_seq = stats.last_seq,
      seq_gaps = stats.seq_gaps,
      "consumer stopped"
   );
   stats
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::spsc::{QueueEmpty, QueueFull};
   use std::collections::VecDeque;

   // Sink that refuses everything and cancels the token after a few tries.
   struct JammedSink<'a> {
      tries: u32,
      token: &'a ShutdownToken,
   }

   impl Sink<Record> for JammedSink<'_> {
      type PushError = QueueFull;
      fn push(&mut self, _: Record) -> Result<(), QueueFull> {
         self.tries += 1;
         if self.tries == 5 {
            self.token.cancel();
         }
         Err(QueueFull)
      }
   }

   // Source that yields a fixed script, then cancels once empty.
   struct Scripted<'a> {
      items: VecDeque<Record>,
      token: &'a ShutdownToken,
   }

   impl Source<Record> for Scripted<'_> {
      type PopError = QueueEmpty;
      fn pop(&mut self) -> Result<Record, QueueEmpty> {
         match self.items.pop_front() {
            Some(r) => Ok(r),
            None => {
               self.token.cancel();
               Err(QueueEmpty)
            }
         }
      }
   }

   #[test]
   fn producer_gives_up_on_full_ring_at_shutdown() {
      let token = ShutdownToken::new();
      let mut sink = JammedSink { tries: 0, token: &token };
      let stats = run_producer(
         &mut sink,
         &mut RecordGenerator::default(),
         &mut RateLimiter::unlimited(),
         BackoffPolicy::Spin,
         &token,
      );
      assert_eq!(stats.produced, 0);
      assert_eq!(stats.full_retries, 5);
      assert!(stats.abandoned);
   }

   #[test]
   fn consumer_counts_gaps_and_forwards_ticks() {
      let token = ShutdownToken::new();
      let now = monotonic_ns();
      let items = [1u64, 2, 4, 5]
         .iter()
         .map(|&seq| Record { seq, sent_at_ns: now, ..Record::default() })
         .collect();
      let mut src = Scripted { items, token: &token };
      let mut agg = LatencyAggregator::with_cap(10);
      let mut seen = Vec::new();

      let stats = run_consumer(&mut src, BackoffPolicy::Spin, &token, &mut agg, |t| {
         seen.push(t.seq)
      });

      assert_eq!(seen, vec![1, 2, 4, 5]);
      assert_eq!(stats.consumed, 4);
      assert_eq!(stats.last_seq, 5);
      assert_eq!(stats.seq_gaps, 1);
      assert_eq!(stats.empty_polls, 1);
      assert_eq!(agg.len(), 4);
   }

   #[test]
   fn cancelled_token_stops_before_work() {
      let token = ShutdownToken::new();
      token.cancel();
      let mut sink = JammedSink { tries: 0, token: &token };
      let stats = run_producer(
         &mut sink,
         &mut RecordGenerator::default(),
         &mut RateLimiter::unlimited(),
         BackoffPolicy::Yield,
         &token,
      );
      assert_eq!(stats, ProducerStats::default());
      assert_eq!(sink.tries, 0);
   }
}
