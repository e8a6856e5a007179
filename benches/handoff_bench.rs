use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spsc_feed_bench::{ring_buffer, Record};
use std::thread;
use std::time::{Duration, Instant};

const ITERS: u64 = 1_000_000;

fn rec(seq: u64) -> Record {
   Record { seq, sent_at_ns: 0, instrument_id: 1, quantity: 1, price: 100.0 }
}

// Producer thread pushes `n` records, the bench thread drains them.
fn handoff(capacity: usize, n: u64) -> Duration {
   let (mut tx, mut rx) = ring_buffer::<Record>(capacity).expect("valid capacity");

   let producer = thread::spawn(move || {
      for seq in 1..=n {
         while tx.push(rec(seq)).is_err() {
            std::hint::spin_loop();
         }
      }
   });

   let start = Instant::now();
   let mut consumed = 0;
   while consumed < n {
      match rx.pop() {
         Ok(r) => {
            debug_assert_eq!(r.seq, consumed + 1);
            consumed += 1;
         }
         Err(_) => std::hint::spin_loop(),
      }
   }
   let dur = start.elapsed();
   producer.join().expect("producer panicked");
   dur
}

fn bench_handoff(c: &mut Criterion) {
   let mut group = c.benchmark_group("spsc handoff (threads)");
   group.throughput(Throughput::Elements(ITERS));
   for exp in [6u32, 10, 16] {
      let capacity = 1usize << exp;
      group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &cap| {
         b.iter_custom(|iters| (0..iters).map(|_| handoff(cap, ITERS)).sum())
      });
   }
   group.finish();
}

// Round trip on one thread: the uncontended cost of push + pop.
fn bench_uncontended(c: &mut Criterion) {
   let (mut tx, mut rx) = ring_buffer::<Record>(1024).expect("valid capacity");
   let mut seq = 0;
   c.bench_function("spsc push+pop (one thread)", |b| {
      b.iter(|| {
         seq += 1;
         tx.push(rec(seq)).expect("never full");
         rx.pop().expect("never empty")
      })
   });
}

fn custom_criterion() -> Criterion {
   Criterion::default()
      .warm_up_time(Duration::from_secs(3))
      .measurement_time(Duration::from_secs(10))
      .sample_size(50)
}

criterion_group! {
   name = benches;
   config = custom_criterion();
   targets = bench_handoff, bench_uncontended
}
criterion_main!(benches);
