// Monotonic nanosecond clock shared by producer and consumer.

/// `CLOCK_MONOTONIC` in nanoseconds. Both threads read the same clock, so
/// differences between two readings are hand-off latencies.
#[inline]
pub fn monotonic_ns() -> u64 {
   let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
   // CLOCK_MONOTONIC cannot fail with a valid pointer.
   unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
   (ts.tv_sec as u64)
      .wrapping_mul(1_000_000_000)
      .wrapping_add(ts.tv_nsec as u64)
}
