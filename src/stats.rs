// Latency sample store and percentile report.

use std::fmt;

/// Percentile of an ascending slice with linear interpolation between the
/// two nearest ranks (R-7). `p` is a fraction in `[0, 1]`; empty → `0.0`.
pub fn percentile(sorted: &[u64], p: f64) -> f64 {
   if sorted.is_empty() {
      return 0.0;
   }
   let idx = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
   let lo = idx.floor() as usize;
   let hi = idx.ceil() as usize;
   if lo == hi {
      return sorted[lo] as f64;
   }
   let frac = idx - lo as f64;
   sorted[lo] as f64 * (1.0 - frac) + sorted[hi] as f64 * frac
}

/// Bounded latency sample set. The first `cap` samples are kept; the rest
/// are only counted.
#[derive(Debug)]
pub struct LatencyAggregator {
   samples: Vec<u64>,
   cap    : usize,
   dropped: u64,
}

impl LatencyAggregator {
   /// Reserves room for `cap` samples up front so recording never allocates.
   pub fn with_cap(cap: usize) -> Self {
      Self { samples: Vec::with_capacity(cap), cap, dropped: 0 }
   }

   #[inline]
   pub fn record(&mut self, sent_at_ns: u64, received_at_ns: u64) {
      self.record_latency(received_at_ns.saturating_sub(sent_at_ns));
   }

   #[inline]
   pub fn record_latency(&mut self, latency_ns: u64) {
      if self.samples.len() < self.cap {
         self.samples.push(latency_ns);
      } else {
         self.dropped += 1;
      }
   }

   pub fn len(&self) -> usize {
      self.samples.len()
   }

   pub fn is_empty(&self) -> bool {
      self.samples.is_empty()
   }

   /// Samples seen after the cap was reached.
   pub fn dropped(&self) -> u64 {
      self.dropped
   }

   pub fn samples(&self) -> &[u64] {
      &self.samples
   }

   pub fn report(&self) -> LatencyReport {
      if self.samples.is_empty() {
         return LatencyReport::default();
      }
      let mut sorted = self.samples.clone();
      sorted.sort_unstable();
      let sum: f64 = sorted.iter().map(|&v| v as f64).sum();
      LatencyReport {
         samples: sorted.len(),
         mean_ns: sum / sorted.len() as f64,
         p50_ns : percentile(&sorted, 0.50),
         p90_ns : percentile(&sorted, 0.90),
         p99_ns : percentile(&sorted, 0.99),
         p999_ns: percentile(&sorted, 0.999),
      }
   }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencyReport {
   pub samples: usize,
   pub mean_ns: f64,
   pub p50_ns : f64,
   pub p90_ns : f64,
   pub p99_ns : f64,
   pub p999_ns: f64,
}

impl fmt::Display for LatencyReport {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      const RULE: &str = "================================";
      writeln!(f, "{RULE}")?;
      writeln!(f, "Latency Analysis Results")?;
      writeln!(f, "{RULE}")?;
      if self.samples == 0 {
         writeln!(f, "No latency samples collected")?;
         return write!(f, "{RULE}");
      }
      let us = |ns: f64| ns / 1000.0;
      writeln!(f, "Samples collected: {:>10}", self.samples)?;
      writeln!(f, "Average latency:   {:>8.2} us", us(self.mean_ns))?;
      writeln!(f, "Median (p50):      {:>8.2} us", us(self.p50_ns))?;
      writeln!(f, "90th percentile:   {:>8.2} us", us(self.p90_ns))?;
      writeln!(f, "99th percentile:   {:>8.2} us", us(self.p99_ns))?;
      writeln!(f, "99.9th percentile: {:>8.2} us", us(self.p999_ns))?;
      write!(f, "{RULE}")
   }
}
