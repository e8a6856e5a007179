pub mod backoff;
pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod harness;
pub mod pipeline;
pub mod record;
pub mod shutdown;
pub mod spsc;
pub mod stats;

pub use backoff::BackoffPolicy;
pub use config::BenchConfig;
pub use error::{ConfigError, HarnessError, QueueError};
pub use record::{Record, Tick};
pub use shutdown::ShutdownToken;
pub use spsc::{ring_buffer, Consumer, Monitor, Producer, QueueEmpty, QueueFull};
pub use stats::{LatencyAggregator, LatencyReport};

/// Write side of a hand-off. The producer loop is generic over it.
pub trait Sink<T> {
   /// Returned when the item could not be accepted right now.
   type PushError;

   fn push(&mut self, item: T) -> Result<(), Self::PushError>;
}

/// Read side of a hand-off. The consumer loop is generic over it.
pub trait Source<T> {
   /// Returned when nothing is available right now.
   type PopError;

   fn pop(&mut self) -> Result<T, Self::PopError>;
}
