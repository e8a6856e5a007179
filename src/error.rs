// Error taxonomy. Full/empty outcomes of push/pop are *not* here: they are
// routine control flow and live next to the ring as `QueueFull`/`QueueEmpty`.

use thiserror::Error;

/// Construction-time failures of the ring buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
   #[error("capacity must be a non-zero power of two, got {0}")]
   InvalidCapacity(usize),
   #[error("could not allocate storage for {capacity} slots")]
   AllocationFailure { capacity: usize },
}

/// Malformed process parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
   #[error("{name} is not a number: {value:?}")]
   NotANumber { name: &'static str, value: String },
   #[error("{name} = {value} is outside {min}..={max}")]
   OutOfRange { name: &'static str, value: u64, min: u64, max: u64 },
   #[error("unexpected extra argument {0:?}")]
   UnexpectedArgument(String),
   #[error("help requested")]
   HelpRequested,
}

#[derive(Debug, Error)]
pub enum HarnessError {
   #[error(transparent)]
   Queue(#[from] QueueError),
   #[error("failed to spawn {name} thread: {source}")]
   Spawn {
      name: &'static str,
      #[source]
      source: std::io::Error,
   },
   #[error("{0} thread panicked")]
   WorkerPanicked(&'static str),
}
