// Wait-free bounded single-producer / single-consumer ring buffer.
//
// Two unbounded cursors, each written by exactly one side:
//
//    write  – total records ever pushed   (producer stores, consumer reads)
//    read   – total records ever popped   (consumer stores, producer reads)
//
// `write - read` is the number of buffered records and never exceeds the
// capacity. A slot is addressed by `cursor & mask`. The Release store of a
// cursor publishes the slot access that preceded it to the other side's
// Acquire load of the same cursor.

use crate::error::QueueError;
use crate::{Sink, Source};
use crossbeam::utils::CachePadded;
use std::{
   cell::UnsafeCell,
   fmt,
   mem::MaybeUninit,
   sync::{
      atomic::{AtomicUsize, Ordering},
      Arc,
   },
};

/// `push` found no free slot. Routine outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

/// `pop` found nothing to read. Routine outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEmpty;

/*──────────────────────────────────────────────────────────────────────────*/
/*  Shared ring                                                             */
/*──────────────────────────────────────────────────────────────────────────*/

struct Ring<T> {
   read : CachePadded<AtomicUsize>, // mutated by consumer
   write: CachePadded<AtomicUsize>, // mutated by producer
   mask : usize,                    // cap − 1
   slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// Slots are partitioned by the cursors: the producer only touches
// [write, read + cap), the consumer only [read, write).
unsafe impl<T: Send> Sync for Ring<T> {}
unsafe impl<T: Send> Send for Ring<T> {}

impl<T: Copy> Ring<T> {
   fn with_capacity(capacity: usize) -> Result<Self, QueueError> {
      if !capacity.is_power_of_two() {
         return Err(QueueError::InvalidCapacity(capacity));
      }

      let mut slots: Vec<UnsafeCell<MaybeUninit<T>>> = Vec::new();
      slots
         .try_reserve_exact(capacity)
         .map_err(|_| QueueError::AllocationFailure { capacity })?;
      slots.extend((0..capacity).map(|_| UnsafeCell::new(MaybeUninit::uninit())));

      Ok(Self {
         read : CachePadded::new(AtomicUsize::new(0)),
         write: CachePadded::new(AtomicUsize::new(0)),
         mask : capacity - 1,
         slots: slots.into_boxed_slice(),
      })
   }

   #[inline]
   fn capacity(&self) -> usize {
      self.mask + 1
   }

   #[inline]
   fn slot(&self, cursor: usize) -> *mut MaybeUninit<T> {
      self.slots[cursor & self.mask].get()
   }

   #[inline]
   fn approximate_size(&self) -> usize {
      // read first: it can only grow towards write, so the difference
      // never underflows.
      let read = self.read.load(Ordering::Acquire);
      let write = self.write.load(Ordering::Acquire);
      write.wrapping_sub(read).min(self.capacity())
   }
}

/// Build a ring of `capacity` slots and hand out its two ends.
///
/// `capacity` must be a non-zero power of two. The storage is allocated once
/// here and released when both handles (and any [`Monitor`]) are dropped.
///
/// ```
/// use spsc_feed_bench::spsc::ring_buffer;
///
/// let (mut tx, mut rx) = ring_buffer::<u64>(4).unwrap();
/// tx.push(1).unwrap();
/// assert_eq!(rx.pop(), Ok(1));
/// ```
pub fn ring_buffer<T: Copy + Send>(
   capacity: usize,
) -> Result<(Producer<T>, Consumer<T>), QueueError> {
   let ring = Arc::new(Ring::with_capacity(capacity)?);
   Ok((
      Producer { ring: Arc::clone(&ring) },
      Consumer { ring },
   ))
}

/*──────────────────────────────────────────────────────────────────────────*/
/*  Producer end                                                            */
/*──────────────────────────────────────────────────────────────────────────*/

/// Write end. Not `Clone`; `push` needs `&mut self`, so there is only ever
/// one pusher.
pub struct Producer<T> {
   ring: Arc<Ring<T>>,
}

impl<T: Copy + Send> Producer<T> {
   /// Non-blocking. On `Err` nothing was stored and the cursor did not move.
   #[inline]
   pub fn push(&mut self, item: T) -> Result<(), QueueFull> {
      let ring = &*self.ring;
      // only we store `write`
      let write = ring.write.load(Ordering::Relaxed);
      let read = ring.read.load(Ordering::Acquire);

      let next = write.wrapping_add(1);
      if next.wrapping_sub(read) > ring.capacity() {
         return Err(QueueFull);
      }

      // SAFETY: the slot at `write` was released by the consumer (Acquire on
      // `read` above) and is not visible to it until the store below.
      unsafe { (*ring.slot(write)).write(item) };
      ring.write.store(next, Ordering::Release);
      Ok(())
   }

   pub fn capacity(&self) -> usize {
      self.ring.capacity()
   }

   /// Diagnostics only; stale as soon as it returns.
   pub fn approximate_size(&self) -> usize {
      self.ring.approximate_size()
   }

   pub fn monitor(&self) -> Monitor<T> {
      Monitor { ring: Arc::clone(&self.ring) }
   }
}

/*──────────────────────────────────────────────────────────────────────────*/
/*  Consumer end                                                            */
/*──────────────────────────────────────────────────────────────────────────*/

/// Read end. Not `Clone`; `pop` needs `&mut self`.
pub struct Consumer<T> {
   ring: Arc<Ring<T>>,
}

impl<T: Copy + Send> Consumer<T> {
   /// Non-blocking. On `Err` the read cursor did not move.
   #[inline]
   pub fn pop(&mut self) -> Result<T, QueueEmpty> {
      let ring = &*self.ring;
      let read = ring.read.load(Ordering::Relaxed);
      let write = ring.write.load(Ordering::Acquire);

      if read == write {
         return Err(QueueEmpty);
      }

      // SAFETY: `read < write`, so the producer fully wrote this slot before
      // its Release store that we just Acquired; it won't touch it again
      // until our store below.
      let item = unsafe { (*ring.slot(read)).assume_init_read() };
      ring.read.store(read.wrapping_add(1), Ordering::Release);
      Ok(item)
   }

   /// Out-parameter form of [`pop`](Self::pop); `out` is untouched when the
   /// ring is empty.
   #[inline]
   pub fn pop_into(&mut self, out: &mut T) -> bool {
      match self.pop() {
         Ok(item) => {
            *out = item;
            true
         }
         Err(QueueEmpty) => false,
      }
   }

   pub fn capacity(&self) -> usize {
      self.ring.capacity()
   }

   pub fn approximate_size(&self) -> usize {
      self.ring.approximate_size()
   }

   pub fn monitor(&self) -> Monitor<T> {
      Monitor { ring: Arc::clone(&self.ring) }
   }
}

/*──────────────────────────────────────────────────────────────────────────*/
/*  Monitor                                                                 */
/*──────────────────────────────────────────────────────────────────────────*/

/// Read-only view for a third thread. Can't push or pop.
#[derive(Clone)]
pub struct Monitor<T> {
   ring: Arc<Ring<T>>,
}

impl<T: Copy + Send> Monitor<T> {
   pub fn capacity(&self) -> usize {
      self.ring.capacity()
   }

   pub fn approximate_size(&self) -> usize {
      self.ring.approximate_size()
   }
}

/*──────────────────────────── trait plumbing ──────────────────────────────*/

impl<T: Copy + Send> Sink<T> for Producer<T> {
   type PushError = QueueFull;

   #[inline]
   fn push(&mut self, item: T) -> Result<(), QueueFull> {
      Producer::push(self, item)
   }
}

impl<T: Copy + Send> Source<T> for Consumer<T> {
   type PopError = QueueEmpty;

   #[inline]
   fn pop(&mut self) -> Result<T, QueueEmpty> {
      Consumer::pop(self)
   }
}

macro_rules! impl_debug {
   ($($name:ident),*) => {$(
      impl<T: Copy + Send> fmt::Debug for $name<T> {
         fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct(stringify!($name))
               .field("capacity", &self.ring.capacity())
               .field("approximate_size", &self.ring.approximate_size())
               .finish()
         }
      }
   )*};
}

impl_debug!(Producer, Consumer, Monitor);
