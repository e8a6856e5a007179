// Fixed-size market-data record: the unit moved through the ring.

/// 32-byte, pointer-free record. `Copy` is what lets the ring reuse slots in
/// place without ever running a destructor.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Record {
   /// Producer-assigned sequence number, starting at 1.
   pub seq: u64,
   /// Monotonic clock reading taken when the record was built.
   pub sent_at_ns: u64,
   pub instrument_id: u32,
   pub quantity: u32,
   pub price: f64,
}

const _: () = assert!(std::mem::size_of::<Record>() == 32);
const _: () = assert!(std::mem::align_of::<Record>() <= 8);

/// Parsed form of a [`Record`] once the consumer has stamped it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
   pub seq: u64,
   pub sent_at_ns: u64,
   pub received_at_ns: u64,
   pub instrument_id: u32,
   pub quantity: u32,
   pub price: f64,
}

impl Tick {
   #[inline]
   pub fn parse(rec: &Record, received_at_ns: u64) -> Self {
      Self {
         seq: rec.seq,
         sent_at_ns: rec.sent_at_ns,
         received_at_ns,
         instrument_id: rec.instrument_id,
         quantity: rec.quantity,
         price: rec.price,
      }
   }

   /// Hand-off latency; a clock that went backwards reads as zero.
   #[inline]
   pub fn latency_ns(&self) -> u64 {
      self.received_at_ns.saturating_sub(self.sent_at_ns)
   }
}
