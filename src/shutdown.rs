// Cooperative cancellation shared by the two loops and the harness.

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::{
   atomic::{AtomicBool, Ordering},
   Arc,
};

/// Broadcast stop flag. Every clone observes the same flag; polling is
/// Relaxed because eventual observation is all a clean stop needs.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
   stop: Arc<AtomicBool>,
}

impl ShutdownToken {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn cancel(&self) {
      self.stop.store(true, Ordering::Relaxed);
   }

   #[inline]
   pub fn is_cancelled(&self) -> bool {
      self.stop.load(Ordering::Relaxed)
   }
}

// The handler may only touch async-signal-safe state, hence a plain static
// that the harness forwards into its token.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_: libc::c_int) {
   INTERRUPTED.store(true, Ordering::Relaxed);
}

/// Route SIGINT to [`interrupt_requested`].
pub fn install_interrupt_handler() -> nix::Result<()> {
   let action = SigAction::new(
      SigHandler::Handler(on_sigint),
      SaFlags::SA_RESTART,
      SigSet::empty(),
   );
   // SAFETY: the handler only stores to an atomic.
   unsafe { sigaction(Signal::SIGINT, &action) }?;
   Ok(())
}

/// True once SIGINT has been received.
pub fn interrupt_requested() -> bool {
   INTERRUPTED.load(Ordering::Relaxed)
}
