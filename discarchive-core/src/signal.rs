use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
struct Flags {
    stop: AtomicBool,
    eject_claimed: AtomicBool,
}

/// Shared state that coordinates an interrupt between the Ctrl+C handler and the
/// session loop.
///
/// Cloning is cheap and every clone observes the same flags. Whoever first calls
/// [`StopSignal::claim_eject`] owns the one shutdown eject; every later caller is told
/// to leave the drive alone.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    inner: Arc<Flags>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.inner.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.inner.stop.load(Ordering::SeqCst)
    }

    /// Returns `Err(Error::Interrupted)` once a stop has been requested.
    pub fn check(&self) -> Result<()> {
        if self.is_stop_requested() {
            return Err(Error::Interrupted);
        }
        Ok(())
    }

    /// Returns `true` exactly once over the lifetime of the signal and all its clones.
    pub fn claim_eject(&self) -> bool {
        !self.inner.eject_claimed.swap(true, Ordering::SeqCst)
    }
}
