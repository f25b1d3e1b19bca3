//! Global shutdown flag, set by the Ctrl+C handler.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Setup the global Ctrl+C handler. Call once at program start.
pub fn setup_shutdown_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
    })?;
    Ok(())
}

/// Whether shutdown was requested.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_starts_unset() {
        // Never toggled here: the flag is process-global and other tests run
        // task lists that observe it.
        assert!(!is_shutdown());
    }
}
