//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Set-once flag polled at trial boundaries. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. There is no way to reset the token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Cancel this token on the first Ctrl-C delivered to the process.
    pub fn cancel_on_ctrl_c(&self) -> JoinHandle<()> {
        let token = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    warn!("interrupt received, stopping after the current trial");
                    token.cancel();
                }
                Err(e) => debug!("unable to listen for interrupts: {}", e),
            }
        })
    }
}
