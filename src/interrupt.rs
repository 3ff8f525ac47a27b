use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Shared flag raised when the operator interrupts the run
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    requested: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag on Ctrl-C.
    ///
    /// A helper thread drives a single-threaded tokio runtime that waits for the
    /// signal; the upgrade itself stays on the calling thread.
    pub fn listen_for_ctrl_c() -> Self {
        let interrupt = Self::new();
        let flag = interrupt.requested.clone();

        let spawned = thread::Builder::new()
            .name("langup-ctrl-c".into())
            .spawn(move || {
                let Ok(runtime) = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                else {
                    return;
                };
                runtime.block_on(async move {
                    if let Ok(()) = tokio::signal::ctrl_c().await {
                        flag.store(true, Ordering::SeqCst);
                    }
                });
            });

        if spawned.is_err() {
            crate::utils::logger::verbose("Ctrl-C listener could not be started");
        }

        interrupt
    }

    #[cfg(test)]
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let interrupt = Interrupt::new();
        let observer = interrupt.clone();
        assert!(!observer.is_requested());
        interrupt.trigger();
        assert!(observer.is_requested());
    }
}
