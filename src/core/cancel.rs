//! Cooperative cancellation
//!
//! Wraps the shutdown `watch` channel set by the signal handler. Network
//! calls, queue pushes and queue pops race against it and surface
//! [`SampleError::Interrupted`] once it flips to `true`.

use crate::domain::{Result, SampleError};
use std::future::Future;
use tokio::sync::watch;

/// Read side of the shutdown signal
#[derive(Debug, Clone)]
pub struct Cancellation {
    signal: watch::Receiver<bool>,
}

impl Cancellation {
    /// Wrap a shutdown receiver
    pub fn new(signal: watch::Receiver<bool>) -> Self {
        Self { signal }
    }

    /// A token that never fires
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self::new(rx)
    }

    /// Whether shutdown has been requested
    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Fail with [`SampleError::Interrupted`] if shutdown has been requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(SampleError::Interrupted);
        }
        Ok(())
    }

    /// Resolves once shutdown is requested
    ///
    /// Pends forever when the sending side is gone without having fired.
    pub async fn cancelled(&self) {
        let mut signal = self.signal.clone();
        loop {
            if *signal.borrow_and_update() {
                return;
            }
            if signal.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Run `fut` unless shutdown is requested first
    pub async fn guard<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(SampleError::Interrupted),
            result = fut => result,
        }
    }
}

impl From<watch::Receiver<bool>> for Cancellation {
    fn from(signal: watch::Receiver<bool>) -> Self {
        Self::new(signal)
    }
}
