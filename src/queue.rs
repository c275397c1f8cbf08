//! # Async Queue
//!
//! Unbounded in-order work queue with a sequential drive loop: one item is
//! fully handled before the next is popped. Collaborators use it to
//! serialize bursts of callback-shaped work (tracking uploads, deferred
//! reports) without blocking the producer.

use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Unbounded FIFO queue whose consumer side is claimed once by [`drive`].
///
/// [`drive`]: AsyncQueue::drive
#[derive(Debug)]
pub struct AsyncQueue<T> {
    sender: mpsc::UnboundedSender<T>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<T>>>,
}

impl<T: Send + 'static> AsyncQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// Append an item. Fails only once the drive loop has shut down.
    pub fn push(&self, item: T) -> CoreResult<()> {
        self.sender
            .send(item)
            .map_err(|_| CoreError::Queue("queue consumer is gone".to_string()))
    }

    /// Spawn the sequential processing loop.
    ///
    /// Items are handled strictly in push order, one at a time. The loop
    /// ends when every queue handle is dropped. Calling `drive` a second
    /// time is an error: the consumer side is single-owner.
    pub fn drive<H, Fut>(&self, handler: H) -> CoreResult<JoinHandle<()>>
    where
        H: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let mut receiver = self
            .receiver
            .lock()
            .take()
            .ok_or_else(|| CoreError::Queue("queue is already being driven".to_string()))?;

        Ok(tokio::spawn(async move {
            while let Some(item) = receiver.recv().await {
                handler(item).await;
            }
            debug!("async queue drained and closed");
        }))
    }
}

impl<T: Send + 'static> Default for AsyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
