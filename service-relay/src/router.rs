use crate::{
    error::{RelayError, RelayResult},
    message::ChatMessage,
    registry::{ConnectionId, Registry},
    sink::ChatSink,
};
use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};

/// Producer side of the broadcast queue, cloned into every session.
///
/// The queue is unbounded: submitting never waits, and a slow router makes the
/// queue grow instead of stalling receive loops.
#[derive(Clone)]
pub struct RouterHandle {
    queue: mpsc::UnboundedSender<ChatMessage>,
}

impl RouterHandle {
    pub fn submit(&self, message: ChatMessage) -> RelayResult<()> {
        self.queue.send(message).map_err(|_| RelayError::RouterClosed)
    }
}

/// Single consumer of the broadcast queue. Fans out one message at a time.
pub struct BroadcastRouter<S> {
    registry: Arc<Registry<S>>,
    queue: mpsc::UnboundedReceiver<ChatMessage>,
    send_timeout: Duration,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub evicted: Vec<ConnectionId>,
}

impl<S: ChatSink> BroadcastRouter<S> {
    pub fn new(registry: Arc<Registry<S>>, send_timeout: Duration) -> (RouterHandle, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let router = Self {
            registry,
            queue: rx,
            send_timeout,
        };

        (RouterHandle { queue: tx }, router)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until every [`RouterHandle`] is dropped.
    pub async fn run(mut self) {
        while let Some(message) = self.queue.recv().await {
            tracing::debug!(username = %message.username, "broadcasting message");

            let report = fan_out(&self.registry, &message, self.send_timeout).await;
            if !report.evicted.is_empty() {
                tracing::info!(
                    delivered = report.delivered,
                    evicted = report.evicted.len(),
                    "fan-out finished with evictions"
                );
            }
        }

        tracing::info!("broadcast queue closed, router stopped");
    }
}

/// Sends `message` to every registered connection while holding the registry lock.
///
/// A recipient whose send fails or exceeds `send_timeout` is removed, its session
/// is told to stop, and its sink is closed; the rest still get the message.
pub async fn fan_out<S: ChatSink>(registry: &Registry<S>, message: &ChatMessage, send_timeout: Duration) -> FanOut {
    let mut entries = registry.lock().await;
    let mut report = FanOut::default();

    for (id, member) in entries.iter_mut() {
        let result = match tokio::time::timeout(send_timeout, member.sink.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::SendTimeout),
        };

        match result {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!(connection_id = %id, error = %e, "send failed, evicting connection");
                report.evicted.push(*id);
            }
        }
    }

    for id in &report.evicted {
        if let Some(member) = entries.remove(id) {
            let sink = member.evict();
            if tokio::time::timeout(send_timeout, sink.close()).await.is_err() {
                tracing::debug!(connection_id = %id, "close of evicted connection timed out");
            }
        }
    }

    report
}
