use crate::{error::RelayResult, message::ChatMessage};
use std::future::Future;

/// Outbound half of a client connection.
pub trait ChatSink: Send + 'static {
    fn send(&mut self, message: &ChatMessage) -> impl Future<Output = RelayResult<()>> + Send;

    /// Best effort; the connection is unusable afterwards either way.
    fn close(self) -> impl Future<Output = ()> + Send;
}
