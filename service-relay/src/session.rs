use crate::{
    error::{RelayError, RelayResult},
    message::ChatMessage,
    registry::{ConnectionId, Evicted, Registry},
    router::RouterHandle,
    sink::ChatSink,
};
use futures_util::{Stream, StreamExt};
use std::{future::Future, sync::Arc, time::Duration};
use tracing::Instrument;
use valkey_client::MessageLog;

/// Durable per-user history that inbound messages are appended to.
pub trait ChatLog: Send + Sync + 'static {
    fn append(&self, message: &ChatMessage) -> impl Future<Output = RelayResult<()>> + Send;
}

impl ChatLog for MessageLog {
    async fn append(&self, message: &ChatMessage) -> RelayResult<()> {
        let payload = message.to_payload()?;
        MessageLog::append(self, &message.log_key(), &payload).await?;
        Ok(())
    }
}

/// Shared collaborators handed to every session.
pub struct SessionContext<S, L> {
    pub registry: Arc<Registry<S>>,
    pub router: RouterHandle,
    pub log: L,
    pub persist_timeout: Duration,
}

/// Drives one connection from registration to close.
///
/// The connection is registered before the first receive and removed once
/// `inbound` ends or yields an error. A failed broadcast that evicts the
/// connection ends the session too; the removal here then finds nothing and
/// the sink is not closed twice.
pub async fn run<In, S, L>(id: ConnectionId, inbound: In, outbound: S, ctx: &SessionContext<S, L>)
where
    In: Stream<Item = RelayResult<ChatMessage>>,
    S: ChatSink,
    L: ChatLog,
{
    let span = tracing::info_span!("session", connection_id = %id);
    async move {
        let Some(evicted) = ctx.registry.add(id, outbound).await else {
            tracing::warn!("connection id already registered, dropping connection");
            return;
        };
        tracing::info!("client connected");

        receive_loop(inbound, evicted, ctx).await;

        if let Some(sink) = ctx.registry.remove(id).await {
            sink.close().await;
        }
        tracing::info!("client disconnected");
    }
    .instrument(span)
    .await
}

async fn receive_loop<In, S, L>(inbound: In, mut evicted: Evicted, ctx: &SessionContext<S, L>)
where
    In: Stream<Item = RelayResult<ChatMessage>>,
    L: ChatLog,
{
    let mut inbound = std::pin::pin!(inbound);

    loop {
        let next = tokio::select! {
            biased;
            _ = &mut evicted => {
                tracing::info!("evicted after a failed send, closing connection");
                break;
            }
            next = inbound.next() => next,
        };

        let message = match next {
            Some(Ok(message)) => message,
            None | Some(Err(RelayError::PeerClosed)) => break,
            Some(Err(e)) => {
                tracing::info!(error = %e, "receive failed, closing connection");
                break;
            }
        };

        tracing::debug!(username = %message.username, "received message");
        persist(&ctx.log, &message, ctx.persist_timeout).await;

        if let Err(e) = ctx.router.submit(message) {
            tracing::error!(error = %e, "could not submit message for broadcast");
            break;
        }
    }
}

async fn persist<L: ChatLog>(log: &L, message: &ChatMessage, limit: Duration) {
    let result = match tokio::time::timeout(limit, log.append(message)).await {
        Ok(result) => result,
        Err(_) => Err(RelayError::PersistTimeout),
    };

    if let Err(e) = result {
        tracing::warn!(username = %message.username, error = %e, "could not persist message");
    }
}
