use crate::{
    api::ws::WsSink,
    registry::Registry,
    router::BroadcastRouter,
    session::{ChatLog, SessionContext},
};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;

pub type RelayState<L> = Arc<SessionContext<WsSink, L>>;

/// Creates the registry, spawns the broadcast router and wraps both with `log`.
///
/// The router stops once the returned state and every session holding it are dropped.
pub fn init_state<L: ChatLog>(log: L, send_timeout: Duration, persist_timeout: Duration) -> (RelayState<L>, JoinHandle<()>) {
    let registry = Arc::new(Registry::new());
    let (router, broadcast) = BroadcastRouter::new(registry.clone(), send_timeout);

    let state = SessionContext {
        registry,
        router,
        log,
        persist_timeout,
    };

    (Arc::new(state), broadcast.spawn())
}
