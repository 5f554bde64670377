use crate::{
    error::{RelayError, RelayResult},
    message::ChatMessage,
    registry::ConnectionId,
    session::{self, ChatLog},
    sink::ChatSink,
    state::RelayState,
};
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, Stream, StreamExt, stream::SplitSink};

pub const WS_PATH: &str = "/ws";

/// Outbound half of an upgraded socket; messages go out as JSON text frames.
pub struct WsSink(SplitSink<WebSocket, Message>);

impl ChatSink for WsSink {
    async fn send(&mut self, message: &ChatMessage) -> RelayResult<()> {
        let text = serde_json::to_string(message)?;
        self.0.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn close(mut self) {
        if let Err(e) = SinkExt::close(&mut self.0).await {
            tracing::debug!(error = %e, "close frame not delivered");
        }
    }
}

pub async fn websocket_handler<L: ChatLog>(State(state): State<RelayState<L>>, ws: WebSocketUpgrade) -> Response {
    ws.on_failed_upgrade(|e| tracing::warn!(error = %e, "websocket upgrade failed"))
        .on_upgrade(move |socket| connection(socket, state))
}

async fn connection<L: ChatLog>(socket: WebSocket, state: RelayState<L>) {
    let (outbound, inbound) = socket.split();
    session::run(ConnectionId::new(), decode_frames(inbound), WsSink(outbound), &state).await;
}

fn decode_frames(
    frames: impl Stream<Item = Result<Message, axum::Error>>,
) -> impl Stream<Item = RelayResult<ChatMessage>> {
    frames.filter_map(|frame| std::future::ready(decode(frame)))
}

/// `None` for control frames the session should not see.
fn decode(frame: Result<Message, axum::Error>) -> Option<RelayResult<ChatMessage>> {
    match frame {
        Ok(Message::Text(text)) => Some(serde_json::from_str(text.as_str()).map_err(Into::into)),
        Ok(Message::Binary(bytes)) => Some(serde_json::from_slice(&bytes).map_err(Into::into)),
        Ok(Message::Ping(_) | Message::Pong(_)) => None,
        Ok(Message::Close(_)) => Some(Err(RelayError::PeerClosed)),
        Err(e) => Some(Err(e.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_frame() {
        let frame = Message::Text(r#"{"username":"alice","text":"hi","timestamp":"t1"}"#.into());
        let message = decode(Ok(frame)).unwrap().unwrap();

        assert_eq!(message, ChatMessage::new("alice", "hi", "t1"));
    }

    #[test]
    fn test_decode_binary_frame() {
        let frame = Message::Binary(br#"{"username":"bob","text":"","timestamp":"t2"}"#.to_vec().into());
        let message = decode(Ok(frame)).unwrap().unwrap();

        assert_eq!(message, ChatMessage::new("bob", "", "t2"));
    }

    #[test]
    fn test_decode_control_frames() {
        assert!(decode(Ok(Message::Ping(Vec::new().into()))).is_none());
        assert!(decode(Ok(Message::Pong(Vec::new().into()))).is_none());
        assert!(matches!(decode(Ok(Message::Close(None))), Some(Err(RelayError::PeerClosed))));
    }

    #[test]
    fn test_decode_malformed_frame() {
        let frame = Message::Text(r#"{"username":"alice"}"#.into());
        assert!(matches!(decode(Ok(frame)), Some(Err(RelayError::Serialization(_)))));
    }
}
