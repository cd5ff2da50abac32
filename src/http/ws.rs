use super::handlers::ErrorResponse;
use super::state::AppState;
use crate::emotion::EmotionEvent;
use crate::service::EmotionService;
use crate::session::{ClientId, FrameSource, InboundFrame, SessionChannel, SessionLoop};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// GET /ws/:client_id
/// Upgrade to an audio streaming session for `client_id`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    info!("WebSocket connection request from client {}", client_id);

    let client_id = match ClientId::new(client_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    let service = state.service.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, service))
}

/// GET /ws
/// Upgrade with a server-generated client id
pub async fn anonymous_ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let client_id = ClientId::generate();
    info!("WebSocket connection request, assigned client id {}", client_id);

    let service = state.service.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, service))
}

async fn handle_socket(socket: WebSocket, client_id: ClientId, service: EmotionService) {
    info!("New WebSocket connection established for client {}", client_id);

    let (sink, stream) = socket.split();
    let (channel, events) = SessionChannel::new();

    // Exits once the registry drops the channel or the socket stops accepting writes
    let writer = tokio::spawn(write_events(sink, events, client_id.clone()));

    let mut frames = WebSocketFrames::new(stream, client_id.clone());
    let mut session = SessionLoop::new(client_id.clone(), service);
    session.run(&mut frames, channel).await;

    if let Err(e) = writer.await {
        error!("Writer task for client {} panicked: {}", client_id, e);
    }

    info!("WebSocket connection closed for client {}", client_id);
}

/// Serialize events to JSON text frames, in channel order
async fn write_events(
    mut sink: SplitSink<WebSocket, Message>,
    mut events: mpsc::UnboundedReceiver<EmotionEvent>,
    client_id: ClientId,
) {
    while let Some(event) = events.recv().await {
        let json = match event.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize event for client {}: {}", client_id, e);
                continue;
            }
        };

        if let Err(e) = sink.send(Message::Text(json)).await {
            warn!("Failed to send event to client {}: {}", client_id, e);
            break;
        }
    }

    let _ = sink.close().await;
}

/// Read side of an axum WebSocket.
///
/// Binary messages are audio; close frames, stream end and socket errors
/// are disconnects. Text frames are ignored.
pub struct WebSocketFrames {
    stream: SplitStream<WebSocket>,
    client_id: ClientId,
}

impl WebSocketFrames {
    pub fn new(stream: SplitStream<WebSocket>, client_id: ClientId) -> Self {
        Self { stream, client_id }
    }
}

#[async_trait::async_trait]
impl FrameSource for WebSocketFrames {
    async fn receive_frame(&mut self) -> InboundFrame {
        while let Some(msg) = self.stream.next().await {
            match msg {
                Ok(Message::Binary(data)) => return InboundFrame::Audio(data),
                Ok(Message::Close(_)) => return InboundFrame::Disconnected,
                Ok(Message::Text(text)) => {
                    debug!("Ignoring text frame from client {}: {}", self.client_id, text);
                }
                // Ping/pong are answered by axum
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket error for client {}: {}", self.client_id, e);
                    return InboundFrame::Disconnected;
                }
            }
        }

        InboundFrame::Disconnected
    }
}
