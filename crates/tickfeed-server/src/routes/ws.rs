//! WebSocket route handler.

use crate::websocket::handle_websocket;
use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocket, WebSocketUpgrade},
        ConnectInfo,
    },
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

pub async fn upgrade(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    // Not a websocket handshake: answer with the rejection status, no log.
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    ws.on_failed_upgrade(move |e| {
        tracing::error!(target: "tickfeed::ws", "WebSocket upgrade failed for {}: {}", peer, e);
    })
    .on_upgrade(move |socket| handle_connection(socket, peer))
}

async fn handle_connection(socket: WebSocket, peer: SocketAddr) {
    let closed = handle_websocket(socket, peer).await;
    tracing::info!(target: "tickfeed::ws", "WebSocket client {} disconnected ({})", peer, closed);
}
