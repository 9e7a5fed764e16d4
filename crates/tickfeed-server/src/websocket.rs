//! WebSocket time feed.
//!
//! Every connection gets a writer task that pushes the local time once per
//! tick and a reader that logs whatever the client sends. Whichever side
//! finishes first ends the connection: a finished reader aborts the writer,
//! a finished writer drops the reader. No error is ever sent to the client.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::BoxError;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tickfeed_core::clock;
use tokio::task::JoinError;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Period between outbound timestamp frames (~62.5 Hz).
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Why a connection left the open state.
#[derive(Debug, Error)]
pub enum Closed {
    #[error("closed by peer{}", close_detail(.0))]
    PeerClosed(Option<CloseFrame>),

    #[error("stream ended")]
    StreamEnded,

    #[error("read error: {0}")]
    ReadFailed(#[source] axum::Error),

    #[error("write error: {0}")]
    WriteFailed(#[source] axum::Error),

    #[error("writer task failed: {0}")]
    WriterFailed(#[source] JoinError),
}

fn close_detail(frame: &Option<CloseFrame>) -> String {
    match frame {
        Some(frame) if frame.reason.as_str().is_empty() => format!(" ({})", frame.code),
        Some(frame) => format!(" ({} {})", frame.code, frame.reason.as_str()),
        None => String::new(),
    }
}

pub async fn handle_websocket(socket: WebSocket, peer: SocketAddr) -> Closed {
    info!(target: "tickfeed::ws", "WebSocket client {} connected", peer);
    let (sink, stream) = socket.split();
    run_feed(sink, stream, peer).await
}

/// Drive one connection until either direction finishes.
pub async fn run_feed<Si, St>(sink: Si, stream: St, peer: SocketAddr) -> Closed
where
    Si: Sink<Message> + Unpin + Send + 'static,
    Si::Error: Into<BoxError>,
    St: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let mut writer = tokio::spawn(write_ticks(sink, peer));

    tokio::select! {
        closed = read_frames(stream, peer) => {
            writer.abort();
            closed
        }
        joined = &mut writer => joined.unwrap_or_else(Closed::WriterFailed),
    }
}

/// Send a timestamp frame every [`TICK_INTERVAL`] until a send fails.
pub async fn write_ticks<Si>(mut sink: Si, peer: SocketAddr) -> Closed
where
    Si: Sink<Message> + Unpin,
    Si::Error: Into<BoxError>,
{
    let mut ticker = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let stamp = clock::now_stamp();
        if let Err(e) = sink.send(Message::Text(stamp.into())).await {
            let closed = Closed::WriteFailed(axum::Error::new(e));
            warn!(target: "tickfeed::ws", "Write error for {}: {}", peer, closed);
            return closed;
        }
    }
}

/// Log every data frame from the client until the stream closes or fails.
pub async fn read_frames<St>(mut stream: St, peer: SocketAddr) -> Closed
where
    St: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                info!(target: "tickfeed::ws", "Message from {}: {}", peer, text.as_str());
            }
            Ok(Message::Binary(data)) => {
                let text = String::from_utf8_lossy(&data);
                info!(target: "tickfeed::ws", "Message from {}: {}", peer, text);
            }
            Ok(Message::Ping(_)) => trace!(target: "tickfeed::ws::control", "Ping from {}", peer),
            Ok(Message::Pong(_)) => trace!(target: "tickfeed::ws::control", "Pong from {}", peer),
            Ok(Message::Close(frame)) => {
                let closed = Closed::PeerClosed(frame);
                info!(target: "tickfeed::ws", "Read error for {}: {}", peer, closed);
                return closed;
            }
            Err(e) => {
                let closed = Closed::ReadFailed(e);
                warn!(target: "tickfeed::ws", "Read error for {}: {}", peer, closed);
                return closed;
            }
        }
    }

    debug!(target: "tickfeed::ws", "Read stream for {} ended", peer);
    Closed::StreamEnded
}
