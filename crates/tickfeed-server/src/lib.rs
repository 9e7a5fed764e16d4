//! Tickfeed server library - static assets plus a websocket time feed.
//!
//! The routes, websocket loops and server type live here rather than in
//! main.rs so integration tests can build isolated server instances.

pub mod config;
pub mod logging;
pub mod routes;
pub mod server;
pub mod state;
pub mod websocket;
