//! Tickfeed core - asset resolution and clock formatting for the tickfeed server.
//!
//! Nothing in here knows about HTTP. The server crate maps these types onto
//! axum handlers.

pub mod assets;
pub mod clock;
pub mod error;

pub use assets::{Asset, AssetMode, AssetPath, AssetSource, BundledSource, FilesystemSource};
pub use error::{AssetError, ServerError};

pub type Result<T> = std::result::Result<T, AssetError>;
