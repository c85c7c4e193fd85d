//! # Transmission RPC client.
//!
//! Two layers: [`SessionClient`] posts raw request bodies to the daemon and keeps its session id
//! current, and [`TransmissionClient`] builds the typed commands on top of it.
//!
//! usage:
//!
//! ```rust,ignore
//! use transmission_rpc_client::{ClientConfig, DEFAULT_FIELDS, TransmissionClient};
//! use transmission_rpc_types::{TorrentRpc, TorrentSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = TransmissionClient::from_config(&ClientConfig::from_env())?;
//!     let added = client
//!         .add_torrent(TorrentSource::RemotePath("/srv/torrents/file.torrent".into()), None)
//!         .await?;
//!     println!("Added torrent: {:?}", added);
//!     for torrent in client.list_torrents(DEFAULT_FIELDS).await? {
//!         println!("{} {}", torrent.id, torrent.name);
//!     }
//!     Ok(())
//! }
//! ```
//!

mod client;
mod config;
mod ops;
mod protocol;
mod session;

#[cfg(test)]
mod testutil;

// Only the integration tests need these.
#[cfg(test)]
use {axum as _, tracing_subscriber as _};

pub use client::{DEFAULT_FIELDS, TransmissionClient};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use session::{RPC_PATH, SESSION_ID_HEADER, SessionClient, TransportError};
