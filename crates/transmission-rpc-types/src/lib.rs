//! # Transmission RPC Types
//!
//! This crate defines the domain types, the error type and the [`TorrentRpc`] trait shared by
//! Transmission RPC clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for Transmission RPC operations.
#[derive(Error, Debug)]
pub enum RpcError {
    /// Network-related errors (connection failures, timeouts, etc.)
    #[error("network error: {0}")]
    Network(String),

    /// The daemon URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A request could not be encoded, or a response body was not the expected JSON.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The daemon answered without the expected payload; carries its `result` string.
    #[error("server error: {0}")]
    ServerError(String),

    /// Fetching a remote torrent file failed.
    #[error("download error: {0}")]
    Download(String),
}

/// Where a torrent to add comes from.
///
/// Choosing between the variants is up to the caller; nothing is inferred from the string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentSource {
    /// A URL the client downloads itself before uploading the metainfo.
    Url(String),
    /// A path (or URL) handed to the daemon as `filename`, resolved on the daemon side.
    RemotePath(String),
}

/// The command surface of a Transmission daemon.
///
/// Methods take `&mut self` because the underlying session id is replaced whenever the daemon
/// rotates it.
#[allow(async_fn_in_trait)]
pub trait TorrentRpc {
    /// List torrents, asking the daemon only for `fields`. Fields not requested keep their
    /// default values.
    async fn list_torrents(&mut self, fields: &[&str]) -> Result<Vec<Torrent>, RpcError>;
    /// Remove a torrent by id. If `delete_local_data` is true, the downloaded data is deleted
    /// too. Returns the daemon's `result` string.
    async fn remove_torrent(&mut self, id: i32, delete_local_data: bool)
    -> Result<String, RpcError>;
    /// Start a torrent by id. Returns the daemon's `result` string.
    async fn start_torrent(&mut self, id: i32) -> Result<String, RpcError>;
    /// Stop a torrent by id. Returns the daemon's `result` string.
    async fn stop_torrent(&mut self, id: i32) -> Result<String, RpcError>;
    /// Add a torrent from raw metainfo bytes.
    ///
    /// If the daemon already has the torrent, the existing entry from `torrent-duplicate` is
    /// returned as `Ok`, indistinguishable from a fresh add. A reply carrying neither
    /// `torrent-added` nor `torrent-duplicate` fails with [`RpcError::ServerError`] holding the
    /// daemon's `result` string, e.g. `"invalid or corrupt torrent file"`.
    async fn add_torrent_from_bytes(
        &mut self,
        metainfo: &[u8],
        download_dir: Option<&str>,
    ) -> Result<TorrentAdded, RpcError>;
    /// Add a torrent from a URL fetched by the client, or from a path resolved by the daemon.
    ///
    /// Duplicates and rejections are reported as for
    /// [`add_torrent_from_bytes`](TorrentRpc::add_torrent_from_bytes). A URL that cannot be
    /// fetched fails with [`RpcError::Download`] before anything is sent to the daemon.
    async fn add_torrent(
        &mut self,
        source: TorrentSource,
        download_dir: Option<&str>,
    ) -> Result<TorrentAdded, RpcError>;
}

// Field names below follow the Transmission RPC spec exactly.

/// Torrent information returned by `torrent-get`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Torrent {
    pub id: i32,

    pub name: String,

    pub status: i32,

    pub left_until_done: i64,

    pub eta: i64,

    pub upload_ratio: f64,

    pub rate_download: i64,

    pub rate_upload: i64,

    pub download_dir: String,

    // Only present when requested, and only on daemons that know them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_finished: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_done: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_ratio_mode: Option<i32>,
}

impl Torrent {
    /// The decoded [`TorrentStatus`], if the code is one the daemon documents.
    pub fn torrent_status(&self) -> Option<TorrentStatus> {
        TorrentStatus::from_code(self.status)
    }
}

/// Torrent status codes as reported in the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TorrentStatus {
    Stopped,
    QueuedToVerify,
    Verifying,
    QueuedToDownload,
    Downloading,
    QueuedToSeed,
    Seeding,
}

impl TorrentStatus {
    /// Map a wire status code to a [`TorrentStatus`].
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Stopped),
            1 => Some(Self::QueuedToVerify),
            2 => Some(Self::Verifying),
            3 => Some(Self::QueuedToDownload),
            4 => Some(Self::Downloading),
            5 => Some(Self::QueuedToSeed),
            6 => Some(Self::Seeding),
            _ => None,
        }
    }
}

/// A torrent accepted by `torrent-add`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TorrentAdded {
    pub hash_string: String,

    pub id: i32,

    pub name: String,
}
