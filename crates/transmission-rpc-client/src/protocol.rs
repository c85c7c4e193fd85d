//! Wire envelopes for the daemon's JSON-RPC protocol.
//!
//! Requests serialize as `{"method": "...", "arguments": {...}}`. Each response decodes as
//! `{"arguments": {...}, "result": "..."}` with the argument shape the method returns.

use serde::{Deserialize, Serialize};
use transmission_rpc_types::{Torrent, TorrentAdded};

/// One variant per supported RPC method.
#[derive(Debug, Serialize)]
#[serde(tag = "method", content = "arguments", rename_all = "kebab-case")]
pub(crate) enum Request<'a> {
    TorrentGet {
        fields: &'a [&'a str],
    },
    TorrentRemove {
        ids: Vec<i32>,
        #[serde(rename = "delete-local-data")]
        delete_local_data: bool,
    },
    TorrentStart {
        ids: Vec<i32>,
    },
    TorrentStop {
        ids: Vec<i32>,
    },
    TorrentAdd(AddArguments<'a>),
}

impl Request<'_> {
    /// The RPC method name, as sent on the wire.
    pub(crate) fn method(&self) -> &'static str {
        match self {
            Self::TorrentGet { .. } => "torrent-get",
            Self::TorrentRemove { .. } => "torrent-remove",
            Self::TorrentStart { .. } => "torrent-start",
            Self::TorrentStop { .. } => "torrent-stop",
            Self::TorrentAdd(_) => "torrent-add",
        }
    }
}

/// Arguments of `torrent-add`. Exactly one of `metainfo` and `filename` is set.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct AddArguments<'a> {
    /// Base64 of the .torrent file contents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) metainfo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) filename: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) download_dir: Option<&'a str>,
}

/// A daemon response with method-specific arguments.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub(crate) struct Response<A> {
    #[serde(default)]
    pub(crate) arguments: A,
    #[serde(default)]
    pub(crate) result: String,
}

/// Arguments returned by `torrent-get`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TorrentGetArguments {
    #[serde(default)]
    pub(crate) torrents: Vec<Torrent>,
}

/// Arguments returned by `torrent-add`. A torrent the daemon already knows comes back as
/// `torrent-duplicate`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct TorrentAddArguments {
    #[serde(default)]
    pub(crate) torrent_added: Option<TorrentAdded>,
    #[serde(default)]
    pub(crate) torrent_duplicate: Option<TorrentAdded>,
}

/// For methods whose arguments carry nothing of interest.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct NoArguments {}
