//! Transmission RPC client implementation.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use transmission_rpc_types::{RpcError, Torrent, TorrentAdded, TorrentRpc, TorrentSource};

use crate::config::ClientConfig;
use crate::ops::RpcTransport;
use crate::protocol::{
    AddArguments, NoArguments, Request, Response, TorrentAddArguments, TorrentGetArguments,
};
use crate::session::{SessionClient, TransportError};


/// Fields requested for the basic torrent record.
pub const DEFAULT_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "leftUntilDone",
    "eta",
    "uploadRatio",
    "rateDownload",
    "rateUpload",
    "downloadDir",
];

/// TransmissionClient speaks the Transmission RPC protocol over a [`SessionClient`].
///
/// It builds the command envelopes and decodes the responses; session id handling and the
/// single retry live in the session client.
#[allow(missing_debug_implementations, private_bounds)]
pub struct TransmissionClient<T: RpcTransport = SessionClient> {
    transport: T,
}

impl TransmissionClient {
    /// Create a new TransmissionClient for the daemon at `base_url`, authenticating with Basic
    /// credentials. No request is sent until the first command.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self, RpcError> {
        let session =
            SessionClient::new(base_url, username, password).map_err(map_transport_error)?;
        Ok(Self::from_session(session))
    }

    /// Create a TransmissionClient from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, RpcError> {
        debug!("Creating Transmission client from {config:?}");
        let session = SessionClient::from_config(config).map_err(map_transport_error)?;
        Ok(Self::from_session(session))
    }

    /// Wrap an existing [`SessionClient`].
    pub fn from_session(session: SessionClient) -> Self {
        Self { transport: session }
    }

    /// The underlying session client.
    pub fn session(&self) -> &SessionClient {
        &self.transport
    }
}

#[allow(private_bounds)]
impl<T: RpcTransport> TransmissionClient<T> {
    /// Create a TransmissionClient with a custom transport implementation.
    /// This is primarily useful for testing with mocks.
    #[cfg(test)]
    pub(crate) fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Encode `request`, send it and decode the response with the argument shape `A`.
    async fn call<A>(&mut self, request: &Request<'_>) -> Result<Response<A>, RpcError>
    where
        A: DeserializeOwned + Default,
    {
        let method = request.method();
        let body = serde_json::to_vec(request).map_err(|e| {
            error!("Failed to encode {method} request: {e}");
            RpcError::Serialization(e.to_string())
        })?;

        debug!("Sending {method}");
        let output = self
            .transport
            .execute(&body)
            .await
            .map_err(map_transport_error)?;

        serde_json::from_slice(&output).map_err(|e| {
            error!(
                "Failed to decode {method} response of {} bytes: {e}",
                output.len()
            );
            debug!("Undecodable body: {}", String::from_utf8_lossy(&output));
            RpcError::Serialization(e.to_string())
        })
    }

    /// Send a command whose only output is the daemon's `result` string.
    async fn send_id_command(&mut self, request: Request<'_>) -> Result<String, RpcError> {
        let response: Response<NoArguments> = self.call(&request).await?;
        debug!("{} answered {:?}", request.method(), response.result);
        Ok(response.result)
    }

    async fn send_add(&mut self, arguments: AddArguments<'_>) -> Result<TorrentAdded, RpcError> {
        let Response { arguments, result } = self
            .call::<TorrentAddArguments>(&Request::TorrentAdd(arguments))
            .await?;

        match (arguments.torrent_added, arguments.torrent_duplicate) {
            (Some(added), _) => {
                debug!("Added {added:?}");
                Ok(added)
            }
            (None, Some(duplicate)) => {
                debug!("Torrent already present: {duplicate:?}");
                Ok(duplicate)
            }
            (None, None) => {
                error!("torrent-add returned no torrent, result: {result:?}");
                Err(RpcError::ServerError(result))
            }
        }
    }
}

#[allow(private_bounds)]
impl<T: RpcTransport> TorrentRpc for TransmissionClient<T> {
    #[instrument(skip(self))]
    async fn list_torrents(&mut self, fields: &[&str]) -> Result<Vec<Torrent>, RpcError> {
        let response: Response<TorrentGetArguments> =
            self.call(&Request::TorrentGet { fields }).await?;
        let torrents = response.arguments.torrents;
        debug!("Listed {} torrents", torrents.len());

        Ok(torrents)
    }

    #[instrument(skip(self))]
    async fn remove_torrent(
        &mut self,
        id: i32,
        delete_local_data: bool,
    ) -> Result<String, RpcError> {
        self.send_id_command(Request::TorrentRemove {
            ids: vec![id],
            delete_local_data,
        })
        .await
    }

    #[instrument(skip(self))]
    async fn start_torrent(&mut self, id: i32) -> Result<String, RpcError> {
        self.send_id_command(Request::TorrentStart { ids: vec![id] })
            .await
    }

    #[instrument(skip(self))]
    async fn stop_torrent(&mut self, id: i32) -> Result<String, RpcError> {
        self.send_id_command(Request::TorrentStop { ids: vec![id] })
            .await
    }

    #[instrument(skip(self, metainfo), fields(len = metainfo.len()))]
    async fn add_torrent_from_bytes(
        &mut self,
        metainfo: &[u8],
        download_dir: Option<&str>,
    ) -> Result<TorrentAdded, RpcError> {
        self.send_add(AddArguments {
            metainfo: Some(STANDARD.encode(metainfo)),
            filename: None,
            download_dir,
        })
        .await
    }

    #[instrument(skip(self))]
    async fn add_torrent(
        &mut self,
        source: TorrentSource,
        download_dir: Option<&str>,
    ) -> Result<TorrentAdded, RpcError> {
        match source {
            TorrentSource::Url(url) => {
                debug!("Downloading torrent from {url}");
                let metainfo = self
                    .transport
                    .download(&url)
                    .await
                    .map_err(map_transport_error)?;
                self.add_torrent_from_bytes(&metainfo, download_dir).await
            }
            TorrentSource::RemotePath(path) => {
                self.send_add(AddArguments {
                    metainfo: None,
                    filename: Some(path.as_str()),
                    download_dir,
                })
                .await
            }
        }
    }
}

/// Maps transport errors to RPC errors.
fn map_transport_error(err: TransportError) -> RpcError {
    match err {
        TransportError::Network(e) => RpcError::Network(e.to_string()),
        TransportError::InvalidUrl(msg) => RpcError::InvalidUrl(msg),
        e @ TransportError::Download { .. } => RpcError::Download(e.to_string()),
    }
}
