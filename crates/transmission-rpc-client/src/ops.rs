//! Internal trait abstracting the RPC transport.
//!
//! This module provides the [`RpcTransport`] trait which abstracts the [`SessionClient`],
//! enabling mocking in tests.

use crate::session::{SessionClient, TransportError};

/// Internal trait that abstracts the transport operations the façade needs.
/// This allows for mocking in tests.
#[cfg_attr(test, mockall::automock)]
#[allow(async_fn_in_trait)]
pub(crate) trait RpcTransport {
    async fn execute(&mut self, body: &[u8]) -> Result<Vec<u8>, TransportError>;
    async fn download(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

impl RpcTransport for SessionClient {
    async fn execute(&mut self, body: &[u8]) -> Result<Vec<u8>, TransportError> {
        SessionClient::execute(self, body).await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        SessionClient::download(self, url).await
    }
}
