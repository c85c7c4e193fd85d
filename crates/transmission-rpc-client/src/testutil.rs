//! Shared test utilities and fixtures.

use serde_json::Value;

pub(crate) const TORRENT_GET_RESPONSE: &str = r#"{"arguments":{"torrents":[{"eta":-1,"id":5,
  "leftUntilDone":0,"name":"Test",
  "rateDownload":0,"rateUpload":0,"status":6,"uploadRatio":0.3114}]},
  "result":"success"}"#;

pub(crate) const SUCCESS_RESPONSE: &str = r#"{"arguments":{},"result":"success"}"#;

pub(crate) const TORRENT_ADDED_RESPONSE: &str = r#"{"arguments":{"torrent-added":{
  "hashString":"875a2d90068c32b4ce7992eb0b1b4c4e4d5b4c5e","id":23,"name":"Test Name"}},
  "result":"success"}"#;

pub(crate) const TORRENT_DUPLICATE_RESPONSE: &str = r#"{"arguments":{"torrent-duplicate":{
  "hashString":"875a2d90068c32b4ce7992eb0b1b4c4e4d5b4c5e","id":23,"name":"Test Name"}},
  "result":"success"}"#;

/// A minimal bencoded metainfo dictionary.
pub(crate) const METAINFO: &[u8] = b"d8:announce21:http://tracker.local/4:infod4:name4:testee";

/// Parse a request body sent to the transport.
pub(crate) fn request_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("request body is not JSON")
}
