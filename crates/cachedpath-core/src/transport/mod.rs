//! Pluggable transports: one implementation per URI scheme.
//!
//! A new remote scheme integrates by implementing [`Transport`] and registering it
//! in a [`TransportRegistry`] before the first resolution.

pub mod http;
mod registry;

pub use crate::retry::TransferError;
pub use http::{HttpClientConfig, HttpTransport};
pub use registry::TransportRegistry;

use std::collections::HashMap;
use std::io::Write;

/// Request headers passed verbatim to the transport (credentials included).
pub type Headers = HashMap<String, String>;

/// Fetch and probe operations for one URI scheme.
pub trait Transport: Send + Sync {
    /// Scheme token this transport serves (e.g. "http").
    fn scheme(&self) -> &str;

    /// Download `uri` into `sink`. Returns the number of body bytes written.
    fn fetch_into(&self, uri: &str, sink: &mut dyn Write, headers: &Headers) -> Result<u64, TransferError>;

    /// Declared size in bytes, or 0 if unknown.
    fn probe_size(&self, uri: &str, headers: &Headers) -> Result<u64, TransferError>;

    /// Opaque revision token (ETag, else Last-Modified), or empty if none.
    fn probe_revision(&self, uri: &str, headers: &Headers) -> Result<String, TransferError>;
}
