//! Scheme → transport lookup.

use super::{HttpTransport, Transport};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps scheme tokens to transports. Built once, then only read.
#[derive(Clone, Default)]
pub struct TransportRegistry {
    transports: HashMap<String, Arc<dyn Transport>>,
}

/// "https" shares the "http" transport.
fn normalize(scheme: &str) -> String {
    let lower = scheme.to_ascii_lowercase();
    if lower == "https" {
        "http".to_string()
    } else {
        lower
    }
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in HTTP(S) transport.
    pub fn with_http(http: HttpTransport) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(http));
        registry
    }

    /// Register `transport` under its own scheme. The last registration for a scheme wins;
    /// the replaced transport is returned.
    pub fn register(&mut self, transport: Arc<dyn Transport>) -> Option<Arc<dyn Transport>> {
        let key = normalize(transport.scheme());
        tracing::debug!(scheme = %key, "registering transport");
        self.transports.insert(key, transport)
    }

    /// Transport for `scheme`, if any.
    pub fn lookup(&self, scheme: &str) -> Option<Arc<dyn Transport>> {
        self.transports.get(&normalize(scheme)).cloned()
    }

    /// Registered scheme tokens, sorted.
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.transports.keys().cloned().collect();
        schemes.sort();
        schemes
    }
}

impl fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}
