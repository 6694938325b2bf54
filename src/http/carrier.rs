//! Trace context extraction from inbound request headers.
//!
//! Header names are normalized before lookup: lower-cased, underscores
//! turned into hyphens, and a gateway transport prefix (`HTTP_` as added by
//! CGI-style servers) stripped. Decoding itself is left entirely to the
//! configured propagator.

use std::collections::HashMap;

use http::HeaderMap;
use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::TraceContextExt;
use opentelemetry::Context;

/// Prefixes some gateways put in front of forwarded header names.
pub const TRANSPORT_PREFIXES: &[&str] = &["http-"];

/// Normalized header name → value map handed to the propagator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCarrier {
    entries: HashMap<String, String>,
}

impl HeaderCarrier {
    /// Normalize a request's headers. Values that are not visible ASCII
    /// cannot carry trace context and are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut carrier = Self::default();
        for (name, value) in headers {
            match value.to_str() {
                Ok(value) => carrier.insert(name.as_str(), value),
                Err(_) => tracing::debug!(header = %name, "Skipping non-text header value"),
            }
        }
        carrier
    }

    /// Normalize arbitrary raw pairs. Later pairs win on key collisions.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut carrier = Self::default();
        for (name, value) in pairs {
            carrier.insert(name, value);
        }
        carrier
    }

    fn insert(&mut self, name: &str, value: &str) {
        self.entries.insert(normalize_key(name), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extractor for HeaderCarrier {
    fn get(&self, key: &str) -> Option<&str> {
        HeaderCarrier::get(self, key)
    }

    fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

/// Lower-case, map `_` to `-`, then drop a known transport prefix.
pub fn normalize_key(raw: &str) -> String {
    let key = raw.to_ascii_lowercase().replace('_', "-");
    match TRANSPORT_PREFIXES
        .iter()
        .find_map(|prefix| key.strip_prefix(prefix))
    {
        Some(bare) => bare.to_string(),
        None => key,
    }
}

/// Recover the upstream span context, if any.
///
/// Missing headers and payloads the propagator cannot decode both yield
/// `None`; the caller starts a root span instead. A payload that was present
/// but unreadable is worth a debug line, nothing more.
pub fn extract_parent(propagator: &dyn TextMapPropagator, carrier: &HeaderCarrier) -> Option<Context> {
    let cx = propagator.extract_with_context(&Context::new(), carrier);
    if cx.span().span_context().is_valid() {
        return Some(cx);
    }

    let present: Vec<&str> = propagator
        .fields()
        .filter(|field| carrier.get(field).is_some())
        .collect();
    if !present.is_empty() {
        tracing::debug!(
            headers = ?present,
            "Discarding unreadable trace context, starting root span"
        );
    }
    None
}
