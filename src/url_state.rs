//! URL state bridge
//!
//! On load, query state is hydrated from URL parameters: `source` carries a
//! whole query document as URL-encoded JSON, `q` a bare free-text override,
//! and any other key is a configuration override. After a full render the
//! serialized document is written back through a [`HistorySink`] so the
//! address bar stays shareable.
//!
//! Malformed parameter JSON is ignored with a diagnostic rather than
//! aborting hydration, and a failing history sink downgrades to a logged
//! no-op.

use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::error::Result;
use crate::query::document::QueryDocument;

/// Recognized URL parameters
#[derive(Clone, Debug, Default)]
pub struct UrlParams {
    /// Full query document (`source=<url-encoded JSON>`)
    pub source: Option<Value>,
    /// Bare free-text override (`q=...`)
    pub q: Option<String>,
    /// Everything else, applied as configuration overrides in order
    pub overrides: Vec<(String, Value)>,
}

impl UrlParams {
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.q.is_none() && self.overrides.is_empty()
    }
}

/// Parse a URL query string (with or without the leading `?`)
pub fn parse_query_string(query_string: &str) -> UrlParams {
    let trimmed = query_string.trim_start_matches('?');
    let mut params = UrlParams::default();

    for (key, value) in form_urlencoded::parse(trimmed.as_bytes()) {
        match key.as_ref() {
            "source" => match serde_json::from_str(&value) {
                Ok(doc) => params.source = Some(doc),
                Err(e) => warn!(error = %e, "ignoring malformed 'source' parameter"),
            },
            "q" => params.q = Some(value.into_owned()),
            _ => params
                .overrides
                .push((key.into_owned(), decode_scalar(&value))),
        }
    }

    params
}

/// Decode an override value: JSON where it parses, plain string otherwise
fn decode_scalar(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Seam to the browser history (or any other address-bar equivalent)
pub trait HistorySink {
    /// Replace the current address-bar state with `query_string`
    fn replace(&mut self, query_string: &str) -> Result<()>;
}

/// Sink for contexts without a usable history API
#[derive(Clone, Debug, Default)]
pub struct NoopHistory;

impl HistorySink for NoopHistory {
    fn replace(&mut self, query_string: &str) -> Result<()> {
        debug!(query_string, "history unavailable; dropping push-state");
        Ok(())
    }
}

/// In-memory sink recording every pushed state
#[derive(Clone, Debug, Default)]
pub struct MemoryHistory {
    pub entries: Vec<String>,
}

impl HistorySink for MemoryHistory {
    fn replace(&mut self, query_string: &str) -> Result<()> {
        self.entries.push(query_string.to_string());
        Ok(())
    }
}

/// Serialize the query document into the sink
///
/// Sink failures are logged and swallowed; push-state must never take the
/// widget down.
pub fn push_query(sink: &mut dyn HistorySink, doc: &QueryDocument) {
    let serialized = form_urlencoded::Serializer::new(String::new())
        .append_pair("source", &doc.as_value().to_string())
        .finish();
    let query_string = format!("?{serialized}");
    if let Err(e) = sink.replace(&query_string) {
        warn!(error = %e, "push-state failed; continuing without history update");
    }
}
