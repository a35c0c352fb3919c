//! Result response model and dispatcher
//!
//! A response is a hit container plus an optional aggregation section. The
//! dispatcher routes each accepted response to exactly one renderer based on
//! the mode flags current when it arrives, after validating the response's
//! correlation token against the most recently issued request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::query::state::{QueryState, RequestToken};
use crate::render::Renderer;

/// A search backend response
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Hits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Aggregations>,
}

/// The ordered hit container
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub hits: Vec<Value>,
}

/// Facet name to bucket list
pub type Aggregations = BTreeMap<String, FacetResult>;

/// One facet's bucketed counts
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FacetResult {
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

/// A single facet bucket
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bucket {
    pub key: Value,
    pub doc_count: u64,
}

impl Bucket {
    /// Bucket key as display text (keys may be strings or numbers)
    pub fn key_label(&self) -> String {
        match self.key.as_str() {
            Some(s) => s.to_string(),
            None => self.key.to_string(),
        }
    }
}

impl SearchResponse {
    /// Decode a raw transport payload
    pub fn from_value(raw: Value) -> Result<Self> {
        Ok(serde_json::from_value(raw)?)
    }
}

/// Which renderer a response was routed to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderRoute {
    /// Full render: result list replacement plus summary, chips, push-state
    Full,
    /// Scroll continuation: results appended only
    Scroll,
    /// Typeahead pass: suggestion list only
    Suggest,
    /// Superseded by a newer request; nothing rendered
    Stale,
}

/// Route a response to exactly one renderer
///
/// Priority order: a stale token drops the response outright; otherwise
/// `scrolling` appends, `suggesting` renders suggestions, and with neither
/// flag set the full result list replaces the page. The matching flag is
/// cleared only after its renderer returns. The caller finishes the full
/// route (summary, chips, push-state, hooks) itself.
pub fn dispatch(
    state: &mut QueryState,
    renderer: &mut dyn Renderer,
    response: &SearchResponse,
    token: RequestToken,
) -> RenderRoute {
    if token != state.latest_token() {
        debug!(?token, latest = ?state.latest_token(), "dropping stale response");
        return RenderRoute::Stale;
    }

    if state.mode.scrolling {
        renderer.append_results(response);
        state.mode.scrolling = false;
        state.total = response.hits.total;
        return RenderRoute::Scroll;
    }

    if state.mode.suggesting {
        let empty = Aggregations::new();
        renderer.render_suggestions(response.aggregations.as_ref().unwrap_or(&empty));
        state.mode.suggesting = false;
        return RenderRoute::Suggest;
    }

    renderer.render_results(response);
    state.total = response.hits.total;
    RenderRoute::Full
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;
    use serde_json::json;

    fn response_with_total(total: u64) -> SearchResponse {
        SearchResponse::from_value(json!({
            "hits": { "total": total, "hits": [{"_id": "a"}, {"_id": "b"}] },
            "aggregations": {
                "keywords": { "buckets": [ { "key": "rust", "doc_count": 7 } ] }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_decode_response() {
        let response = response_with_total(12);
        assert_eq!(response.hits.total, 12);
        assert_eq!(response.hits.hits.len(), 2);
        let aggs = response.aggregations.unwrap();
        assert_eq!(aggs["keywords"].buckets[0].key_label(), "rust");
        assert_eq!(aggs["keywords"].buckets[0].doc_count, 7);
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let response = SearchResponse::from_value(json!({
            "took": 3,
            "_shards": { "total": 5 },
            "hits": { "total": 1, "hits": [] }
        }))
        .unwrap();
        assert_eq!(response.hits.total, 1);
    }

    #[test]
    fn test_dispatch_full() {
        let mut state = QueryState::new();
        let token = state.next_token();
        let mut renderer = RecordingRenderer::default();
        let route = dispatch(&mut state, &mut renderer, &response_with_total(12), token);
        assert_eq!(route, RenderRoute::Full);
        assert_eq!(state.total, 12);
        assert_eq!(renderer.results_rendered, 1);
        assert_eq!(renderer.results_appended, 0);
        assert_eq!(renderer.suggestions_rendered, 0);
    }

    #[test]
    fn test_dispatch_suggesting_is_exclusive() {
        let mut state = QueryState::new();
        state.mode.suggesting = true;
        let token = state.next_token();
        let mut renderer = RecordingRenderer::default();
        let route = dispatch(&mut state, &mut renderer, &response_with_total(12), token);
        assert_eq!(route, RenderRoute::Suggest);
        assert_eq!(renderer.suggestions_rendered, 1);
        assert_eq!(renderer.results_rendered, 0);
        assert_eq!(renderer.results_appended, 0);
        assert!(!state.mode.suggesting);
    }

    #[test]
    fn test_dispatch_scrolling_appends() {
        let mut state = QueryState::new();
        state.mode.scrolling = true;
        let token = state.next_token();
        let mut renderer = RecordingRenderer::default();
        let route = dispatch(&mut state, &mut renderer, &response_with_total(12), token);
        assert_eq!(route, RenderRoute::Scroll);
        assert_eq!(renderer.results_appended, 1);
        assert_eq!(renderer.results_rendered, 0);
        assert!(!state.mode.scrolling);
    }

    #[test]
    fn test_dispatch_drops_stale_token() {
        let mut state = QueryState::new();
        let stale = state.next_token();
        let _newer = state.next_token();
        let mut renderer = RecordingRenderer::default();
        let route = dispatch(&mut state, &mut renderer, &response_with_total(12), stale);
        assert_eq!(route, RenderRoute::Stale);
        assert_eq!(renderer.results_rendered, 0);
        assert_eq!(renderer.results_appended, 0);
        assert_eq!(renderer.suggestions_rendered, 0);
    }

    #[test]
    fn test_dispatch_suggest_without_aggregations() {
        let mut state = QueryState::new();
        state.mode.suggesting = true;
        let token = state.next_token();
        let mut renderer = RecordingRenderer::default();
        let response = SearchResponse::from_value(json!({
            "hits": { "total": 0, "hits": [] }
        }))
        .unwrap();
        let route = dispatch(&mut state, &mut renderer, &response, token);
        assert_eq!(route, RenderRoute::Suggest);
        assert_eq!(renderer.suggestions_rendered, 1);
    }
}
