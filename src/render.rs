//! Renderer contract and a plain-text implementation
//!
//! Markup is an external templating concern. The core only requires that a
//! renderer can replace the result list, append to it, show facet
//! suggestions and filter chips, and reflect the loading and error states.
//! [`TextRenderer`] is a minimal implementation used by the demo binary.

use crate::error::HolderError;
use crate::query::document::FilterChip;
use crate::response::{Aggregations, SearchResponse};

/// Rendering seam between the session and the page
pub trait Renderer {
    /// Toggle the loading indicator and the search-box placeholder text
    fn set_loading(&mut self, loading: bool, placeholder: &str);

    /// Replace the result list with the hits of a full response
    fn render_results(&mut self, response: &SearchResponse);

    /// Append the hits of a scroll-continuation response
    fn append_results(&mut self, response: &SearchResponse);

    /// Show one clickable suggestion per facet bucket
    fn render_suggestions(&mut self, aggregations: &Aggregations);

    /// Show one removable chip per active clause
    fn render_filters(&mut self, chips: &[FilterChip]);

    /// Show the result-count summary line
    fn render_summary(&mut self, summary: &str);

    /// Surface a recoverable failure; the UI must never stay stuck in the
    /// loading state
    fn render_error(&mut self, error: &HolderError);
}

/// The result-count summary line
///
/// `articles found 10 to 20 of 95` when paged in, otherwise
/// `articles found 10 of 95`.
pub fn result_summary(what: &str, from: u64, size: u64, total: u64) -> String {
    if from != 0 {
        format!("{what} found {from} to {} of {total}", from.saturating_add(size))
    } else {
        format!("{what} found {} of {total}", size.min(total))
    }
}

/// Renderer that accumulates plain-text lines
#[derive(Debug, Default)]
pub struct TextRenderer {
    lines: Vec<String>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything rendered so far
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl Renderer for TextRenderer {
    fn set_loading(&mut self, loading: bool, placeholder: &str) {
        if loading {
            self.lines.push(format!("[{placeholder}]"));
        }
    }

    fn render_results(&mut self, response: &SearchResponse) {
        for hit in &response.hits.hits {
            self.lines.push(hit.to_string());
        }
    }

    fn append_results(&mut self, response: &SearchResponse) {
        self.render_results(response);
    }

    fn render_suggestions(&mut self, aggregations: &Aggregations) {
        for (facet, result) in aggregations {
            for bucket in &result.buckets {
                self.lines
                    .push(format!("{facet}: {} ({})", bucket.key_label(), bucket.doc_count));
            }
        }
    }

    fn render_filters(&mut self, chips: &[FilterChip]) {
        for chip in chips {
            self.lines.push(format!("[x] {}", chip.label));
        }
    }

    fn render_summary(&mut self, summary: &str) {
        self.lines.push(summary.to_string());
    }

    fn render_error(&mut self, error: &HolderError) {
        self.lines.push(format!("search failed: {error}"));
    }
}

/// Renderer that counts calls, for unit tests across the crate
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub results_rendered: usize,
    pub results_appended: usize,
    pub suggestions_rendered: usize,
    pub filters_rendered: usize,
    pub summaries: Vec<String>,
    pub errors: Vec<String>,
    pub loading: Vec<bool>,
}

#[cfg(test)]
impl Renderer for RecordingRenderer {
    fn set_loading(&mut self, loading: bool, _placeholder: &str) {
        self.loading.push(loading);
    }

    fn render_results(&mut self, _response: &SearchResponse) {
        self.results_rendered += 1;
    }

    fn append_results(&mut self, _response: &SearchResponse) {
        self.results_appended += 1;
    }

    fn render_suggestions(&mut self, _aggregations: &Aggregations) {
        self.suggestions_rendered += 1;
    }

    fn render_filters(&mut self, _chips: &[FilterChip]) {
        self.filters_rendered += 1;
    }

    fn render_summary(&mut self, summary: &str) {
        self.summaries.push(summary.to_string());
    }

    fn render_error(&mut self, error: &HolderError) {
        self.errors.push(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_first_page() {
        assert_eq!(result_summary("articles", 0, 10, 95), "articles found 10 of 95");
    }

    #[test]
    fn test_summary_fewer_hits_than_page() {
        assert_eq!(result_summary("articles", 0, 10, 3), "articles found 3 of 3");
    }

    #[test]
    fn test_summary_paged_in() {
        assert_eq!(
            result_summary("articles", 10, 10, 95),
            "articles found 10 to 20 of 95"
        );
    }

    #[test]
    fn test_summary_near_max_offset() {
        assert_eq!(
            result_summary("articles", u64::MAX, 10, 5),
            format!("articles found {} to {} of 5", u64::MAX, u64::MAX)
        );
    }

    #[test]
    fn test_text_renderer_suggestions() {
        let mut renderer = TextRenderer::new();
        let aggregations: Aggregations = serde_json::from_value(json!({
            "keywords": { "buckets": [ { "key": "rust", "doc_count": 7 } ] }
        }))
        .unwrap();
        renderer.render_suggestions(&aggregations);
        assert_eq!(renderer.take_lines(), vec!["keywords: rust (7)"]);
    }
}
