//! The search session state machine
//!
//! One [`Holder`] per widget instance owns the configuration, the query
//! state, the transport, the renderer, and the history sink. Every
//! user-triggered action mutates the shared query document, re-executes,
//! and the response is dispatched to exactly one renderer according to the
//! mode flags and correlation token current when it arrives.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{error, warn};

use crate::components::UiContext;
use crate::config::{Action, HolderConfig};
use crate::debounce::{DebounceMode, Debouncer};
use crate::error::{HolderError, Result};
use crate::query::document::QueryDocument;
use crate::query::path::{self, FanOut};
use crate::query::state::{QueryState, RequestToken};
use crate::query::text::fuzzify;
use crate::render::{result_summary, Renderer};
use crate::request::{RequestExecutor, Transport};
use crate::response::{dispatch, RenderRoute, SearchResponse};
use crate::url_state::{self, HistorySink};

/// Quiet period for the typeahead path
pub const SUGGEST_DEBOUNCE: Duration = Duration::from_millis(300);

/// What an add action contributes to the query
#[derive(Clone, Copy, Debug)]
pub enum AddInput<'a> {
    /// A ready-made query-string condition
    QueryString(&'a str),
    /// An exact-match term filter, e.g. from a clicked suggestion
    Filter { field: &'a str, value: &'a str },
    /// Raw search-box text: fuzzified free text, or the
    /// `options.<key>=<value>` power-user override channel
    SearchBox(&'a str),
}

/// A search session bound to one widget instance
pub struct Holder<R: Renderer> {
    config: HolderConfig,
    state: QueryState,
    transport: Box<dyn Transport>,
    renderer: R,
    history: Box<dyn HistorySink>,
    last_response: Option<SearchResponse>,
    suggest_debouncer: Debouncer<String>,
    searching: bool,
}

impl<R: Renderer> Holder<R> {
    pub fn new(
        config: HolderConfig,
        transport: Box<dyn Transport>,
        renderer: R,
        history: Box<dyn HistorySink>,
    ) -> Self {
        Self {
            config,
            state: QueryState::new(),
            transport,
            renderer,
            history,
            last_response: None,
            suggest_debouncer: Debouncer::new(DebounceMode::Delay, SUGGEST_DEBOUNCE),
            searching: false,
        }
    }

    pub fn config(&self) -> &HolderConfig {
        &self.config
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn last_response(&self) -> Option<&SearchResponse> {
        self.last_response.as_ref()
    }

    /// Snapshot handed to composed UI components
    pub fn ui_context(&self) -> UiContext<'_> {
        let (from, size) = self
            .state
            .doc()
            .map(|doc| (doc.from_offset(), doc.size()))
            .unwrap_or((0, 10));
        UiContext {
            what: &self.config.what,
            from,
            size,
            total: self.state.total,
            searching: self.searching,
            response: self.last_response.as_ref(),
        }
    }

    /// Bootstrap the session from the page URL's query string
    ///
    /// Configuration overrides are applied before the query document is
    /// built, so a `size` override takes effect even on the first request.
    /// `source` then becomes the query document verbatim and `q` overwrites
    /// the free-text clause list. With any parameter present a request runs
    /// unconditionally; with none, `execute_on_load` decides.
    pub async fn load(&mut self, query_string: &str) -> Result<()> {
        let params = url_state::parse_query_string(query_string);
        let had_params = !params.is_empty();

        for (key, value) in &params.overrides {
            self.config.apply_override(key, value);
        }
        if let Some(source) = params.source {
            self.state.set_doc(QueryDocument::from_value(source));
        }
        if let Some(q) = params.q {
            self.ensure_initialized();
            let operator = self.config.operator;
            if let Some(doc) = self.state.doc_mut() {
                doc.replace_free_text(&q, operator);
            }
        }

        if had_params || self.config.execute_on_load {
            self.execute().await?;
        }

        self.config.after.run(Action::Ui);
        Ok(())
    }

    /// Serialize the current state and issue the request
    ///
    /// Transport and decode failures never propagate: they are logged,
    /// the loading state is cleared, and the renderer gets a recoverable
    /// error instead.
    pub async fn execute(&mut self) -> Result<()> {
        self.renderer.set_loading(true, "searching...");
        self.searching = true;
        self.ensure_initialized();

        let scrolling = self.state.mode.scrolling;
        let Some(doc) = self.state.doc() else {
            return Err(HolderError::InvalidQuery("no query document".to_string()));
        };
        let payload = doc.prepare_for_send(scrolling);
        let request = RequestExecutor::build(&self.config, &payload)?;
        let token = self.state.next_token();
        self.config.after.run(Action::Execute);

        let outcome = self.transport.send(&request).await;
        self.searching = false;
        self.renderer.set_loading(false, &self.config.what);

        match outcome.and_then(SearchResponse::from_value) {
            Ok(response) => self.handle_response(response, token),
            Err(e) => {
                error!(error = %e, url = %request.url, "search request failed");
                self.state.mode = Default::default();
                self.renderer.render_error(&e);
            }
        }
        Ok(())
    }

    fn handle_response(&mut self, response: SearchResponse, token: RequestToken) {
        let route = dispatch(&mut self.state, &mut self.renderer, &response, token);

        if route == RenderRoute::Full {
            if let Some(doc) = self.state.doc() {
                let summary = result_summary(
                    &self.config.what,
                    doc.from_offset(),
                    doc.size(),
                    response.hits.total,
                );
                self.renderer.render_summary(&summary);
                self.renderer.render_filters(&doc.filter_chips());
                if self.config.push_state {
                    url_state::push_query(self.history.as_mut(), doc);
                }
            }
            self.config.after.run(Action::Render);
            self.config.results_hooks.run(&response);
            self.config.after.run(Action::Results);
        }

        if route != RenderRoute::Stale {
            self.last_response = Some(response);
        }
    }

    /// Add a condition to the query and re-execute from page 0
    pub async fn add(&mut self, input: AddInput<'_>) -> Result<()> {
        self.ensure_initialized();
        self.state.reset_to_first_page();

        let operator = self.config.operator;
        match input {
            AddInput::QueryString(q) => {
                if let Some(doc) = self.state.doc_mut() {
                    doc.push_query_string(q, operator);
                }
            }
            AddInput::Filter { field, value } => {
                if let Some(doc) = self.state.doc_mut() {
                    doc.push_term_filter(field, value);
                }
            }
            AddInput::SearchBox(text) => self.add_search_box_text(text),
        }

        self.execute().await?;
        self.config.after.run(Action::Add);
        Ok(())
    }

    /// Remove the clause at `remove_path` (a chip path) and re-execute from
    /// page 0
    pub async fn remove(&mut self, remove_path: &str) -> Result<()> {
        let rel = remove_path
            .strip_prefix("options.query.")
            .unwrap_or(remove_path);
        if let Some(doc) = self.state.doc_mut() {
            if let Err(e) = path::delete(doc.value_mut(), rel, FanOut::Disabled) {
                warn!(path = remove_path, error = %e, "remove target not found");
            }
        }
        self.state.reset_to_first_page();
        self.execute().await?;
        self.config.after.run(Action::Remove);
        Ok(())
    }

    /// Run a suggestion pass for the current search-box text
    ///
    /// The trailing free-text clause is replaced on every pass so the
    /// document only carries one in-progress condition. `submitted` (enter
    /// key) commits the text as a regular add instead.
    pub async fn suggest(&mut self, text: &str, submitted: bool) -> Result<()> {
        self.ensure_initialized();

        if submitted {
            if let Some(doc) = self.state.doc_mut() {
                doc.pop_last_must();
            }
            self.add(AddInput::SearchBox(text)).await?;
        } else {
            self.state.mode.suggesting = true;
            self.state.reset_to_first_page();
            let operator = self.config.operator;
            let shaped = if text.is_empty() {
                None
            } else {
                Some(match self.config.fuzzify {
                    Some(mode) => fuzzify(text, mode),
                    None => text.to_string(),
                })
            };
            if let Some(doc) = self.state.doc_mut() {
                doc.pop_last_must();
                if let Some(q) = shaped {
                    doc.push_query_string(&q, operator);
                }
            }
            self.execute().await?;
        }

        self.config.after.run(Action::Suggest);
        Ok(())
    }

    /// Record a keystroke for the debounced typeahead path
    pub fn queue_suggestion(&mut self, text: &str, now: Instant) {
        self.suggest_debouncer.feed(text.to_string(), now);
    }

    /// Fire the pending suggestion once its quiet period has passed
    ///
    /// Returns whether a suggestion pass ran.
    pub async fn poll_suggestions(&mut self, now: Instant) -> Result<bool> {
        match self.suggest_debouncer.poll(now) {
            Some(text) => {
                self.suggest(&text, false).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Page backward; silently ignored at the first page
    pub async fn prev(&mut self) -> Result<()> {
        self.ensure_initialized();
        if self.state.page_backward() {
            self.execute().await?;
        }
        self.config.after.run(Action::Prev);
        Ok(())
    }

    /// Page forward; silently ignored past the last page
    pub async fn next(&mut self) -> Result<()> {
        self.ensure_initialized();
        if self.state.page_forward() {
            self.execute().await?;
        }
        self.config.after.run(Action::Next);
        Ok(())
    }

    /// Jump to an explicit offset
    pub async fn set_from(&mut self, from: u64) -> Result<()> {
        self.ensure_initialized();
        if let Some(doc) = self.state.doc_mut() {
            doc.set_from_offset(from);
        }
        self.execute().await?;
        self.config.after.run(Action::From);
        Ok(())
    }

    /// Stretch the page to end at `to`
    pub async fn set_to(&mut self, to: u64) -> Result<()> {
        self.ensure_initialized();
        if let Some(doc) = self.state.doc_mut() {
            let from = doc.from_offset();
            let size = to.checked_sub(from).filter(|s| *s > 0).unwrap_or(to);
            doc.set_size(size);
        }
        self.execute().await?;
        self.config.after.run(Action::To);
        Ok(())
    }

    /// Fetch the next window for infinite scrolling; results are appended
    pub async fn scroll_results(&mut self) -> Result<()> {
        self.ensure_initialized();
        if self.state.scroll_forward() {
            self.execute().await?;
        }
        self.config.after.run(Action::ScrollResults);
        Ok(())
    }

    fn ensure_initialized(&mut self) {
        if !self.state.is_initialized() {
            self.state.initialize(
                &self.config.default_query,
                self.config.aggregations.as_ref(),
                self.config.facets.as_ref(),
                self.config.size,
            );
        }
    }

    fn add_search_box_text(&mut self, text: &str) {
        if let Some(assignment) = text.strip_prefix("options.") {
            match assignment.split_once('=') {
                Some((key, raw_value)) => {
                    let key = key.trim();
                    let raw_value = raw_value.strip_prefix(' ').unwrap_or(raw_value);
                    let value = raw_value
                        .parse::<i64>()
                        .map(Value::from)
                        .unwrap_or_else(|_| Value::String(raw_value.to_string()));
                    self.apply_option_override(key, &value);
                }
                None => warn!(input = text, "ignoring malformed option override"),
            }
        } else if !text.is_empty() {
            let operator = self.config.operator;
            let shaped = match self.config.fuzzify {
                Some(mode) => fuzzify(text, mode),
                None => text.to_string(),
            };
            if let Some(doc) = self.state.doc_mut() {
                doc.push_query_string(&shaped, operator);
            }
        }
    }

    /// Route a power-user override: `query.*` paths edit the document,
    /// anything else is a configuration option
    fn apply_option_override(&mut self, key: &str, value: &Value) {
        if let Some(doc_path) = key.strip_prefix("query.") {
            let outcome = self
                .state
                .doc_mut()
                .map(|doc| path::set(doc.value_mut(), doc_path, value, FanOut::Disabled));
            if let Some(Err(e)) = outcome {
                warn!(path = key, error = %e, "option override path not found");
            }
        } else {
            self.config.apply_override(key, value);
        }
    }
}
