//! Widget configuration
//!
//! One owned configuration struct per widget instance. Defaults mirror the
//! classic widget: page size 10, wildcard fuzzification, AND operator,
//! execute on load, push-state on, infinite scroll off.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::query::document::default_template;
use crate::query::text::{Fuzzify, Operator};
use crate::request::Method;
use crate::response::SearchResponse;

/// User-triggered actions, used to key post-action callbacks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Ui,
    Add,
    Remove,
    Execute,
    Render,
    Results,
    Prev,
    Next,
    From,
    To,
    Suggest,
    ScrollResults,
}

/// Callback run after an action completes
pub type AfterFn = Box<dyn FnMut() + Send>;

/// Post-action callbacks keyed by the action they follow
#[derive(Default)]
pub struct AfterHooks {
    hooks: HashMap<Action, AfterFn>,
}

impl AfterHooks {
    pub fn set(&mut self, action: Action, hook: AfterFn) {
        self.hooks.insert(action, hook);
    }

    /// Run the hook for `action`, if one is configured
    pub fn run(&mut self, action: Action) {
        if let Some(hook) = self.hooks.get_mut(&action) {
            hook();
        }
    }
}

impl fmt::Debug for AfterHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.hooks.keys()).finish()
    }
}

/// Callback given every full response
pub type ResultsFn = Box<dyn FnMut(&SearchResponse) + Send>;

/// Result handlers run after the full render pipeline
///
/// Either a single function or a named set; with a named set every handler
/// runs for every response.
#[derive(Default)]
pub enum ResultsHooks {
    #[default]
    None,
    Single(ResultsFn),
    Named(Vec<(String, ResultsFn)>),
}

impl ResultsHooks {
    pub fn run(&mut self, response: &SearchResponse) {
        match self {
            ResultsHooks::None => {}
            ResultsHooks::Single(hook) => hook(response),
            ResultsHooks::Named(hooks) => {
                for (_, hook) in hooks {
                    hook(response);
                }
            }
        }
    }
}

impl fmt::Debug for ResultsHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultsHooks::None => f.write_str("None"),
            ResultsHooks::Single(_) => f.write_str("Single"),
            ResultsHooks::Named(hooks) => f
                .debug_list()
                .entries(hooks.iter().map(|(name, _)| name))
                .finish(),
        }
    }
}

/// Configuration for one widget instance
#[derive(Debug)]
pub struct HolderConfig {
    /// Label used in the result-count summary
    pub what: String,
    /// CSS namespace scoping all DOM selectors of this instance
    pub css_class: String,
    /// Search endpoint
    pub url: String,
    pub method: Method,
    /// Expected response encoding
    pub datatype: String,
    /// Initial query document template
    pub default_query: Value,
    /// Aggregation requests merged into the template at initialization
    pub aggregations: Option<Value>,
    /// Facet requests, for older backends that predate aggregations
    pub facets: Option<Value>,
    /// Initial page size override
    pub size: Option<u64>,
    /// Default boolean operator for search-box text
    pub operator: Operator,
    /// Fuzzy-match marker for bare terms; `None` disables fuzzification
    pub fuzzify: Option<Fuzzify>,
    /// Run an initial request with no user input
    pub execute_on_load: bool,
    /// Write the serialized query into browser history after full renders
    pub push_state: bool,
    /// Infinite-scroll continuation instead of explicit paging
    pub scroll: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub after: AfterHooks,
    pub results_hooks: ResultsHooks,
}

impl Default for HolderConfig {
    fn default() -> Self {
        Self {
            what: "search...".to_string(),
            css_class: "holder".to_string(),
            url: "http://localhost:9200/_search".to_string(),
            method: Method::Get,
            datatype: "json".to_string(),
            default_query: default_template(),
            aggregations: None,
            facets: None,
            size: None,
            operator: Operator::And,
            fuzzify: Some(Fuzzify::Wildcard),
            execute_on_load: true,
            push_state: true,
            scroll: false,
            username: None,
            password: None,
            after: AfterHooks::default(),
            results_hooks: ResultsHooks::default(),
        }
    }
}

impl HolderConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_what(mut self, what: impl Into<String>) -> Self {
        self.what = what.into();
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_aggregations(mut self, aggregations: Value) -> Self {
        self.aggregations = Some(aggregations);
        self
    }

    pub fn with_facets(mut self, facets: Value) -> Self {
        self.facets = Some(facets);
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_fuzzify(mut self, fuzzify: Option<Fuzzify>) -> Self {
        self.fuzzify = fuzzify;
        self
    }

    pub fn with_execute_on_load(mut self, execute_on_load: bool) -> Self {
        self.execute_on_load = execute_on_load;
        self
    }

    pub fn with_push_state(mut self, push_state: bool) -> Self {
        self.push_state = push_state;
        self
    }

    pub fn with_scroll(mut self, scroll: bool) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_after(mut self, action: Action, hook: AfterFn) -> Self {
        self.after.set(action, hook);
        self
    }

    pub fn with_results_hooks(mut self, hooks: ResultsHooks) -> Self {
        self.results_hooks = hooks;
        self
    }

    /// Apply a named option override, from URL parameters or the search-box
    /// power-user channel
    ///
    /// Unrecognized keys are ignored with a diagnostic.
    pub fn apply_override(&mut self, key: &str, value: &Value) {
        match key {
            "what" => {
                if let Some(s) = value.as_str() {
                    self.what = s.to_string();
                }
            }
            "class" => {
                if let Some(s) = value.as_str() {
                    self.css_class = s.to_string();
                }
            }
            "url" => {
                if let Some(s) = value.as_str() {
                    self.url = s.to_string();
                }
            }
            "type" => match value.as_str().map(str::to_ascii_uppercase).as_deref() {
                Some("GET") => self.method = Method::Get,
                Some("POST") => self.method = Method::Post,
                other => debug!(?other, "ignoring unrecognized request type"),
            },
            "datatype" => {
                if let Some(s) = value.as_str() {
                    self.datatype = s.to_string();
                }
            }
            "defaultquery" => self.default_query = value.clone(),
            "aggregations" => self.aggregations = Some(value.clone()),
            "facets" => self.facets = Some(value.clone()),
            "size" => {
                if let Some(size) = value.as_u64() {
                    self.size = Some(size);
                }
            }
            "operator" => match value.as_str() {
                Some("AND") => self.operator = Operator::And,
                Some("OR") => self.operator = Operator::Or,
                other => debug!(?other, "ignoring unrecognized operator"),
            },
            "fuzzify" => {
                self.fuzzify = match value {
                    Value::String(s) => Fuzzify::from_option(s),
                    _ => None,
                };
            }
            "executeonload" => {
                if let Some(flag) = value_as_bool(value) {
                    self.execute_on_load = flag;
                }
            }
            "pushstate" => {
                if let Some(flag) = value_as_bool(value) {
                    self.push_state = flag;
                }
            }
            "scroll" => {
                if let Some(flag) = value_as_bool(value) {
                    self.scroll = flag;
                }
            }
            "username" => self.username = value.as_str().map(str::to_string),
            "password" => self.password = value.as_str().map(str::to_string),
            other => debug!(option = other, "ignoring unrecognized option"),
        }
    }
}

fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
