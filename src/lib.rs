//! A headless search-UI engine over Elasticsearch-style backends
//!
//! The crate keeps one mutable query document per session, mutates it in
//! response to user actions (typing, clicking a facet, paging, scrolling),
//! executes it against a search endpoint, and routes each response to
//! exactly one rendering path. Rendering, HTTP, and browser history are
//! trait seams so the engine runs the same way in a demo binary, a test,
//! or a real UI shell.
//!
//! The usual entry point is [`Holder`]: configure it with a
//! [`HolderConfig`], give it a [`Transport`], a [`Renderer`], and a
//! [`HistorySink`], then drive it with `load`, `add`, `suggest`, and the
//! paging methods.

pub mod components;
pub mod config;
pub mod debounce;
pub mod error;
pub mod query;
pub mod render;
pub mod request;
pub mod response;
pub mod session;
pub mod url_state;

pub use components::{common_search_ui, Component, ComponentRegistry, UiContext};
pub use config::{Action, HolderConfig, ResultsHooks};
pub use error::{HolderError, Result};
pub use query::document::{FilterChip, QueryDocument};
pub use query::state::{ModeFlags, QueryState, RequestToken};
pub use query::text::{Fuzzify, Operator};
pub use render::{Renderer, TextRenderer};
pub use request::{HttpRequest, HttpTransport, Method, Transport};
pub use response::{RenderRoute, SearchResponse};
pub use session::{AddInput, Holder};
pub use url_state::{HistorySink, MemoryHistory, NoopHistory};

/// Crate version, for diagnostics
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
