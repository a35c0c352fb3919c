//! Query document, state, and mutation
//!
//! The query side of the widget: the mutable Elasticsearch-style document
//! (`document`), the per-instance state store with paging and mode flags
//! (`state`), the dot-path editor used by chips and the power-user override
//! channel (`path`), and free-text shaping (`text`).

pub mod document;
pub mod path;
pub mod state;
pub mod text;

pub use document::{default_template, FilterChip, QueryDocument};
pub use path::FanOut;
pub use state::{ModeFlags, QueryState, RequestToken};
pub use text::{fuzzify, Fuzzify, Operator};
