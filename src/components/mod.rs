//! Composed search-UI components
//!
//! A structured alternative to driving the renderer directly: small
//! components register against a session and draw themselves from a
//! [`UiContext`] snapshot. [`common_search_ui`] assembles the stock layout
//! of a searching notification, a pager above and below the results, and a
//! result display.

use crate::response::SearchResponse;

/// Read-only snapshot of the session handed to components when drawing
#[derive(Clone, Copy, Debug)]
pub struct UiContext<'a> {
    pub what: &'a str,
    pub from: u64,
    pub size: u64,
    pub total: u64,
    pub searching: bool,
    pub response: Option<&'a SearchResponse>,
}

impl UiContext<'_> {
    /// 1-based page number of the current window
    pub fn page(&self) -> u64 {
        self.from / self.size.max(1) + 1
    }

    /// Total number of pages, at least 1
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(self.size.max(1)).max(1)
    }
}

/// Registration contract for composed components
pub trait Component {
    /// Unique identifier within a registry
    fn id(&self) -> &str;

    /// Grouping category, e.g. `top-pager`
    fn category(&self) -> &str;

    /// Produce this component's textual fragment for the given snapshot
    fn draw(&self, ctx: &UiContext<'_>) -> String;
}

/// Shows a notification while a request is in flight
#[derive(Clone, Debug)]
pub struct SearchingNotification {
    id: String,
}

impl SearchingNotification {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Component for SearchingNotification {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> &str {
        "searching-notification"
    }

    fn draw(&self, ctx: &UiContext<'_>) -> String {
        if ctx.searching {
            format!("searching {}...", ctx.what)
        } else {
            String::new()
        }
    }
}

/// Paging controls with the current window position
#[derive(Clone, Debug)]
pub struct Pager {
    id: String,
    category: String,
}

impl Pager {
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
        }
    }
}

impl Component for Pager {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn draw(&self, ctx: &UiContext<'_>) -> String {
        format!("< page {} of {} >", ctx.page(), ctx.pages())
    }
}

/// Default result display: one line per hit
#[derive(Clone, Debug)]
pub struct ResultList {
    id: String,
}

impl ResultList {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Component for ResultList {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> &str {
        "results"
    }

    fn draw(&self, ctx: &UiContext<'_>) -> String {
        let Some(response) = ctx.response else {
            return String::new();
        };
        response
            .hits
            .hits
            .iter()
            .map(|hit| hit.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Facet buckets as clickable add-filter affordances
#[derive(Clone, Debug)]
pub struct FacetView {
    id: String,
}

impl FacetView {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Component for FacetView {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> &str {
        "facetview"
    }

    fn draw(&self, ctx: &UiContext<'_>) -> String {
        let Some(aggregations) = ctx.response.and_then(|r| r.aggregations.as_ref()) else {
            return String::new();
        };
        let mut lines = Vec::new();
        for (facet, result) in aggregations {
            for bucket in &result.buckets {
                lines.push(format!(
                    "[add {facet}={}] {} ({})",
                    bucket.key_label(),
                    bucket.key_label(),
                    bucket.doc_count
                ));
            }
        }
        lines.join("\n")
    }
}

/// Ordered set of registered components
#[derive(Default)]
pub struct ComponentRegistry {
    components: Vec<Box<dyn Component>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Draw every component in registration order
    pub fn draw_all(&self, ctx: &UiContext<'_>) -> Vec<(String, String)> {
        self.components
            .iter()
            .map(|c| (c.id().to_string(), c.draw(ctx)))
            .collect()
    }

    /// Components of one category, in registration order
    pub fn by_category(&self, category: &str) -> Vec<&dyn Component> {
        self.components
            .iter()
            .filter(|c| c.category() == category)
            .map(AsRef::as_ref)
            .collect()
    }
}

/// Assemble the stock search UI layout
///
/// Searching notification, a pager above and below the results, the given
/// result display, then any extra components.
pub fn common_search_ui(
    result_display: Box<dyn Component>,
    extra: Vec<Box<dyn Component>>,
) -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register(Box::new(SearchingNotification::new("searching-notification")));
    registry.register(Box::new(Pager::new("top-pager", "top-pager")));
    registry.register(Box::new(Pager::new("bottom-pager", "bottom-pager")));
    registry.register(result_display);
    for component in extra {
        registry.register(component);
    }
    registry
}
