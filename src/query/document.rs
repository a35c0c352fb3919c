//! The mutable query document
//!
//! One order-preserving JSON tree per widget instance, shaped like a classic
//! filtered Elasticsearch query: free-text conditions live under
//! `query.filtered.query.bool.must`, exact-match filters under
//! `query.filtered.filter.bool.must`, with `from`, `size`, `aggregations`,
//! `facets` and `sort` at the top level. The document is mutated in place by
//! every user action; serialization normalizes a copy, never the live tree.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::text::Operator;

/// Dot-path of the free-text clause list
pub const MUST_PATH: &str = "query.filtered.query.bool.must";

/// Dot-path of the exact-match filter clause list
pub const FILTER_MUST_PATH: &str = "query.filtered.filter.bool.must";

/// A removable representation of one active clause
///
/// `remove_path` is the exact dot-path of the clause within the document, so
/// activating the chip deletes precisely that clause and nothing else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterChip {
    pub label: String,
    pub remove_path: String,
}

/// The default filtered-query skeleton
///
/// A filtered query is required: the serializer strips empty clause
/// containers out of this shape for backward compatibility with backends
/// that reject empty filter objects.
pub fn default_template() -> Value {
    json!({
        "query": {
            "filtered": {
                "query": {
                    "bool": {
                        "must": []
                    }
                },
                "filter": {
                    "bool": {
                        "must": []
                    }
                }
            }
        }
    })
}

/// The single mutable query document of a widget instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryDocument(Value);

impl QueryDocument {
    /// Wrap an existing document, e.g. one supplied via the `source` URL
    /// parameter
    pub fn from_value(value: Value) -> Self {
        QueryDocument(value)
    }

    /// Build a document from a default template, merging in the separately
    /// configured aggregation, facet, and size overrides
    ///
    /// The template is deep-copied so later mutation of the document never
    /// touches the configured default. Building twice from the same inputs
    /// yields identical documents.
    pub fn from_template(
        template: &Value,
        aggregations: Option<&Value>,
        facets: Option<&Value>,
        size: Option<u64>,
    ) -> Self {
        let mut doc = QueryDocument(template.clone());
        if let Some(aggs) = aggregations {
            doc.set_top_level("aggregations", aggs.clone());
        }
        if let Some(facets) = facets {
            doc.set_top_level("facets", facets.clone());
        }
        if doc.0.get("from").is_none() {
            doc.set_top_level("from", json!(0));
        }
        if doc.0.get("size").is_none() {
            doc.set_top_level("size", json!(size.unwrap_or(10)));
        }
        doc
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    /// Current paging offset
    pub fn from_offset(&self) -> u64 {
        self.0.get("from").and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn set_from_offset(&mut self, from: u64) {
        self.set_top_level("from", json!(from));
    }

    /// Current page size
    pub fn size(&self) -> u64 {
        self.0.get("size").and_then(Value::as_u64).unwrap_or(10)
    }

    pub fn set_size(&mut self, size: u64) {
        self.set_top_level("size", json!(size.max(1)));
    }

    /// Push a query-string condition onto the free-text clause list
    pub fn push_query_string(&mut self, query: &str, operator: Operator) {
        let condition = json!({
            "query_string": {
                "query": query,
                "default_operator": operator.as_str()
            }
        });
        if let Some(must) = self.must_list_mut() {
            must.push(condition);
        }
    }

    /// Push an exact-match term filter, creating the filter container if the
    /// document does not have one yet
    pub fn push_term_filter(&mut self, field: &str, value: &str) {
        let mut term = serde_json::Map::new();
        term.insert(field.to_string(), json!(value));
        let condition = json!({ "term": term });
        if let Some(filters) = self.filter_list_mut_or_create() {
            filters.push(condition);
        }
    }

    /// Drop the most recent free-text clause, if any
    ///
    /// The suggestion pass replaces the trailing clause on every keystroke,
    /// so the document only ever carries one in-progress condition.
    pub fn pop_last_must(&mut self) {
        if let Some(must) = self.must_list_mut() {
            must.pop();
        }
    }

    /// Overwrite the free-text clause list with a single query-string
    /// condition (the `q` URL parameter)
    pub fn replace_free_text(&mut self, query: &str, operator: Operator) {
        if let Some(must) = self.must_list_mut() {
            must.clear();
        }
        self.push_query_string(query, operator);
    }

    /// Produce the serializable request body
    ///
    /// Works on a copy; the in-memory document is unaffected. An empty
    /// free-text clause list is substituted with a single match-all
    /// condition, an empty filter clause list is omitted entirely, and
    /// scroll-continuation requests drop aggregations and facets since the
    /// buckets from the first page are still on screen.
    pub fn prepare_for_send(&self, scrolling: bool) -> Value {
        let mut payload = self.0.clone();

        if let Some(filtered) = payload
            .get_mut("query")
            .and_then(|q| q.get_mut("filtered"))
            .and_then(Value::as_object_mut)
        {
            let empty_filter = filtered
                .get("filter")
                .and_then(|f| f.get("bool"))
                .and_then(|b| b.get("must"))
                .and_then(Value::as_array)
                .is_some_and(Vec::is_empty);
            if empty_filter {
                filtered.remove("filter");
            }

            if let Some(must) = filtered
                .get_mut("query")
                .and_then(|q| q.get_mut("bool"))
                .and_then(|b| b.get_mut("must"))
                .and_then(Value::as_array_mut)
            {
                if must.is_empty() {
                    must.push(json!({ "match_all": {} }));
                }
            }
        }

        if scrolling {
            if let Some(top) = payload.as_object_mut() {
                top.remove("aggregations");
                top.remove("facets");
            }
        }

        payload
    }

    /// Build removable chips for every active free-text and filter clause
    pub fn filter_chips(&self) -> Vec<FilterChip> {
        let mut chips = Vec::new();

        if let Some(must) = self.must_list() {
            for (i, clause) in must.iter().enumerate() {
                if let Some(query) = clause
                    .get("query_string")
                    .and_then(|qs| qs.get("query"))
                    .and_then(Value::as_str)
                {
                    chips.push(FilterChip {
                        label: query.to_string(),
                        remove_path: format!("{MUST_PATH}.{i}"),
                    });
                }
            }
        }

        if let Some(filters) = self.filter_list() {
            for (i, clause) in filters.iter().enumerate() {
                if let Some(term) = clause.get("term").and_then(Value::as_object) {
                    let label = term
                        .iter()
                        .map(|(field, value)| match value.as_str() {
                            Some(s) => format!("{field}:{s}"),
                            None => format!("{field}:{value}"),
                        })
                        .collect::<Vec<_>>()
                        .join(" ");
                    chips.push(FilterChip {
                        label,
                        remove_path: format!("{FILTER_MUST_PATH}.{i}"),
                    });
                }
            }
        }

        chips
    }

    /// The free-text clause list, if the document has the expected shape
    pub fn must_list(&self) -> Option<&Vec<Value>> {
        self.0
            .get("query")?
            .get("filtered")?
            .get("query")?
            .get("bool")?
            .get("must")?
            .as_array()
    }

    fn must_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.0
            .get_mut("query")?
            .get_mut("filtered")?
            .get_mut("query")?
            .get_mut("bool")?
            .get_mut("must")?
            .as_array_mut()
    }

    /// The exact-match filter clause list, if present
    pub fn filter_list(&self) -> Option<&Vec<Value>> {
        self.0
            .get("query")?
            .get("filtered")?
            .get("filter")?
            .get("bool")?
            .get("must")?
            .as_array()
    }

    fn filter_list_mut_or_create(&mut self) -> Option<&mut Vec<Value>> {
        let filtered = self
            .0
            .get_mut("query")?
            .get_mut("filtered")?
            .as_object_mut()?;
        filtered
            .entry("filter")
            .or_insert_with(|| json!({ "bool": { "must": [] } }));
        filtered
            .get_mut("filter")?
            .get_mut("bool")?
            .get_mut("must")?
            .as_array_mut()
    }

    fn set_top_level(&mut self, key: &str, value: Value) {
        if let Some(top) = self.0.as_object_mut() {
            top.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_template_defaults() {
        let doc = QueryDocument::from_template(&default_template(), None, None, None);
        assert_eq!(doc.from_offset(), 0);
        assert_eq!(doc.size(), 10);
        assert!(doc.must_list().unwrap().is_empty());
    }

    #[test]
    fn test_from_template_is_idempotent() {
        let template = default_template();
        let aggs = json!({ "keywords": { "terms": { "field": "keyword" } } });
        let once = QueryDocument::from_template(&template, Some(&aggs), None, Some(25));
        let twice = QueryDocument::from_template(&template, Some(&aggs), None, Some(25));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_template_isolated_from_mutation() {
        let template = default_template();
        let mut doc = QueryDocument::from_template(&template, None, None, None);
        doc.push_query_string("cats", Operator::And);
        doc.set_from_offset(40);
        assert_eq!(template, default_template());
    }

    #[test]
    fn test_push_and_pop_query_string() {
        let mut doc = QueryDocument::from_template(&default_template(), None, None, None);
        doc.push_query_string("cats*", Operator::And);
        assert_eq!(doc.must_list().unwrap().len(), 1);
        doc.pop_last_must();
        assert!(doc.must_list().unwrap().is_empty());
    }

    #[test]
    fn test_push_term_filter_creates_container() {
        let mut doc = QueryDocument::from_value(json!({
            "query": { "filtered": { "query": { "bool": { "must": [] } } } }
        }));
        assert!(doc.filter_list().is_none());
        doc.push_term_filter("journal", "PLoS ONE");
        assert_eq!(doc.filter_list().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_must_substitution_on_copy() {
        let doc = QueryDocument::from_template(&default_template(), None, None, None);
        let payload = doc.prepare_for_send(false);
        let must = payload["query"]["filtered"]["query"]["bool"]["must"]
            .as_array()
            .unwrap();
        assert_eq!(must.len(), 1);
        assert_eq!(must[0], json!({ "match_all": {} }));
        // the live document still has an empty clause list
        assert!(doc.must_list().unwrap().is_empty());
    }

    #[test]
    fn test_empty_filter_omitted() {
        let doc = QueryDocument::from_template(&default_template(), None, None, None);
        let payload = doc.prepare_for_send(false);
        assert!(payload["query"]["filtered"].get("filter").is_none());
    }

    #[test]
    fn test_populated_filter_kept() {
        let mut doc = QueryDocument::from_template(&default_template(), None, None, None);
        doc.push_term_filter("journal", "PLoS ONE");
        let payload = doc.prepare_for_send(false);
        assert!(payload["query"]["filtered"].get("filter").is_some());
    }

    #[test]
    fn test_scrolling_strips_aggregations() {
        let aggs = json!({ "keywords": { "terms": { "field": "keyword" } } });
        let doc = QueryDocument::from_template(&default_template(), Some(&aggs), None, None);
        let payload = doc.prepare_for_send(true);
        assert!(payload.get("aggregations").is_none());
        // a full request keeps them
        let payload = doc.prepare_for_send(false);
        assert!(payload.get("aggregations").is_some());
    }

    #[test]
    fn test_filter_chips_paths() {
        let mut doc = QueryDocument::from_template(&default_template(), None, None, None);
        doc.push_query_string("cats*", Operator::And);
        doc.push_term_filter("journal", "PLoS ONE");

        let chips = doc.filter_chips();
        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].label, "cats*");
        assert_eq!(chips[0].remove_path, "query.filtered.query.bool.must.0");
        assert_eq!(chips[1].label, "journal:PLoS ONE");
        assert_eq!(chips[1].remove_path, "query.filtered.filter.bool.must.0");
    }

    #[test]
    fn test_replace_free_text() {
        let mut doc = QueryDocument::from_template(&default_template(), None, None, None);
        doc.push_query_string("old", Operator::And);
        doc.push_query_string("older", Operator::And);
        doc.replace_free_text("fresh", Operator::Or);
        let must = doc.must_list().unwrap();
        assert_eq!(must.len(), 1);
        assert_eq!(must[0]["query_string"]["query"], json!("fresh"));
    }
}
