//! Free-text query shaping
//!
//! Bare search-box terms get a fuzzy-match marker appended before they are
//! pushed into the query document, so `cats dogs` searches as `cats* dogs*`.
//! Input that already uses query-string syntax is passed through untouched.

use serde::{Deserialize, Serialize};

/// Default boolean operator for query-string conditions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    /// All terms must match
    #[default]
    And,
    /// At least one term must match
    Or,
}

impl Operator {
    /// The value used in the serialized `default_operator` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

/// Fuzzy-match marker appended to bare query terms
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fuzzify {
    /// Wildcard suffix (`term*`)
    #[serde(rename = "*")]
    Wildcard,
    /// Fuzzy suffix (`term~`)
    #[serde(rename = "~")]
    Fuzzy,
}

impl Fuzzify {
    /// The marker character appended to each term
    pub fn marker(&self) -> char {
        match self {
            Fuzzify::Wildcard => '*',
            Fuzzify::Fuzzy => '~',
        }
    }

    /// Parse the widget option value (`"*"`, `"~"`, anything else is off)
    pub fn from_option(value: &str) -> Option<Self> {
        match value {
            "*" => Some(Fuzzify::Wildcard),
            "~" => Some(Fuzzify::Fuzzy),
            _ => None,
        }
    }
}

/// Append the fuzzy-match marker to each bare term of a search-box query
///
/// Input that already contains query-string syntax (`*`, `~`, `:`, `"`,
/// `AND`, `OR`) is returned unchanged so power users keep full control.
pub fn fuzzify(query: &str, mode: Fuzzify) -> String {
    let has_syntax = query.contains('*')
        || query.contains('~')
        || query.contains(':')
        || query.contains('"')
        || query.contains("AND")
        || query.contains("OR");
    if has_syntax {
        return query.to_string();
    }

    let mut shaped = String::with_capacity(query.len() + 8);
    for term in query.split(' ') {
        if term.is_empty() {
            continue;
        }
        shaped.push_str(term);
        shaped.push(mode.marker());
        shaped.push(' ');
    }
    shaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzify_single_term() {
        assert_eq!(fuzzify("cats", Fuzzify::Wildcard), "cats* ");
        assert_eq!(fuzzify("cats", Fuzzify::Fuzzy), "cats~ ");
    }

    #[test]
    fn test_fuzzify_multiple_terms() {
        assert_eq!(fuzzify("cats dogs", Fuzzify::Wildcard), "cats* dogs* ");
    }

    #[test]
    fn test_fuzzify_skips_query_syntax() {
        assert_eq!(fuzzify("title:cats", Fuzzify::Wildcard), "title:cats");
        assert_eq!(fuzzify("cats AND dogs", Fuzzify::Wildcard), "cats AND dogs");
        assert_eq!(fuzzify("\"exact cats\"", Fuzzify::Wildcard), "\"exact cats\"");
        assert_eq!(fuzzify("cat*", Fuzzify::Wildcard), "cat*");
    }

    #[test]
    fn test_fuzzify_collapses_extra_spaces() {
        assert_eq!(fuzzify("cats  dogs", Fuzzify::Wildcard), "cats* dogs* ");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Fuzzify::from_option("*"), Some(Fuzzify::Wildcard));
        assert_eq!(Fuzzify::from_option("~"), Some(Fuzzify::Fuzzy));
        assert_eq!(Fuzzify::from_option("false"), None);
    }

    #[test]
    fn test_operator_as_str() {
        assert_eq!(Operator::And.as_str(), "AND");
        assert_eq!(Operator::Or.as_str(), "OR");
    }
}
