//! Search request bodies for OPNsense `search*` endpoints.
//!
//! Every OPNsense grid endpoint accepts the same pagination body. A
//! `rowCount` of `-1` asks for all rows in one page.

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `rowCount` value meaning "return every row".
pub const ROW_COUNT_ALL: i64 = -1;

/// Pagination and filter body for a search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Page number, starting at 1.
    pub current: i64,
    /// Rows per page, or [`ROW_COUNT_ALL`].
    pub row_count: i64,
    /// Column to direction (`asc`/`desc`) mapping.
    pub sort: BTreeMap<String, String>,
    /// Free-text filter.
    pub search_phrase: String,
    /// Type filter. Omitted when `None`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    /// Category filter. Omitted when `None`.
    #[serde(rename = "category", default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl SearchQuery {
    /// First page holding every row, no sorting or filters.
    #[must_use]
    pub fn all() -> Self {
        Self {
            current: 1,
            row_count: ROW_COUNT_ALL,
            sort: BTreeMap::new(),
            search_phrase: String::new(),
            types: None,
            categories: None,
        }
    }

    /// Request a specific page.
    #[must_use]
    pub const fn with_page(mut self, current: i64, row_count: i64) -> Self {
        self.current = current;
        self.row_count = row_count;
        self
    }

    /// Add a sort column.
    #[must_use]
    pub fn with_sort(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.sort.insert(column.into(), direction.into());
        self
    }

    /// Set the free-text filter.
    #[must_use]
    pub fn with_search_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.search_phrase = phrase.into();
        self
    }

    /// Set the type filter. An empty slice is sent as `[]`.
    #[must_use]
    pub fn with_types(mut self, types: &[&str]) -> Self {
        self.types = Some(types.iter().map(|t| (*t).to_string()).collect());
        self
    }

    /// Set the category filter. An empty slice is sent as `[]`.
    #[must_use]
    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = Some(categories.iter().map(|c| (*c).to_string()).collect());
        self
    }

    /// Render the query as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`](crate::Error::Decode) if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_omits_filters() {
        assert_eq!(
            SearchQuery::all().to_value().unwrap(),
            json!({"current": 1, "rowCount": -1, "sort": {}, "searchPhrase": ""})
        );
    }

    #[test]
    fn empty_filters_serialize_as_arrays() {
        let body = SearchQuery::all().with_categories(&[]).to_value().unwrap();
        assert_eq!(body["category"], json!([]));
        assert!(body.get("type").is_none());
    }

    #[test]
    fn type_and_category_filters() {
        let body = SearchQuery::all()
            .with_types(&["host"])
            .with_categories(&["cat1"])
            .to_value()
            .unwrap();

        assert_eq!(
            body,
            json!({
                "current": 1,
                "rowCount": -1,
                "sort": {},
                "searchPhrase": "",
                "type": ["host"],
                "category": ["cat1"]
            })
        );
    }

    #[test]
    fn paging_sort_and_phrase() {
        let body = SearchQuery::all()
            .with_page(2, 25)
            .with_sort("name", "asc")
            .with_search_phrase("lan")
            .to_value()
            .unwrap();

        assert_eq!(body["current"], json!(2));
        assert_eq!(body["rowCount"], json!(25));
        assert_eq!(body["sort"], json!({"name": "asc"}));
        assert_eq!(body["searchPhrase"], json!("lan"));
    }

    #[test]
    fn deserializes_from_wire_names() {
        let query: SearchQuery = serde_json::from_value(json!({
            "current": 1,
            "rowCount": -1,
            "sort": {},
            "searchPhrase": "",
            "type": ["network"]
        }))
        .unwrap();

        assert_eq!(query.types, Some(vec!["network".to_string()]));
        assert!(query.categories.is_none());
    }
}
