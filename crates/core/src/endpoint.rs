//! Seams between a remote API and the list pipeline.
//!
//! An [`Endpoint`] knows how to turn page options into one HTTP GET against a
//! backend, and which pagination mode that backend supports. A [`Normalizer`]
//! turns that backend's raw record into a domain item. The two are chosen
//! independently so the same controller runs against any upstream shape.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::item::{Item, PageOptions, Pagination};

/// One outbound GET: absolute URL plus query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl Request {
    /// Join a base URL and a path, tolerating a trailing slash on the base
    pub fn get(base_url: &str, path: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let url = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };

        Self { url, query: vec![] }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A remote list endpoint
pub trait Endpoint: Send + Sync + 'static {
    type Raw: DeserializeOwned + Send + 'static;

    /// Short backend identifier, used in logs and verbose output
    fn backend(&self) -> &'static str;

    /// Largest page size the remote API accepts
    fn max_per_page(&self) -> u32;

    /// Build the request for a page; out-of-range options are clamped here
    fn request(&self, options: PageOptions) -> Request;

    fn pagination(&self) -> Pagination;
}

/// Pure, total mapping from one raw upstream record to an item
pub trait Normalizer: Send + Sync + 'static {
    type Raw;
    type Item: Item;

    fn normalize(&self, raw: Self::Raw) -> Self::Item;
}

/// Render a loosely-typed identifier (string, number, Mongo `{"$oid": ...}`)
pub fn id_to_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Object(map) => map.get("$oid").and_then(|oid| id_to_string(Some(oid))),
        _ => None,
    }
}

/// Trimmed, non-empty text or `None`
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_joins_base_and_path() {
        let request = Request::get("https://pokeapi.co/api/v2/", "/pokemon");
        assert_eq!(request.url, "https://pokeapi.co/api/v2/pokemon");
    }

    #[test]
    fn test_request_without_path() {
        let request = Request::get("http://127.0.0.1:8000/pokemons/", "");
        assert_eq!(request.url, "http://127.0.0.1:8000/pokemons");
    }

    #[test]
    fn test_request_params_keep_order() {
        let request = Request::get("http://x", "y").param("limit", 10).param("offset", 0);
        assert_eq!(
            request.query,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("offset".to_string(), "0".to_string())
            ]
        );
        assert_eq!(request.query_value("offset"), Some("0"));
        assert_eq!(request.query_value("page"), None);
    }

    #[test]
    fn test_id_to_string_variants() {
        assert_eq!(id_to_string(Some(&json!("abc"))), Some("abc".to_string()));
        assert_eq!(id_to_string(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(
            id_to_string(Some(&json!({"$oid": "65f0c1"}))),
            Some("65f0c1".to_string())
        );
        assert_eq!(id_to_string(Some(&json!(""))), None);
        assert_eq!(id_to_string(Some(&json!(null))), None);
        assert_eq!(id_to_string(None), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }
}
