//! HTTP adapters: one GET per call, mapped onto `FetchError` kinds.

use std::future::Future;
use std::time::Duration;

use cardgrid_core::endpoint::{Endpoint, Request};
use cardgrid_core::envelope::decode;
use cardgrid_core::error::FetchError;
use cardgrid_core::item::PageOptions;
use serde::de::DeserializeOwned;

use crate::prelude::*;

/// Source of raw records for one list
///
/// Implementations issue exactly one request per call and never retry.
pub trait Adapter: Send + Sync + 'static {
    type Raw: Send + 'static;

    fn fetch_items(
        &self,
        options: PageOptions,
    ) -> impl Future<Output = Result<Vec<Self::Raw>, FetchError>> + Send;
}

/// Adapter backed by a remote [`Endpoint`]
#[derive(Debug, Clone)]
pub struct HttpAdapter<E> {
    client: reqwest::Client,
    endpoint: E,
}

impl<E: Endpoint> HttpAdapter<E> {
    pub fn new(endpoint: E, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client(timeout)?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }
}

impl<E: Endpoint> Adapter for HttpAdapter<E> {
    type Raw = E::Raw;

    fn fetch_items(
        &self,
        options: PageOptions,
    ) -> impl Future<Output = Result<Vec<E::Raw>, FetchError>> + Send {
        let request = self.endpoint.request(options);
        let client = self.client.clone();
        let backend = self.endpoint.backend();

        async move {
            let body = get_text(&client, &request).await?;
            let items: Vec<E::Raw> = decode(&body).inspect_err(|err| {
                log::warn!("{backend}: could not decode {}: {err}", request.url);
            })?;
            log::debug!("{backend}: {} records from {}", items.len(), request.url);
            Ok::<_, FetchError>(items)
        }
    }
}

/// Create an HTTP client whose every request is bounded by `timeout`
pub fn create_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("cardgrid/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// GET a request and return the body of a successful response
pub async fn get_text(client: &reqwest::Client, request: &Request) -> Result<String, FetchError> {
    log::debug!("GET {} {:?}", request.url, request.query);

    let response = client
        .get(&request.url)
        .query(&request.query)
        .send()
        .await
        .map_err(|e| network_error(&request.url, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| network_error(&request.url, e))?;

    if !status.is_success() {
        log::warn!("GET {} returned {}", request.url, status);
        return Err(FetchError::http_status(status.as_u16(), &body));
    }

    Ok(body)
}

/// GET a single JSON document
pub async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    request: &Request,
) -> Result<T, FetchError> {
    let body = get_text(client, request).await?;
    serde_json::from_str(&body).map_err(|e| FetchError::parse(e.to_string()))
}

fn network_error(url: &str, err: reqwest::Error) -> FetchError {
    log::warn!("GET {url} failed: {err}");
    if err.is_timeout() {
        FetchError::network(format!("request to {url} timed out"))
    } else {
        FetchError::network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use cardgrid_core::error::FetchErrorKind;
    use cardgrid_core::pokemon::{detail_request, PokeApi, PokeApiEntry, PokemonDetail};
    use serde_json::json;
    use std::collections::HashMap;

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn list_pokemon(
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<serde_json::Value> {
        let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(0);
        let offset: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
        let results: Vec<_> = (offset + 1..=offset + limit)
            .map(|id| {
                json!({
                    "name": format!("mon-{id}"),
                    "url": format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
                })
            })
            .collect();
        Json(json!({"count": 1302, "next": null, "previous": null, "results": results}))
    }

    #[tokio::test]
    async fn test_fetch_items_sends_page_options() {
        let base = serve(Router::new().route("/pokemon", get(list_pokemon))).await;
        let adapter = HttpAdapter::new(PokeApi::new(base), TIMEOUT).unwrap();

        let items: Vec<PokeApiEntry> = adapter.fetch_items(PageOptions::new(3, 5)).await.unwrap();

        assert_eq!(items.len(), 5);
        assert_eq!(items[0].name.as_deref(), Some("mon-11"));
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let router = Router::new().route(
            "/pokemon",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "") }),
        );
        let adapter = HttpAdapter::new(PokeApi::new(serve(router).await), TIMEOUT).unwrap();

        let err = adapter.fetch_items(PageOptions::new(1, 20)).await.unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::HttpStatus);
        assert_eq!(err.detail, "status 500");
    }

    #[tokio::test]
    async fn test_not_found_keeps_body() {
        let router = Router::new().route(
            "/pokemon",
            get(|| async { (StatusCode::NOT_FOUND, "Not Found") }),
        );
        let adapter = HttpAdapter::new(PokeApi::new(serve(router).await), TIMEOUT).unwrap();

        let err = adapter.fetch_items(PageOptions::new(1, 20)).await.unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::HttpStatus);
        assert_eq!(err.detail, "status 404: Not Found");
    }

    #[tokio::test]
    async fn test_parse_error() {
        let router = Router::new().route("/pokemon", get(|| async { "<html>maintenance</html>" }));
        let adapter = HttpAdapter::new(PokeApi::new(serve(router).await), TIMEOUT).unwrap();

        let err = adapter.fetch_items(PageOptions::new(1, 20)).await.unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_network_error_when_nothing_listens() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let adapter = HttpAdapter::new(PokeApi::new(format!("http://{addr}")), TIMEOUT).unwrap();
        let err = adapter.fetch_items(PageOptions::new(1, 20)).await.unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::Network);
    }

    #[tokio::test]
    async fn test_timeout_is_a_network_error() {
        let router = Router::new().route(
            "/pokemon",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "[]"
            }),
        );
        let base = serve(router).await;
        let adapter = HttpAdapter::new(PokeApi::new(base), Duration::from_millis(100)).unwrap();

        let err = adapter.fetch_items(PageOptions::new(1, 20)).await.unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::Network);
        assert!(err.detail.contains("timed out"));
    }

    #[tokio::test]
    async fn test_fetch_json_detail() {
        let router = Router::new().route(
            "/pokemon/{name}",
            get(|axum::extract::Path(name): axum::extract::Path<String>| async move {
                Json(json!({"id": 25, "name": name, "weight": 60, "height": 4, "types": []}))
            }),
        );
        let base = serve(router).await;
        let client = create_client(TIMEOUT).unwrap();

        let detail: PokemonDetail = fetch_json(&client, &detail_request(&base, "Pikachu").unwrap())
            .await
            .unwrap();

        assert_eq!(detail.id, Some(25));
        assert_eq!(detail.name.as_deref(), Some("pikachu"));
    }
}
