mod client;
mod basic;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Context, Result};

/// Issues a GET for `url` and returns the response body.
///
/// Non-success HTTP statuses are treated the same as transport failures.
pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid feed url: {url}"))?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StatusClient(u16);

    #[async_trait]
    impl HttpClient for StatusClient {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let resp = http::Response::builder()
                .status(self.0)
                .body("{\"features\":[]}")
                .unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }

    #[tokio::test]
    async fn test_fetch_bytes_returns_body() {
        let bytes = fetch_bytes(&StatusClient(200), "https://example.com/feed.geojson")
            .await
            .unwrap();
        assert_eq!(bytes, b"{\"features\":[]}");
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_server_error() {
        let result = fetch_bytes(&StatusClient(503), "https://example.com/feed.geojson").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_bad_url() {
        let result = fetch_bytes(&StatusClient(200), "not a url").await;
        assert!(result.is_err());
    }
}
