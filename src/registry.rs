use reqwest::Client;
use tracing::debug;

use crate::error::AppError;
use crate::models::{Candidate, TagPage};
use crate::selector::Selector;

/// Docker Hub, the only registry exposing the tag listing shape we decode
pub const DEFAULT_REGISTRY: &str = "https://hub.docker.com";

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Listing order requested from the registry: most recently updated first.
const ORDERING: &str = "last_updated";

pub struct RegistryClient {
    client: Client,
    base_url: String,
    page_size: u32,
}

impl RegistryClient {
    pub fn new(base_url: &str, page_size: u32) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            page_size,
        }
    }

    /// URL of the first tag listing page for a normalized repository
    pub fn first_page_url(&self, repository: &str) -> String {
        format!(
            "{}/v2/repositories/{}/tags?page_size={}&page=1&ordering={}",
            self.base_url, repository, self.page_size, ORDERING
        )
    }

    /// GET one tag listing page. The body is read in full before decoding.
    pub async fn fetch_page(&self, url: &str) -> Result<TagPage, AppError> {
        debug!("GET {}", url);
        let resp = self.client.get(url).send().await?.error_for_status()?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Walk the tag listing until a page yields candidates.
    ///
    /// Pages arrive most recently updated first, so the first page with any
    /// usable tag settles the result and later pages are never fetched.
    /// Stops without candidates once `count` tags were examined or the
    /// registry announces no further page.
    pub async fn find_candidates(
        &self,
        repository: &str,
        selector: &mut Selector,
    ) -> Result<Vec<Candidate>, AppError> {
        let mut url = self.first_page_url(repository);
        let mut examined: usize = 0;

        loop {
            let page = self.fetch_page(&url).await?;
            examined += page.results.len();

            let candidates = selector.filter_page(&page.results)?;
            debug!(
                "Page yielded {} candidates ({} of {} tags examined)",
                candidates.len(),
                examined,
                page.count
            );

            if !candidates.is_empty() {
                return Ok(candidates);
            }
            if examined >= page.count || page.results.is_empty() {
                return Ok(Vec::new());
            }
            match page.next_url() {
                Some(next) => url = next.to_string(),
                None => return Ok(Vec::new()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestParams;
    use mockito::{Matcher, Server, ServerGuard};

    const TAGS_PATH: &str = "/v2/repositories/grafana/grafana-oss/tags";

    fn page_body(count: usize, next: Option<String>, results: &str) -> String {
        let next = match next {
            Some(url) => format!("\"{}\"", url),
            None => "null".to_string(),
        };
        format!(
            r#"{{"count": {}, "next": {}, "results": [{}]}}"#,
            count, next, results
        )
    }

    fn image_tag(name: &str, architecture: &str, status: &str) -> String {
        format!(
            r#"{{"name": "{}", "content_type": "image", "last_updated": "2024-03-01T10:20:30.123456Z",
                "images": [{{"architecture": "{}", "os": "linux", "status": "{}"}}]}}"#,
            name, architecture, status
        )
    }

    fn first_page_query() -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("page_size".into(), "100".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("ordering".into(), "last_updated".into()),
        ])
    }

    fn selector(arch: &str) -> Selector {
        let params = RequestParams::new("grafana/grafana-oss", arch, "linux", "");
        Selector::new(&params).unwrap()
    }

    async fn mock_first_page(server: &mut ServerGuard, body: String) -> mockito::Mock {
        server
            .mock("GET", TAGS_PATH)
            .match_query(first_page_query())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[test]
    fn test_first_page_url() {
        let client = RegistryClient::new("https://hub.docker.com/", DEFAULT_PAGE_SIZE);
        assert_eq!(
            client.first_page_url("library/nginx"),
            "https://hub.docker.com/v2/repositories/library/nginx/tags?page_size=100&page=1&ordering=last_updated"
        );
    }

    #[tokio::test]
    async fn test_first_page_with_candidates_stops_pagination() {
        let mut server = Server::new_async().await;
        let next = format!("{}/next-page", server.url());

        let page1 = mock_first_page(
            &mut server,
            page_body(2, Some(next), &image_tag("1.0.0", "amd64", "active")),
        )
        .await;
        let page2 = server
            .mock("GET", "/next-page")
            .with_status(200)
            .with_body(page_body(2, None, &image_tag("2.0.0", "amd64", "active")))
            .expect(0)
            .create_async()
            .await;

        let client = RegistryClient::new(&server.url(), DEFAULT_PAGE_SIZE);
        let mut selector = selector("amd64");
        let candidates = client
            .find_candidates("grafana/grafana-oss", &mut selector)
            .await
            .unwrap();

        page1.assert_async().await;
        page2.assert_async().await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "1.0.0");
    }

    #[tokio::test]
    async fn test_follows_next_page_until_candidates() {
        let mut server = Server::new_async().await;
        let next = format!("{}/next-page", server.url());

        let page1 = mock_first_page(
            &mut server,
            page_body(2, Some(next), &image_tag("1.1.0", "arm64", "active")),
        )
        .await;
        let page2 = server
            .mock("GET", "/next-page")
            .with_status(200)
            .with_body(page_body(2, None, &image_tag("1.0.0", "amd64", "active")))
            .create_async()
            .await;

        let client = RegistryClient::new(&server.url(), DEFAULT_PAGE_SIZE);
        let mut selector = selector("amd64");
        let candidates = client
            .find_candidates("grafana/grafana-oss", &mut selector)
            .await
            .unwrap();

        page1.assert_async().await;
        page2.assert_async().await;
        assert_eq!(candidates[0].name, "1.0.0");
    }

    #[tokio::test]
    async fn test_stops_when_count_is_reached() {
        let mut server = Server::new_async().await;
        let next = format!("{}/next-page", server.url());

        let page1 = mock_first_page(
            &mut server,
            page_body(1, Some(next), &image_tag("1.0.0", "amd64", "inactive")),
        )
        .await;
        let page2 = server
            .mock("GET", "/next-page")
            .expect(0)
            .create_async()
            .await;

        let client = RegistryClient::new(&server.url(), DEFAULT_PAGE_SIZE);
        let mut selector = selector("amd64");
        let candidates = client
            .find_candidates("grafana/grafana-oss", &mut selector)
            .await
            .unwrap();

        page1.assert_async().await;
        page2.assert_async().await;
        assert!(candidates.is_empty());
        assert_eq!(
            selector.last_rejection().unwrap().to_string(),
            "status: inactive"
        );
    }

    #[tokio::test]
    async fn test_http_error_is_transport_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", TAGS_PATH)
            .match_query(first_page_query())
            .with_status(404)
            .with_body(r#"{"message": "object not found"}"#)
            .create_async()
            .await;

        let client = RegistryClient::new(&server.url(), DEFAULT_PAGE_SIZE);
        let mut selector = selector("amd64");
        let result = client
            .find_candidates("grafana/grafana-oss", &mut selector)
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(AppError::Transport(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut server = Server::new_async().await;
        let mock = mock_first_page(&mut server, r#"{"results": "nope"}"#.to_string()).await;

        let client = RegistryClient::new(&server.url(), DEFAULT_PAGE_SIZE);
        let mut selector = selector("amd64");
        let result = client
            .find_candidates("grafana/grafana-oss", &mut selector)
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(AppError::Decode(_))));
    }

    #[tokio::test]
    async fn test_failed_second_page_aborts() {
        let mut server = Server::new_async().await;
        let next = format!("{}/next-page", server.url());

        let _page1 = mock_first_page(
            &mut server,
            page_body(2, Some(next), &image_tag("1.0.0", "arm64", "active")),
        )
        .await;
        let _page2 = server
            .mock("GET", "/next-page")
            .with_status(500)
            .create_async()
            .await;

        let client = RegistryClient::new(&server.url(), DEFAULT_PAGE_SIZE);
        let mut selector = selector("amd64");
        let result = client
            .find_candidates("grafana/grafana-oss", &mut selector)
            .await;

        assert!(matches!(result, Err(AppError::Transport(_))));
    }
}
