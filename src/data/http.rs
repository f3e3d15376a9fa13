// src/data/http.rs
use super::reader::{DataError, DataReader};
use crate::config::DataServiceConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// `DataReader` backed by the data service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpDataService {
    base_url: Url,
    client: Client,
}

impl HttpDataService {
    pub fn new(config: &DataServiceConfig) -> Result<Self, DataError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        // Request paths are joined relative to the base, so its path must end in '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str, query: &str) -> Result<Url, DataError> {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;

        if !query.is_empty() {
            let query = query.trim_start_matches('?');
            let combined = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{}&{}", existing, query),
                _ => query.to_string(),
            };
            url.set_query(Some(&combined));
        }

        Ok(url)
    }
}

#[async_trait]
impl DataReader for HttpDataService {
    async fn read<T>(&self, path: &str, query: &str) -> Result<T, DataError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.url_for(path, query)?;
        debug!(%url, "reading from data service");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(DataError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            return Err(DataError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Movie;

    fn service(base: &str) -> HttpDataService {
        HttpDataService::new(&DataServiceConfig {
            base_url: Url::parse(base).unwrap(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_url_for_merges_query() {
        let svc = service("http://localhost:4122");

        let url = svc.url_for("/api/movies?q=ring", "pageSize=10").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4122/api/movies?q=ring&pageSize=10");

        let url = svc.url_for("/api/genres", "").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4122/api/genres");
    }

    #[test]
    fn test_url_for_keeps_base_path_prefix() {
        let svc = service("http://h/data/");
        let url = svc.url_for("/api/genres", "").unwrap();
        assert_eq!(url.as_str(), "http://h/data/api/genres");

        let svc = service("http://h/data");
        assert_eq!(svc.base_url().as_str(), "http://h/data/");
        let url = svc.url_for("/api/actors?q=nicole", "").unwrap();
        assert_eq!(url.as_str(), "http://h/data/api/actors?q=nicole");
    }

    #[tokio::test]
    async fn test_read_decodes_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/movies/tt0133093")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "movieId": "tt0133093", "title": "The Matrix" }"#)
            .create_async()
            .await;

        let svc = service(&server.url());
        let movie: Movie = svc.read("/api/movies/tt0133093", "").await.unwrap();

        assert_eq!(movie.title, "The Matrix");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_maps_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/actors/nm404")
            .with_status(404)
            .create_async()
            .await;

        let svc = service(&server.url());
        let result: Result<Movie, DataError> = svc.read("/api/actors/nm404", "").await;
        let err = result.unwrap_err();

        assert!(matches!(err, DataError::NotFound(ref p) if p == "/api/actors/nm404"));
    }

    #[tokio::test]
    async fn test_read_maps_server_error_and_bad_body() {
        let mut server = mockito::Server::new_async().await;
        let _failing = server
            .mock("GET", "/api/genres")
            .with_status(500)
            .create_async()
            .await;
        let _garbage = server
            .mock("GET", "/api/actors/nm0000173")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let svc = service(&server.url());

        let result: Result<Vec<String>, DataError> = svc.read("/api/genres", "").await;
        let err = result.unwrap_err();
        assert!(matches!(err, DataError::Status { status: 500, .. }));

        let result: Result<Movie, DataError> = svc.read("/api/actors/nm0000173", "").await;
        let err = result.unwrap_err();
        assert!(matches!(err, DataError::Decode(_)));
    }
}
