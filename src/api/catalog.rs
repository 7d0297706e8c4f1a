//! Dataset and ticker listings

use super::{endpoint, Session};
use crate::error::{Error, Result};
use crate::network::ApiRequest;
use crate::query::{DatasetItem, DatasetResponse, TickerItem, TickerResponse};
use tracing::debug;

impl Session {
    /// List available datasets, optionally only those covering `ticker`
    pub async fn datasets(&self, ticker: Option<&str>) -> Result<Vec<DatasetItem>> {
        let url = endpoint(&self.base_url, &["connections", "datasets"])?;
        let mut request = self.authorized(ApiRequest::get(url));
        if let Some(ticker) = ticker.filter(|t| !t.is_empty()) {
            request = request.param("ticker", ticker);
        }

        let response = self.client.execute(&request).await?;
        if !response.is_success() {
            return Err(Error::Protocol {
                status: response.status,
                body: response.text,
            });
        }

        let listing: DatasetResponse = response.json()?;
        Ok(listing.items)
    }

    /// List the tickers of a dataset
    pub async fn tickers(&self, dataset_id: &str) -> Result<Vec<TickerItem>> {
        if dataset_id.is_empty() {
            return Err(Error::Validation(
                "dataset not specified when requesting the list of tickers".to_string(),
            ));
        }

        let url = endpoint(
            &self.base_url,
            &["connections", "dataset", dataset_id, "tickers"],
        )?;
        let request = self.authorized(ApiRequest::get(url));

        let response = self.client.execute(&request).await?;
        if !response.is_success() {
            return Err(Error::Protocol {
                status: response.status,
                body: response.text,
            });
        }

        let listing: TickerResponse = response.json()?;
        debug!(
            "Tickers for {}: count={} total={}",
            dataset_id, listing.metadata.count, listing.metadata.total
        );
        Ok(listing.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credential;
    use crate::network::HttpClient;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session(base: String) -> Session {
        Session::new(
            HttpClient::new().unwrap(),
            base,
            "20151130",
            Credential::new("abc", Utc::now() + Duration::hours(1)),
        )
    }

    #[tokio::test]
    async fn test_datasets_with_ticker_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/connections/datasets"))
            .and(query_param("ticker", "nasdaq:aapl"))
            .and(header("Authorization", "token abc"))
            .and(header("X-API-Version", "20151130"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "total": 2,
                "items": [
                    {"id": "store", "display_name": "Store Locations"},
                    {"id": "job_listings", "display_name": "Job Listings"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let datasets = session(server.uri())
            .datasets(Some("nasdaq:aapl"))
            .await
            .unwrap();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[1].id, "job_listings");
    }

    #[tokio::test]
    async fn test_tickers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/connections/dataset/store/tickers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "total": 1,
                "items": [{"id": "nasdaq:aapl", "display_name": "Apple", "sector": "Tech"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tickers = session(server.uri()).tickers("store").await.unwrap();
        assert_eq!(tickers.len(), 1);
        assert_eq!(tickers[0].sector, "Tech");
    }

    #[tokio::test]
    async fn test_tickers_without_dataset_makes_no_call() {
        let server = MockServer::start().await;
        let result = session(server.uri()).tickers("").await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;

        let result = session(server.uri()).datasets(None).await;
        match result {
            Err(Error::Protocol { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad token");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
