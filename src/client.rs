// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! HTTP client for the events and analytics API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::filters::EventQuery;
use crate::prelude::*;
use crate::types::*;

pub const DEFAULT_URL: &str = "http://localhost:8080";

/// The operations the controllers need from the backend. Implemented by
/// [`Client`] over HTTP; tests provide an in-memory version.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn health(&self) -> Result<HealthResponse, ApiError>;

    async fn events(&self, query: &EventQuery) -> Result<ApiResponse<Vec<Event>>, ApiError>;

    async fn label_values(&self, label: Label) -> Result<Vec<String>, ApiError>;

    async fn data_keys(&self, service: Option<&str>) -> Result<Vec<String>, ApiError>;

    async fn data_values(&self, key: &str, service: Option<&str>)
        -> Result<Vec<String>, ApiError>;

    async fn analytics(&self, query: &AnalyticsQuery) -> Result<AnalyticsResponse, ApiError>;

    async fn timeseries(&self, query: &TimeSeriesQuery) -> Result<TimeSeriesResponse, ApiError>;

    async fn topn(&self, query: &TopNQuery) -> Result<TopNResponse, ApiError>;

    async fn gauge(&self, query: &GaugeQuery) -> Result<GaugeResponse, ApiError>;

    /// `None` when the backend had no comparison to offer.
    async fn compare(&self, query: &CompareQuery) -> Result<Option<CompareResponse>, ApiError>;
}

#[derive(Debug, Default)]
pub struct ClientBuilder {
    url: String,
    api_key: Option<String>,
    disable_certificate_validation: bool,
}

impl ClientBuilder {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        if !api_key.is_empty() {
            self.api_key = Some(api_key.to_string());
        }
        self
    }

    pub fn disable_certificate_validation(mut self, yes: bool) -> Self {
        self.disable_certificate_validation = yes;
        self
    }

    pub fn build(self) -> Result<Client, ApiError> {
        let url = self.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(self.url));
        }
        let mut builder = reqwest::Client::builder();
        if self.disable_certificate_validation {
            builder = builder.danger_accept_invalid_certs(true);
        }
        Ok(Client {
            url,
            api_key: self.api_key,
            inner: builder.build()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    api_key: Option<String>,
    inner: reqwest::Client,
}

impl Client {
    pub fn new(url: &str) -> Result<Self, ApiError> {
        ClientBuilder::new(url).build()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.url, path.trim_start_matches('/'));
        let request = self
            .inner
            .request(method, url)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.api_key {
            request.header("X-Api-Key", api_key)
        } else {
            request
        }
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::GET, path)
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::POST, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!("Request failed with status {}: {}", status, text);
            return Err(ApiError::Status { status, text });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_json<Q: Serialize + Sync, T: DeserializeOwned + Default>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_string(query)?;
        trace!("POST {}: {}", path, body);
        let response: ApiResponse<T> = self.send(self.post(path).body(body)).await?;
        Ok(response.into_data())
    }
}

#[async_trait]
impl Backend for Client {
    async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.send(self.get("health")).await
    }

    async fn events(&self, query: &EventQuery) -> Result<ApiResponse<Vec<Event>>, ApiError> {
        let params = query.to_params();
        self.send(self.get("v1/events").query(&params)).await
    }

    async fn label_values(&self, label: Label) -> Result<Vec<String>, ApiError> {
        let path = format!("v1/labels/{}/values", label);
        let response: ApiResponse<Vec<String>> = self.send(self.get(&path)).await?;
        Ok(response.into_data())
    }

    async fn data_keys(&self, service: Option<&str>) -> Result<Vec<String>, ApiError> {
        let mut request = self.get("v1/data/keys");
        if let Some(service) = service.filter(|s| !s.is_empty()) {
            request = request.query(&[("service", service)]);
        }
        let response: ApiResponse<Vec<String>> = self.send(request).await?;
        Ok(response.into_data())
    }

    async fn data_values(
        &self,
        key: &str,
        service: Option<&str>,
    ) -> Result<Vec<String>, ApiError> {
        let mut params = vec![("key", key)];
        if let Some(service) = service.filter(|s| !s.is_empty()) {
            params.push(("service", service));
        }
        let response: ApiResponse<Vec<String>> =
            self.send(self.get("v1/data/values").query(&params)).await?;
        Ok(response.into_data())
    }

    async fn analytics(&self, query: &AnalyticsQuery) -> Result<AnalyticsResponse, ApiError> {
        self.post_json("v1/analytics", query).await
    }

    async fn timeseries(&self, query: &TimeSeriesQuery) -> Result<TimeSeriesResponse, ApiError> {
        self.post_json("v1/timeseries", query).await
    }

    async fn topn(&self, query: &TopNQuery) -> Result<TopNResponse, ApiError> {
        self.post_json("v1/topn", query).await
    }

    async fn gauge(&self, query: &GaugeQuery) -> Result<GaugeResponse, ApiError> {
        self.post_json("v1/gauge", query).await
    }

    async fn compare(&self, query: &CompareQuery) -> Result<Option<CompareResponse>, ApiError> {
        let body = serde_json::to_string(query)?;
        let response: ApiResponse<CompareResponse> =
            self.send(self.post("v1/compare").body(body)).await?;
        Ok(response.data)
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::filters::FilterTerm;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn echo_query(Query(params): Query<Vec<(String, String)>>) -> Json<Value> {
        let events: Vec<Value> = params
            .iter()
            .map(|(k, v)| json!({"timestamp": "t", "service": k, "name": v}))
            .collect();
        Json(json!({
            "success": true,
            "message": "",
            "data": events,
            "pagination": {"count": 1, "next": "n", "previous": ""}
        }))
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        assert!(matches!(
            ClientBuilder::new("localhost:8080").build(),
            Err(ApiError::InvalidUrl(_))
        ));
        let client = ClientBuilder::new("http://localhost:8080/").build().unwrap();
        assert_eq!(client.url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_health_and_api_key() {
        let router = Router::new().route(
            "/health",
            get(|headers: HeaderMap| async move {
                let key = headers
                    .get("x-api-key")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                Json(json!({"status": key, "enqueued": 4, "dropped": 1, "pending": 2}))
            }),
        );
        let url = serve(router).await;

        let client = ClientBuilder::new(&url).with_api_key("secret").build().unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health.status, "secret");
        assert_eq!(health.enqueued, 4);
        assert_eq!(health.pending, 2);

        let client = ClientBuilder::new(&url).with_api_key("").build().unwrap();
        assert_eq!(client.health().await.unwrap().status, "");
    }

    #[tokio::test]
    async fn test_events_query_params() {
        let router = Router::new().route("/v1/events", get(echo_query));
        let url = serve(router).await;
        let client = Client::new(&url).unwrap();

        let query = EventQuery {
            level: Some("error".to_string()),
            limit: 50,
            filters: vec![
                FilterTerm::new("service", Operator::Eq, "users"),
                FilterTerm::new("data.duration", Operator::Gte, "100"),
                FilterTerm::new("env", Operator::Eq, ""),
            ],
            ..Default::default()
        };
        let response = client.events(&query).await.unwrap();
        assert!(response.pagination.as_ref().unwrap().has_next());
        let params: Vec<(String, String)> = response
            .into_data()
            .into_iter()
            .map(|e| (e.service, e.name))
            .collect();
        assert!(params.contains(&("level".to_string(), "error".to_string())));
        assert!(params.contains(&("limit".to_string(), "50".to_string())));
        assert!(params.contains(&("service".to_string(), "users".to_string())));
        assert!(params.contains(&("data.duration__gte".to_string(), "100".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "env" || k == "from"));
    }

    #[tokio::test]
    async fn test_labels_and_data() {
        let router = Router::new()
            .route(
                "/v1/labels/{label}/values",
                get(|Path(label): Path<String>| async move {
                    Json(json!({"success": true, "data": [label]}))
                }),
            )
            .route(
                "/v1/data/keys",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    let service = q.get("service").cloned().unwrap_or_default();
                    Json(json!({"success": true, "data": [format!("keys-{service}")]}))
                }),
            )
            .route(
                "/v1/data/values",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({"success": true, "data": [q["key"], q.get("service")]}))
                }),
            );
        let url = serve(router).await;
        let client = Client::new(&url).unwrap();

        assert_eq!(client.label_values(Label::Level).await.unwrap(), vec!["level"]);
        assert_eq!(client.data_keys(None).await.unwrap(), vec!["keys-"]);
        assert_eq!(client.data_keys(Some("users")).await.unwrap(), vec!["keys-users"]);

        // A null in a string list fails to decode.
        assert!(matches!(
            client.data_values("duration", None).await,
            Err(ApiError::Json(_))
        ));
        assert_eq!(
            client.data_values("duration", Some("users")).await.unwrap(),
            vec!["duration", "users"]
        );
    }

    #[tokio::test]
    async fn test_analytics_bodies() {
        let router = Router::new()
            .route(
                "/v1/gauge",
                post(|Json(body): Json<Value>| async move {
                    let value = body["filters"].as_array().map_or(0, |f| f.len());
                    Json(json!({"success": true, "data": {"value": value}}))
                }),
            )
            .route(
                "/v1/timeseries",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"success": true, "data": {"series": [
                        {"name": body["interval"], "data_points": [{"timestamp": "t", "value": 1}]}
                    ]}}))
                }),
            )
            .route(
                "/v1/topn",
                post(|| async { Json(json!({"success": true, "data": {}})) }),
            )
            .route(
                "/v1/compare",
                post(|| async { Json(json!({"success": true})) }),
            )
            .route(
                "/v1/analytics",
                post(|| async {
                    Json(json!({"success": true, "data": {"results": [
                        {"groups": {"service": "users"}, "value": 3}
                    ]}}))
                }),
            );
        let url = serve(router).await;
        let client = Client::new(&url).unwrap();

        let gauge = client
            .gauge(&GaugeQuery {
                filters: vec![AnalyticsFilter::new("level", Operator::Eq, "error")],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(gauge.value, 1.0);

        let series = client
            .timeseries(&TimeSeriesQuery {
                interval: Interval::Day,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(series.series[0].name.as_deref(), Some("day"));
        assert_eq!(series.series[0].data_points[0].value, 1.0);

        assert!(client.topn(&TopNQuery::default()).await.unwrap().data.is_empty());
        assert!(client.compare(&GaugeQuery::default()).await.unwrap().is_none());

        let analytics = client.analytics(&AnalyticsQuery::default()).await.unwrap();
        assert_eq!(analytics.results[0].groups["service"], "users");
    }

    #[tokio::test]
    async fn test_status_error() {
        let router = Router::new().route(
            "/health",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "queue full") }),
        );
        let url = serve(router).await;
        let client = Client::new(&url).unwrap();
        let err = client.health().await.unwrap_err();
        assert_eq!(err.to_string(), "API error: 503 Service Unavailable");
        match err {
            ApiError::Status { text, .. } => assert_eq!(text, "queue full"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let client = Client::new(&url).unwrap();
        assert!(matches!(client.health().await, Err(ApiError::Request(_))));
    }
}
