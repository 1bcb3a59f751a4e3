//! HTTP client for a PostgREST-style table service.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use super::{RemoteSettings, RemoteStore};
use crate::entity::{ListQuery, Record};
use crate::error::RemoteError;

/// Timeout for a single request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Remote store reached over HTTP.
///
/// Requests go to `<url>/rest/v1/<table>` and carry the key both as the
/// `apikey` header and as a bearer token.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl RestClient {
    /// Creates a client for `url`. A URL without a scheme is treated as
    /// plain http.
    pub fn new(url: &str, api_key: &str) -> Result<Self, RemoteError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RemoteError::InvalidEndpoint(url.to_string()));
        }

        let base_url = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("http://{}", url)
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url).map_err(|_| RemoteError::InvalidEndpoint(url.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            http,
        })
    }

    /// Builds a client when the settings are complete, `Ok(None)` otherwise.
    pub fn from_settings(settings: &RemoteSettings) -> Result<Option<Self>, RemoteError> {
        if !settings.is_configured() {
            return Ok(None);
        }
        match (&settings.url, &settings.api_key) {
            (Some(url), Some(key)) => Self::new(url, key).map(Some),
            _ => Ok(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn rows(response: Response) -> Result<Vec<Record>, RemoteError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value =
            serde_json::from_str(&text).map_err(|e| RemoteError::Decode(e.to_string()))?;
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(RemoteError::Decode(format!("expected a row, got {}", other))),
                })
                .collect(),
            Value::Object(map) => Ok(vec![map]),
            other => Err(RemoteError::Decode(format!(
                "expected a list of rows, got {}",
                other
            ))),
        }
    }
}

/// Pulls the `message` out of a PostgREST error body, or returns the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

fn order_param(query: &ListQuery) -> Option<String> {
    query.order.as_ref().map(|order| {
        format!(
            "{}.{}",
            order.column,
            if order.ascending { "asc" } else { "desc" }
        )
    })
}

impl RemoteStore for RestClient {
    async fn select(&self, table: &str, query: &ListQuery) -> Result<Vec<Record>, RemoteError> {
        let mut params = vec![("select", "*".to_string())];
        if let Some(order) = order_param(query) {
            params.push(("order", order));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        debug!(table, ?params, "remote select");
        let response = self
            .send(self.request(Method::GET, table).query(&params))
            .await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: &str, records: Vec<Record>) -> Result<Vec<Record>, RemoteError> {
        debug!(table, count = records.len(), "remote insert");
        let response = self
            .send(
                self.request(Method::POST, table)
                    .header("Prefer", "return=representation")
                    .json(&records),
            )
            .await?;
        Self::rows(response).await
    }

    async fn update(
        &self,
        table: &str,
        patch: Record,
        column: &str,
        value: &str,
    ) -> Result<Vec<Record>, RemoteError> {
        debug!(table, column, value, "remote update");
        let response = self
            .send(
                self.request(Method::PATCH, table)
                    .query(&[(column, format!("eq.{}", value))])
                    .header("Prefer", "return=representation")
                    .json(&patch),
            )
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, table: &str, column: &str, value: &str) -> Result<(), RemoteError> {
        debug!(table, column, value, "remote delete");
        self.send(
            self.request(Method::DELETE, table)
                .query(&[(column, format!("eq.{}", value))]),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, Order};

    #[test]
    fn test_new_normalizes_url() {
        let client = RestClient::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(client.base_url(), "https://abc.supabase.co");
        assert_eq!(
            client.table_url("patients"),
            "https://abc.supabase.co/rest/v1/patients"
        );

        let client = RestClient::new("localhost:54321", "key").unwrap();
        assert_eq!(client.base_url(), "http://localhost:54321");
    }

    #[test]
    fn test_new_rejects_empty_url() {
        assert!(matches!(
            RestClient::new("  ", "key"),
            Err(RemoteError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_from_settings() {
        assert!(RestClient::from_settings(&RemoteSettings::default())
            .unwrap()
            .is_none());

        let settings = RemoteSettings::new("http://127.0.0.1:9", "key");
        assert!(RestClient::from_settings(&settings).unwrap().is_some());
    }

    #[test]
    fn test_order_param() {
        let query = ListQuery::default_for(EntityKind::Appointments);
        assert_eq!(order_param(&query).as_deref(), Some("appointment_date.asc"));

        let query = ListQuery::default().ordered_by(Order::desc("created_at"));
        assert_eq!(order_param(&query).as_deref(), Some("created_at.desc"));

        assert_eq!(order_param(&ListQuery::default()), None);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"code":"23505","message":"duplicate key value"}"#),
            "duplicate key value"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        // port 9 (discard) is not listening on loopback in test environments
        let client = RestClient::new("http://127.0.0.1:9", "key").unwrap();
        let result = client.select("patients", &ListQuery::default()).await;
        assert!(matches!(result, Err(RemoteError::Http(_))));
    }
}
