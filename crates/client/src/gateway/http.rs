use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use eventdesk_catalog::{Event, EventCategory, EventDraft};
use eventdesk_core::EventId;

use super::r#trait::{EventGateway, GatewayError, GatewayResult};
use crate::config::ClientConfig;

/// `EventGateway` backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpEventGateway {
    client: Client,
    base_url: String,
}

impl HttpEventGateway {
    pub fn new(config: &ClientConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Unreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request; non-success statuses become `GatewayError`s.
    async fn execute(&self, builder: RequestBuilder) -> GatewayResult<Response> {
        let request = builder
            .build()
            .map_err(|e| GatewayError::Unreachable(format!("invalid request: {e}")))?;
        let method = request.method().clone();
        let url = request.url().clone();

        tracing::debug!(%method, %url, "api request");

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "api request failed");
            GatewayError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!(%method, %url, status = status.as_u16(), "api response");

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            let err = error_from_status(status.as_u16(), &body);
            tracing::warn!(%method, %url, status = status.as_u16(), error = %err, "api error");
            Err(err)
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> GatewayResult<T> {
        let response = self.execute(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl EventGateway for HttpEventGateway {
    async fn list(&self) -> GatewayResult<Vec<Event>> {
        self.fetch(self.client.get(self.url("/events"))).await
    }

    async fn get(&self, id: EventId) -> GatewayResult<Event> {
        self.fetch(self.client.get(self.url(&format!("/events/{id}")))).await
    }

    async fn create(&self, draft: &EventDraft) -> GatewayResult<Event> {
        self.fetch(self.client.post(self.url("/events")).json(draft)).await
    }

    async fn update(&self, id: EventId, draft: &EventDraft) -> GatewayResult<Event> {
        self.fetch(self.client.put(self.url(&format!("/events/{id}"))).json(draft))
            .await
    }

    async fn delete(&self, id: EventId) -> GatewayResult<()> {
        self.execute(self.client.delete(self.url(&format!("/events/{id}"))))
            .await
            .map(|_| ())
    }

    async fn search_by_name(&self, name: &str) -> GatewayResult<Vec<Event>> {
        self.fetch(self.client.get(self.url("/events/search")).query(&[("name", name)]))
            .await
    }

    async fn by_category(&self, category: EventCategory) -> GatewayResult<Vec<Event>> {
        self.fetch(self.client.get(self.url(&format!("/events/category/{category}"))))
            .await
    }

    async fn upcoming(&self) -> GatewayResult<Vec<Event>> {
        self.fetch(self.client.get(self.url("/events/upcoming"))).await
    }

    async fn upcoming_by_category(&self, category: EventCategory) -> GatewayResult<Vec<Event>> {
        self.fetch(self.client.get(self.url(&format!("/events/upcoming/category/{category}"))))
            .await
    }

    async fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> GatewayResult<Vec<Event>> {
        let (start, end) = (start.to_string(), end.to_string());
        self.fetch(
            self.client
                .get(self.url("/events/date-range"))
                .query(&[("startDate", start.as_str()), ("endDate", end.as_str())]),
        )
        .await
    }

    async fn by_organizer(&self, organizer: &str) -> GatewayResult<Vec<Event>> {
        self.fetch(
            self.client
                .get(self.url("/events/organizer"))
                .query(&[("organizer", organizer)]),
        )
        .await
    }
}

/// Error body shapes produced by the backend: `{message}` and/or
/// `{errors: [{defaultMessage | message}]}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    message: Option<String>,
    errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldError {
    #[serde(default)]
    default_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn field_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .filter_map(|e| e.default_message.clone().or_else(|| e.message.clone()))
            .collect()
    }
}

/// Map a non-success status and its raw body to a `GatewayError`.
pub(crate) fn error_from_status(status: u16, body: &str) -> GatewayError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    match status {
        404 => GatewayError::NotFound,
        400 => {
            let mut messages = parsed.field_messages();
            if messages.is_empty() {
                messages.push(parsed.message.unwrap_or_else(|| "invalid data".to_string()));
            }
            GatewayError::Validation(messages)
        }
        500 => GatewayError::Internal,
        _ => GatewayError::Status {
            status,
            message: parsed.message.unwrap_or_else(|| format!("HTTP {status}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_not_found_and_internal() {
        assert_eq!(error_from_status(404, ""), GatewayError::NotFound);
        assert_eq!(error_from_status(500, "<html>boom</html>"), GatewayError::Internal);
    }

    #[test]
    fn aggregates_field_errors() {
        let body = r#"{"errors":[{"defaultMessage":"Event name is required"},{"message":"Capacity must be at least 1"},{"field":"x"}]}"#;
        assert_eq!(
            error_from_status(400, body),
            GatewayError::Validation(vec![
                "Event name is required".to_string(),
                "Capacity must be at least 1".to_string(),
            ])
        );
    }

    #[test]
    fn bad_request_without_errors_uses_message_or_default() {
        assert_eq!(
            error_from_status(400, r#"{"message":"Malformed JSON"}"#),
            GatewayError::Validation(vec!["Malformed JSON".to_string()])
        );
        assert_eq!(
            error_from_status(400, "not json"),
            GatewayError::Validation(vec!["invalid data".to_string()])
        );
    }

    #[test]
    fn other_statuses_keep_code_and_message() {
        assert_eq!(
            error_from_status(409, r#"{"message":"duplicate"}"#),
            GatewayError::Status {
                status: 409,
                message: "duplicate".to_string()
            }
        );
        assert_eq!(
            error_from_status(503, ""),
            GatewayError::Status {
                status: 503,
                message: "HTTP 503".to_string()
            }
        );
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = ClientConfig::default().with_api_url("http://localhost:9000/api/");
        let gateway = HttpEventGateway::new(&config).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:9000/api");
        assert_eq!(gateway.url("/events"), "http://localhost:9000/api/events");
    }
}
