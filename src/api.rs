use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::DashboardError;
use crate::models::ErrorBody;

pub const PROFILE_PATH: &str = "/auth/profile";

/// A dashboard resource and how its failures are worded.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub path: &'static str,
    /// Used in "Erro ao carregar ..." messages.
    pub subject: &'static str,
    /// Used in "Não autorizado a acessar ..." messages.
    pub scope: &'static str,
    pub redirect_on_denied: bool,
}

pub const METRICS: Endpoint = Endpoint {
    path: "/dashboard/metrics",
    subject: "métricas",
    scope: "o dashboard",
    redirect_on_denied: true,
};

pub const WEEKLY_HOURS: Endpoint = Endpoint {
    path: "/dashboard/weekly-hours",
    subject: "horas semanais",
    scope: "dados de horas semanais",
    redirect_on_denied: false,
};

pub const PRESENCE_STATUS: Endpoint = Endpoint {
    path: "/dashboard/presence-status",
    subject: "status de presença",
    scope: "dados de status de presença",
    redirect_on_denied: false,
};

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, DashboardError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `base_url + path` with the bearer token. 2xx bodies decode into
    /// `T`; 401/403 and other statuses carry the server's `message`, if any.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, DashboardError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "response");

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DashboardError::Unauthorized {
                status: status.as_u16(),
                message,
            }),
            _ => Err(DashboardError::RequestFailed {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::mock_backend::{unreachable_base_url, MockBackend, MockReply};
    use crate::models::{DashboardMetrics, WeeklyHoursData};

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_sends_bearer_and_content_type() {
        let backend = MockBackend::start(vec![(
            METRICS.path,
            MockReply::json(StatusCode::OK, json!({"totalFuncionarios": 4})),
        )])
        .await;

        let metrics: DashboardMetrics =
            client(&backend.base_url).get_json(METRICS.path, "tok-1").await.unwrap();
        assert_eq!(metrics.total_funcionarios, 4);

        let hits = backend.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "/dashboard/metrics");
        assert_eq!(hits[0].authorization.as_deref(), Some("Bearer tok-1"));
        assert_eq!(hits[0].content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let backend = MockBackend::start(vec![(
            WEEKLY_HOURS.path,
            MockReply::json(StatusCode::OK, json!({"labels": ["Seg"], "data": [8]})),
        )])
        .await;

        let data: WeeklyHoursData = client(&format!("{}/", backend.base_url))
            .get_json(WEEKLY_HOURS.path, "t")
            .await
            .unwrap();
        assert_eq!(data.labels, vec!["Seg"]);
        assert_eq!(backend.hits()[0].path, "/dashboard/weekly-hours");
    }

    #[tokio::test]
    async fn test_401_and_403_are_unauthorized() {
        let backend = MockBackend::start(vec![
            (METRICS.path, MockReply::json(StatusCode::FORBIDDEN, json!({"message": "forbidden"}))),
            (WEEKLY_HOURS.path, MockReply::raw(StatusCode::UNAUTHORIZED, "")),
        ])
        .await;
        let api = client(&backend.base_url);

        let err = api.get_json::<DashboardMetrics>(METRICS.path, "t").await.unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Unauthorized { status: 403, ref message } if message.as_deref() == Some("forbidden")
        ));

        let err = api.get_json::<WeeklyHoursData>(WEEKLY_HOURS.path, "t").await.unwrap_err();
        assert!(matches!(err, DashboardError::Unauthorized { status: 401, message: None }));
    }

    #[tokio::test]
    async fn test_other_status_is_request_failed() {
        let backend = MockBackend::start(vec![(
            METRICS.path,
            MockReply::json(StatusCode::INTERNAL_SERVER_ERROR, json!({"message": "db down"})),
        )])
        .await;

        let err = client(&backend.base_url)
            .get_json::<DashboardMetrics>(METRICS.path, "t")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::RequestFailed { status: 500, ref message } if message.as_deref() == Some("db down")
        ));
        assert!(!err.is_auth_failure());
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let backend = MockBackend::start(vec![(
            METRICS.path,
            MockReply::raw(StatusCode::OK, "<html>oops</html>"),
        )])
        .await;

        let err = client(&backend.base_url)
            .get_json::<DashboardMetrics>(METRICS.path, "t")
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let base_url = unreachable_base_url().await;
        let err = client(&base_url)
            .get_json::<DashboardMetrics>(METRICS.path, "t")
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Network(_)));
    }
}
