use thiserror::Error;

/// Failures surfaced by the dashboard. The variant decides the policy:
/// session and authorization failures redirect to login, everything else
/// is shown inline and leaves the rest of the dashboard alone.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("session token not found")]
    MissingSession,

    #[error("not authorized (HTTP {status}){}", fmt_message(.message))]
    Unauthorized { status: u16, message: Option<String> },

    #[error("role '{role}' may not access the dashboard")]
    RoleMismatch { role: String },

    #[error("request failed (HTTP {status}){}", fmt_message(.message))]
    RequestFailed { status: u16, message: Option<String> },

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("session storage: {0}")]
    Storage(String),
}

fn fmt_message(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default()
}

impl DashboardError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            DashboardError::MissingSession
                | DashboardError::Unauthorized { .. }
                | DashboardError::RoleMismatch { .. }
        )
    }

    /// Message the backend attached to a non-2xx response, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            DashboardError::Unauthorized { message, .. }
            | DashboardError::RequestFailed { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("{labels} rótulos para {values} valores")]
    LengthMismatch { labels: usize, values: usize },

    #[error("valor inválido na posição {index}")]
    NonFinite { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_grouping() {
        assert!(DashboardError::MissingSession.is_auth_failure());
        assert!(DashboardError::Unauthorized { status: 401, message: None }.is_auth_failure());
        assert!(DashboardError::RoleMismatch { role: "USER".into() }.is_auth_failure());
        assert!(!DashboardError::RequestFailed { status: 500, message: None }.is_auth_failure());
        assert!(!DashboardError::Storage("disk".into()).is_auth_failure());
    }

    #[test]
    fn test_display_includes_server_message() {
        let err = DashboardError::Unauthorized { status: 403, message: Some("forbidden".into()) };
        assert_eq!(err.to_string(), "not authorized (HTTP 403): forbidden");
        assert_eq!(err.server_message(), Some("forbidden"));

        let err = DashboardError::RequestFailed { status: 500, message: None };
        assert_eq!(err.to_string(), "request failed (HTTP 500)");
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_chart_error_display() {
        let err = ChartError::LengthMismatch { labels: 7, values: 5 };
        assert_eq!(err.to_string(), "7 rótulos para 5 valores");
    }
}
