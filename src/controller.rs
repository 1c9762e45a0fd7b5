use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::api::{ApiClient, Endpoint, METRICS, PRESENCE_STATUS, PROFILE_PATH, WEEKLY_HOURS};
use crate::charts::{LineChartConfig, PieChartConfig};
use crate::config::AuthConfig;
use crate::error::DashboardError;
use crate::models::{CanvasId, DashboardMetrics, PresenceStatusData, Profile, WeeklyHoursData};
use crate::redirect::Redirect;
use crate::session::TokenStore;
use crate::state::SharedState;

const MSG_NO_SESSION: &str = "Sessão não encontrada. Redirecionando para o login.";
const MSG_SESSION_EXPIRED: &str = "Sessão expirada ou não autenticada. Redirecionando para o login.";
const MSG_NOT_PERMITTED: &str = "Você não tem permissão para acessar este dashboard.";
const MSG_PERMISSION_CHECK_FAILED: &str = "Erro ao verificar permissões. Redirecionando para o login.";
const MSG_LOGGED_OUT: &str = "Sessão encerrada.";
const UNKNOWN_ERROR: &str = "Erro desconhecido";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub metrics: bool,
    pub weekly_hours: bool,
    pub presence_status: bool,
}

impl LoadSummary {
    pub fn is_complete(&self) -> bool {
        self.metrics && self.weekly_hours && self.presence_status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Denied,
    Loaded(LoadSummary),
}

pub struct DashboardController {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    redirect: Arc<dyn Redirect>,
    state: SharedState,
    auth: AuthConfig,
}

impl DashboardController {
    pub fn new(
        api: ApiClient,
        store: Arc<dyn TokenStore>,
        redirect: Arc<dyn Redirect>,
        state: SharedState,
        auth: AuthConfig,
    ) -> Self {
        Self { api, store, redirect, state, auth }
    }

    fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.auth.redirect_delay_ms)
    }

    async fn deny(&self, text: &str) {
        self.state.write().await.show_message(text, true);
        self.redirect.schedule(self.redirect_delay());
    }

    /// Checks that a session exists and belongs to the required role.
    /// Every failure shows a message and schedules the login redirect.
    pub async fn ensure_authorized(&self) -> Option<String> {
        let Some(token) = self.store.get() else {
            warn!("no session token");
            self.deny(MSG_NO_SESSION).await;
            return None;
        };

        match self.api.get_json::<Profile>(PROFILE_PATH, &token).await {
            Ok(profile) if profile.role.as_deref() == Some(self.auth.required_role.as_str()) => {
                info!(role = %self.auth.required_role, "session authorized");
                Some(token)
            }
            Ok(profile) => {
                let err = DashboardError::RoleMismatch {
                    role: profile.role.unwrap_or_default(),
                };
                warn!(error = %err, "access denied");
                self.deny(MSG_NOT_PERMITTED).await;
                None
            }
            Err(err @ (DashboardError::Unauthorized { .. } | DashboardError::RequestFailed { .. })) => {
                warn!(error = %err, "profile check rejected");
                self.deny(MSG_NOT_PERMITTED).await;
                None
            }
            Err(err) => {
                error!(error = %err, "profile check failed");
                self.deny(MSG_PERMISSION_CHECK_FAILED).await;
                None
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Option<T> {
        let Some(token) = self.store.get() else {
            warn!(path = endpoint.path, "no session token, skipping request");
            if endpoint.redirect_on_denied {
                self.report_failure(endpoint, &DashboardError::MissingSession).await;
            }
            return None;
        };

        info!(path = endpoint.path, "fetching");
        match self.api.get_json::<T>(endpoint.path, &token).await {
            Ok(data) => Some(data),
            Err(err) => {
                self.report_failure(endpoint, &err).await;
                None
            }
        }
    }

    async fn report_failure(&self, endpoint: Endpoint, err: &DashboardError) {
        error!(path = endpoint.path, error = %err, "request failed");
        self.state
            .write()
            .await
            .show_message(failure_message(endpoint, err), true);
        if err.is_auth_failure() && endpoint.redirect_on_denied {
            self.redirect.schedule(self.redirect_delay());
        }
    }

    /// Loads today's counts into the four metric cards.
    pub async fn fetch_metrics(&self) -> Option<DashboardMetrics> {
        let metrics: DashboardMetrics = self.fetch(METRICS).await?;
        info!(?metrics, "metrics loaded");
        self.state.write().await.metrics = Some(metrics.clone());
        Some(metrics)
    }

    pub async fn fetch_weekly_hours(&self) -> Option<WeeklyHoursData> {
        self.fetch(WEEKLY_HOURS).await
    }

    pub async fn fetch_presence_status(&self) -> Option<PresenceStatusData> {
        self.fetch(PRESENCE_STATUS).await
    }

    pub async fn render_weekly_hours_chart(&self, data: &WeeklyHoursData) {
        let mut state = self.state.write().await;
        if !state.has_canvas(CanvasId::WeeklyHours) {
            error!(canvas = CanvasId::WeeklyHours.name(), "canvas not found");
            return;
        }

        state.weekly_hours.clear();
        match LineChartConfig::weekly_hours(data) {
            Ok(config) => {
                state.weekly_hours.replace(config);
            }
            Err(err) => {
                error!(error = %err, "weekly hours chart not rendered");
                state.show_message(format!("Erro ao renderizar gráfico de horas semanais: {}", err), true);
            }
        }
    }

    pub async fn render_presence_status_chart(&self, data: &PresenceStatusData) {
        let mut state = self.state.write().await;
        if !state.has_canvas(CanvasId::PresenceStatus) {
            error!(canvas = CanvasId::PresenceStatus.name(), "canvas not found");
            return;
        }
        state.presence_status.replace(PieChartConfig::presence_status(data));
    }

    /// Runs once at startup: session guard first, then the three widgets in
    /// order. A failed widget only skips its own chart.
    pub async fn initialize(&self) -> InitOutcome {
        self.state.write().await.loading = true;
        if self.ensure_authorized().await.is_none() {
            self.state.write().await.loading = false;
            return InitOutcome::Denied;
        }
        let summary = self.load_widgets().await;
        info!(?summary, "dashboard initialized");
        InitOutcome::Loaded(summary)
    }

    /// Reloads the widgets without repeating the session guard.
    pub async fn refresh(&self) -> LoadSummary {
        let summary = self.load_widgets().await;
        info!(?summary, "dashboard refreshed");
        summary
    }

    async fn load_widgets(&self) -> LoadSummary {
        self.state.write().await.loading = true;

        let metrics = self.fetch_metrics().await.is_some();

        let weekly_hours = match self.fetch_weekly_hours().await {
            Some(data) => {
                self.render_weekly_hours_chart(&data).await;
                true
            }
            None => false,
        };

        let presence_status = match self.fetch_presence_status().await {
            Some(data) => {
                self.render_presence_status_chart(&data).await;
                true
            }
            None => false,
        };

        let mut state = self.state.write().await;
        state.loading = false;
        state.last_updated = Some(Local::now());

        LoadSummary { metrics, weekly_hours, presence_status }
    }

    pub async fn logout(&self) {
        if let Err(err) = self.store.remove() {
            warn!(error = %err, "could not remove session token");
        }
        info!("logged out");
        self.state.write().await.show_message(MSG_LOGGED_OUT, false);
        self.redirect.schedule(Duration::ZERO);
    }
}

fn failure_message(endpoint: Endpoint, err: &DashboardError) -> String {
    match err {
        DashboardError::MissingSession => MSG_SESSION_EXPIRED.to_string(),
        DashboardError::Unauthorized { .. } | DashboardError::RoleMismatch { .. } => {
            let detail = err.server_message().map(|m| format!(": {}", m)).unwrap_or_default();
            let mut text = format!("Não autorizado a acessar {}{}.", endpoint.scope, detail);
            if endpoint.redirect_on_denied {
                text.push_str(" Redirecionando para o login.");
            }
            text
        }
        DashboardError::RequestFailed { message, .. } => format!(
            "Erro ao carregar {}: {}",
            endpoint.subject,
            message.as_deref().unwrap_or(UNKNOWN_ERROR)
        ),
        DashboardError::Network(e) => network_message(endpoint, e),
        DashboardError::Decode(e) => network_message(endpoint, e),
        DashboardError::Storage(e) => format!("Erro ao carregar {}: {}", endpoint.subject, e),
    }
}

fn network_message(endpoint: Endpoint, reason: &dyn std::fmt::Display) -> String {
    format!(
        "Erro de rede ao carregar {}: {}. Verifique sua conexão com o backend.",
        endpoint.subject, reason
    )
}
