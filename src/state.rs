use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::RwLock;
use tracing::warn;

use crate::charts::{ChartSlot, LineChartConfig, PieChartConfig};
use crate::config::LayoutConfig;
use crate::models::{CanvasId, DashboardMetrics, MetricField, StatusMessage};

/// Everything the dashboard view shows. Written by the controller, read by
/// the UI loop.
pub struct DashboardState {
    pub metrics: Option<DashboardMetrics>,
    pub message: Option<StatusMessage>,
    pub weekly_hours: ChartSlot<LineChartConfig>,
    pub presence_status: ChartSlot<PieChartConfig>,
    pub layout: LayoutConfig,
    pub loading: bool,
    pub last_updated: Option<DateTime<Local>>,
}

pub type SharedState = Arc<RwLock<DashboardState>>;

impl DashboardState {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            metrics: None,
            message: None,
            weekly_hours: ChartSlot::new(CanvasId::WeeklyHours),
            presence_status: ChartSlot::new(CanvasId::PresenceStatus),
            layout,
            loading: false,
            last_updated: None,
        }
    }

    pub fn shared(layout: LayoutConfig) -> SharedState {
        Arc::new(RwLock::new(Self::new(layout)))
    }

    pub fn has_canvas(&self, canvas: CanvasId) -> bool {
        match canvas {
            CanvasId::WeeklyHours => self.layout.weekly_hours_chart,
            CanvasId::PresenceStatus => self.layout.presence_status_chart,
        }
    }

    /// Text shown in a metric card; "--" until metrics have loaded.
    pub fn metric_text(&self, field: MetricField) -> String {
        self.metrics
            .as_ref()
            .map(|m| field.read(m).to_string())
            .unwrap_or_else(|| "--".into())
    }

    /// Replaces the current message. Without a message panel the message
    /// is raised as a popup instead.
    pub fn show_message(&mut self, text: impl Into<String>, is_error: bool) {
        let alert = !self.layout.message_panel;
        if alert {
            warn!("message panel disabled, showing message as popup");
        }
        self.message = Some(StatusMessage {
            text: text.into(),
            is_error,
            alert,
            at: Local::now(),
        });
    }

    pub fn dismiss_alert(&mut self) {
        if self.message.as_ref().is_some_and(|m| m.alert) {
            self.message = None;
        }
    }

    pub fn has_alert(&self) -> bool {
        self.message.as_ref().is_some_and(|m| m.alert)
    }
}
