use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Whole numbers are counts whether written as `10`, `10.0` or `"10"`.
/// Anything else, including missing and `null`, reads as zero.
fn count_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    };
    Ok(count.unwrap_or_default())
}

fn whole(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

fn vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    #[serde(default, deserialize_with = "count_or_zero")]
    pub total_funcionarios: i64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub presentes_hoje: i64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub ausentes_hoje: i64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub atrasados_hoje: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyHoursData {
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceStatusData {
    #[serde(default, deserialize_with = "count_or_zero")]
    pub presentes: i64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub ausentes: i64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub atrasados: i64,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricField {
    TotalFuncionarios,
    PresentesHoje,
    AusentesHoje,
    AtrasadosHoje,
}

impl MetricField {
    pub const ALL: [MetricField; 4] = [
        MetricField::TotalFuncionarios,
        MetricField::PresentesHoje,
        MetricField::AusentesHoje,
        MetricField::AtrasadosHoje,
    ];

    pub fn title(self) -> &'static str {
        match self {
            MetricField::TotalFuncionarios => "Funcionários",
            MetricField::PresentesHoje => "Presentes hoje",
            MetricField::AusentesHoje => "Ausentes hoje",
            MetricField::AtrasadosHoje => "Atrasados hoje",
        }
    }

    pub fn read(self, metrics: &DashboardMetrics) -> i64 {
        match self {
            MetricField::TotalFuncionarios => metrics.total_funcionarios,
            MetricField::PresentesHoje => metrics.presentes_hoje,
            MetricField::AusentesHoje => metrics.ausentes_hoje,
            MetricField::AtrasadosHoje => metrics.atrasados_hoje,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasId {
    WeeklyHours,
    PresenceStatus,
}

impl CanvasId {
    pub fn name(self) -> &'static str {
        match self {
            CanvasId::WeeklyHours => "weeklyHoursChart",
            CanvasId::PresenceStatus => "presenceStatusChart",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    /// Shown as a popup because there is no message panel.
    pub alert: bool,
    pub at: DateTime<Local>,
}
