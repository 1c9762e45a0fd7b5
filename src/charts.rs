use std::f64::consts::TAU;

use tracing::debug;

use crate::error::ChartError;
use crate::models::{CanvasId, PresenceStatusData, WeeklyHoursData};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Colour after compositing over a black background.
    pub fn over_black(self) -> (u8, u8, u8) {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |c: u8| (c as f64 * a).round() as u8;
        (mix(self.r), mix(self.g), mix(self.b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    Top,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisConfig {
    pub title: &'static str,
    pub begin_at_zero: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineDataset {
    pub label: &'static str,
    pub data: Vec<f64>,
    pub border_color: Rgba,
    pub fill_color: Rgba,
    pub tension: f64,
    pub fill: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChartConfig {
    pub title: &'static str,
    pub labels: Vec<String>,
    pub dataset: LineDataset,
    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,
    pub legend: LegendPosition,
}

const LINE_BLUE: Rgba = Rgba::rgb(0, 123, 255);

impl LineChartConfig {
    /// Worked hours per weekday: one filled, smoothed series with the
    /// y-axis anchored at zero. Any number of labels is accepted as long
    /// as every label has exactly one finite value.
    pub fn weekly_hours(data: &WeeklyHoursData) -> Result<Self, ChartError> {
        if data.labels.len() != data.data.len() {
            return Err(ChartError::LengthMismatch {
                labels: data.labels.len(),
                values: data.data.len(),
            });
        }
        if let Some(index) = data.data.iter().position(|v| !v.is_finite()) {
            return Err(ChartError::NonFinite { index });
        }

        Ok(Self {
            title: "Horas Trabalhadas na Semana",
            labels: data.labels.clone(),
            dataset: LineDataset {
                label: "Horas Trabalhadas",
                data: data.data.clone(),
                border_color: LINE_BLUE,
                fill_color: LINE_BLUE.with_alpha(0.2),
                tension: 0.3,
                fill: true,
            },
            x_axis: AxisConfig { title: "Dia da Semana", begin_at_zero: false },
            y_axis: AxisConfig { title: "Horas", begin_at_zero: true },
            legend: LegendPosition::Top,
        })
    }

    /// Data points with the label index as x.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.dataset
            .data
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect()
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        let last = self.labels.len().saturating_sub(1) as f64;
        [0.0, last.max(1.0)]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        let data = &self.dataset.data;
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let lower = if self.y_axis.begin_at_zero || data.is_empty() { min.min(0.0) } else { min };
        let lower = if lower.is_finite() { lower } else { 0.0 };
        let upper = if max.is_finite() { max + (max - lower).abs() * 0.1 } else { 0.0 };
        if upper <= lower {
            [lower, lower + 1.0]
        } else {
            [lower, upper]
        }
    }

    pub fn curve(&self, steps_per_segment: usize) -> Vec<(f64, f64)> {
        smooth_curve(&self.points(), self.dataset.tension, steps_per_segment)
    }
}

/// Samples a cubic Bézier spline through `points`. Control points follow the
/// neighbouring points, scaled by `tension` (0 gives straight segments).
pub fn smooth_curve(points: &[(f64, f64)], tension: f64, steps_per_segment: usize) -> Vec<(f64, f64)> {
    if points.len() < 2 || steps_per_segment == 0 {
        return points.to_vec();
    }

    let controls: Vec<((f64, f64), (f64, f64))> = (0..points.len())
        .map(|i| {
            let prev = points[i.saturating_sub(1)];
            let cur = points[i];
            let next = points[(i + 1).min(points.len() - 1)];
            spline_controls(prev, cur, next, tension)
        })
        .collect();

    let mut out = Vec::with_capacity((points.len() - 1) * steps_per_segment + 1);
    for i in 0..points.len() - 1 {
        let p0 = points[i];
        let p1 = controls[i].1;
        let p2 = controls[i + 1].0;
        let p3 = points[i + 1];
        for step in 0..steps_per_segment {
            let t = step as f64 / steps_per_segment as f64;
            out.push(cubic_bezier(p0, p1, p2, p3, t));
        }
    }
    if let Some(last) = points.last() {
        out.push(*last);
    }
    out
}

fn spline_controls(
    prev: (f64, f64),
    cur: (f64, f64),
    next: (f64, f64),
    tension: f64,
) -> ((f64, f64), (f64, f64)) {
    let d01 = ((cur.0 - prev.0).powi(2) + (cur.1 - prev.1).powi(2)).sqrt();
    let d12 = ((next.0 - cur.0).powi(2) + (next.1 - cur.1).powi(2)).sqrt();
    let total = d01 + d12;
    let (s01, s12) = if total > 0.0 { (d01 / total, d12 / total) } else { (0.0, 0.0) };
    let fa = tension * s01;
    let fb = tension * s12;
    let dx = next.0 - prev.0;
    let dy = next.1 - prev.1;
    (
        (cur.0 - fa * dx, cur.1 - fa * dy),
        (cur.0 + fb * dx, cur.1 + fb * dy),
    )
}

fn cubic_bezier(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), p3: (f64, f64), t: f64) -> (f64, f64) {
    let u = 1.0 - t;
    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;
    (
        b0 * p0.0 + b1 * p1.0 + b2 * p2.0 + b3 * p3.0,
        b0 * p0.1 + b1 * p1.1 + b2 * p2.1 + b3 * p3.1,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChartConfig {
    pub title: &'static str,
    pub labels: [&'static str; 3],
    pub data: [f64; 3],
    pub colors: [Rgba; 3],
    pub legend: LegendPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: &'static str,
    pub value: f64,
    pub color: Rgba,
    /// Fractions of a full turn, clockwise from 12 o'clock.
    pub start: f64,
    pub sweep: f64,
}

impl PieSlice {
    pub fn percent(&self) -> f64 {
        self.sweep * 100.0
    }
}

const PRESENT_GREEN: Rgba = Rgba::rgb(0x28, 0xa7, 0x45);
const ABSENT_RED: Rgba = Rgba::rgb(0xdc, 0x35, 0x45);
const LATE_AMBER: Rgba = Rgba::rgb(0xff, 0xc1, 0x07);

impl PieChartConfig {
    /// Always three categories in the same order and colours.
    pub fn presence_status(data: &PresenceStatusData) -> Self {
        Self {
            title: "Status de Presença Hoje",
            labels: ["Presentes", "Ausentes", "Atrasados"],
            data: [data.presentes as f64, data.ausentes as f64, data.atrasados as f64],
            colors: [PRESENT_GREEN, ABSENT_RED, LATE_AMBER],
            legend: LegendPosition::Top,
        }
    }

    pub fn total(&self) -> f64 {
        self.data.iter().map(|v| v.max(0.0)).sum()
    }

    /// Non-empty categories with their share of the circle. Empty when
    /// every count is zero.
    pub fn slices(&self) -> Vec<PieSlice> {
        let total = self.total();
        if total <= 0.0 {
            return Vec::new();
        }
        let mut start = 0.0;
        let mut slices = Vec::new();
        for i in 0..self.labels.len() {
            let value = self.data[i].max(0.0);
            if value == 0.0 {
                continue;
            }
            let sweep = value / total;
            slices.push(PieSlice {
                label: self.labels[i],
                value,
                color: self.colors[i],
                start,
                sweep,
            });
            start += sweep;
        }
        slices
    }
}

/// Index into `slices` of the slice covering the point `(x, y)` relative to
/// the pie centre.
pub fn slice_at(slices: &[PieSlice], x: f64, y: f64) -> Option<usize> {
    let turn = x.atan2(y).rem_euclid(TAU) / TAU;
    slices
        .iter()
        .position(|s| turn >= s.start && turn < s.start + s.sweep)
        .or_else(|| if slices.is_empty() { None } else { Some(slices.len() - 1) })
}

/// A chart bound to a canvas.
#[derive(Debug)]
pub struct ChartInstance<C> {
    pub id: u64,
    pub canvas: CanvasId,
    pub config: C,
}

impl<C> ChartInstance<C> {
    fn destroy(self) {
        debug!(canvas = self.canvas.name(), id = self.id, "chart destroyed");
    }
}

/// Holds at most one live chart for a canvas. Installing a new chart always
/// releases the previous one first.
#[derive(Debug)]
pub struct ChartSlot<C> {
    canvas: CanvasId,
    instance: Option<ChartInstance<C>>,
    created: u64,
    destroyed: u64,
}

impl<C> ChartSlot<C> {
    pub fn new(canvas: CanvasId) -> Self {
        Self {
            canvas,
            instance: None,
            created: 0,
            destroyed: 0,
        }
    }

    /// Releases the current chart, if any.
    pub fn clear(&mut self) {
        if let Some(old) = self.instance.take() {
            old.destroy();
            self.destroyed += 1;
        }
    }

    pub fn replace(&mut self, config: C) -> &ChartInstance<C> {
        self.clear();
        self.created += 1;
        debug!(
            canvas = self.canvas.name(),
            id = self.created,
            live = self.live_count(),
            destroyed = self.destroyed(),
            "chart created"
        );
        self.instance.insert(ChartInstance {
            id: self.created,
            canvas: self.canvas,
            config,
        })
    }

    pub fn live(&self) -> Option<&ChartInstance<C>> {
        self.instance.as_ref()
    }

    pub fn live_count(&self) -> u64 {
        self.created - self.destroyed
    }

    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly(labels: &[&str], data: &[f64]) -> WeeklyHoursData {
        WeeklyHoursData {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn test_weekly_hours_config() {
        let config = LineChartConfig::weekly_hours(&weekly(&["Seg", "Ter"], &[8.0, 7.5])).unwrap();
        assert_eq!(config.labels, vec!["Seg", "Ter"]);
        assert_eq!(config.dataset.data, vec![8.0, 7.5]);
        assert!(config.dataset.fill);
        assert_eq!(config.dataset.tension, 0.3);
        assert!(config.y_axis.begin_at_zero);
        assert_eq!(config.y_axis.title, "Horas");
        assert_eq!(config.x_axis.title, "Dia da Semana");
        assert_eq!(config.legend, LegendPosition::Top);
    }

    #[test]
    fn test_weekly_hours_rejects_bad_data() {
        assert_eq!(
            LineChartConfig::weekly_hours(&weekly(&["Seg", "Ter", "Qua"], &[8.0])),
            Err(ChartError::LengthMismatch { labels: 3, values: 1 })
        );
        assert_eq!(
            LineChartConfig::weekly_hours(&weekly(&["Seg", "Ter"], &[8.0, f64::NAN])),
            Err(ChartError::NonFinite { index: 1 })
        );
    }

    #[test]
    fn test_weekly_hours_accepts_any_length() {
        let labels = ["S", "T", "Q", "Q", "S", "S", "D", "S2", "T2"];
        let data = [1.0; 9];
        let config = LineChartConfig::weekly_hours(&weekly(&labels, &data)).unwrap();
        assert_eq!(config.points().len(), 9);
        assert_eq!(config.x_bounds(), [0.0, 8.0]);
    }

    #[test]
    fn test_y_bounds_start_at_zero() {
        let config = LineChartConfig::weekly_hours(&weekly(&["a", "b"], &[6.0, 9.0])).unwrap();
        let [lo, hi] = config.y_bounds();
        assert_eq!(lo, 0.0);
        assert!(hi > 9.0);

        let empty = LineChartConfig::weekly_hours(&WeeklyHoursData::default()).unwrap();
        assert_eq!(empty.y_bounds(), [0.0, 1.0]);

        let zeros = LineChartConfig::weekly_hours(&weekly(&["a"], &[0.0])).unwrap();
        assert_eq!(zeros.y_bounds(), [0.0, 1.0]);
    }

    #[test]
    fn test_smooth_curve_passes_through_points() {
        let points = [(0.0, 8.0), (1.0, 7.5), (2.0, 9.0), (3.0, 0.0)];
        let curve = smooth_curve(&points, 0.3, 10);
        assert_eq!(curve.len(), 3 * 10 + 1);
        for (i, p) in points.iter().enumerate() {
            let sample = curve[i * 10];
            assert!((sample.0 - p.0).abs() < 1e-9);
            assert!((sample.1 - p.1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_smooth_curve_straight_line_stays_straight() {
        let points = [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)];
        for (x, y) in smooth_curve(&points, 0.3, 8) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_smooth_curve_degenerate_inputs() {
        assert!(smooth_curve(&[], 0.3, 8).is_empty());
        assert_eq!(smooth_curve(&[(0.0, 4.0)], 0.3, 8), vec![(0.0, 4.0)]);
    }

    #[test]
    fn test_presence_status_fixed_order() {
        let config = PieChartConfig::presence_status(&PresenceStatusData {
            presentes: 5,
            ausentes: 1,
            atrasados: 0,
        });
        assert_eq!(config.labels, ["Presentes", "Ausentes", "Atrasados"]);
        assert_eq!(config.data, [5.0, 1.0, 0.0]);
        assert_eq!(config.colors, [PRESENT_GREEN, ABSENT_RED, LATE_AMBER]);
        assert_eq!(config.legend, LegendPosition::Top);
    }

    #[test]
    fn test_pie_slices() {
        let config = PieChartConfig::presence_status(&PresenceStatusData {
            presentes: 6,
            ausentes: 0,
            atrasados: 2,
        });
        let slices = config.slices();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "Presentes");
        assert_eq!(slices[0].start, 0.0);
        assert!((slices[0].percent() - 75.0).abs() < 1e-9);
        assert_eq!(slices[1].label, "Atrasados");
        assert!((slices[1].start - 0.75).abs() < 1e-9);

        let empty = PieChartConfig::presence_status(&PresenceStatusData::default());
        assert!(empty.slices().is_empty());
    }

    #[test]
    fn test_slice_at_clockwise_from_top() {
        let config = PieChartConfig::presence_status(&PresenceStatusData {
            presentes: 1,
            ausentes: 1,
            atrasados: 2,
        });
        let slices = config.slices();
        // right half: first quarter is Presentes, second Ausentes
        assert_eq!(slice_at(&slices, 0.5, 0.5), Some(0));
        assert_eq!(slice_at(&slices, 0.5, -0.5), Some(1));
        assert_eq!(slice_at(&slices, -0.5, 0.0), Some(2));
        assert_eq!(slice_at(&[], 0.5, 0.5), None);
    }

    #[test]
    fn test_over_black() {
        assert_eq!(LINE_BLUE.over_black(), (0, 123, 255));
        assert_eq!(LINE_BLUE.with_alpha(0.2).over_black(), (0, 25, 51));
    }

    #[test]
    fn test_slot_replace_destroys_previous() {
        let mut slot = ChartSlot::new(CanvasId::WeeklyHours);
        assert!(slot.live().is_none());

        let first = slot.replace("first").id;
        let second = slot.replace("second").id;
        assert_ne!(first, second);
        assert_eq!(slot.live().map(|c| c.config), Some("second"));
        assert_eq!(slot.live_count(), 1);
        assert_eq!(slot.destroyed(), 1);

        slot.clear();
        assert!(slot.live().is_none());
        assert_eq!(slot.live_count(), 0);
        slot.clear();
        assert_eq!(slot.destroyed(), 2);
    }
}
