use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Points},
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, LegendPosition as ChartLegend, Paragraph, Wrap,
    },
};

use crate::charts::{slice_at, LegendPosition, LineChartConfig, PieChartConfig, Rgba};
use crate::models::MetricField;
use crate::state::DashboardState;
use crate::tui::layout::{centered_rect, create_layout};

const SPINNERS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn to_color(c: Rgba) -> Color {
    let (r, g, b) = c.over_black();
    Color::Rgb(r, g, b)
}

fn legend_position(p: LegendPosition) -> ChartLegend {
    match p {
        LegendPosition::Top => ChartLegend::Top,
    }
}

pub fn render_dashboard(frame: &mut Frame, state: &DashboardState, show_help: bool, tick: usize) {
    let layout = create_layout(frame.area(), &state.layout);

    render_header(frame, state, layout.header, tick);
    for (field, area) in MetricField::ALL.iter().zip(layout.cards) {
        render_metric_card(frame, state, *field, area);
    }
    if let Some(area) = layout.weekly_hours {
        render_weekly_hours(frame, state, area);
    }
    if let Some(area) = layout.presence_status {
        render_presence_status(frame, state, area);
    }
    if let Some(area) = layout.message {
        render_message_bar(frame, state, area);
    }
    if state.has_alert() {
        render_alert_popup(frame, state);
    }
    if show_help {
        render_help_popup(frame);
    }
}

fn render_header(frame: &mut Frame, state: &DashboardState, area: Rect, tick: usize) {
    let mut spans = vec![
        Span::styled(" 📋 Painel de Presença ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
    ];
    if state.loading {
        spans.push(Span::styled(
            format!("{} Carregando ", SPINNERS[tick % SPINNERS.len()]),
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(at) = state.last_updated {
        spans.push(Span::styled(
            format!("Atualizado às {} ", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::styled(
        "  [r] atualizar  [L] sair da sessão  [?] ajuda  [q] fechar",
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_metric_card(frame: &mut Frame, state: &DashboardState, field: MetricField, area: Rect) {
    let (icon, color) = match field {
        MetricField::TotalFuncionarios => (" 👥 ", Color::Cyan),
        MetricField::PresentesHoje => (" ✅ ", Color::Green),
        MetricField::AusentesHoje => (" ❌ ", Color::Red),
        MetricField::AtrasadosHoje => (" ⏰ ", Color::Yellow),
    };
    let card = Paragraph::new(vec![
        Line::from(Span::styled(
            state.metric_text(field),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(field.title(), Style::default().fg(Color::DarkGray))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(icon)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(card, area);
}

fn empty_panel(frame: &mut Frame, title: &str, text: &str, area: Rect) {
    let empty = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
    frame.render_widget(empty, area);
}

fn render_weekly_hours(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let Some(chart) = state.weekly_hours.live() else {
        empty_panel(frame, "📈 Horas Trabalhadas na Semana", "Sem dados", area);
        return;
    };
    render_line_chart(frame, &chart.config, area);
}

fn render_line_chart(frame: &mut Frame, config: &LineChartConfig, area: Rect) {
    let points = config.points();
    let curve = config.curve(8);
    let fill = if config.dataset.fill { config.curve(24) } else { Vec::new() };
    let [y_min, y_max] = config.y_bounds();

    let mut datasets = Vec::new();
    if !fill.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Bar)
                .style(Style::default().fg(to_color(config.dataset.fill_color)))
                .data(&fill),
        );
    }
    datasets.push(
        Dataset::default()
            .name(config.dataset.label)
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(to_color(config.dataset.border_color)))
            .data(&curve),
    );
    datasets.push(
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::White))
            .data(&points),
    );

    let y_labels = vec![
        format!("{:.1}", y_min),
        format!("{:.1}", (y_min + y_max) / 2.0),
        format!("{:.1}", y_max),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" 📈 {} ", config.title)),
        )
        .x_axis(
            Axis::default()
                .title(config.x_axis.title)
                .style(Style::default().fg(Color::DarkGray))
                .bounds(config.x_bounds())
                .labels(config.labels.clone()),
        )
        .y_axis(
            Axis::default()
                .title(config.y_axis.title)
                .style(Style::default().fg(Color::DarkGray))
                .bounds([y_min, y_max])
                .labels(y_labels),
        )
        .legend_position(Some(legend_position(config.legend)));
    frame.render_widget(chart, area);
}

fn render_presence_status(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let Some(chart) = state.presence_status.live() else {
        empty_panel(frame, "🥧 Status de Presença Hoje", "Sem dados", area);
        return;
    };
    render_pie_chart(frame, &chart.config, area);
}

fn render_pie_chart(frame: &mut Frame, config: &PieChartConfig, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" 🥧 {} ", config.title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let legend_height = if config.legend == LegendPosition::Top { 2 } else { 0 };
    let chunks = Layout::vertical([Constraint::Length(legend_height), Constraint::Min(3)]).split(inner);
    let slices = config.slices();

    let legend: Vec<Span> = config
        .labels
        .iter()
        .zip(config.colors.iter())
        .flat_map(|(label, color)| {
            let (value, pct) = slices
                .iter()
                .find(|s| s.label == *label)
                .map(|s| (s.value, s.percent()))
                .unwrap_or((0.0, 0.0));
            vec![
                Span::styled("██ ", Style::default().fg(to_color(*color))),
                Span::styled(
                    format!("{} {} ({:.0}%)  ", label, value, pct),
                    Style::default().fg(Color::White),
                ),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(legend)).wrap(Wrap { trim: true }), chunks[0]);

    let pie_area = chunks[1];
    if slices.is_empty() {
        frame.render_widget(
            Paragraph::new("Sem registros hoje")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            pie_area,
        );
        return;
    }

    // Braille dots are roughly square, so dot counts give the aspect ratio.
    let cols = pie_area.width as usize * 2;
    let rows = pie_area.height as usize * 4;
    if cols == 0 || rows == 0 {
        return;
    }
    let x_extent = cols as f64 / rows as f64;
    let radius = x_extent.min(1.0) * 0.95;

    let mut coords: Vec<Vec<(f64, f64)>> = vec![Vec::new(); slices.len()];
    for cx in 0..cols {
        for cy in 0..rows {
            let x = -x_extent + (cx as f64 + 0.5) / cols as f64 * 2.0 * x_extent;
            let y = -1.0 + (cy as f64 + 0.5) / rows as f64 * 2.0;
            if x * x + y * y > radius * radius {
                continue;
            }
            if let Some(i) = slice_at(&slices, x, y) {
                coords[i].push((x, y));
            }
        }
    }

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-x_extent, x_extent])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            for (slice, points) in slices.iter().zip(coords.iter()) {
                ctx.draw(&Points {
                    coords: points,
                    color: to_color(slice.color),
                });
            }
        });
    frame.render_widget(canvas, pie_area);
}

fn render_message_bar(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let line = match &state.message {
        Some(msg) if !msg.alert => {
            let color = if msg.is_error { Color::Red } else { Color::Green };
            Line::from(vec![
                Span::styled(format!("[{}] ", msg.at.format("%H:%M:%S")), Style::default().fg(Color::DarkGray)),
                Span::styled(msg.text.clone(), Style::default().fg(color)),
            ])
        }
        _ => Line::from(""),
    };
    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Mensagens "));
    frame.render_widget(bar, area);
}

fn render_alert_popup(frame: &mut Frame, state: &DashboardState) {
    let Some(msg) = &state.message else { return };
    let area = centered_rect(60, 25, frame.area());
    frame.render_widget(Clear, area);

    let color = if msg.is_error { Color::Red } else { Color::Green };
    let text = vec![
        Line::from(Span::styled(msg.text.clone(), Style::default().fg(color))),
        Line::from(""),
        Line::from(Span::styled("Enter para fechar", Style::default().fg(Color::DarkGray))),
    ];
    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Aviso ")
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(popup, area);
}

fn render_help_popup(frame: &mut Frame) {
    let area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, area);
    let key = |k: &'static str| Span::styled(format!("{:>8}  ", k), Style::default().fg(Color::Yellow));
    let text = vec![
        Line::from(vec![key("r"), Span::raw("Recarregar métricas e gráficos")]),
        Line::from(vec![key("L"), Span::raw("Encerrar a sessão")]),
        Line::from(vec![key("Enter"), Span::raw("Fechar aviso")]),
        Line::from(vec![key("?"), Span::raw("Mostrar/ocultar ajuda")]),
        Line::from(vec![key("q / Esc"), Span::raw("Fechar o painel")]),
    ];
    let help = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Ajuda ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(help, area);
}
