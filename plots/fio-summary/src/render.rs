use std::path::Path;

use common::{
    config::{ChartConfig, HexColor},
    summary::Metric,
};
use eyre::Result;
use plotters::{
    coord::Shift,
    prelude::*,
    style::{
        FontStyle, FontTransform,
        text_anchor::{HPos, Pos, VPos},
    },
};

use crate::{
    layout::{Canvas, bar_span, font_px},
    series::Series,
};

const FONT: &str = "sans-serif";

/// One value axis with a read and a write series side by side.
#[derive(Debug, Clone, Copy)]
pub struct Panel {
    pub title: &'static str,
    pub y_desc: &'static str,
    pub metrics: [Metric; 2],
}

pub const IOPS_PANEL: Panel = Panel {
    title: "IOPS Performance (Read/Write)",
    y_desc: "IOPS",
    metrics: Metric::IOPS,
};

pub const LATENCY_PANEL: Panel = Panel {
    title: "Latency Performance (Read/Write)",
    y_desc: "Latency (ns)",
    metrics: Metric::LATENCY,
};

const X_DESC: &str = "Measurement Time";

/// Everything a panel needs besides the drawing area.
pub struct ChartData<'a> {
    pub series: &'a Series,
    pub labels: &'a [String],
    pub config: &'a ChartConfig,
}

/// Font sizes in pixels for the configured DPI.
#[derive(Debug, Clone, Copy)]
struct Fonts {
    title: f64,
    axis: f64,
    tick: f64,
    legend: f64,
}

impl Fonts {
    fn new(dpi: u32) -> Self {
        Self {
            title: font_px(14.0, dpi),
            axis: font_px(10.0, dpi),
            tick: font_px(9.0, dpi),
            legend: font_px(10.0, dpi),
        }
    }
}

fn rgb(color: HexColor) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Tick label text for the value axis.
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("{:.1}G", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if magnitude >= 1e4 {
        format!("{:.1}k", value / 1e3)
    } else if magnitude >= 100.0 || magnitude == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Upper bound of the value axis: 10% headroom over the tallest bar.
pub fn value_ceiling(series: &Series, metrics: &[Metric]) -> f64 {
    let max = metrics
        .iter()
        .flat_map(|m| series.values(*m))
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Renders a single grouped bar chart to a PNG file.
pub fn render_grouped(
    data: &ChartData,
    panel: &Panel,
    bar_width: f64,
    canvas: Canvas,
    path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(path, canvas.pixels(data.config.dpi)).into_drawing_area();
    root.fill(&WHITE)?;
    draw_panel(&root, data, panel, bar_width, Some(X_DESC))?;
    root.present()?;
    Ok(())
}

/// Renders the IOPS and latency panels stacked in one PNG file.
pub fn render_summary(data: &ChartData, bar_width: f64, canvas: Canvas, path: &Path) -> Result<()> {
    let fonts = Fonts::new(data.config.dpi);
    let root = BitMapBackend::new(path, canvas.pixels(data.config.dpi)).into_drawing_area();
    root.fill(&WHITE)?;
    let title = format!(
        "FIO Performance Summary ({} measurements)",
        data.series.len()
    );
    let body = root.titled(
        &title,
        (FONT, fonts.title * 16.0 / 14.0)
            .into_font()
            .style(FontStyle::Bold),
    )?;
    let panels = body.split_evenly((2, 1));
    draw_panel(&panels[0], data, &IOPS_PANEL, bar_width, None)?;
    draw_panel(&panels[1], data, &LATENCY_PANEL, bar_width, Some(X_DESC))?;
    root.present()?;
    Ok(())
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &ChartData,
    panel: &Panel,
    bar_width: f64,
    x_desc: Option<&str>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let fonts = Fonts::new(data.config.dpi);
    let points = data.series.len();
    let longest_label = data
        .labels
        .iter()
        .flat_map(|l| l.lines())
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    // vertical labels: their length sets the height of the label area
    let tick_gap = (fonts.tick * 0.5) as i32;
    let x_label_area = (longest_label as f64 * fonts.tick * 0.6) as i32
        + tick_gap * 2
        + if x_desc.is_some() { (fonts.axis * 2.0) as i32 } else { 0 };

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, (FONT, fonts.title))
        .margin((fonts.tick * 1.5) as i32)
        .x_label_area_size(x_label_area)
        .y_label_area_size((fonts.tick * 7.0) as i32)
        .build_cartesian_2d(
            -0.5..(points as f64 - 0.5),
            0.0..value_ceiling(data.series, &panel.metrics),
        )?;

    let y_formatter = |v: &f64| format_value(*v);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .x_labels(0)
        .y_labels(8)
        .y_desc(panel.y_desc)
        .y_label_formatter(&y_formatter)
        .label_style((FONT, fonts.tick))
        .axis_desc_style((FONT, fonts.axis))
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(TRANSPARENT);
    if let Some(desc) = x_desc {
        mesh.x_desc(desc);
    }
    mesh.draw()?;

    for (slot, metric) in panel.metrics.iter().enumerate() {
        let style = data.config.style(*metric);
        let color = rgb(style.color);
        let fill = color.mix(data.config.alpha).filled();
        chart
            .draw_series(
                data.series
                    .values(*metric)
                    .iter()
                    .enumerate()
                    .map(|(index, value)| {
                        let (left, right) = bar_span(index, slot, bar_width);
                        Rectangle::new([(left, 0.0), (right, *value)], fill)
                    }),
            )?
            .label(style.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK.mix(0.3))
        .label_font((FONT, fonts.legend))
        .draw()?;

    // time labels, one text line per label line, reading top to bottom
    let base = area.get_base_pixel();
    let line_height = (fonts.tick * 1.2) as i32;
    let tick_style = (FONT, fonts.tick)
        .into_font()
        .transform(FontTransform::Rotate90)
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for (index, label) in data.labels.iter().enumerate() {
        if label.is_empty() {
            continue;
        }
        let (x, y) = chart.backend_coord(&(index as f64, 0.0));
        let x = x - base.0;
        let y = y - base.1 + tick_gap;
        let lines = label.lines().count() as i32;
        for (line_no, line) in label.lines().enumerate() {
            let offset = (lines - 1) * line_height / 2 - line_no as i32 * line_height;
            area.draw(&Text::new(line.to_owned(), (x + offset, y), tick_style.clone()))?;
        }
    }

    Ok(())
}
