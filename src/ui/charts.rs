use std::f64::consts::TAU;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Polygon, Text,
};

use crate::color::{red_yellow_green, ColorMap};
use crate::data::aggregate::{CountryMean, HistogramBin, RemoteCount, TitleMean};

const CHART_HEIGHT: f32 = 320.0;
const BAR_COLOR: Color32 = Color32::from_rgb(0x63, 0x6e, 0xfa);

/// Warning shown in place of a chart whose table is empty.
fn no_data(ui: &mut Ui, chart: &str) {
    ui.add_space(8.0);
    ui.colored_label(
        Color32::from_rgb(0xe0, 0xa0, 0x00),
        format!("⚠ No data to display in the {chart} chart."),
    );
}

/// Label the integer grid marks of a categorical axis.
fn category_formatter(
    labels: Vec<String>,
) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String + 'static {
    move |mark, _range| {
        let v = mark.value;
        if v.fract() != 0.0 || v < 0.0 {
            return String::new();
        }
        labels.get(v as usize).cloned().unwrap_or_default()
    }
}

fn static_plot(id: &str) -> Plot<'_> {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
}

// ---------------------------------------------------------------------------
// Top titles – horizontal bars
// ---------------------------------------------------------------------------

pub fn top_titles_chart(ui: &mut Ui, top: &[TitleMean]) {
    ui.strong("Top 10 titles by mean salary");
    if top.is_empty() {
        no_data(ui, "top titles");
        return;
    }

    // Rows arrive smallest first, so the largest bar ends up on top.
    let bars: Vec<Bar> = top
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Bar::new(i as f64, t.mean_usd)
                .name(&t.job_title)
                .width(0.7)
                .fill(BAR_COLOR)
        })
        .collect();
    let labels = top.iter().map(|t| t.job_title.clone()).collect();

    static_plot("top_titles")
        .x_axis_label("Mean annual salary (USD)")
        .y_axis_formatter(category_formatter(labels))
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().color(BAR_COLOR));
        });
}

// ---------------------------------------------------------------------------
// Salary distribution – histogram
// ---------------------------------------------------------------------------

pub fn histogram_chart(ui: &mut Ui, bins: &[HistogramBin]) {
    ui.strong("Annual salary distribution");
    if bins.is_empty() {
        no_data(ui, "distribution");
        return;
    }

    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{:.0} – {:.0}", b.start, b.end))
                .fill(BAR_COLOR)
        })
        .collect();

    static_plot("salary_histogram")
        .x_axis_label("Salary range (USD)")
        .y_axis_label("Records")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));
        });
}

// ---------------------------------------------------------------------------
// Remote work – donut
// ---------------------------------------------------------------------------

/// One ring segment of the donut, angles in radians from 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct DonutSlice {
    pub category: String,
    pub fraction: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Split a full turn proportionally to the counts, in table order.
pub fn donut_slices(counts: &[RemoteCount]) -> Vec<DonutSlice> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut angle = 0.0;
    counts
        .iter()
        .map(|c| {
            let fraction = c.count as f64 / total as f64;
            let start = angle;
            angle += fraction * TAU;
            DonutSlice {
                category: c.category.clone(),
                fraction,
                start_angle: start,
                end_angle: angle,
            }
        })
        .collect()
}

/// Point on a circle of `radius`, clockwise from the top.
fn polar(radius: f64, angle: f64) -> [f64; 2] {
    [radius * angle.sin(), radius * angle.cos()]
}

fn ring_segment(slice: &DonutSlice, inner: f64, outer: f64) -> Vec<[f64; 2]> {
    let steps = ((slice.end_angle - slice.start_angle) / TAU * 120.0).ceil().max(2.0) as usize;
    let step = (slice.end_angle - slice.start_angle) / steps as f64;
    let outer_arc = (0..=steps).map(|i| polar(outer, slice.start_angle + i as f64 * step));
    let inner_arc = (0..=steps)
        .rev()
        .map(|i| polar(inner, slice.start_angle + i as f64 * step));
    outer_arc.chain(inner_arc).collect()
}

pub fn remote_donut(ui: &mut Ui, counts: &[RemoteCount], colors: &ColorMap) {
    ui.strong("Share of work arrangements");
    let slices = donut_slices(counts);
    if slices.is_empty() {
        no_data(ui, "work arrangement");
        return;
    }

    static_plot("remote_donut")
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for slice in &slices {
                let color = colors.color_for(&slice.category);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(ring_segment(slice, 0.5, 1.0)))
                        .name(&slice.category)
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );

                let [x, y] = polar(0.75, (slice.start_angle + slice.end_angle) / 2.0);
                let label = format!("{}\n{:.1}%", slice.category, slice.fraction * 100.0);
                plot_ui.text(Text::new(
                    PlotPoint::new(x, y),
                    RichText::new(label).color(Color32::BLACK).small(),
                ));
            }
        });
}

// ---------------------------------------------------------------------------
// Data Scientist salary per country
// ---------------------------------------------------------------------------

/// Country bars coloured on a red-yellow-green scale of their mean salary.
pub fn country_chart(ui: &mut Ui, means: &[CountryMean]) {
    ui.strong("Mean Data Scientist salary by country");
    if means.is_empty() {
        no_data(ui, "country");
        return;
    }

    let min = means.iter().map(|m| m.mean_usd).fold(f64::INFINITY, f64::min);
    let max = means
        .iter()
        .map(|m| m.mean_usd)
        .fold(f64::NEG_INFINITY, f64::max);

    let bars: Vec<Bar> = means
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Bar::new(i as f64, m.mean_usd)
                .name(&m.residence_iso3)
                .width(0.8)
                .fill(red_yellow_green(m.mean_usd, min, max))
        })
        .collect();
    let labels = means.iter().map(|m| m.residence_iso3.clone()).collect();

    static_plot("country_means")
        .x_axis_formatter(category_formatter(labels))
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .y_axis_label("Mean salary (USD)")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}
