use eframe::egui::{RichText, Ui};

use crate::data::aggregate::SummaryMetrics;

/// Currency formatting used by the salary cards.
pub fn format_usd(value: f64) -> String {
    format!("US$ {value:.2}")
}

/// Render the four summary cards side by side.
pub fn metric_cards(ui: &mut Ui, metrics: &SummaryMetrics) {
    ui.columns(4, |cols: &mut [Ui]| {
        metric_card(&mut cols[0], "Mean salary", &format_usd(metrics.mean_usd));
        metric_card(&mut cols[1], "Maximum salary", &format_usd(metrics.max_usd));
        metric_card(&mut cols[2], "Total records", &metrics.total_records.to_string());
        metric_card(&mut cols[3], "Most frequent title", &metrics.most_frequent_title);
    });
}

fn metric_card(ui: &mut Ui, label: &str, value: &str) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(22.0).strong());
    });
}
