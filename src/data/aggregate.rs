use std::collections::{BTreeMap, HashMap};

use super::filter::FilteredView;
use super::model::SalaryRecord;

/// Placeholder shown as most frequent title when nothing is selected.
pub const NO_TITLE: &str = "-";
/// Number of rows in the top titles table.
pub const TOP_TITLES: usize = 10;
/// Number of bins in the salary histogram.
pub const HISTOGRAM_BINS: usize = 30;
/// Job title the country table is restricted to (exact match).
pub const COUNTRY_TITLE: &str = "Data Scientist";

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// The four scalar metrics shown above the charts.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub mean_usd: f64,
    pub max_usd: f64,
    pub total_records: usize,
    pub most_frequent_title: String,
}

impl Default for SummaryMetrics {
    fn default() -> Self {
        Self {
            mean_usd: 0.0,
            max_usd: 0.0,
            total_records: 0,
            most_frequent_title: NO_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleMean {
    pub job_title: String,
    pub mean_usd: f64,
}

/// One histogram bin, `[start, end)` except the last which is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryMean {
    pub residence_iso3: String,
    pub mean_usd: f64,
}

/// Everything the dashboard renders, computed from one filtered view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub metrics: SummaryMetrics,
    pub top_titles: Vec<TitleMean>,
    pub salary_histogram: Vec<HistogramBin>,
    pub remote_counts: Vec<RemoteCount>,
    pub country_means: Vec<CountryMean>,
}

impl DashboardSummary {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let mut rows: Vec<&SalaryRecord> = Vec::with_capacity(view.len());
        rows.extend(view.iter());
        Self {
            metrics: summary_metrics(&rows),
            top_titles: top_titles_by_mean(&rows, TOP_TITLES),
            salary_histogram: salary_histogram(&rows, HISTOGRAM_BINS),
            remote_counts: remote_counts(&rows),
            country_means: country_means_for_title(&rows, COUNTRY_TITLE),
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

pub fn summary_metrics(rows: &[&SalaryRecord]) -> SummaryMetrics {
    if rows.is_empty() {
        return SummaryMetrics::default();
    }
    let total: f64 = rows.iter().map(|r| r.salary_usd).sum();
    let max = rows
        .iter()
        .map(|r| r.salary_usd)
        .fold(f64::NEG_INFINITY, f64::max);

    SummaryMetrics {
        mean_usd: total / rows.len() as f64,
        max_usd: max,
        total_records: rows.len(),
        most_frequent_title: most_frequent_title(rows).unwrap_or_else(|| NO_TITLE.to_string()),
    }
}

/// Mode of the job title column. Ties go to the title seen first.
pub fn most_frequent_title(rows: &[&SalaryRecord]) -> Option<String> {
    // title → (count, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, rec) in rows.iter().enumerate() {
        counts.entry(rec.job_title.as_str()).or_insert((0, pos)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, pa)), (_, (cb, pb))| ca.cmp(cb).then(pb.cmp(pa)))
        .map(|(title, _)| title.to_string())
}

// ---------------------------------------------------------------------------
// Per-chart tables
// ---------------------------------------------------------------------------

/// Group by `key` and average the USD salary, groups in key order.
fn mean_usd_by<'r>(
    rows: impl Iterator<Item = &'r SalaryRecord>,
    key: impl Fn(&'r SalaryRecord) -> &'r str,
) -> BTreeMap<&'r str, f64> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for rec in rows {
        let entry = sums.entry(key(rec)).or_insert((0.0, 0));
        entry.0 += rec.salary_usd;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

/// The `limit` titles with the highest mean salary, smallest first.
pub fn top_titles_by_mean(rows: &[&SalaryRecord], limit: usize) -> Vec<TitleMean> {
    let mut means: Vec<TitleMean> = mean_usd_by(rows.iter().copied(), |r| r.job_title.as_str())
        .into_iter()
        .map(|(title, mean)| TitleMean {
            job_title: title.to_string(),
            mean_usd: mean,
        })
        .collect();

    means.sort_by(|a, b| b.mean_usd.total_cmp(&a.mean_usd));
    means.truncate(limit);
    means.sort_by(|a, b| a.mean_usd.total_cmp(&b.mean_usd));
    means
}

/// Equal-width histogram over the min/max of the given rows.
pub fn salary_histogram(rows: &[&SalaryRecord], bins: usize) -> Vec<HistogramBin> {
    if rows.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = rows.iter().map(|r| r.salary_usd).fold(f64::INFINITY, f64::min);
    let max = rows
        .iter()
        .map(|r| r.salary_usd)
        .fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if max > min {
        (min, max)
    } else {
        // Half a unit, or a few ulps where half a unit would be absorbed.
        let pad = (min.abs() * f64::EPSILON).max(0.5);
        (min - pad, max + pad)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for rec in rows {
        let idx = ((rec.salary_usd - lo) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + i as f64 * width,
            end: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
            count,
        })
        .collect()
}

/// Records per remote-work category, most common first. Equal counts keep
/// the order in which the categories were first seen.
pub fn remote_counts(rows: &[&SalaryRecord]) -> Vec<RemoteCount> {
    let mut counts: Vec<RemoteCount> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    for rec in rows {
        match position.get(rec.remote.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                position.insert(rec.remote.as_str(), counts.len());
                counts.push(RemoteCount {
                    category: rec.remote.clone(),
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Mean salary per residence country over rows whose title is exactly `title`.
pub fn country_means_for_title(rows: &[&SalaryRecord], title: &str) -> Vec<CountryMean> {
    mean_usd_by(
        rows.iter().copied().filter(|r| r.job_title == title),
        |r| r.residence_iso3.as_str(),
    )
    .into_iter()
    .map(|(iso3, mean)| CountryMean {
        residence_iso3: iso3.to_string(),
        mean_usd: mean,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::filter::{apply_filters, FilterSelection};
    use crate::data::model::tests::record;
    use crate::data::model::SalaryDataset;

    fn sample_dataset() -> SalaryDataset {
        SalaryDataset::from_records(vec![
            record(2021, "junior", "integral", "media", "Data Analyst", 40.0, "presencial", "BRA"),
            record(2021, "senior", "integral", "grande", "Data Scientist", 120.0, "remoto", "USA"),
            record(2022, "pleno", "freelancer", "media", "Data Scientist", 90.0, "hibrido", "DEU"),
            record(2022, "senior", "integral", "pequena", "ML Engineer", 150.0, "remoto", "USA"),
            record(2023, "junior", "integral", "media", "Data Analyst", 45.0, "remoto", "BRA"),
        ])
    }

    fn rows(ds: &SalaryDataset) -> Vec<&SalaryRecord> {
        ds.records().iter().collect()
    }

    #[test]
    fn metrics_over_full_view() {
        let ds = sample_dataset();
        let m = summary_metrics(&rows(&ds));
        assert!((m.mean_usd - 89.0).abs() < 1e-9);
        assert_eq!(m.max_usd, 150.0);
        assert_eq!(m.total_records, 5);
        // Both analyst and scientist appear twice; the analyst comes first.
        assert_eq!(m.most_frequent_title, "Data Analyst");
    }

    #[test]
    fn metrics_for_single_year_selection() {
        let ds = sample_dataset();
        let mut selection = FilterSelection::all(ds.universes());
        selection.years = BTreeSet::from([2022]);

        let summary = DashboardSummary::compute(&apply_filters(&ds, &selection));
        assert_eq!(summary.metrics.total_records, 2);
        assert!((summary.metrics.mean_usd - 120.0).abs() < 1e-9);
        assert_eq!(summary.metrics.most_frequent_title, "Data Scientist");
    }

    #[test]
    fn empty_seniority_selection_degrades_to_placeholders() {
        let ds = sample_dataset();
        let mut selection = FilterSelection::all(ds.universes());
        selection.seniorities.clear();

        let summary = DashboardSummary::compute(&apply_filters(&ds, &selection));
        assert_eq!(summary.metrics.mean_usd, 0.0);
        assert_eq!(summary.metrics.max_usd, 0.0);
        assert_eq!(summary.metrics.total_records, 0);
        assert_eq!(summary.metrics.most_frequent_title, "-");
        assert!(summary.top_titles.is_empty());
        assert!(summary.salary_histogram.is_empty());
        assert!(summary.remote_counts.is_empty());
        assert!(summary.country_means.is_empty());
    }

    #[test]
    fn mode_tie_break_follows_row_order() {
        let ds = SalaryDataset::from_records(vec![
            record(2021, "s", "c", "m", "Zeta", 1.0, "r", "USA"),
            record(2021, "s", "c", "m", "Alpha", 1.0, "r", "USA"),
            record(2021, "s", "c", "m", "Alpha", 1.0, "r", "USA"),
            record(2021, "s", "c", "m", "Zeta", 1.0, "r", "USA"),
        ]);
        assert_eq!(most_frequent_title(&rows(&ds)).as_deref(), Some("Zeta"));
    }

    #[test]
    fn top_titles_are_capped_and_ascending() {
        let records: Vec<_> = (0..15)
            .map(|i| {
                record(
                    2022,
                    "senior",
                    "integral",
                    "media",
                    &format!("Title {i:02}"),
                    1000.0 * (i as f64 + 1.0),
                    "remoto",
                    "USA",
                )
            })
            .collect();
        let ds = SalaryDataset::from_records(records);
        let view_rows = rows(&ds);
        let top = top_titles_by_mean(&view_rows, TOP_TITLES);

        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].mean_usd <= w[1].mean_usd));
        assert_eq!(top.first().map(|t| t.job_title.as_str()), Some("Title 05"));
        assert_eq!(top.last().map(|t| t.job_title.as_str()), Some("Title 14"));
        for t in &top {
            assert!(view_rows.iter().any(|r| r.job_title == t.job_title));
        }
    }

    #[test]
    fn top_titles_average_each_group() {
        let ds = sample_dataset();
        let top = top_titles_by_mean(&rows(&ds), TOP_TITLES);
        let expected = vec![
            TitleMean { job_title: "Data Analyst".into(), mean_usd: 42.5 },
            TitleMean { job_title: "Data Scientist".into(), mean_usd: 105.0 },
            TitleMean { job_title: "ML Engineer".into(), mean_usd: 150.0 },
        ];
        assert_eq!(top, expected);
    }

    #[test]
    fn histogram_has_thirty_bins_covering_every_row() {
        let ds = sample_dataset();
        let hist = salary_histogram(&rows(&ds), HISTOGRAM_BINS);

        assert_eq!(hist.len(), 30);
        assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), ds.len());
        assert_eq!(hist[0].start, 40.0);
        assert_eq!(hist[29].end, 150.0);
        // Maximum lands in the closed last bin, minimum in the first.
        assert_eq!(hist[29].count, 1);
        assert_eq!(hist[0].count, 1);
        let width = hist[0].end - hist[0].start;
        assert!(hist.iter().all(|b| (b.end - b.start - width).abs() < 1e-9));
    }

    #[test]
    fn histogram_of_constant_salaries_uses_one_bin() {
        let ds = SalaryDataset::from_records(vec![
            record(2021, "s", "c", "m", "A", 70.0, "r", "USA"),
            record(2022, "s", "c", "m", "B", 70.0, "r", "USA"),
        ]);
        let hist = salary_histogram(&rows(&ds), HISTOGRAM_BINS);
        assert_eq!(hist.len(), 30);
        assert_eq!(hist.iter().filter(|b| b.count > 0).count(), 1);
        assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn histogram_of_huge_constant_salaries_stays_interior() {
        let v = 2f64.powi(60);
        let ds = SalaryDataset::from_records(vec![
            record(2021, "s", "c", "m", "A", v, "r", "USA"),
            record(2022, "s", "c", "m", "B", v, "r", "USA"),
            record(2023, "s", "c", "m", "C", v, "r", "USA"),
        ]);
        let hist = salary_histogram(&rows(&ds), HISTOGRAM_BINS);

        assert_eq!(hist.len(), 30);
        assert!(hist[29].end > hist[0].start);
        let filled: Vec<&HistogramBin> = hist.iter().filter(|b| b.count > 0).collect();
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].count, 3);
        assert!(filled[0].start <= v && v <= filled[0].end);
        assert!(hist[0].count == 0 && hist[29].count == 0);
    }

    #[test]
    fn remote_counts_sorted_by_frequency() {
        let ds = sample_dataset();
        let counts = remote_counts(&rows(&ds));
        let expected = vec![
            RemoteCount { category: "remoto".into(), count: 3 },
            RemoteCount { category: "presencial".into(), count: 1 },
            RemoteCount { category: "hibrido".into(), count: 1 },
        ];
        assert_eq!(counts, expected);
    }

    #[test]
    fn country_means_only_consider_data_scientists() {
        let ds = sample_dataset();
        let means = country_means_for_title(&rows(&ds), COUNTRY_TITLE);
        let expected = vec![
            CountryMean { residence_iso3: "DEU".into(), mean_usd: 90.0 },
            CountryMean { residence_iso3: "USA".into(), mean_usd: 120.0 },
        ];
        // BRA only has analysts; the USA engineer does not move the mean.
        assert_eq!(means, expected);
    }

    #[test]
    fn country_title_match_is_exact() {
        let ds = SalaryDataset::from_records(vec![
            record(2021, "s", "c", "m", "data scientist", 10.0, "r", "FRA"),
            record(2021, "s", "c", "m", "Data Scientist ", 10.0, "r", "ITA"),
            record(2021, "s", "c", "m", "Senior Data Scientist", 10.0, "r", "ESP"),
        ]);
        assert!(country_means_for_title(&rows(&ds), COUNTRY_TITLE).is_empty());
    }

    #[test]
    fn summary_is_stable_across_recomputation() {
        let ds = sample_dataset();
        let selection = FilterSelection::all(ds.universes());
        let a = DashboardSummary::compute(&apply_filters(&ds, &selection));
        let b = DashboardSummary::compute(&apply_filters(&ds, &selection));
        assert_eq!(a, b);
    }
}
