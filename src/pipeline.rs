//! Binning pipelines: raw statistics rows in, chart-ready data out.
//!
//! Three modes share one contract: per row, compute the mode's x
//! coordinate, compute the Wilson interval when the sample size allows,
//! and route up to four derived points into the `(tag, role)` series.
//! What differs is the x-axis semantics: season labels, continuous
//! percentiles, or explicit bucket centers.

use std::cmp::Reverse;

use serde::Serialize;
use tracing::warn;

use crate::model::{DifficultyBinRow, DifficultyBucketRow, VintageStatRow};
use crate::series::{assemble, CategoryDescriptor, Coord, Point, SeriesRole, SeriesSet};
use crate::stats::{ordinal_to_season, point_weight, season_to_ordinal, wilson_interval};

/// Historical window shown by default on the vintage chart. Data outside
/// it is still loaded and reachable by panning.
const DEFAULT_WINDOW_START: &str = "Winter 2007";
const DEFAULT_WINDOW_END: &str = "Fall 2020";

/// x-axis configuration for the charting collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum XAxis {
    /// Category axis indexed by the `labels` list.
    Category,
    /// Linear axis with fixed bounds (also the pan/zoom limits).
    Linear { min: f64, max: f64 },
}

/// Visible x range, in label indices (category axis) or axis units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

/// Chart-level rendering options. Confidence-band series are always
/// excluded from legend and tooltip; that is a role property, not a
/// per-chart switch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub x_axis: XAxis,
    /// Upper bound of the guess-rate axis, when the mode fixes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_axis_max: Option<f64>,
    /// Whether a secondary play-count axis is shown on the right.
    pub count_axis: bool,
    /// Initial zoom applied after populating, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<ZoomRange>,
}

/// Everything the charting collaborator needs to draw one chart.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: SeriesSet,
    pub options: ChartOptions,
}

fn vintage_descriptors() -> Vec<CategoryDescriptor> {
    vec![
        CategoryDescriptor::new("All", Some("Guess Rate (All)"), None),
        CategoryDescriptor::new(
            "Opening",
            Some("Guess Rate (Openings)"),
            Some("Total Plays (Opening)"),
        ),
        CategoryDescriptor::new(
            "Ending",
            Some("Guess Rate (Endings)"),
            Some("Total Plays (Ending)"),
        ),
        CategoryDescriptor::new(
            "Insert",
            Some("Guess Rate (Inserts)"),
            Some("Total Plays (Insert)"),
        ),
    ]
}

fn bucket_descriptors() -> Vec<CategoryDescriptor> {
    vec![
        CategoryDescriptor::new("All", Some("Guess Rate"), None),
        CategoryDescriptor::new("Opening", Some("Guess Rate (Openings)"), None),
        CategoryDescriptor::new("Ending", Some("Guess Rate (Endings)"), None),
        CategoryDescriptor::new("Insert", Some("Guess Rate (Inserts)"), None),
    ]
}

/// Interval for a row, if it has a plottable rate and a positive sample.
fn interval_of(guess_rate: Option<f64>, guess_count: u64) -> Option<(f64, f64)> {
    match (guess_rate, guess_count) {
        (Some(rate), n) if n > 0 => Some(wilson_interval(rate, n)),
        _ => None,
    }
}

fn radius_of(guess_count: u64) -> f64 {
    if guess_count > 0 {
        point_weight(guess_count)
    } else {
        0.0
    }
}

// =============================================================================
// Vintage (season) mode
// =============================================================================

/// Assemble the per-season chart: category x axis over the contiguous
/// season span present in the data, guess-rate lines with confidence
/// bands, stacked play-count bars for the non-All categories.
pub fn assemble_vintage(mut rows: Vec<VintageStatRow>) -> ChartData {
    let mut set = assemble(&vintage_descriptors());

    // Unparseable vintage labels would poison the label span; drop them.
    let before = rows.len();
    rows.retain(|r| season_to_ordinal(&r.vintage) >= 0);
    if rows.len() < before {
        let dropped = before - rows.len();
        warn!(dropped, "vintage rows with unrecognized season label");
    }
    rows.sort_by_key(|r| Reverse(season_to_ordinal(&r.vintage)));

    for row in &rows {
        let x = Coord::Label(row.vintage.clone());
        if let Some((lower, upper)) = interval_of(row.guess_rate, row.guess_count) {
            let up = Point::at(x.clone(), Some(upper));
            let low = Point::at(x.clone(), Some(lower));
            set.push_point(&row.kind, SeriesRole::CiUpper, up);
            set.push_point(&row.kind, SeriesRole::CiLower, low);
        }
        set.push_main(
            &row.kind,
            Point {
                x: x.clone(),
                y: row.guess_rate,
                z: Some(row.guess_count),
                c: Some(row.times_played),
            },
            radius_of(row.guess_count),
        );
        set.push_point(
            &row.kind,
            SeriesRole::PlayCountBar,
            Point::at(x, Some(row.times_played as f64)),
        );
    }

    let (labels, zoom) = match (rows.first(), rows.last()) {
        (Some(newest), Some(oldest)) => {
            let max = season_to_ordinal(&newest.vintage);
            let min = season_to_ordinal(&oldest.vintage);
            // Contiguous span: seasons absent from the data still get an
            // x position, so gaps render as gaps instead of vanishing.
            let labels: Vec<String> = (min..=max).map(ordinal_to_season).collect();
            let window_min = season_to_ordinal(DEFAULT_WINDOW_START).max(min) - min;
            let window_max = season_to_ordinal(DEFAULT_WINDOW_END).min(max) - min;
            let zoom = (window_min <= window_max).then(|| ZoomRange {
                min: window_min as f64,
                max: window_max as f64,
            });
            (labels, zoom)
        }
        _ => (Vec::new(), None),
    };

    ChartData {
        labels,
        series: set,
        options: ChartOptions {
            x_axis: XAxis::Category,
            rate_axis_max: Some(1.05),
            count_axis: true,
            zoom,
        },
    }
}

// =============================================================================
// Continuous difficulty-bin mode
// =============================================================================

/// Assemble the equal-width difficulty chart: one "All" guess-rate line
/// over bin-center percentiles with a companion play-count bar series.
/// Rates are scaled to 0..100 for percent display.
pub fn assemble_difficulty(rows: Vec<DifficultyBinRow>, bin_count: u32) -> ChartData {
    let mut set = assemble(&[CategoryDescriptor::new(
        "All",
        Some("Guess Rate"),
        Some("Total Plays"),
    )]);

    for row in &rows {
        let x = Coord::Value((row.diff_bin as f64 - 0.5) / bin_count as f64 * 100.0);
        if let Some((lower, upper)) = interval_of(row.guess_rate, row.guess_count) {
            let up = Point::at(x.clone(), Some(upper * 100.0));
            let low = Point::at(x.clone(), Some(lower * 100.0));
            set.push_point("All", SeriesRole::CiUpper, up);
            set.push_point("All", SeriesRole::CiLower, low);
        }
        set.push_main(
            "All",
            Point {
                x: x.clone(),
                y: row.guess_rate.map(|r| r * 100.0),
                z: Some(row.guess_count),
                c: None,
            },
            radius_of(row.guess_count),
        );
        set.push_point(
            "All",
            SeriesRole::PlayCountBar,
            Point::at(x, Some(row.times_played as f64)),
        );
    }

    ChartData {
        labels: Vec::new(),
        series: set,
        options: ChartOptions {
            x_axis: XAxis::Linear { min: 0.0, max: 100.0 },
            rate_axis_max: None,
            count_axis: true,
            zoom: None,
        },
    }
}

// =============================================================================
// Categorical difficulty-bucket mode
// =============================================================================

/// Assemble the per-category bucket chart: guess-rate lines at bucket
/// centers for all four categories, no bar series. Input arrives in
/// descending bucket order; points must be inserted ascending so the
/// lines draw left to right.
pub fn assemble_difficulty_buckets(mut rows: Vec<DifficultyBucketRow>) -> ChartData {
    let mut set = assemble(&bucket_descriptors());

    rows.sort_by(|a, b| {
        let xa = (a.bucket_min + a.bucket_max) / 2.0;
        let xb = (b.bucket_min + b.bucket_max) / 2.0;
        xa.total_cmp(&xb)
    });

    for row in &rows {
        let x = Coord::Value((row.bucket_min + row.bucket_max) / 2.0);
        if let Some((lower, upper)) = interval_of(row.guess_rate, row.guess_count) {
            let up = Point::at(x.clone(), Some(upper * 100.0));
            let low = Point::at(x.clone(), Some(lower * 100.0));
            set.push_point(&row.kind, SeriesRole::CiUpper, up);
            set.push_point(&row.kind, SeriesRole::CiLower, low);
        }
        set.push_main(
            &row.kind,
            Point {
                x,
                y: row.guess_rate.map(|r| r * 100.0),
                z: Some(row.guess_count),
                c: None,
            },
            radius_of(row.guess_count),
        );
    }

    ChartData {
        labels: Vec::new(),
        series: set,
        options: ChartOptions {
            x_axis: XAxis::Linear { min: 0.0, max: 100.0 },
            rate_axis_max: Some(101.0),
            count_axis: false,
            zoom: None,
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
