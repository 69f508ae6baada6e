//! Series assembler: the declarative chart-series set for a list of
//! category descriptors.
//!
//! Pipelines never match category tags themselves; they route points
//! through the `(tag, role)` lookup built here.

use std::collections::HashMap;

use serde::Serialize;

/// Fixed palette cycled by descriptor index.
pub const PALETTE: [&str; 8] = [
    "#444444", "#36a2eb", "#ff6384", "#ff9f40", "#ffcd56", "#4bc0c0", "#9966ff", "#c9cbcf",
];

/// What a series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesRole {
    /// The guess-rate line itself.
    MainLine,
    /// Upper bound of the confidence band.
    CiUpper,
    /// Lower bound of the confidence band.
    CiLower,
    /// Stacked play-count bars on the secondary axis.
    PlayCountBar,
}

impl SeriesRole {
    /// Confidence-band series are excluded from legend and tooltip.
    pub fn is_ci(self) -> bool {
        matches!(self, SeriesRole::CiUpper | SeriesRole::CiLower)
    }
}

/// Which y axis a series is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum YAxis {
    GuessRate,
    PlayCount,
}

/// One category's requested series: a main line and/or a play-count bar.
/// A confidence band is always emitted.
#[derive(Debug, Clone)]
pub struct CategoryDescriptor {
    pub tag: String,
    pub main_label: Option<String>,
    pub bar_label: Option<String>,
}

impl CategoryDescriptor {
    pub fn new(tag: &str, main_label: Option<&str>, bar_label: Option<&str>) -> Self {
        Self {
            tag: tag.to_string(),
            main_label: main_label.map(str::to_string),
            bar_label: bar_label.map(str::to_string),
        }
    }
}

/// One plotted point. `x` is a season label on the category axis or a
/// percentile on linear axes; `y` is None for gap points (null guess
/// rate); `z` carries the sample size and `c` the play count for
/// tooltips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: Coord,
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c: Option<u64>,
}

impl Point {
    pub fn at(x: Coord, y: Option<f64>) -> Self {
        Self { x, y, z: None, c: None }
    }
}

/// x coordinate: a category-axis label or a linear-axis value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coord {
    Label(String),
    Value(f64),
}

/// A single chart series with its rendering hints.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub tag: String,
    pub role: SeriesRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub hidden: bool,
    pub color: String,
    pub axis: YAxis,
    /// Index of the main-line series this band fills against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_to: Option<usize>,
    /// Bars stack with other bar series on the play-count axis.
    pub stacked: bool,
    pub data: Vec<Point>,
    /// Per-point radii, index-aligned with `data`. Only main lines track
    /// radii.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<Vec<f64>>,
}

impl Series {
    fn new(tag: &str, role: SeriesRole, color: &str) -> Self {
        Self {
            tag: tag.to_string(),
            role,
            label: None,
            hidden: false,
            color: color.to_string(),
            axis: YAxis::GuessRate,
            fill_to: None,
            stacked: false,
            data: Vec::new(),
            point_radius: None,
        }
    }
}

/// The assembled series list plus the `(tag, role)` routing map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeriesSet {
    pub series: Vec<Series>,
    #[serde(skip)]
    index: HashMap<(String, SeriesRole), usize>,
}

impl SeriesSet {
    fn push_series(&mut self, series: Series) {
        self.index
            .insert((series.tag.clone(), series.role), self.series.len());
        self.series.push(series);
    }

    pub fn get(&self, tag: &str, role: SeriesRole) -> Option<&Series> {
        self.index
            .get(&(tag.to_string(), role))
            .map(|&i| &self.series[i])
    }

    fn get_mut(&mut self, tag: &str, role: SeriesRole) -> Option<&mut Series> {
        let i = *self.index.get(&(tag.to_string(), role))?;
        Some(&mut self.series[i])
    }

    /// Route a point into the series for `(tag, role)`. Rows for
    /// categories the descriptor list didn't ask for are dropped.
    pub fn push_point(&mut self, tag: &str, role: SeriesRole, point: Point) {
        if let Some(series) = self.get_mut(tag, role) {
            series.data.push(point);
        }
    }

    /// Route a main point together with its visual radius. The point and
    /// radius vectors stay index-aligned; zero-sample points get a zero
    /// radius.
    pub fn push_main(&mut self, tag: &str, point: Point, radius: f64) {
        if let Some(series) = self.get_mut(tag, SeriesRole::MainLine) {
            series.data.push(point);
            if let Some(radii) = series.point_radius.as_mut() {
                radii.push(radius);
            }
        }
    }
}

/// Build the series set for an ordered descriptor list.
///
/// Per descriptor, in order: a main line iff a main label is present
/// (hidden except the first main line overall), a stacked play-count bar
/// iff a bar label is present, and always a CI-upper/CI-lower pair
/// anchored to the descriptor's main line.
pub fn assemble(descriptors: &[CategoryDescriptor]) -> SeriesSet {
    let mut set = SeriesSet::default();
    let mut first_main_seen = false;
    for (i, desc) in descriptors.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let mut main_index = None;
        if let Some(label) = &desc.main_label {
            let mut s = Series::new(&desc.tag, SeriesRole::MainLine, color);
            s.label = Some(label.clone());
            s.hidden = first_main_seen;
            s.point_radius = Some(Vec::new());
            first_main_seen = true;
            main_index = Some(set.series.len());
            set.push_series(s);
        }
        if let Some(label) = &desc.bar_label {
            let mut s = Series::new(&desc.tag, SeriesRole::PlayCountBar, color);
            s.label = Some(label.clone());
            s.axis = YAxis::PlayCount;
            s.stacked = true;
            set.push_series(s);
        }
        for role in [SeriesRole::CiUpper, SeriesRole::CiLower] {
            let mut s = Series::new(&desc.tag, role, color);
            s.fill_to = main_index;
            set.push_series(s);
        }
    }
    set
}

// =============================================================================
// Tests
// =============================================================================
