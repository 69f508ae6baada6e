//! Chart mode controller: owns the current visualization and swaps it
//! out wholesale on a mode switch.
//!
//! A mode switch fetches that mode's statistics, runs its pipeline, then
//! disposes the previous surface and renders a fresh one. Surfaces are
//! never mutated across modes; the one shared thing is the controller's
//! `current` slot.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::api::CatalogApi;
use crate::pipeline::{
    assemble_difficulty, assemble_difficulty_buckets, assemble_vintage, ChartData, ZoomRange,
};

/// The three chart modes the statistics page offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
    /// Guess rate over release seasons.
    Vintage,
    /// Guess rate over equal-width difficulty bins.
    DifficultyBins,
    /// Guess rate over per-category difficulty buckets.
    DifficultyBuckets,
}

/// Rendering collaborator: one live chart instance.
pub trait ChartSurface: Send {
    /// Replace the surface's data and redraw.
    fn redraw(&mut self, data: &ChartData);
    /// Set the visible x range.
    fn zoom_to(&mut self, range: ZoomRange);
    /// Tear the instance down. Called exactly once, before replacement.
    fn dispose(&mut self);
}

/// Creates a fresh surface for a mode switch.
pub trait ChartFactory: Send + Sync {
    fn create(&self, mode: ChartMode) -> Box<dyn ChartSurface>;
}

struct CurrentChart {
    mode: ChartMode,
    surface: Box<dyn ChartSurface>,
    data: ChartData,
}

pub struct ChartController {
    api: Arc<dyn CatalogApi>,
    factory: Arc<dyn ChartFactory>,
    current: Option<CurrentChart>,
}

impl ChartController {
    pub fn new(api: Arc<dyn CatalogApi>, factory: Arc<dyn ChartFactory>) -> Self {
        Self { api, factory, current: None }
    }

    pub fn current_mode(&self) -> Option<ChartMode> {
        self.current.as_ref().map(|c| c.mode)
    }

    pub fn current_data(&self) -> Option<&ChartData> {
        self.current.as_ref().map(|c| &c.data)
    }

    /// Switch to (or reload) a chart mode. `bins` only matters for the
    /// two difficulty modes. On a fetch failure the previous chart stays
    /// in place untouched and the error propagates to the caller, which
    /// surfaces it to the user.
    pub async fn show(&mut self, mode: ChartMode, bins: u32) -> Result<()> {
        let data = self.build(mode, bins).await?;
        if let Some(mut prev) = self.current.take() {
            debug!(mode = ?prev.mode, "disposing previous chart");
            prev.surface.dispose();
        }
        let mut surface = self.factory.create(mode);
        surface.redraw(&data);
        if let Some(zoom) = data.options.zoom {
            surface.zoom_to(zoom);
        }
        info!(?mode, series = data.series.series.len(), "chart rendered");
        self.current = Some(CurrentChart { mode, surface, data });
        Ok(())
    }

    async fn build(&self, mode: ChartMode, bins: u32) -> Result<ChartData> {
        Ok(match mode {
            ChartMode::Vintage => assemble_vintage(self.api.vintage_stats().await?),
            ChartMode::DifficultyBins => {
                assemble_difficulty(self.api.difficulty_stats(bins).await?, bins)
            }
            ChartMode::DifficultyBuckets => {
                assemble_difficulty_buckets(self.api.difficulty_buckets(bins).await?)
            }
        })
    }
}
