//! Client-side analytics for a trivia-song catalog.
//!
//! Sits between the backend's JSON query API and the rendering layer:
//! turns raw per-song statistics into chart-ready series with confidence
//! bands, and drives the interactive search/detail table. Rendering and
//! DOM mechanics live behind the [`chart::ChartSurface`] and
//! [`table::TableView`] traits and are consumed, not implemented, here.

pub mod api;
pub mod chart;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod series;
pub mod stats;
pub mod table;
