//! Chart controller wiring: mode switches dispose and recreate the
//! surface, pipelines feed it the right data, and a failed fetch leaves
//! the current chart alone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use songstats::api::CatalogApi;
use songstats::chart::{ChartController, ChartFactory, ChartMode, ChartSurface};
use songstats::model::{
    DifficultyBinRow, DifficultyBucketRow, SongDetail, SongRow, VintageStatRow,
};
use songstats::pipeline::{ChartData, ZoomRange};
use songstats::series::{Coord, SeriesRole};

// ---------------------------------------------------------------------------
// Stub backend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StatsApi {
    fail_difficulty: AtomicBool,
}

#[async_trait]
impl CatalogApi for StatsApi {
    async fn search(&self, _search: &str, _exact: bool) -> Result<Vec<SongRow>> {
        Ok(Vec::new())
    }

    async fn song_detail(&self, id: &str) -> Result<SongDetail> {
        Err(anyhow!("no song with id {}", id))
    }

    async fn vintage_stats(&self) -> Result<Vec<VintageStatRow>> {
        Ok(vec![
            VintageStatRow {
                kind: "All".to_string(),
                vintage: "Winter 2019".to_string(),
                guess_rate: Some(0.5),
                guess_count: 40,
                times_played: 400,
            },
            VintageStatRow {
                kind: "All".to_string(),
                vintage: "Fall 2019".to_string(),
                guess_rate: Some(0.6),
                guess_count: 10,
                times_played: 90,
            },
        ])
    }

    async fn difficulty_stats(&self, _bins: u32) -> Result<Vec<DifficultyBinRow>> {
        if self.fail_difficulty.load(Ordering::SeqCst) {
            return Err(anyhow!("stats backend unavailable"));
        }
        Ok(vec![DifficultyBinRow {
            diff_bin: 1,
            guess_rate: Some(0.5),
            guess_count: 20,
            times_played: 100,
        }])
    }

    async fn difficulty_buckets(&self, _bins: u32) -> Result<Vec<DifficultyBucketRow>> {
        Ok(vec![DifficultyBucketRow {
            kind: "Opening".to_string(),
            bucket_min: 40.0,
            bucket_max: 60.0,
            guess_rate: Some(0.75),
            guess_count: 8,
        }])
    }
}

// ---------------------------------------------------------------------------
// Recording surface/factory
// ---------------------------------------------------------------------------

type Log = Arc<Mutex<Vec<String>>>;

struct RecordingSurface {
    name: &'static str,
    log: Log,
}

impl ChartSurface for RecordingSurface {
    fn redraw(&mut self, data: &ChartData) {
        self.log
            .lock()
            .unwrap()
            .push(format!("redraw {} series={}", self.name, data.series.series.len()));
    }

    fn zoom_to(&mut self, range: ZoomRange) {
        self.log
            .lock()
            .unwrap()
            .push(format!("zoom {} {}..{}", self.name, range.min, range.max));
    }

    fn dispose(&mut self) {
        self.log.lock().unwrap().push(format!("dispose {}", self.name));
    }
}

struct RecordingFactory {
    log: Log,
}

impl ChartFactory for RecordingFactory {
    fn create(&self, mode: ChartMode) -> Box<dyn ChartSurface> {
        let name = match mode {
            ChartMode::Vintage => "vintage",
            ChartMode::DifficultyBins => "difficulty",
            ChartMode::DifficultyBuckets => "difficulty2",
        };
        self.log.lock().unwrap().push(format!("create {}", name));
        Box::new(RecordingSurface { name, log: self.log.clone() })
    }
}

fn setup() -> (ChartController, Arc<StatsApi>, Log) {
    let api = Arc::new(StatsApi::default());
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let factory = Arc::new(RecordingFactory { log: log.clone() });
    (ChartController::new(api.clone(), factory), api, log)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn difficulty_end_to_end() {
    let (mut ctl, _api, _log) = setup();
    ctl.show(ChartMode::DifficultyBins, 10).await.unwrap();

    let data = ctl.current_data().unwrap();
    let main = data.series.get("All", SeriesRole::MainLine).unwrap();
    assert_eq!(main.data.len(), 1);
    assert_eq!(main.data[0].x, Coord::Value(5.0));
    assert_eq!(main.data[0].y, Some(50.0));
    let bar = data.series.get("All", SeriesRole::PlayCountBar).unwrap();
    assert_eq!(bar.data[0].x, Coord::Value(5.0));
    assert_eq!(bar.data[0].y, Some(100.0));
}

#[tokio::test]
async fn mode_switch_disposes_before_recreating() {
    let (mut ctl, _api, log) = setup();
    ctl.show(ChartMode::Vintage, 10).await.unwrap();
    ctl.show(ChartMode::DifficultyBuckets, 10).await.unwrap();

    let entries = log.lock().unwrap().clone();
    let dispose_at = entries.iter().position(|e| e == "dispose vintage").unwrap();
    let create_at = entries.iter().position(|e| e == "create difficulty2").unwrap();
    assert!(dispose_at < create_at, "log: {:?}", entries);
    assert_eq!(ctl.current_mode(), Some(ChartMode::DifficultyBuckets));
}

#[tokio::test]
async fn vintage_chart_gets_contiguous_labels_and_zoom() {
    let (mut ctl, _api, log) = setup();
    ctl.show(ChartMode::Vintage, 10).await.unwrap();

    let data = ctl.current_data().unwrap();
    // Winter..Fall 2019, including the two seasons with no rows.
    assert_eq!(data.labels.len(), 4);
    assert!(data.options.zoom.is_some());
    let entries = log.lock().unwrap().clone();
    assert!(entries.iter().any(|e| e.starts_with("zoom vintage")));
}

#[tokio::test]
async fn fetch_error_keeps_previous_chart() {
    let (mut ctl, api, log) = setup();
    ctl.show(ChartMode::Vintage, 10).await.unwrap();

    api.fail_difficulty.store(true, Ordering::SeqCst);
    let err = ctl.show(ChartMode::DifficultyBins, 10).await.unwrap_err();
    assert_eq!(err.to_string(), "stats backend unavailable");

    assert_eq!(ctl.current_mode(), Some(ChartMode::Vintage));
    let entries = log.lock().unwrap().clone();
    assert!(!entries.contains(&"dispose vintage".to_string()));
    assert!(!entries.contains(&"create difficulty".to_string()));
}
