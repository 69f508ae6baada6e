//! Search/detail table controller: query submission, per-row expansion,
//! and the session-scoped detail cache.
//!
//! The controller owns all table state; the [`TableView`] collaborator
//! only ever renders what it is handed. Two guarantees live here and
//! nowhere else: a stale search response never reaches the table, and a
//! detail fetch is never duplicated while one is in flight for the same
//! id.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::api::CatalogApi;
use crate::model::{SongDetail, SongId, SongRow};

/// Rendering collaborator for the results table. Implementations draw;
/// they hold no state the controller depends on.
pub trait TableView: Send + Sync {
    /// Replace the whole result set. Never an incremental append.
    fn replace_rows(&self, rows: &[SongRow]);
    fn show_detail(&self, id: &SongId, lines: &[DetailLine]);
    fn collapse_row(&self, id: &SongId);
    fn set_loading(&self, visible: bool);
    /// Blocking user-facing notification for a failed operation.
    fn alert(&self, message: &str);
}

/// One rendered line of a song's detail block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailLine {
    Label(String),
    Link { href: String, text: &'static str },
    Title(String),
}

/// Map detail attributes to their presentation, sorted by key.
///
/// Only the known keys {id, mp3, video, name} are rendered; everything
/// else is dropped, matching the shipped behavior (whether that filter
/// is deliberate is an open product question, so unknown keys are only
/// traced, not shown).
pub fn render_detail(detail: &SongDetail, asset_host: &str) -> Vec<DetailLine> {
    let host = asset_host.trim_end_matches('/');
    let mut attrs = detail.attrs.clone();
    attrs.sort_by(|a, b| a.0.cmp(&b.0));
    let mut lines = Vec::new();
    for (key, value) in &attrs {
        match key.as_str() {
            "id" => lines.push(DetailLine::Label(format!("ANN ID: {}", value))),
            "mp3" => lines.push(DetailLine::Link {
                href: format!("{}/{}", host, value),
                text: "Sound",
            }),
            "video" => lines.push(DetailLine::Link {
                href: format!("{}/{}", host, value),
                text: "Video",
            }),
            "name" => lines.push(DetailLine::Title(value.clone())),
            other => debug!(key = other, "skipping unmapped detail attribute"),
        }
    }
    lines
}

#[derive(Default)]
struct TableState {
    /// Bumped on every submitted query; in-flight responses from older
    /// generations are discarded, never merged.
    query_generation: u64,
    rows: Vec<SongRow>,
    /// Session cache: append-only for the lifetime of the page.
    cache: HashMap<SongId, Arc<SongDetail>>,
    /// Rows currently expanded.
    shown: HashSet<SongId>,
    /// In-flight detail fetches. The value is whether the detail should
    /// render on arrival; it flips on every toggle while the fetch is
    /// pending, so collapse-then-reexpand attaches to the pending fetch
    /// instead of issuing another. Entries outlive query submissions:
    /// the fetch itself cannot be cancelled, and the new result set may
    /// contain the same id.
    pending: HashMap<SongId, bool>,
}

pub struct TableController {
    api: Arc<dyn CatalogApi>,
    view: Arc<dyn TableView>,
    asset_host: String,
    state: Mutex<TableState>,
}

/// Resolved next step for a row toggle, computed under the lock.
enum ToggleStep {
    Collapse,
    Render(Arc<SongDetail>),
    Fetch,
    AttachedToPending,
}

impl TableController {
    pub fn new(api: Arc<dyn CatalogApi>, view: Arc<dyn TableView>, asset_host: &str) -> Self {
        Self {
            api,
            view,
            asset_host: asset_host.to_string(),
            state: Mutex::new(TableState::default()),
        }
    }

    /// Current result set, for callers that re-render out of band.
    pub fn rows(&self) -> Vec<SongRow> {
        self.state.lock().unwrap().rows.clone()
    }

    pub fn cached_detail(&self, id: &SongId) -> Option<Arc<SongDetail>> {
        self.state.lock().unwrap().cache.get(id).cloned()
    }

    /// Submit a committed search. Empty search strings are a no-op; a
    /// non-empty one clears the table and fully replaces it with the
    /// response. Failures leave the table empty and alert the user; the
    /// controller stays usable either way.
    pub async fn submit_query(&self, search: &str, exact: bool) {
        if search.is_empty() {
            return;
        }
        let generation = {
            let mut st = self.state.lock().unwrap();
            st.query_generation += 1;
            st.rows.clear();
            st.shown.clear();
            // In-flight detail fetches stay in the pending map so a
            // re-expansion in the new result set attaches to them, but
            // they must not render into the replaced table on their own.
            for show_on_arrival in st.pending.values_mut() {
                *show_on_arrival = false;
            }
            st.query_generation
        };
        self.view.set_loading(true);

        let result = self.api.search(search, exact).await;

        // Staleness check and result commit happen under one lock scope:
        // a newer query bumping the generation concurrently must never
        // interleave between them.
        {
            let mut st = self.state.lock().unwrap();
            if st.query_generation != generation {
                // A newer query owns the table and the loading indicator
                // now; this response must not touch either.
                debug!(search, "discarding stale search response");
                return;
            }
            match &result {
                Ok(rows) => st.rows = rows.clone(),
                Err(_) => st.rows.clear(),
            }
        }
        self.view.set_loading(false);
        match result {
            Ok(rows) => self.view.replace_rows(&rows),
            Err(err) => {
                self.view.replace_rows(&[]);
                self.view.alert(&err.to_string());
            }
        }
    }

    /// Expand or collapse one row. First expansion of an id fetches its
    /// detail and stores it in the session cache; later expansions render
    /// from cache with no network call. At most one detail fetch per id
    /// is ever in flight.
    pub async fn toggle_row(&self, id: &SongId) {
        let step = {
            let mut st = self.state.lock().unwrap();
            if st.shown.remove(id) {
                ToggleStep::Collapse
            } else if let Some(show_on_arrival) = st.pending.get_mut(id) {
                *show_on_arrival = !*show_on_arrival;
                ToggleStep::AttachedToPending
            } else if let Some(detail) = st.cache.get(id) {
                debug!(%id, "detail cache hit");
                let detail = detail.clone();
                st.shown.insert(id.clone());
                ToggleStep::Render(detail)
            } else {
                st.pending.insert(id.clone(), true);
                ToggleStep::Fetch
            }
        };

        match step {
            ToggleStep::Collapse => self.view.collapse_row(id),
            ToggleStep::AttachedToPending => {}
            ToggleStep::Render(detail) => {
                self.view
                    .show_detail(id, &render_detail(&detail, &self.asset_host));
            }
            ToggleStep::Fetch => self.fetch_detail(id).await,
        }
    }

    async fn fetch_detail(&self, id: &SongId) {
        self.view.set_loading(true);
        let result = self.api.song_detail(id).await;
        self.view.set_loading(false);

        match result {
            Ok(detail) => {
                let (detail, show) = {
                    let mut st = self.state.lock().unwrap();
                    let detail = st
                        .cache
                        .entry(id.clone())
                        .or_insert_with(|| Arc::new(detail))
                        .clone();
                    // Only the pending entry transitions here; an already
                    // shown row (cache-hit expansion) is left alone.
                    let show = st.pending.remove(id).unwrap_or(false);
                    if show {
                        st.shown.insert(id.clone());
                    }
                    (detail, show)
                };
                if show {
                    self.view
                        .show_detail(id, &render_detail(&detail, &self.asset_host));
                }
            }
            Err(err) => {
                self.state.lock().unwrap().pending.remove(id);
                self.view.alert(&err.to_string());
                self.view.collapse_row(id);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(pairs: &[(&str, &str)]) -> SongDetail {
        SongDetail {
            attrs: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_render_detail_known_keys() {
        let d = detail(&[
            ("name", "Some Song"),
            ("mp3", "abc.mp3"),
            ("id", "123"),
            ("video", "abc.webm"),
        ]);
        let lines = render_detail(&d, "https://files.catbox.moe");
        assert_eq!(
            lines,
            vec![
                DetailLine::Label("ANN ID: 123".to_string()),
                DetailLine::Link {
                    href: "https://files.catbox.moe/abc.mp3".to_string(),
                    text: "Sound",
                },
                DetailLine::Title("Some Song".to_string()),
                DetailLine::Link {
                    href: "https://files.catbox.moe/abc.webm".to_string(),
                    text: "Video",
                },
            ]
        );
    }

    #[test]
    fn test_render_detail_drops_unknown_keys() {
        let d = detail(&[("internal_flag", "1"), ("name", "Song")]);
        let lines = render_detail(&d, "https://files.catbox.moe");
        assert_eq!(lines, vec![DetailLine::Title("Song".to_string())]);
    }

    #[test]
    fn test_render_detail_host_trailing_slash() {
        let d = detail(&[("mp3", "x.mp3")]);
        let lines = render_detail(&d, "https://files.catbox.moe/");
        assert_eq!(
            lines,
            vec![DetailLine::Link {
                href: "https://files.catbox.moe/x.mp3".to_string(),
                text: "Sound",
            }]
        );
    }
}
