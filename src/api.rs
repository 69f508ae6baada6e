//! Network boundary: the catalog backend's query and statistics endpoints.
//!
//! Controllers talk to the [`CatalogApi`] trait so tests can substitute a
//! stub; [`HttpCatalogApi`] is the real JSON-over-HTTP implementation.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::model::{DifficultyBinRow, DifficultyBucketRow, SongDetail, SongRow, VintageStatRow};

#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /query?search=..&exact=..` — full result set for one search.
    async fn search(&self, search: &str, exact: bool) -> Result<Vec<SongRow>>;

    /// `GET /songquery/{id}` — detail attributes for one song.
    async fn song_detail(&self, id: &str) -> Result<SongDetail>;

    /// `GET /stats/vintage` — per-season statistics for every category.
    async fn vintage_stats(&self) -> Result<Vec<VintageStatRow>>;

    /// `GET /stats/difficulty/{bins}` — equal-width difficulty bins.
    async fn difficulty_stats(&self, bins: u32) -> Result<Vec<DifficultyBinRow>>;

    /// `GET /stats/difficulty2/{bins}` — per-category difficulty buckets.
    async fn difficulty_buckets(&self, bins: u32) -> Result<Vec<DifficultyBucketRow>>;
}

pub struct HttpCatalogApi {
    client: Client,
    base: Url,
}

impl HttpCatalogApi {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        let base = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid base url {}", cfg.base_url))?;
        Ok(Self { client, base })
    }

    /// GET a JSON document. A non-2xx status surfaces the response body
    /// text as the error message; nothing is retried here.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let res = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            if body.is_empty() {
                return Err(anyhow!("{} failed: {}", url.path(), status));
            }
            return Err(anyhow!(body));
        }
        res.json::<T>()
            .await
            .with_context(|| format!("unexpected response shape from {}", url.path()))
    }

    fn path(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base url cannot have segments appended"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn search(&self, search: &str, exact: bool) -> Result<Vec<SongRow>> {
        let mut url = self.path(&["query"])?;
        url.query_pairs_mut()
            .append_pair("search", search)
            .append_pair("exact", if exact { "true" } else { "false" });
        self.get_json(url).await
    }

    async fn song_detail(&self, id: &str) -> Result<SongDetail> {
        let url = self.path(&["songquery", id])?;
        self.get_json(url).await
    }

    async fn vintage_stats(&self) -> Result<Vec<VintageStatRow>> {
        let url = self.path(&["stats", "vintage"])?;
        self.get_json(url).await
    }

    async fn difficulty_stats(&self, bins: u32) -> Result<Vec<DifficultyBinRow>> {
        let url = self.path(&["stats", "difficulty", &bins.to_string()])?;
        self.get_json(url).await
    }

    async fn difficulty_buckets(&self, bins: u32) -> Result<Vec<DifficultyBucketRow>> {
        let url = self.path(&["stats", "difficulty2", &bins.to_string()])?;
        self.get_json(url).await
    }
}
