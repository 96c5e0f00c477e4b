use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, error, trace};
use url::Url;

use crate::domain::{AppConfig, AppError, FetchFailure};
use crate::table::Row;

const DEFAULT_TITLE: &str = "No Title";
const DEFAULT_UNKNOWN: &str = "Unknown";

// Only the fields the table consumes. Everything else in the payload is ignored.
#[derive(Debug, Deserialize)]
pub struct ArtworksResponse {
    pub data: Vec<RawArtwork>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct RawArtwork {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub place_of_origin: Option<String>,
    #[serde(default)]
    pub artist_display: Option<String>,
}

fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(s) if !s.is_empty() => s,
        _ => default.to_string(),
    }
}

pub fn map_record(raw: RawArtwork) -> Row {
    Row {
        id: raw.id,
        title: or_default(raw.title, DEFAULT_TITLE),
        place_of_origin: or_default(raw.place_of_origin, DEFAULT_UNKNOWN),
        artist_display: or_default(raw.artist_display, DEFAULT_UNKNOWN),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageData {
    pub rows: Vec<Row>,
    pub total_records: u64,
}

impl PageData {
    pub fn from_response(response: ArtworksResponse) -> Self {
        PageData {
            rows: response.data.into_iter().map(map_record).collect(),
            total_records: response.pagination.total,
        }
    }
}

pub fn decode_response(body: &str) -> Result<ArtworksResponse, FetchFailure> {
    Ok(serde_json::from_str(body)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub page: usize,
    pub rows: usize,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub request: FetchRequest,
    pub result: Result<PageData, FetchFailure>,
}

pub trait ArtworkSource: Send + Sync {
    fn fetch_page(&self, page: usize, rows: usize) -> Result<ArtworksResponse, FetchFailure>;
}

pub struct HttpSource {
    base: Url,
    client: Client,
}

impl HttpSource {
    pub fn new(cfg: &AppConfig) -> Result<Self, AppError> {
        let base =
            Url::parse(&cfg.api_url).map_err(|_| AppError::InvalidUrl(cfg.api_url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(AppError::InvalidUrl(cfg.api_url.clone()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(FetchFailure::from)?;
        Ok(Self { base, client })
    }

    pub fn page_url(&self, page: usize, rows: usize) -> Result<Url, FetchFailure> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchFailure::new(format!("{} cannot be a base url", self.base)))?
            .pop_if_empty()
            .push("artworks");
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &rows.to_string());
        Ok(url)
    }
}

impl ArtworkSource for HttpSource {
    fn fetch_page(&self, page: usize, rows: usize) -> Result<ArtworksResponse, FetchFailure> {
        let url = self.page_url(page, rows)?;
        debug!("GET {url}");
        let response = self.client.get(url).send()?.error_for_status()?;
        let body = response.text()?;
        decode_response(&body)
    }
}

// Runs requests on the rayon pool and hands the outcomes back to the UI loop.
// The pool is sized for cpu work and blocking requests occupy a worker each, so a burst
// of page changes queues up. A queued request that has been superseded by a newer one
// is dropped before it reaches the network. Requests already in flight are never
// cancelled, the model discards their stale outcomes by seq.
pub struct Fetcher {
    source: Arc<dyn ArtworkSource>,
    latest_seq: Arc<AtomicU64>,
    tx: Sender<FetchOutcome>,
    rx: Receiver<FetchOutcome>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn ArtworkSource>) -> Self {
        let (tx, rx) = channel();
        Self {
            source,
            latest_seq: Arc::new(AtomicU64::new(0)),
            tx,
            rx,
        }
    }

    pub fn dispatch(&self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let latest_seq = Arc::clone(&self.latest_seq);
        let tx = self.tx.clone();
        latest_seq.fetch_max(request.seq, Ordering::SeqCst);
        trace!(
            "Dispatching request #{} page={} limit={}",
            request.seq, request.page, request.rows
        );
        rayon::spawn(move || {
            let latest = latest_seq.load(Ordering::SeqCst);
            if request.seq < latest {
                debug!("Skipping request #{} superseded by #{latest}", request.seq);
                return;
            }
            let start_time = Instant::now();
            let result = source
                .fetch_page(request.page, request.rows)
                .map(PageData::from_response);
            match &result {
                Ok(data) => debug!(
                    "Request #{} returned {} rows in {}ms",
                    request.seq,
                    data.rows.len(),
                    start_time.elapsed().as_millis()
                ),
                Err(e) => error!("Error fetching data (request #{}): {e}", request.seq),
            }
            // The receiver is gone when the app is shutting down
            let _ = tx.send(FetchOutcome { request, result });
        });
    }

    pub fn try_recv(&self) -> Option<FetchOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            // We hold a sender ourselves, so this can not happen while self is alive
            Err(TryRecvError::Disconnected) => None,
        }
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<FetchOutcome> {
        self.rx.recv_timeout(timeout).ok()
    }
}
