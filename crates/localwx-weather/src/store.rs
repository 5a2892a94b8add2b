//! Locality and weather stores.
//!
//! Network work is spawned onto the tokio runtime; results come back as
//! messages on the store's channel and are applied by whoever owns the store,
//! via `poll()` (non-blocking) or `settle()` (waits for outstanding requests).

use std::sync::Arc;

use localwx_core::{AsyncState, Phase};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::catalog::CatalogSource;
use crate::client::WeatherClient;
use crate::types::{CatalogError, LocalityRecord, WeatherError, WeatherReading};

/// Messages sent from catalog loads back to the owning thread
#[derive(Debug)]
pub enum CatalogMessage {
    LoadDone(Result<Vec<LocalityRecord>, CatalogError>),
}

/// Holds the full locality catalog once loaded.
pub struct LocalityStore {
    state: AsyncState<Vec<LocalityRecord>>,
    source: CatalogSource,
    runtime: Handle,
    tx: mpsc::UnboundedSender<CatalogMessage>,
    rx: mpsc::UnboundedReceiver<CatalogMessage>,
    in_flight: usize,
}

impl LocalityStore {
    pub fn new(source: CatalogSource, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: AsyncState::default(),
            source,
            runtime,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &AsyncState<Vec<LocalityRecord>> {
        &self.state
    }

    /// Loaded catalog, or an empty slice while loading or after a failure.
    pub fn catalog(&self) -> &[LocalityRecord] {
        self.state.data.as_deref().unwrap_or_default()
    }

    /// Called when the search view mounts. Loads the catalog unless it is
    /// already loaded or loading; a failed load is retried here.
    pub fn mount(&mut self) -> bool {
        match self.state.phase() {
            Phase::Success | Phase::Pending => false,
            Phase::Idle | Phase::Failure => {
                self.fetch_all();
                true
            }
        }
    }

    /// Start loading the whole catalog.
    pub fn fetch_all(&mut self) {
        self.state.begin();
        self.in_flight += 1;

        let tx = self.tx.clone();
        let source = self.source.clone();
        self.runtime.spawn(async move {
            let result = source.load().await;
            let _ = tx.send(CatalogMessage::LoadDone(result));
        });
    }

    pub fn apply(&mut self, result: Result<Vec<LocalityRecord>, CatalogError>) {
        match result {
            Ok(records) => self.state.succeed(records),
            Err(e) => {
                tracing::warn!("Locality catalog load failed: {}", e);
                self.state.fail(e.to_string());
            }
        }
    }

    /// Apply every result that has already arrived. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle(message);
            applied += 1;
        }
        applied
    }

    /// Wait until every outstanding load has been applied.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(message) => self.handle(message),
                None => break,
            }
        }
    }

    fn handle(&mut self, message: CatalogMessage) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match message {
            CatalogMessage::LoadDone(result) => self.apply(result),
        }
    }
}

/// Identifies one weather request. Later requests have larger tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTag(u64);

/// Messages sent from weather fetches back to the owning thread
#[derive(Debug)]
pub enum WeatherMessage {
    FetchDone {
        tag: RequestTag,
        locality_id: String,
        result: Result<WeatherReading, WeatherError>,
    },
}

/// Fetches and holds the reading for the selected locality.
///
/// Only the most recent request may change the state: results carrying an
/// older tag are dropped when they arrive.
pub struct WeatherStore {
    state: AsyncState<WeatherReading>,
    client: Arc<WeatherClient>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<WeatherMessage>,
    rx: mpsc::UnboundedReceiver<WeatherMessage>,
    next_tag: u64,
    latest: Option<RequestTag>,
    locality_id: Option<String>,
    in_flight: usize,
}

impl WeatherStore {
    pub fn new(client: Arc<WeatherClient>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: AsyncState::default(),
            client,
            runtime,
            tx,
            rx,
            next_tag: 0,
            latest: None,
            locality_id: None,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &AsyncState<WeatherReading> {
        &self.state
    }

    /// Locality of the most recent request.
    pub fn locality_id(&self) -> Option<&str> {
        self.locality_id.as_deref()
    }

    /// Record a new request without doing any I/O.
    ///
    /// Goes to pending and clears the error; the previous reading stays until
    /// this request resolves.
    pub fn request(&mut self, locality_id: &str) -> RequestTag {
        self.next_tag += 1;
        let tag = RequestTag(self.next_tag);
        self.latest = Some(tag);
        self.locality_id = Some(locality_id.to_string());
        self.state.begin();
        tag
    }

    /// Apply the outcome of request `tag`. Returns false if it was superseded.
    pub fn resolve(&mut self, tag: RequestTag, result: Result<WeatherReading, WeatherError>) -> bool {
        if self.latest != Some(tag) {
            tracing::debug!("Discarding stale weather result {:?} (latest {:?})", tag, self.latest);
            return false;
        }

        match result {
            Ok(reading) => self.state.succeed(reading),
            Err(e) => {
                tracing::warn!("Weather fetch failed: {}", e);
                self.state.fail(e.to_string());
            }
        }
        true
    }

    /// Fetch the reading for `locality_id`. Always issues a new request, even
    /// for the locality currently shown.
    pub fn fetch_by_locality(&mut self, locality_id: &str) -> RequestTag {
        let tag = self.request(locality_id);
        self.in_flight += 1;
        tracing::info!("Fetching weather for {}", locality_id);

        let tx = self.tx.clone();
        let client = self.client.clone();
        let locality_id = locality_id.to_string();
        self.runtime.spawn(async move {
            let result = client.fetch(&locality_id).await;
            let _ = tx.send(WeatherMessage::FetchDone {
                tag,
                locality_id,
                result,
            });
        });

        tag
    }

    /// Back to idle. Requests still in flight will be ignored when they land.
    pub fn reset(&mut self) {
        self.latest = None;
        self.locality_id = None;
        self.state.reset();
    }

    /// Apply every result that has already arrived. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            if self.handle(message) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait until every outstanding fetch has landed (applied or discarded).
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(message) => {
                    self.handle(message);
                }
                None => break,
            }
        }
    }

    fn handle(&mut self, message: WeatherMessage) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        match message {
            WeatherMessage::FetchDone {
                tag,
                locality_id,
                result,
            } => {
                tracing::debug!("Weather result for {} ({:?})", locality_id, tag);
                self.resolve(tag, result)
            }
        }
    }
}
