use anyhow::{Context, Result};
use std::sync::Arc;

use localwx_core::{AsyncState, Config};
use localwx_weather::{
    filter, CatalogSource, LocalityRecord, LocalityStore, WeatherClient, WeatherReading,
    WeatherStore,
};

/// Which view the session is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Search { query: String },
    Weather { locality_id: String },
}

/// Session state: owns the runtime and both stores.
pub struct App {
    config: Arc<Config>,
    runtime: tokio::runtime::Runtime,
    localities: LocalityStore,
    weather: WeatherStore,
    route: Route,
}

impl App {
    /// Create a new session from a loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("localwx-tokio")
            .build()
            .context("Failed to create tokio runtime")?;

        let source = CatalogSource::from_config(&config.catalog)
            .context("Failed to set up locality catalog")?;
        let client = WeatherClient::from_config(&config.weather)
            .context("Failed to set up weather client")?;

        let localities = LocalityStore::new(source, runtime.handle().clone());
        let weather = WeatherStore::new(Arc::new(client), runtime.handle().clone());

        tracing::info!("Session created (catalog: {})", config.catalog.source);

        Ok(Self {
            config: Arc::new(config),
            runtime,
            localities,
            weather,
            route: Route::Search {
                query: String::new(),
            },
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Show the search view with an empty query. Leaving the detail view
    /// resets the weather store.
    pub fn open_search(&mut self) {
        if matches!(self.route, Route::Weather { .. }) {
            self.weather.reset();
        }
        self.route = Route::Search {
            query: String::new(),
        };
        if self.localities.mount() {
            tracing::debug!("Locality catalog load started");
        }
    }

    /// Update the search text. Switches to the search view if needed.
    pub fn set_query(&mut self, query: &str) {
        if !matches!(self.route, Route::Search { .. }) {
            self.open_search();
        }
        self.route = Route::Search {
            query: query.to_string(),
        };
    }

    /// Current suggestions; empty outside the search view.
    pub fn suggestions(&self) -> Vec<&LocalityRecord> {
        match &self.route {
            Route::Search { query } => filter(query, self.localities.catalog()),
            Route::Weather { .. } => Vec::new(),
        }
    }

    /// Navigate to the detail view of `locality_id` and fetch its weather.
    pub fn select(&mut self, locality_id: &str) {
        self.route = Route::Weather {
            locality_id: locality_id.to_string(),
        };
        self.weather.fetch_by_locality(locality_id);
    }

    pub fn localities(&self) -> &AsyncState<Vec<LocalityRecord>> {
        self.localities.state()
    }

    pub fn weather(&self) -> &AsyncState<WeatherReading> {
        self.weather.state()
    }

    /// Apply whatever results have arrived without blocking.
    pub fn poll(&mut self) -> usize {
        self.localities.poll() + self.weather.poll()
    }

    /// Block until every outstanding request has been applied.
    pub fn wait(&mut self) {
        let Self {
            runtime,
            localities,
            weather,
            ..
        } = self;
        runtime.block_on(async {
            localities.settle().await;
            weather.settle().await;
        });
    }

    /// Shutdown the session
    pub fn shutdown(self) {
        tracing::info!("Shutting down session");
        self.runtime.shutdown_background();
    }
}
