//! Read-only locality catalog: a JSON array served from a file or an HTTP endpoint.
//! The whole catalog is returned on every load; no filtering happens here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use localwx_core::{CatalogConfig, NetworkError, ReqwestErrorExt};
use reqwest::Client;
use url::Url;

use crate::types::{CatalogError, LocalityRecord};

#[derive(Debug, Clone)]
pub enum CatalogSource {
    File(PathBuf),
    Remote { client: Arc<Client>, url: Url },
}

impl CatalogSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn remote(url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let url = Url::parse(url).map_err(|e| CatalogError::Parse(format!("bad catalog URL: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.into_network_error()))?;
        Ok(Self::Remote {
            client: Arc::new(client),
            url,
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.is_remote() {
            Self::remote(&config.source, Duration::from_secs(config.timeout_secs))
        } else {
            Ok(Self::file(&config.source))
        }
    }

    /// Load the full catalog.
    pub async fn load(&self) -> Result<Vec<LocalityRecord>, CatalogError> {
        let records = match self {
            Self::File(path) => {
                let contents = tokio::fs::read_to_string(path).await.map_err(|source| {
                    CatalogError::Io {
                        path: path.display().to_string(),
                        source,
                    }
                })?;
                parse_catalog(&contents)?
            }
            Self::Remote { client, url } => {
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| CatalogError::Network(e.into_network_error()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(CatalogError::Network(NetworkError::ServerError {
                        status: status.as_u16(),
                        message: status.canonical_reason().unwrap_or("unknown status").to_string(),
                    }));
                }

                let body = response
                    .text()
                    .await
                    .map_err(|e| CatalogError::Network(e.into_network_error()))?;
                parse_catalog(&body)?
            }
        };

        tracing::info!("Loaded {} localities", records.len());
        Ok(records)
    }
}

fn parse_catalog(contents: &str) -> Result<Vec<LocalityRecord>, CatalogError> {
    serde_json::from_str(contents).map_err(|e| CatalogError::Parse(e.to_string()))
}
