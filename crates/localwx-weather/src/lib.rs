//! Locality search and weather lookup for localwx
//!
//! Loads the locality catalog, filters it for autocomplete, and fetches the
//! current reading for a selected locality from the weather service.

pub mod types;
pub mod catalog;
pub mod client;
pub mod search;
pub mod store;

pub use types::*;
pub use catalog::CatalogSource;
pub use client::WeatherClient;
pub use search::filter;
pub use store::{LocalityStore, RequestTag, WeatherStore};
