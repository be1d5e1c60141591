/// Place name → coordinate resolution (Open-Meteo geocoding API).
///
/// The geocoder is an external collaborator: the engine only needs the best
/// single match with its administrative region, or a "not found" signal.
///
/// API Documentation: https://open-meteo.com/en/docs/geocoding-api

use serde::Deserialize;
use tracing::debug;

use crate::config::{EngineConfig, GeocoderConfig};
use crate::ingest::{build_client, get_text};
use crate::model::{Coordinate, FeedError};

/// Resolves a free-text place name.
///
/// `Ok(None)` means the service answered but knows no such place.
pub trait Geocoder: Send + Sync {
    fn locate(&self, place_name: &str) -> Result<Option<Coordinate>, FeedError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    admin1: Option<String>,
}

pub fn build_search_url(config: &GeocoderConfig, place_name: &str) -> String {
    format!(
        "{}?name={}&count=1&language={}&format=json",
        config.base_url,
        urlencoding::encode(place_name),
        config.language
    )
}

/// Parses a search response into its best match.
pub fn parse_search_response(json: &str) -> Result<Option<Coordinate>, FeedError> {
    let response: SearchResponse = serde_json::from_str(json)
        .map_err(|e| FeedError::Malformed(format!("JSON deserialization failed: {}", e)))?;

    Ok(response.results.into_iter().next().map(|r| Coordinate {
        latitude: r.latitude,
        longitude: r.longitude,
        resolved_name: r.name,
        region_name: r.admin1.unwrap_or_default(),
    }))
}

pub struct OpenMeteoGeocoder {
    client: reqwest::blocking::Client,
    config: GeocoderConfig,
}

impl OpenMeteoGeocoder {
    pub fn new(config: &EngineConfig) -> Result<Self, FeedError> {
        Ok(Self {
            client: build_client(config.timeouts.geocoder())?,
            config: config.geocoder.clone(),
        })
    }
}

impl Geocoder for OpenMeteoGeocoder {
    fn locate(&self, place_name: &str) -> Result<Option<Coordinate>, FeedError> {
        let url = build_search_url(&self.config, place_name);
        debug!(%url, "Geocoding place");
        let body = get_text(&self.client, &url)?;
        parse_search_response(&body)
    }
}
