/// Official regional weather status client (BMKG Digital Forecast).
///
/// Resolves a region name to one of the regional XML documents, parses the
/// document down to its sub-areas, picks the sub-area matching the place
/// name and normalizes its current weather code.
///
/// Every failure (transport, timeout, HTTP status, malformed XML, missing
/// weather parameter) is absorbed and reported as an unavailable status.
///
/// Feed index: https://data.bmkg.go.id/prakiraan-cuaca/

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, OfficialConfig};
use crate::ingest::{build_client, get_text, StatusSource};
use crate::model::{FeedError, OfficialStatus, StatusSource as Source};
use crate::regions::select_feed;
use crate::weather_codes;

/// Administrative suffixes the geocoder appends that the feed never uses.
const PLACE_SUFFIXES: &[&str] = &["City", "Regency"];

// ---------------------------------------------------------------------------
// Parsed structure
// ---------------------------------------------------------------------------

/// One named sub-area of a regional document.
#[derive(Debug, Clone, PartialEq)]
pub struct SubArea {
    pub name: String,
    /// Raw text of the first weather value, if the area has one.
    pub weather_code: Option<String>,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds the document URL for the region's feed.
pub fn build_feed_url(config: &OfficialConfig, region_name: &str) -> String {
    let feed_id = select_feed(&config.regions, &config.national_feed_id, region_name);
    format!("{}/{}", config.base_url.trim_end_matches('/'), feed_id)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn attribute(element: &BytesStart, key: &[u8]) -> Result<Option<String>, FeedError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| FeedError::Malformed(format!("bad attribute: {}", e)))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| FeedError::Malformed(format!("bad attribute value: {}", e)))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Parses a regional document into its sub-areas, in document order.
///
/// # Errors
/// `FeedError::Malformed` if the XML is invalid, has no `data/forecast`
/// block, or contains no areas.
pub fn parse_feed(xml: &str) -> Result<Vec<SubArea>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut saw_data = false;
    let mut in_forecast = false;
    let mut current: Option<SubArea> = None;
    let mut in_weather_param = false;
    let mut in_value = false;
    let mut areas = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"data" => saw_data = true,
                b"forecast" if saw_data => in_forecast = true,
                b"area" if in_forecast => {
                    let name = attribute(&e, b"description")?.unwrap_or_default();
                    current = Some(SubArea { name, weather_code: None });
                }
                b"parameter" if current.is_some() => {
                    in_weather_param = attribute(&e, b"id")?.as_deref() == Some("weather");
                }
                b"value" if in_weather_param => {
                    // Only the first timerange's value is the current period.
                    in_value = current.as_ref().is_some_and(|a| a.weather_code.is_none());
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_value => {
                let text = t
                    .unescape()
                    .map_err(|e| FeedError::Malformed(format!("bad text: {}", e)))?;
                if let Some(area) = current.as_mut() {
                    area.weather_code = Some(text.trim().to_string());
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"value" => in_value = false,
                b"parameter" => in_weather_param = false,
                b"area" => {
                    if let Some(area) = current.take() {
                        areas.push(area);
                    }
                }
                b"forecast" => in_forecast = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FeedError::Malformed(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if !saw_data {
        return Err(FeedError::Malformed("missing <data> root".to_string()));
    }
    if areas.is_empty() {
        return Err(FeedError::Malformed("no forecast areas in document".to_string()));
    }

    Ok(areas)
}

/// Lowercased place name with administrative suffixes removed.
pub fn normalize_place(place_name: &str) -> String {
    let mut name = place_name.to_string();
    for suffix in PLACE_SUFFIXES {
        name = name.replace(suffix, "");
    }
    name.trim().to_lowercase()
}

/// Picks the first sub-area whose name contains the place name
/// (case-insensitive), or the first sub-area in document order.
pub fn select_area<'a>(areas: &'a [SubArea], place_name: &str) -> Option<&'a SubArea> {
    let target = normalize_place(place_name);
    areas
        .iter()
        .find(|a| a.name.to_lowercase().contains(&target))
        .or_else(|| areas.first())
}

/// Turns a sub-area into an official status.
///
/// # Errors
/// `FeedError::Malformed` if the area has no weather value or the value is
/// not an integer. Codes outside the enumeration are not errors.
pub fn normalize_area(area: &SubArea) -> Result<OfficialStatus, FeedError> {
    let raw = area
        .weather_code
        .as_deref()
        .ok_or_else(|| FeedError::Malformed(format!("area '{}' has no weather parameter", area.name)))?;

    let code: i32 = raw
        .parse()
        .map_err(|_| FeedError::Malformed(format!("weather code '{}' is not an integer", raw)))?;

    Ok(OfficialStatus {
        categorical_code: code,
        label: weather_codes::label_for(code).to_string(),
        matched_area_name: area.name.clone(),
        source: Source::Official,
    })
}

/// Parses a whole document and resolves the status for `place_name`.
pub fn status_from_document(xml: &str, place_name: &str) -> Result<OfficialStatus, FeedError> {
    let areas = parse_feed(xml)?;
    let area = select_area(&areas, place_name)
        .ok_or_else(|| FeedError::Malformed("no forecast areas in document".to_string()))?;
    normalize_area(area)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP-backed status source with the short official timeout.
pub struct BmkgStatusSource {
    client: reqwest::blocking::Client,
    config: OfficialConfig,
}

impl BmkgStatusSource {
    pub fn new(config: &EngineConfig) -> Result<Self, FeedError> {
        Ok(Self {
            client: build_client(config.timeouts.official())?,
            config: config.official.clone(),
        })
    }

    fn try_fetch(&self, region_name: &str, place_name: &str) -> Result<OfficialStatus, FeedError> {
        let url = build_feed_url(&self.config, region_name);
        debug!(%url, "Fetching official regional feed");
        let body = get_text(&self.client, &url)?;
        status_from_document(&body, place_name)
    }
}

impl StatusSource for BmkgStatusSource {
    fn fetch_status(&self, region_name: &str, place_name: &str) -> OfficialStatus {
        match self.try_fetch(region_name, place_name) {
            Ok(status) => {
                info!(
                    area = %status.matched_area_name,
                    code = status.categorical_code,
                    label = %status.label,
                    "Official status resolved"
                );
                status
            }
            Err(e) => {
                warn!(region = region_name, place = place_name, error = %e, "Official feed unavailable, continuing without it");
                OfficialStatus::unavailable()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
