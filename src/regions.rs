/// Regional feed registry for the official weather status source.
///
/// Maps administrative region names (as returned by the geocoder) to the
/// regional forecast document that covers them. Regions without an entry
/// use the nationwide document.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One regional feed: any region name containing `keyword`
/// (case-insensitive) is served by `feed_id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionFeed {
    pub keyword: String,
    pub feed_id: String,
}

/// Nationwide document used when no region keyword matches.
pub const NATIONAL_FEED_ID: &str = "DigitalForecast-Indonesia.xml";

/// Regions with a dedicated document, checked in order.
pub static REGION_REGISTRY: &[(&str, &str)] = &[
    ("jakarta", "DigitalForecast-DKIJakarta.xml"),
    ("jawa barat", "DigitalForecast-JawaBarat.xml"),
    ("jawa tengah", "DigitalForecast-JawaTengah.xml"),
    ("jawa timur", "DigitalForecast-JawaTimur.xml"),
    ("banten", "DigitalForecast-Banten.xml"),
    ("yogyakarta", "DigitalForecast-DIYogyakarta.xml"),
    ("bali", "DigitalForecast-Bali.xml"),
    ("sumatera utara", "DigitalForecast-SumateraUtara.xml"),
];

/// The built-in registry as owned entries, the default for `EngineConfig`.
pub fn default_region_feeds() -> Vec<RegionFeed> {
    REGION_REGISTRY
        .iter()
        .map(|(keyword, feed_id)| RegionFeed {
            keyword: keyword.to_string(),
            feed_id: feed_id.to_string(),
        })
        .collect()
}

/// Picks the feed for a region name, falling back to `national`.
pub fn select_feed<'a>(feeds: &'a [RegionFeed], national: &'a str, region_name: &str) -> &'a str {
    let region = region_name.to_lowercase();
    feeds
        .iter()
        .find(|f| region.contains(&f.keyword.to_lowercase()))
        .map(|f| f.feed_id.as_str())
        .unwrap_or(national)
}
