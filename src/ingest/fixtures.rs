/// Test fixtures: representative payloads from the upstream feeds.
///
/// These are structurally complete but truncated to the minimum needed to
/// exercise the parsers.
///
/// Regional XML feed shape:
///   data
///     forecast
///       area[@description]          — sub-area name used for matching
///         name                      — localized names (ignored)
///         parameter[@id]            — "weather" carries the categorical code
///           timerange               — first timerange is the current period
///             value                 — code as element text
///
/// Telemetry JSON shape:
///   utc_offset_seconds, timezone
///   hourly.time[]            — local "YYYY-MM-DDTHH:MM"
///   hourly.precipitation[]   — mm, may be null
///   daily.time[]             — local "YYYY-MM-DD", starts past_days before today
///   daily.precipitation_sum[], daily.precipitation_probability_max[]

/// Three Jakarta sub-areas: West (overcast, first in document order),
/// South (heavy rain) and the Thousand Islands (no weather parameter).
#[cfg(test)]
pub(crate) fn fixture_jakarta_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<data source="meteorological_agency" productioncenter="Jakarta">
  <forecast domain="local">
    <issue>
      <timestamp>20240110000000</timestamp>
    </issue>
    <area id="501195" latitude="-6.16" longitude="106.76" coordinate="106.76 -6.16" type="land" region="" level="1" description="Jakarta Barat" domain="DKI Jakarta" tags="">
      <name xml:lang="en_US">West Jakarta</name>
      <name xml:lang="id_ID">Jakarta Barat</name>
      <parameter id="hu" description="Humidity" type="hourly">
        <timerange type="hourly" h="0" datetime="202401100000"><value unit="%">85</value></timerange>
      </parameter>
      <parameter id="weather" description="Weather" type="hourly">
        <timerange type="hourly" h="0" datetime="202401100000"><value unit="icon">3</value></timerange>
        <timerange type="hourly" h="6" datetime="202401100600"><value unit="icon">60</value></timerange>
      </parameter>
    </area>
    <area id="501196" latitude="-6.26" longitude="106.81" coordinate="106.81 -6.26" type="land" region="" level="1" description="Jakarta Selatan" domain="DKI Jakarta" tags="">
      <name xml:lang="en_US">South Jakarta</name>
      <name xml:lang="id_ID">Jakarta Selatan</name>
      <parameter id="weather" description="Weather" type="hourly">
        <timerange type="hourly" h="0" datetime="202401100000"><value unit="icon">63</value></timerange>
      </parameter>
    </area>
    <area id="501197" latitude="-5.61" longitude="106.55" coordinate="106.55 -5.61" type="land" region="" level="1" description="Kepulauan Seribu" domain="DKI Jakarta" tags="">
      <name xml:lang="en_US">Thousand Islands</name>
      <parameter id="t" description="Temperature" type="hourly">
        <timerange type="hourly" h="0" datetime="202401100000"><value unit="C">29</value><value unit="F">84</value></timerange>
      </parameter>
    </area>
  </forecast>
</data>"#
}

/// Single sub-area reporting a code missing from the enumeration.
#[cfg(test)]
pub(crate) fn fixture_unknown_code_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<data source="meteorological_agency">
  <forecast domain="local">
    <area id="1" description="Denpasar" domain="Bali">
      <parameter id="weather" description="Weather" type="hourly">
        <timerange type="hourly" h="0" datetime="202401100000"><value unit="icon">7</value></timerange>
      </parameter>
    </area>
  </forecast>
</data>"#
}

/// Well-formed XML with no forecast block, as served by an error page.
#[cfg(test)]
pub(crate) fn fixture_missing_forecast_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<error><message>Service temporarily unavailable</message></error>"#
}

/// Twelve hours of Jakarta telemetry (UTC+7), 04:00–15:00 local on
/// 2024-01-10, plus four days of daily aggregates starting yesterday.
///
/// 06:00–11:00 totals 1.6 mm. 14:00 is null.
#[cfg(test)]
pub(crate) fn fixture_forecast_json() -> &'static str {
    r#"{
      "latitude": -6.25,
      "longitude": 106.75,
      "generationtime_ms": 0.12,
      "utc_offset_seconds": 25200,
      "timezone": "Asia/Jakarta",
      "timezone_abbreviation": "WIB",
      "elevation": 8.0,
      "hourly_units": { "time": "iso8601", "precipitation": "mm" },
      "hourly": {
        "time": [
          "2024-01-10T04:00", "2024-01-10T05:00", "2024-01-10T06:00", "2024-01-10T07:00",
          "2024-01-10T08:00", "2024-01-10T09:00", "2024-01-10T10:00", "2024-01-10T11:00",
          "2024-01-10T12:00", "2024-01-10T13:00", "2024-01-10T14:00", "2024-01-10T15:00"
        ],
        "precipitation": [0.0, 0.0, 0.1, 0.0, 0.0, 0.0, 0.3, 1.2, 2.5, 0.8, null, 0.0]
      },
      "daily_units": { "time": "iso8601", "precipitation_sum": "mm", "precipitation_probability_max": "%" },
      "daily": {
        "time": ["2024-01-09", "2024-01-10", "2024-01-11", "2024-01-12"],
        "precipitation_sum": [3.1, 5.0, 22.4, 8.0],
        "precipitation_probability_max": [40, 65, 90, null]
      }
    }"#
}

/// Hourly block whose arrays disagree in length.
#[cfg(test)]
pub(crate) fn fixture_mismatched_hourly_json() -> &'static str {
    r#"{
      "utc_offset_seconds": 0,
      "timezone": "GMT",
      "hourly": {
        "time": ["2024-01-10T00:00", "2024-01-10T01:00"],
        "precipitation": [0.0]
      }
    }"#
}

/// Geocoder hit for Bandung.
#[cfg(test)]
pub(crate) fn fixture_geocode_bandung_json() -> &'static str {
    r#"{
      "results": [
        {
          "id": 1650357,
          "name": "Bandung",
          "latitude": -6.90389,
          "longitude": 107.61861,
          "elevation": 768.0,
          "feature_code": "PPLA",
          "country_code": "ID",
          "timezone": "Asia/Jakarta",
          "country": "Indonesia",
          "admin1": "Jawa Barat"
        }
      ],
      "generationtime_ms": 0.9
    }"#
}

/// Geocoder miss: the `results` key is absent entirely.
#[cfg(test)]
pub(crate) fn fixture_geocode_empty_json() -> &'static str {
    r#"{ "generationtime_ms": 0.4 }"#
}
