/// Human-readable prose for an analysis.
///
/// Narrators only ever see values the engine has already computed and only
/// produce `description` and `recommendation`. Risk level, score and sensor
/// data are never routed through here.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{NarrativeConfig, NarrativeProvider};
use crate::ingest::build_client;
use crate::model::{Factors, FeedError, RiskLevel};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Computed inputs a narrator may describe.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeFacts {
    pub location: String,
    pub level: RiskLevel,
    pub score: u32,
    pub total_rainfall_mm: f64,
    /// Official status label, `None` when the feed was unavailable.
    pub official_label: Option<String>,
    pub correction_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Narrative {
    pub description: String,
    pub recommendation: String,
}

pub trait Narrator: Send + Sync {
    fn narrate(&self, facts: &NarrativeFacts) -> Narrative;
}

/// The factor breakdown shown next to the description.
pub fn factors(total_rainfall_mm: f64) -> Factors {
    Factors {
        rainfall: format!("{:.1} mm (6-hour accumulation)", total_rainfall_mm),
        drainage: "Estimated urban drainage capacity (standard)".to_string(),
        history: "Regional topography analysis of flood-prone areas".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Template narrator
// ---------------------------------------------------------------------------

/// Fixed per-level wording. Always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateNarrator;

impl Narrator for TemplateNarrator {
    fn narrate(&self, facts: &NarrativeFacts) -> Narrative {
        let official = match &facts.official_label {
            Some(label) => format!("the official status reports {}", label),
            None => "no official status was available".to_string(),
        };
        let correction = if facts.correction_applied {
            " Telemetry read near zero while the official status reports rain, so light rain was added to the latest hours."
        } else {
            ""
        };

        let description = match facts.level {
            RiskLevel::Danger => format!(
                "CRITICAL WARNING: {} shows high rainfall ({:.1} mm) and {}. Flash flooding or deep \
                 inundation is very likely. Move valuables to higher ground now.",
                facts.location, facts.total_rainfall_mm, official
            ),
            RiskLevel::Watch => format!(
                "EARLY WARNING: moderate rain activity detected in {}. A total of {:.1} mm may cause \
                 pooling where drainage is poor, and {}. Stay alert to rapid weather changes.",
                facts.location, facts.total_rainfall_mm, official
            ),
            RiskLevel::Safe => format!(
                "STABLE: weather in {} is calm. Rainfall is low ({:.1} mm) and {}. Outdoor activity \
                 is safe.",
                facts.location, facts.total_rainfall_mm, official
            ),
        };

        let recommendation = match facts.level {
            RiskLevel::Danger => {
                "Evacuate if water starts entering the house. Switch off the electricity. Keep away from rivers."
            }
            RiskLevel::Watch => {
                "Clear drains and gutters. Avoid sheltering under old trees. Prepare an emergency bag."
            }
            RiskLevel::Safe => "Keep checking official weather updates. Keep local drainage clean.",
        };

        Narrative {
            description: format!("{}{}", description, correction),
            recommendation: recommendation.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Gemini narrator
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

fn build_prompt(facts: &NarrativeFacts) -> String {
    format!(
        "Write a short flood risk summary for {location}. The risk level is {level} with a score \
         of {score}/99, based on {rain:.1} mm of rainfall in the last 6 hours. Official status: \
         {official}.{correction} Do not change the level or the score. Reply with JSON only: \
         {{\"description\": string, \"recommendation\": string}}",
        location = facts.location,
        level = facts.level,
        score = facts.score,
        rain = facts.total_rainfall_mm,
        official = facts.official_label.as_deref().unwrap_or("unavailable"),
        correction = if facts.correction_applied {
            " The rainfall includes light rain added because telemetry read zero while the official status reported rain."
        } else {
            ""
        },
    )
}

/// Pulls the narrative object out of model text, tolerating surrounding prose
/// or code fences.
pub fn parse_narrative_text(text: &str) -> Result<Narrative, FeedError> {
    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&text[start..=end])
            .map_err(|e| FeedError::Malformed(format!("narrative JSON: {}", e))),
        _ => Err(FeedError::Malformed("no JSON object in narrative response".to_string())),
    }
}

/// Rewrites prose with a hosted model; any failure falls back to the
/// template wording.
pub struct GeminiNarrator {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    fallback: TemplateNarrator,
}

impl GeminiNarrator {
    pub fn new(config: &NarrativeConfig, api_key: String) -> Result<Self, FeedError> {
        Ok(Self {
            client: build_client(Duration::from_secs(config.timeout_secs))?,
            api_key,
            model: config.model.clone(),
            fallback: TemplateNarrator,
        })
    }

    fn generate(&self, facts: &NarrativeFacts) -> Result<Narrative, FeedError> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: build_prompt(facts) }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.4,
                response_mime_type: "application/json".to_string(),
            },
        };

        // Key goes in a header so it never appears in request URLs or their errors.
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let body: GenerateResponse = response.json()?;
        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| FeedError::Malformed("empty narrative response".to_string()))?;

        parse_narrative_text(text)
    }
}

impl Narrator for GeminiNarrator {
    fn narrate(&self, facts: &NarrativeFacts) -> Narrative {
        match self.generate(facts) {
            Ok(narrative) => {
                debug!(model = %self.model, "Narrative generated");
                narrative
            }
            Err(e) => {
                warn!(model = %self.model, error = %e, "Narrative generation failed, using template");
                self.fallback.narrate(facts)
            }
        }
    }
}

/// Narrator selected by configuration. Gemini without an API key falls back
/// to the template narrator.
pub fn narrator_from_config(config: &NarrativeConfig) -> Box<dyn Narrator> {
    match config.provider {
        NarrativeProvider::Template => Box::new(TemplateNarrator),
        NarrativeProvider::Gemini => {
            let api_key = match std::env::var(GEMINI_API_KEY_ENV) {
                Ok(key) if !key.trim().is_empty() => key,
                _ => {
                    warn!("{} not set, using template narrative", GEMINI_API_KEY_ENV);
                    return Box::new(TemplateNarrator);
                }
            };
            match GeminiNarrator::new(config, api_key) {
                Ok(narrator) => Box::new(narrator),
                Err(e) => {
                    warn!(error = %e, "Could not build narrative client, using template narrative");
                    Box::new(TemplateNarrator)
                }
            }
        }
    }
}
