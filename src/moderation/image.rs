//! Image-safety scoring
//!
//! The scorer is an external dependency behind [`ImageScorer`]. The production
//! implementation calls SightEngine's `check.json` endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::Verdict;
use crate::config::ModerationConfig;

/// Image is safe iff `1 - max(scores) >= SAFETY_THRESHOLD`
pub const SAFETY_THRESHOLD: f64 = 0.7;
/// A category above this score is named as the rejection reason
pub const CATEGORY_THRESHOLD: f64 = 0.3;

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Scorer API error: {0}")]
    Api(String),

    #[error("Failed to decode scorer response: {0}")]
    Decode(String),

    #[error("Scorer timed out after {0}ms")]
    Timeout(u128),
}

/// Per-category probabilities in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImageScores {
    pub nudity: f64,
    pub weapon: f64,
    pub alcohol: f64,
    pub drugs: f64,
    pub offensive: f64,
    pub violence: f64,
}

impl ImageScores {
    fn all(&self) -> [f64; 6] {
        [
            self.nudity,
            self.weapon,
            self.alcohol,
            self.drugs,
            self.offensive,
            self.violence,
        ]
    }

    pub fn safety(&self) -> f64 {
        let max = self.all().into_iter().fold(0.0_f64, f64::max);
        (1.0 - max).clamp(0.0, 1.0)
    }

    /// Reason for an unsafe image, checked in severity order
    pub fn rejection_reason(&self) -> &'static str {
        let ordered = [
            (self.nudity, "Adult content detected"),
            (self.violence, "Violent content detected"),
            (self.weapon, "Weapon detected"),
            (self.alcohol, "Alcohol content detected"),
            (self.drugs, "Drug-related content detected"),
            (self.offensive, "Offensive content detected"),
        ];
        ordered
            .into_iter()
            .find(|(score, _)| *score > CATEGORY_THRESHOLD)
            .map(|(_, reason)| reason)
            .unwrap_or("Inappropriate content detected")
    }

    pub fn verdict(&self) -> Verdict {
        let safety = self.safety();
        if safety >= SAFETY_THRESHOLD {
            Verdict::approve(safety)
        } else {
            Verdict::reject(safety, self.rejection_reason())
        }
    }
}

#[async_trait]
pub trait ImageScorer: Send + Sync {
    async fn score(&self, image_ref: &str) -> Result<ImageScores, ScorerError>;
}

// =============================================================================
// SightEngine
// =============================================================================

const SIGHTENGINE_MODELS: &str = "nudity,weapon,alcohol,drugs,offensive,violence";

#[derive(Debug, Default, Deserialize)]
struct SightEngineResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<SightEngineError>,
    #[serde(default)]
    request: SightEngineRequestInfo,
    #[serde(default)]
    nudity: SightEngineNudity,
    #[serde(default)]
    weapon: f64,
    #[serde(default)]
    alcohol: f64,
    #[serde(default)]
    drugs: f64,
    #[serde(default)]
    offensive: SightEngineScore,
    #[serde(default)]
    violence: f64,
}

#[derive(Debug, Default, Deserialize)]
struct SightEngineError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct SightEngineRequestInfo {
    #[serde(default)]
    events: SightEngineEvents,
}

#[derive(Debug, Default, Deserialize)]
struct SightEngineEvents {
    #[serde(default)]
    error: String,
}

#[derive(Debug, Default, Deserialize)]
struct SightEngineNudity {
    #[serde(default)]
    raw: f64,
    #[serde(default)]
    partial: f64,
}

/// `offensive` is either a bare number or `{ "prob": n }` depending on model version
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SightEngineScore {
    Bare(f64),
    Prob { prob: f64 },
}

impl Default for SightEngineScore {
    fn default() -> Self {
        SightEngineScore::Bare(0.0)
    }
}

impl SightEngineScore {
    fn value(&self) -> f64 {
        match self {
            SightEngineScore::Bare(v) => *v,
            SightEngineScore::Prob { prob } => *prob,
        }
    }
}

impl SightEngineResponse {
    fn into_scores(self) -> Result<ImageScores, ScorerError> {
        if let Some(err) = self.error {
            return Err(ScorerError::Api(err.message));
        }
        if !self.request.events.error.is_empty() {
            return Err(ScorerError::Api(self.request.events.error));
        }
        if !self.status.is_empty() && self.status != "success" {
            return Err(ScorerError::Api(format!("status {}", self.status)));
        }
        Ok(ImageScores {
            nudity: self.nudity.raw.max(self.nudity.partial),
            weapon: self.weapon,
            alcohol: self.alcohol,
            drugs: self.drugs,
            offensive: self.offensive.value(),
            violence: self.violence,
        })
    }
}

/// SightEngine `check.json` client
pub struct SightEngineScorer {
    client: reqwest::Client,
    endpoint: String,
    api_user: String,
    api_secret: String,
}

impl SightEngineScorer {
    /// Returns `Ok(None)` when credentials are not configured
    pub fn from_config(config: &ModerationConfig) -> Result<Option<Self>, ScorerError> {
        if !config.has_credentials() {
            return Ok(None);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ScorerError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Some(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_user: config.api_user.clone().unwrap_or_default(),
            api_secret: config.api_secret.clone().unwrap_or_default(),
        }))
    }
}

#[async_trait]
impl ImageScorer for SightEngineScorer {
    async fn score(&self, image_ref: &str) -> Result<ImageScores, ScorerError> {
        let form = [
            ("api_user", self.api_user.as_str()),
            ("api_secret", self.api_secret.as_str()),
            ("url", image_ref),
            ("models", SIGHTENGINE_MODELS),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| ScorerError::Http(e.to_string()))?;

        let status = response.status();
        let body: SightEngineResponse = response
            .json()
            .await
            .map_err(|e| ScorerError::Decode(e.to_string()))?;
        debug!(http_status = %status, "SightEngine response received");

        body.into_scores()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_image_safety() {
        let scores = ImageScores {
            weapon: 0.1,
            ..Default::default()
        };
        let v = scores.verdict();
        assert!(v.approved);
        assert!((v.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let scores = ImageScores {
            drugs: 0.3,
            ..Default::default()
        };
        assert!(scores.verdict().approved);
    }

    #[test]
    fn test_reason_priority() {
        // weapon is the max, but violence outranks it in reporting
        let scores = ImageScores {
            weapon: 0.8,
            violence: 0.4,
            ..Default::default()
        };
        let v = scores.verdict();
        assert!(!v.approved);
        assert_eq!(v.reason.as_deref(), Some("Violent content detected"));

        let scores = ImageScores {
            nudity: 0.35,
            alcohol: 0.9,
            ..Default::default()
        };
        assert_eq!(scores.rejection_reason(), "Adult content detected");
    }

    #[test]
    fn test_generic_reason() {
        // No category above 0.3
        let scores = ImageScores::default();
        assert_eq!(scores.rejection_reason(), "Inappropriate content detected");
    }

    #[test]
    fn test_parse_sightengine_success() {
        let body: SightEngineResponse = serde_json::from_value(serde_json::json!({
            "status": "success",
            "request": { "id": "req_1", "events": {} },
            "nudity": { "raw": 0.01, "partial": 0.05, "safe": 0.94 },
            "weapon": 0.02,
            "alcohol": 0.4,
            "drugs": 0.0,
            "offensive": { "prob": 0.01 },
            "violence": 0.0
        }))
        .unwrap();
        let scores = body.into_scores().unwrap();
        assert_eq!(scores.nudity, 0.05);
        assert_eq!(scores.alcohol, 0.4);
        assert_eq!(scores.offensive, 0.01);
    }

    #[test]
    fn test_parse_sightengine_api_error() {
        let body: SightEngineResponse = serde_json::from_value(serde_json::json!({
            "status": "failure",
            "error": { "type": "credentials_error", "code": 103, "message": "Incorrect API user" }
        }))
        .unwrap();
        assert!(matches!(body.into_scores(), Err(ScorerError::Api(_))));

        let body: SightEngineResponse = serde_json::from_value(serde_json::json!({
            "status": "success",
            "request": { "events": { "error": "media not reachable" } }
        }))
        .unwrap();
        assert!(matches!(body.into_scores(), Err(ScorerError::Api(_))));
    }

    #[test]
    fn test_no_credentials_no_scorer() {
        let config = ModerationConfig::default();
        assert!(SightEngineScorer::from_config(&config).unwrap().is_none());
    }
}
