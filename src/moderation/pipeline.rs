//! Text + image evaluation

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::image::{ImageScorer, ScorerError};
use super::text::moderate_text;
use super::Verdict;

/// Combines the keyword screen with an optional image scorer
#[derive(Clone)]
pub struct ModerationPipeline {
    scorer: Option<Arc<dyn ImageScorer>>,
    timeout: Duration,
}

impl ModerationPipeline {
    pub fn new(scorer: Option<Arc<dyn ImageScorer>>, timeout: Duration) -> Self {
        Self { scorer, timeout }
    }

    /// Keyword screen only; images are never scored
    pub fn text_only() -> Self {
        Self {
            scorer: None,
            timeout: Duration::ZERO,
        }
    }

    pub async fn evaluate(&self, title: &str, description: &str, image: Option<&str>) -> Verdict {
        let text = moderate_text(title, description);
        if !text.approved {
            return text;
        }

        let Some(image) = image.map(str::trim).filter(|s| !s.is_empty()) else {
            return text;
        };

        let Some(scorer) = &self.scorer else {
            debug!("No image scorer configured, text verdict stands");
            return text;
        };

        let scored = match tokio::time::timeout(self.timeout, scorer.score(image)).await {
            Ok(result) => result,
            Err(_) => Err(ScorerError::Timeout(self.timeout.as_millis())),
        };

        match scored {
            Ok(scores) => {
                let image_verdict = scores.verdict();
                if !image_verdict.approved {
                    return image_verdict;
                }
                Verdict::approve((text.confidence + image_verdict.confidence) / 2.0)
            }
            Err(e) => {
                // Fail open
                warn!(image, error = %e, "Image moderation failed, using text verdict");
                text
            }
        }
    }
}
