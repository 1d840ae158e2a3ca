//! Content moderation
//!
//! A listing is screened by its text first; an image is only scored when the
//! text passes. The image scorer is best-effort: when it fails or times out
//! the text verdict stands.

pub mod image;
pub mod pipeline;
pub mod text;

use serde::Serialize;

pub use image::{ImageScorer, ImageScores, ScorerError, SightEngineScorer};
pub use pipeline::ModerationPipeline;
pub use text::moderate_text;

/// Moderation outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub approved: bool,
    /// In [0, 1]
    pub confidence: f64,
    /// Set on rejection
    pub reason: Option<String>,
}

impl Verdict {
    pub fn approve(confidence: f64) -> Self {
        Self {
            approved: true,
            confidence: confidence.clamp(0.0, 1.0),
            reason: None,
        }
    }

    pub fn reject(confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            confidence: confidence.clamp(0.0, 1.0),
            reason: Some(reason.into()),
        }
    }
}
