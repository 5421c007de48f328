//! Résumé Tailoring — orchestrates the tailoring pipeline.
//!
//! Flow: build_prompt → provider.generate → extract_json → normalize → draft.
//!
//! One provider round-trip per call, no internal retry. The input résumé is a
//! read-only snapshot; the returned draft is a new value the caller may
//! persist or discard.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::llm_client::{ProviderError, TextGenerator};
use crate::models::resume::StructuredResume;
use crate::tailoring::extract::extract_json;
use crate::tailoring::normalizer::{normalize, ParseError};
use crate::tailoring::prompts::build_prompt;

/// Low temperature biases toward factual rewrites over creative variation.
pub const TAILOR_TEMPERATURE: f32 = 0.3;

/// How much of an unparseable response to keep in the log line.
const RAW_LOG_LIMIT: usize = 2000;

#[derive(Debug, Error)]
pub enum TailorError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("tailoring was cancelled")]
    Cancelled,
}

/// Shared across requests; holds only the provider handle and model override.
#[derive(Clone)]
pub struct ResumeTailor {
    provider: Arc<dyn TextGenerator>,
    model: Option<String>,
}

impl ResumeTailor {
    pub fn new(provider: Arc<dyn TextGenerator>, model: Option<String>) -> Self {
        Self { provider, model }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Tailors `resume` to `job_description`.
    ///
    /// Cancellation is honoured up to the end of the provider call; once the
    /// response is in hand, extraction and normalization run to completion.
    pub async fn tailor(
        &self,
        resume: &StructuredResume,
        job_description: &str,
        cancel: &CancellationToken,
    ) -> Result<StructuredResume, TailorError> {
        if cancel.is_cancelled() {
            return Err(TailorError::Cancelled);
        }

        let prompt = build_prompt(resume, job_description);

        info!(
            "Tailoring resume '{}' via {} ({} work experiences, {} chars of job description)",
            resume.title,
            self.provider.name(),
            resume.work_experiences.len(),
            job_description.len()
        );

        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Tailoring cancelled before the provider responded");
                return Err(TailorError::Cancelled);
            }
            result = self.provider.generate(&prompt, self.model.as_deref(), TAILOR_TEMPERATURE) => result?,
        };

        let json = extract_json(&raw);

        let draft = normalize(json, resume).map_err(|e| {
            warn!(
                "Tailoring response from {} could not be parsed ({e}); raw response: {}",
                self.provider.name(),
                truncate(&raw, RAW_LOG_LIMIT)
            );
            TailorError::Parse(e)
        })?;

        info!(
            "Tailored draft '{}': {} work experiences, {} skills",
            draft.title,
            draft.work_experiences.len(),
            draft.skills.len()
        );

        Ok(draft)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}…", text.chars().take(max_chars).collect::<String>())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
