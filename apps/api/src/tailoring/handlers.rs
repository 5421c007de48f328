//! Axum route handlers for the Tailoring API.
//!
//! Stateless: the caller supplies the résumé snapshot in the body and decides
//! what to do with the returned draft. Authentication, ownership checks and
//! persistence sit in front of this service.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::resume::StructuredResume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorRequest {
    pub resume: StructuredResume,
    pub job_description: String,
}

/// POST /api/v1/tailor
///
/// Rewrites the résumé for the job description and returns the draft.
/// The original résumé is never modified; on failure nothing is returned but the error.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<StructuredResume>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobDescription cannot be empty".to_string(),
        ));
    }

    let cancel = state.shutdown.child_token();
    let draft = state
        .tailor
        .tailor(&request.resume, &request.job_description, &cancel)
        .await?;

    Ok(Json(draft))
}
