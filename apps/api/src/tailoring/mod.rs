// Résumé tailoring pipeline.
// Prompt building, extraction and normalization are shared by every provider;
// only llm_client adapters know a backend's wire format.

pub mod bullets;
pub mod dates;
pub mod extract;
pub mod handlers;
pub mod normalizer;
pub mod prompts;
pub mod tailor;
