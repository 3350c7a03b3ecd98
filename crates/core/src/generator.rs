//! Experience Generation Service
//!
//! Turns a principle into a short guided micro-experience by prompting a
//! text-generation endpoint for structured JSON. Generation never fails from
//! the caller's point of view: every error is absorbed into the language's
//! fallback experience at a single boundary, `ExperienceGenerator::generate`.

use crate::catalog;
use crate::experience::{GeneratedExperience, Principle};
use crate::language::Language;
use crate::llm_client::GenAiClient;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Reasons a generation attempt produced no usable experience.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API credential is not configured")]
    MissingCredential,
    #[error("Empty response from the text-generation endpoint")]
    EmptyResponse,
    #[error("Malformed experience payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Text-generation request failed: {0:#}")]
    Transport(anyhow::Error),
}

/// Defines the contract for anything that can produce a micro-experience.
#[async_trait]
pub trait ExperienceGenerator: Send + Sync {
    /// Makes a single attempt at generating an experience.
    async fn try_generate(
        &self,
        principle: &Principle,
        language: Language,
    ) -> Result<GeneratedExperience, GenerationError>;

    /// Generates an experience, substituting the static fallback on any failure.
    async fn generate(&self, principle: &Principle, language: Language) -> GeneratedExperience {
        match self.try_generate(principle, language).await {
            Ok(experience) => experience,
            Err(e) => {
                error!(principle_id = principle.id, %language, error = %e, "Experience generation failed, using fallback");
                language.fallback_experience()
            }
        }
    }
}

/// Builds the full generation prompt for a principle.
pub fn build_prompt(principle: &Principle, language: Language) -> String {
    let context = catalog::context_for(principle.id).unwrap_or(principle.description.as_str());
    format!(
        "Based on the Anat Baniel Method (NeuroMovement) 9 Essentials.\n\
         Do NOT create a fitness exercise, a stretch, or a generic meditation.\n\
         Create a 'Micro-Experience' (Erlebnis / Deneyim) that embodies the specific essential definition below.\n\
         \n\
         The Essential: \"{title}\"\n\
         Definition from Source: \"{context}\"\n\
         \n\
         Instruction: Create a brief (approx 1 min) guided experience where the user performs a very small, safe, internal or external action to FEEL this principle.\n\
         Focus on sensation, perception, and the nervous system, not muscle building.\n\
         \n\
         {suffix}",
        title = principle.title,
        suffix = language.config().prompt_suffix,
    )
}

/// JSON schema of `GeneratedExperience`, in the form sent as the response schema.
pub fn response_schema() -> serde_json::Value {
    let mut schema = schemars::schema_for!(GeneratedExperience).to_value();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    schema
}

/// Removes a surrounding Markdown code fence (```` ```json ```` or ```` ``` ````).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    body.trim_start()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parses a (possibly fenced) structured response.
pub fn parse_experience(raw: &str) -> Result<GeneratedExperience, GenerationError> {
    let json = strip_code_fence(raw);
    if json.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(serde_json::from_str(json)?)
}

/// An `ExperienceGenerator` backed by a generative-AI client.
pub struct LLMExperienceGenerator {
    client: Arc<dyn GenAiClient>,
}

impl LLMExperienceGenerator {
    pub fn new(client: Arc<dyn GenAiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExperienceGenerator for LLMExperienceGenerator {
    async fn try_generate(
        &self,
        principle: &Principle,
        language: Language,
    ) -> Result<GeneratedExperience, GenerationError> {
        if !self.client.has_credential() {
            return Err(GenerationError::MissingCredential);
        }

        info!(principle_id = principle.id, %language, "Requesting micro-experience");
        let raw = self
            .client
            .generate_structured(build_prompt(principle, language), response_schema())
            .await
            .map_err(GenerationError::Transport)?
            .ok_or(GenerationError::EmptyResponse)?;

        parse_experience(&raw)
    }
}

/// A mock `ExperienceGenerator` that always returns the same experience.
///
/// Useful for running the pipeline offline.
pub struct MockExperienceGenerator;

#[async_trait]
impl ExperienceGenerator for MockExperienceGenerator {
    async fn try_generate(
        &self,
        principle: &Principle,
        language: Language,
    ) -> Result<GeneratedExperience, GenerationError> {
        Ok(GeneratedExperience {
            title: principle.title.clone(),
            content: language.config().fallback_content.to_string(),
            duration: language.config().fallback_duration.to_string(),
        })
    }
}
